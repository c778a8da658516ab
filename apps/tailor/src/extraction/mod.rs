//! Document Extractor — pulls page text out of the source resume PDF.
//!
//! `lopdf` opens the document and answers the structural questions (encrypted?
//! how many pages?); `pdf-extract` does the per-page text extraction. Either
//! the whole document is extracted or an `ExtractionError` is returned; no
//! partial text escapes this module.

pub mod side_inputs;
pub mod structure;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document as LopdfDocument;
use thiserror::Error;
use tracing::info;

use crate::models::{ExtractedDocument, StructuralSummary};

pub use structure::analyze_structure;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("could not read '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("not a readable PDF: {0}")]
    Parse(String),

    #[error("document is encrypted")]
    Encrypted,

    #[error("document has no pages")]
    NoPages,

    #[error("text extraction failed: {0}")]
    Text(String),
}

impl From<lopdf::Error> for ExtractionError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => ExtractionError::Encrypted,
            _ => ExtractionError::Parse(err.to_string()),
        }
    }
}

/// Reads the PDF at `path` and returns its text together with the structural
/// summary of that text.
pub fn extract_document(
    path: &Path,
) -> Result<(ExtractedDocument, StructuralSummary), ExtractionError> {
    info!("Extracting text from PDF: {}", path.display());
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Open {
        path: path.display().to_string(),
        source,
    })?;
    extract_from_bytes(&bytes)
}

/// In-memory variant of [`extract_document`].
pub fn extract_from_bytes(
    bytes: &[u8],
) -> Result<(ExtractedDocument, StructuralSummary), ExtractionError> {
    let doc = LopdfDocument::load_mem(bytes)?;
    if doc.is_encrypted() {
        return Err(ExtractionError::Encrypted);
    }
    if doc.get_pages().is_empty() {
        return Err(ExtractionError::NoPages);
    }

    let pages = extract_page_texts(bytes)?;
    if pages.is_empty() {
        return Err(ExtractionError::NoPages);
    }

    let mut per_page_char_counts = Vec::with_capacity(pages.len());
    for (i, page_text) in pages.iter().enumerate() {
        let chars = page_text.chars().count();
        info!("  - Extracted {} characters from page {}", chars, i + 1);
        per_page_char_counts.push(chars);
    }

    let document = ExtractedDocument {
        full_text: pages.join("\n"),
        per_page_char_counts,
    };
    let summary = analyze_structure(&document.full_text);
    info!(
        "  - Identified {} sections across {} page(s)",
        summary.recognized_sections.len(),
        document.page_count()
    );

    Ok((document, summary))
}

/// Runs `pdf-extract` over the buffer. The library panics on some malformed
/// inputs, so panics are converted into `ExtractionError::Text`.
fn extract_page_texts(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match outcome {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Text(e.to_string())),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "extraction library panicked".to_string());
            Err(ExtractionError::Text(reason))
        }
    }
}
