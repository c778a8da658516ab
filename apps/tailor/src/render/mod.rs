//! Markup-to-Layout Renderer — turns generated LaTeX into a paginated preview.
//!
//! Pipeline: `markup::parse_markup` → `layout::layout_resume` → `pdf::write_pdf`.
//! Parsing is tolerant and never fails; the only content-level error is a
//! document with nothing to render.

pub mod font_metrics;
pub mod layout;
pub mod markup;
pub mod pdf;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

pub use layout::{layout_resume, PaginatedDocument};
pub use markup::parse_markup;
pub use pdf::write_pdf;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("markup contains no recognizable sections")]
    Empty,

    #[error("PDF serialization failed: {0}")]
    Pdf(String),

    #[error("layout dump failed: {0}")]
    Dump(#[from] serde_json::Error),

    #[error("could not write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parses and lays out generated markup.
pub fn render_markup(markup: &str) -> Result<PaginatedDocument, RenderError> {
    let model = parse_markup(markup);
    if model.sections.is_empty() {
        return Err(RenderError::Empty);
    }

    let entries: usize = model.sections.iter().map(|s| s.entries.len()).sum();
    info!(
        "Parsed markup: name='{}', {} sections, {} entries",
        model.full_name,
        model.sections.len(),
        entries
    );

    let document = layout_resume(&model);
    info!("Laid out preview on {} page(s)", document.pages.len());
    Ok(document)
}
