//! Pipeline — runs the stages in order for a single tailoring job.
//!
//! Side inputs → extraction → instruction → gateway → markup on disk →
//! preview PDF → optional typesetting. Each stage's error aborts the run,
//! except typesetting which only reports an outcome. Nothing is written to the
//! output directory until the gateway has returned markup.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::extraction::{extract_document, side_inputs};
use crate::generation::{build_instruction, GenerationRequest};
use crate::llm_client::{strip_code_fences, GenerationGateway};
use crate::render::{render_markup, write_pdf, RenderError};
use crate::typeset::{typeset, TypesetOutcome};

pub const DEFAULT_JOB_NAME: &str = "Tailored_Resume";

/// Everything one run needs, resolved from the command line and config.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub resume_path: PathBuf,
    pub job_description_path: PathBuf,
    pub details_path: PathBuf,
    pub out_dir: PathBuf,
    /// Already sanitized; used as the stem of every output file.
    pub job_name: String,
    /// `None` disables the typesetting pass.
    pub tex_engine: Option<String>,
    pub dump_layout: bool,
}

/// Paths of the artifacts a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub markup_path: PathBuf,
    pub preview_path: PathBuf,
    pub layout_path: Option<PathBuf>,
    pub typeset: TypesetOutcome,
}

/// Runs the whole pipeline.
pub async fn run(
    options: &RunOptions,
    gateway: &dyn GenerationGateway,
) -> Result<RunReport, PipelineError> {
    let job_description = read_job_description(&options.job_description_path)?;
    let supplementary_details = side_inputs::read_optional(&options.details_path);
    if supplementary_details.is_empty() {
        info!("No additional details provided");
    } else {
        info!(
            "Loaded {} chars of additional details from {}",
            supplementary_details.len(),
            options.details_path.display()
        );
    }

    let (document, structural_summary) = extract_document(&options.resume_path)?;
    info!(
        "Extracted {} chars from {} page(s)",
        document.full_text.len(),
        document.page_count()
    );

    let request = GenerationRequest {
        job_description,
        resume_text: document.full_text,
        supplementary_details,
        structural_summary,
    };
    tailor(&request, options, gateway).await
}

/// Generation onward: builds the instruction, calls the gateway, persists the
/// markup and renders the preview.
pub async fn tailor(
    request: &GenerationRequest,
    options: &RunOptions,
    gateway: &dyn GenerationGateway,
) -> Result<RunReport, PipelineError> {
    let instruction = build_instruction(request);
    info!(
        "Requesting tailored markup ({} chars of instruction)",
        instruction.len()
    );
    let raw = gateway.generate(&instruction).await?;
    let markup = strip_code_fences(&raw);
    info!("Received {} chars of markup", markup.len());

    tokio::fs::create_dir_all(&options.out_dir)
        .await
        .map_err(|e| PipelineError::io(&options.out_dir, e))?;

    let markup_path = options.out_dir.join(format!("{}.tex", options.job_name));
    tokio::fs::write(&markup_path, &markup)
        .await
        .map_err(|e| PipelineError::io(&markup_path, e))?;
    info!("Markup saved to {}", markup_path.display());

    let document = render_markup(&markup)?;

    let layout_path = if options.dump_layout {
        let path = options
            .out_dir
            .join(format!("{}_layout.json", options.job_name));
        let json = serde_json::to_string_pretty(&document).map_err(RenderError::from)?;
        write_render_artifact(&path, json.as_bytes()).await?;
        info!("Layout dump written to {}", path.display());
        Some(path)
    } else {
        None
    };

    let bytes = write_pdf(&document)?;
    let preview_path = options
        .out_dir
        .join(format!("{}_preview.pdf", options.job_name));
    write_render_artifact(&preview_path, &bytes).await?;
    info!("Preview PDF written to {}", preview_path.display());

    let typeset = match &options.tex_engine {
        Some(engine) => typeset(engine, &markup_path, &options.out_dir).await,
        None => TypesetOutcome::Skipped,
    };

    Ok(RunReport {
        markup_path,
        preview_path,
        layout_path,
        typeset,
    })
}

async fn write_render_artifact(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn read_job_description(path: &Path) -> Result<String, PipelineError> {
    match side_inputs::read_text_with_fallback(path) {
        Ok(text) => {
            if text.trim().is_empty() {
                warn!("Job description {} is empty", path.display());
            }
            info!(
                "Loaded {} chars of job description from {}",
                text.len(),
                path.display()
            );
            Ok(text)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(PipelineError::Configuration(format!(
            "job description file '{}' not found",
            path.display()
        ))),
        Err(e) => Err(PipelineError::io(path, e)),
    }
}

/// Picks the resume to tailor: the explicit path if given, otherwise the
/// first `*.pdf` (by file name) in `resume_dir`.
pub fn discover_resume(
    explicit: Option<&Path>,
    resume_dir: &Path,
) -> Result<PathBuf, PipelineError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let entries = std::fs::read_dir(resume_dir).map_err(|e| {
        PipelineError::Configuration(format!(
            "no resume given and '{}' is not readable: {e}",
            resume_dir.display()
        ))
    })?;

    let mut pdfs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdfs.sort();

    let first = pdfs.into_iter().next().ok_or_else(|| {
        PipelineError::Configuration(format!(
            "no PDF resume found in '{}'",
            resume_dir.display()
        ))
    })?;
    info!("Using resume {}", first.display());
    Ok(first)
}

/// Restricts a job title to `[A-Za-z0-9_-]` for use as a file stem. Spaces
/// become underscores; other characters are dropped.
pub fn sanitize_job_name(title: &str) -> String {
    let name: String = title
        .trim()
        .chars()
        .filter_map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '-' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    if name.is_empty() {
        DEFAULT_JOB_NAME.to_string()
    } else {
        name
    }
}
