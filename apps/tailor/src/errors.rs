use std::path::PathBuf;

use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::GatewayError;
use crate::render::RenderError;

/// Run-level error type. Every variant names the stage that failed so the
/// binary can report it before exiting non-zero.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Generation failed: {0}")]
    Generation(GatewayError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<GatewayError> for PipelineError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingApiKey => PipelineError::Configuration(err.to_string()),
            other => PipelineError::Generation(other),
        }
    }
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Configuration(_) => "configuration",
            PipelineError::Extraction(_) => "extraction",
            PipelineError::Generation(_) => "generation",
            PipelineError::Render(_) => "rendering",
            PipelineError::Io { .. } => "output",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
