mod cli;
mod config;
mod errors;
mod extraction;
mod generation;
mod llm_client;
mod models;
mod pipeline;
mod render;
mod typeset;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;
use crate::llm_client::GeminiGateway;
use crate::typeset::TypesetOutcome;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration")?;

    // Initialize structured logging
    let filter = if cli.verbose {
        EnvFilter::new(format!("{}=debug", env!("CARGO_PKG_NAME")))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        })
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tailor v{}", env!("CARGO_PKG_VERSION"));

    let options = match cli.into_run_options(config.tex_engine.clone()) {
        Ok(options) => options,
        Err(e) => {
            error!("Stage '{}' failed: {e}", e.stage());
            return Ok(ExitCode::FAILURE);
        }
    };

    let gateway = GeminiGateway::new(config.gemini_api_key.clone())
        .context("building the HTTP client")?;
    info!("Generation gateway initialized (model: {})", llm_client::MODEL);

    match pipeline::run(&options, &gateway).await {
        Ok(report) => {
            info!("Tailored markup: {}", report.markup_path.display());
            info!("Preview PDF: {}", report.preview_path.display());
            if let Some(path) = &report.layout_path {
                info!("Layout dump: {}", path.display());
            }
            match &report.typeset {
                TypesetOutcome::Compiled(path) => info!("Typeset PDF: {}", path.display()),
                TypesetOutcome::Skipped => info!("Typesetting skipped"),
                TypesetOutcome::Failed { status, excerpt } => warn!(
                    "Typesetting failed (exit status {status:?}, last line: '{}'); the preview PDF is the fallback",
                    excerpt.lines().last().unwrap_or_default()
                ),
                TypesetOutcome::Unavailable(reason) => warn!(
                    "Typesetting unavailable ({reason}); the preview PDF is the fallback"
                ),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Stage '{}' failed: {e}", e.stage());
            Ok(ExitCode::FAILURE)
        }
    }
}
