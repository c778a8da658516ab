use std::path::PathBuf;

use clap::Parser;

use crate::errors::PipelineError;
use crate::pipeline::{discover_resume, sanitize_job_name, RunOptions, DEFAULT_JOB_NAME};

#[derive(Parser, Debug)]
#[command(name = "tailor", version)]
#[command(about = "Tailor a PDF resume to a job description and render it as LaTeX and PDF")]
pub struct Cli {
    /// Resume PDF to tailor (default: first PDF in --resume-dir)
    #[arg(short, long)]
    pub resume: Option<PathBuf>,

    /// Directory searched for a resume PDF when --resume is not given
    #[arg(long, default_value = "resume")]
    pub resume_dir: PathBuf,

    /// Plain-text job description
    #[arg(short, long, default_value = "job_description.txt")]
    pub job_description: PathBuf,

    /// Optional plain-text file with extra details about the candidate
    #[arg(short, long, default_value = "additional_details.txt")]
    pub details: PathBuf,

    /// Output directory for the generated files
    #[arg(short, long, default_value = "newresume")]
    pub out_dir: PathBuf,

    /// Job title used to name the output files
    #[arg(short = 't', long, default_value = DEFAULT_JOB_NAME)]
    pub job_title: String,

    /// Skip the external TeX typesetting pass
    #[arg(long)]
    pub no_typeset: bool,

    /// Also write the computed page layout as JSON
    #[arg(long)]
    pub dump_layout: bool,

    /// Debug-level logging (overrides RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolves paths and names into run options. `tex_engine` is the
    /// configured engine; it is dropped when typesetting is disabled.
    pub fn into_run_options(self, tex_engine: String) -> Result<RunOptions, PipelineError> {
        let resume_path = discover_resume(self.resume.as_deref(), &self.resume_dir)?;
        Ok(RunOptions {
            resume_path,
            job_description_path: self.job_description,
            details_path: self.details,
            out_dir: self.out_dir,
            job_name: sanitize_job_name(&self.job_title),
            tex_engine: (!self.no_typeset).then_some(tex_engine),
            dump_layout: self.dump_layout,
        })
    }
}
