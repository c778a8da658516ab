//! Optional typesetting pass — hands the saved markup to an external TeX engine.
//!
//! Best effort only: every outcome is reported back to the caller, none is an
//! error. The preview PDF produced by the renderer does not depend on this.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

/// Lines of engine output kept in a failure excerpt.
const EXCERPT_LINES: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypesetOutcome {
    /// The engine exited successfully and produced this PDF.
    Compiled(PathBuf),
    /// The engine ran but did not produce a PDF.
    Failed {
        status: Option<i32>,
        excerpt: String,
    },
    /// The engine could not be started (typically not installed).
    Unavailable(String),
    /// Disabled from the command line.
    Skipped,
}

/// Runs `<engine> -interaction=nonstopmode -halt-on-error -output-directory
/// <out_dir> <tex_path>` and classifies the result.
pub async fn typeset(engine: &str, tex_path: &Path, out_dir: &Path) -> TypesetOutcome {
    info!("Typesetting {} with {engine}", tex_path.display());

    let output = Command::new(engine)
        .arg("-interaction=nonstopmode")
        .arg("-halt-on-error")
        .arg("-output-directory")
        .arg(out_dir)
        .arg(tex_path)
        .stdin(Stdio::null())
        .output()
        .await;

    let output = match output {
        Ok(o) => o,
        Err(e) => {
            warn!("TeX engine '{engine}' unavailable: {e}; the preview PDF is still available");
            return TypesetOutcome::Unavailable(e.to_string());
        }
    };

    let pdf_path = expected_pdf_path(tex_path, out_dir);
    if output.status.success() && pdf_path.is_file() {
        info!("Typeset PDF written to {}", pdf_path.display());
        return TypesetOutcome::Compiled(pdf_path);
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let excerpt = tail_lines(&combined, EXCERPT_LINES);

    warn!(
        "TeX engine '{engine}' failed (status {:?}); the preview PDF is still available.\n{excerpt}",
        output.status.code()
    );
    TypesetOutcome::Failed {
        status: output.status.code(),
        excerpt,
    }
}

/// `<out_dir>/<tex stem>.pdf`, where a TeX engine writes its output.
fn expected_pdf_path(tex_path: &Path, out_dir: &Path) -> PathBuf {
    let stem = tex_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{stem}.pdf"))
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
