//! Instruction builder — deterministic string assembly for the generation call.
//!
//! Identical inputs always produce byte-identical output. User-supplied text is
//! appended verbatim and never run through placeholder substitution, so a job
//! description that happens to contain `{email}` cannot change the template.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::generation::prompts::{FILL_CHECKLIST, RESUME_TEMPLATE, TASK_FRAMING};
use crate::llm_client::prompts::{EXHAUSTIVE_INSTRUCTION, MARKUP_ONLY_INSTRUCTION};
use crate::models::StructuralSummary;

pub const DEFAULT_NAME: &str = "Name";
pub const DEFAULT_EMAIL: &str = "email@example.com";
pub const DEFAULT_LINKEDIN: &str = "linkedin.com/in/username";
pub const DEFAULT_GITHUB: &str = "github.com/username";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z ]*").expect("name regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").expect("email regex")
});
static LINKEDIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"linkedin\.com/in/[a-zA-Z0-9_-]+").expect("linkedin regex"));
static GITHUB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/[a-zA-Z0-9_-]+").expect("github regex"));

/// Everything the instruction is built from. Constructed once per run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub job_description: String,
    pub resume_text: String,
    /// May be empty.
    pub supplementary_details: String,
    pub structural_summary: StructuralSummary,
}

/// Best-effort contact metadata used to pre-fill the template header.
/// Each field falls back to a fixed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSeed {
    pub full_name: String,
    pub email: String,
    pub linkedin: String,
    pub github: String,
}

impl TemplateSeed {
    pub fn from_resume_text(text: &str) -> Self {
        let full_name = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .and_then(|line| NAME_RE.find(line))
            .map(|m| m.as_str().trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        Self {
            full_name,
            email: first_match(&EMAIL_RE, text, DEFAULT_EMAIL),
            linkedin: first_match(&LINKEDIN_RE, text, DEFAULT_LINKEDIN),
            github: first_match(&GITHUB_RE, text, DEFAULT_GITHUB),
        }
    }

    /// The fixed template with the header placeholders filled in.
    pub fn seeded_template(&self) -> String {
        RESUME_TEMPLATE
            .replace("{full_name}", &self.full_name)
            .replace("{email}", &self.email)
            .replace("{linkedin}", &self.linkedin)
            .replace("{github}", &self.github)
    }
}

fn first_match(re: &Regex, text: &str, fallback: &str) -> String {
    re.find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Builds the full instruction string sent to the generation gateway.
pub fn build_instruction(request: &GenerationRequest) -> String {
    let seed = TemplateSeed::from_resume_text(&request.resume_text);
    let summary = &request.structural_summary;

    let mut out = String::with_capacity(
        RESUME_TEMPLATE.len()
            + request.job_description.len()
            + request.resume_text.len()
            + request.supplementary_details.len()
            + 2048,
    );

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{EXHAUSTIVE_INSTRUCTION}\n");
    let _ = writeln!(out, "{TASK_FRAMING}\n");

    out.push_str("JOB DESCRIPTION:\n");
    out.push_str(&request.job_description);
    out.push_str("\n\nCURRENT RESUME CONTENT:\n");
    out.push_str(&request.resume_text);
    out.push_str("\n\nADDITIONAL DETAILS ABOUT THE PERSON (incorporate if relevant):\n");
    out.push_str(&request.supplementary_details);
    out.push_str("\n\n");

    let _ = writeln!(out, "RESUME STRUCTURE ANALYSIS:");
    let _ = writeln!(
        out,
        "- Sections detected: {}",
        summary.recognized_sections.join(", ")
    );
    let _ = writeln!(out, "- Uses bullet points: {}", yes_no(summary.has_bullet_points));
    let _ = writeln!(out, "- Contains tables: {}", yes_no(summary.has_tabular_hints));
    let _ = writeln!(
        out,
        "- Indentation style: {}\n",
        summary.indentation_style.as_str()
    );

    out.push_str(
        "Convert this resume to the following LaTeX format and structure, keeping the preamble and \
         document class settings exactly as shown:\n\n",
    );
    out.push_str(&seed.seeded_template());
    out.push('\n');

    let _ = writeln!(out, "{FILL_CHECKLIST}\n");
    out.push_str(MARKUP_ONLY_INSTRUCTION);
    out.push('\n');
    out
}
