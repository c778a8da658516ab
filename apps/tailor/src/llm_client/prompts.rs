// Cross-cutting prompt fragments shared by every generation request.
// The resume-specific template lives in generation::prompts.

/// Appended to every instruction: the response must be raw markup only.
pub const MARKUP_ONLY_INSTRUCTION: &str = "\
Return ONLY the LaTeX source for the resume, starting with \\documentclass and ending with \\end{document}. \
Do NOT include explanations, commentary, or apologies. \
Do NOT wrap the output in markdown code fences.";

/// Asks the model not to stop after the first few items.
pub const EXHAUSTIVE_INSTRUCTION: &str = "\
Process the ENTIRE resume content provided below. Go through ALL projects, skills, certifications, and \
experiences in the resume and the additional details. Do not truncate, summarise away, or skip any relevant \
section; do not limit yourself to the first few items.";
