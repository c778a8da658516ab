//! Markup parser — recovers a `LogicalResumeModel` from generated LaTeX.
//!
//! The input comes from a non-deterministic generator, so there is no strict
//! grammar here. Every construct is located independently and read with a
//! balanced-brace argument reader; anything that does not fit its expected
//! shape is logged and skipped, and parsing carries on with the next element.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::generation::builder::DEFAULT_NAME;
use crate::generation::prompts::{SKILL_CATEGORIES, TEMPLATE_SECTIONS};
use crate::models::{Entry, LogicalResumeModel, Section};

pub const TECHNICAL_SKILLS: &str = "Technical Skills";

const BEGIN_DOCUMENT: &str = "\\begin{document}";
const END_DOCUMENT: &str = "\\end{document}";
const SECTION_OPEN: &str = "\\section";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\textbf\s*\{\s*\\Huge\s*\\scshape\s*([^}]*)\}").expect("name heading regex")
});
static CENTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\\begin\{center\}(.*?)\\end\{center\}").expect("center block regex")
});
static SMALL_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\small\s+([^\n]+)").expect("contact line regex"));

/// Parses generated markup. Never fails; missing pieces fall back to defaults.
pub fn parse_markup(markup: &str) -> LogicalResumeModel {
    let markup = strip_comments(markup);
    let body = match markup.find(BEGIN_DOCUMENT) {
        Some(i) => &markup[i + BEGIN_DOCUMENT.len()..],
        None => markup.as_str(),
    };

    LogicalResumeModel {
        full_name: extract_name(body),
        contact_line: extract_contact(body),
        sections: extract_sections(body),
    }
}

/// Drops whole-line comments and cuts every other line at its first
/// unescaped `%`.
fn strip_comments(markup: &str) -> String {
    markup
        .lines()
        .filter(|line| !line.trim_start().starts_with('%'))
        .map(cut_comment)
        .collect::<Vec<_>>()
        .join("\n")
}

fn cut_comment(line: &str) -> &str {
    let mut backslashes = 0;
    for (i, c) in line.char_indices() {
        match c {
            '\\' => backslashes += 1,
            '%' if backslashes % 2 == 0 => return &line[..i],
            _ => backslashes = 0,
        }
    }
    line
}

fn extract_name(body: &str) -> String {
    NAME_RE
        .captures(body)
        .map(|caps| clean_latex(&caps[1]))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string())
}

/// Contact details live after `\small` in the centered header block. Falls
/// back to the first `\small` line anywhere in the body.
fn extract_contact(body: &str) -> String {
    let from_center = CENTER_RE.captures(body).and_then(|caps| {
        let block = caps.get(1)?.as_str();
        command_positions(block, "small")
            .first()
            .map(|&(_, after)| block[after..].to_string())
    });

    let raw = from_center.or_else(|| {
        SMALL_LINE_RE
            .captures(body)
            .map(|caps| caps[1].to_string())
    });

    raw.map(|r| clean_latex(&r)).unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn extract_sections(body: &str) -> Vec<Section> {
    let end_doc = body.find(END_DOCUMENT).unwrap_or(body.len());
    let starts: Vec<usize> = command_positions(&body[..end_doc], "section")
        .into_iter()
        .map(|(start, _)| start)
        .collect();

    let mut sections = Vec::with_capacity(starts.len());
    for (k, &start) in starts.iter().enumerate() {
        let span_end = starts.get(k + 1).copied().unwrap_or(end_doc);
        let span = &body[start + SECTION_OPEN.len()..span_end];

        let Some((raw_title, content)) = read_group(span) else {
            warn!("Skipping section with an unterminated heading");
            continue;
        };
        if raw_title.contains('\n') {
            warn!("Skipping section with an unterminated heading");
            continue;
        }
        let title = clean_latex(raw_title);
        if title.is_empty() {
            warn!("Skipping section with an empty heading");
            continue;
        }
        if !TEMPLATE_SECTIONS.contains(&title.as_str()) {
            debug!("Section '{title}' is not one of the template sections");
        }

        let entries = extract_entries(&title, content);
        sections.push(Section { title, entries });
    }
    sections
}

/// Pulls every recognised construct out of a section span and returns them in
/// source order.
fn extract_entries(title: &str, span: &str) -> Vec<Entry> {
    let mut found: Vec<(usize, Entry)> = Vec::new();

    for (pos, after) in command_positions(span, "resumeSubheading") {
        match read_args(&span[after..], 4) {
            Some(args) => found.push((
                pos,
                Entry::Subheading {
                    org: clean_latex(args[0]),
                    location: clean_latex(args[1]),
                    title: clean_latex(args[2]),
                    dates: clean_latex(args[3]),
                },
            )),
            None => warn!("Skipping malformed \\resumeSubheading in section '{title}'"),
        }
    }

    for (pos, after) in command_positions(span, "resumeProjectHeading") {
        match read_args(&span[after..], 2) {
            Some(args) => found.push((
                pos,
                Entry::ProjectHeading {
                    summary: clean_latex(args[0]),
                    dates: clean_latex(args[1]),
                },
            )),
            None => warn!("Skipping malformed \\resumeProjectHeading in section '{title}'"),
        }
    }

    for (pos, after) in command_positions(span, "resumeItem") {
        match read_args(&span[after..], 1) {
            Some(args) => {
                let text = clean_latex(args[0]);
                if !text.is_empty() {
                    found.push((pos, Entry::BulletItem { text }));
                }
            }
            None => warn!("Skipping malformed \\resumeItem in section '{title}'"),
        }
    }

    if title == TECHNICAL_SKILLS {
        found.extend(extract_skill_categories(span));
    }

    if found.is_empty() {
        let text = clean_latex(span);
        if !text.is_empty() {
            return vec![Entry::Paragraph { text }];
        }
        return Vec::new();
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, entry)| entry).collect()
}

/// Reads `\textbf{Label}{: values}` and `\textbf{Label}: values` pairs.
fn extract_skill_categories(span: &str) -> Vec<(usize, Entry)> {
    let mut out = Vec::new();
    for (pos, after) in command_positions(span, "textbf") {
        let Some((raw_label, rest)) = read_group(&span[after..]) else {
            continue;
        };
        let rest_trimmed = rest.trim_start();

        let raw_value = if rest_trimmed.starts_with('{') {
            match read_group(rest_trimmed) {
                Some((inner, _)) => inner.trim_start().strip_prefix(':').map(str::to_string),
                None => None,
            }
        } else {
            rest_trimmed.strip_prefix(':').map(|value| {
                let end = [value.find("\\\\"), value.find('\n'), value.find('}')]
                    .into_iter()
                    .flatten()
                    .min()
                    .unwrap_or(value.len());
                value[..end].to_string()
            })
        };

        let Some(raw_value) = raw_value else {
            continue;
        };
        let label = clean_latex(raw_label);
        let items = clean_latex(&raw_value);
        if label.is_empty() || items.is_empty() {
            continue;
        }
        if !SKILL_CATEGORIES.contains(&label.as_str()) {
            debug!("Skill category '{label}' is not one of the template categories");
        }
        out.push((pos, Entry::SkillCategory { label, items }));
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Low-level readers
// ────────────────────────────────────────────────────────────────────────────

/// Finds `\name` occurrences that are not a prefix of a longer command.
/// Returns `(start_of_backslash, index_after_name)` pairs.
fn command_positions(text: &str, name: &str) -> Vec<(usize, usize)> {
    let needle = format!("\\{name}");
    text.match_indices(&needle)
        .filter_map(|(start, _)| {
            let after = start + needle.len();
            let next = text[after..].chars().next();
            match next {
                Some(c) if c.is_ascii_alphabetic() => None,
                _ => Some((start, after)),
            }
        })
        .collect()
}

/// Reads one `{...}` group after optional whitespace, honouring nesting and
/// escaped braces. Returns the inner text and the remainder after the group.
fn read_group(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_start();
    let offset = text.len() - trimmed.len();
    if !trimmed.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in trimmed.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let inner = &text[offset + 1..offset + i];
                    let rest = &text[offset + i + 1..];
                    return Some((inner, rest));
                }
            }
            _ => {}
        }
    }
    None
}

/// Reads exactly `n` consecutive brace groups.
fn read_args(text: &str, n: usize) -> Option<Vec<&str>> {
    let mut args = Vec::with_capacity(n);
    let mut rest = text;
    for _ in 0..n {
        let (inner, remainder) = read_group(rest)?;
        args.push(inner);
        rest = remainder;
    }
    Some(args)
}

// ────────────────────────────────────────────────────────────────────────────
// Text cleanup
// ────────────────────────────────────────────────────────────────────────────

/// Commands whose group arguments carry no visible text.
const DISCARD_ARG_COMMANDS: [&str; 6] = ["vspace", "hspace", "begin", "end", "label", "input"];

/// Reduces a LaTeX fragment to its visible text: wrappers such as `\textbf`,
/// `\emph` or `\underline` are unwrapped, `\href{url}{label}` keeps the label,
/// escapes are resolved, `$|$` becomes `|`, and whitespace is collapsed.
pub fn clean_latex(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    push_clean(fragment, &mut out);

    let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace("---", "—").replace("--", "–")
}

fn push_clean(fragment: &str, out: &mut String) {
    let mut rest = fragment;
    while let Some(c) = rest.chars().next() {
        match c {
            '\\' => rest = push_command(&rest[1..], out),
            '{' | '}' | '$' => rest = &rest[1..],
            '~' => {
                out.push(' ');
                rest = &rest[1..];
            }
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
}

/// Handles the text following a backslash; returns the unconsumed remainder.
fn push_command<'a>(after_backslash: &'a str, out: &mut String) -> &'a str {
    let Some(first) = after_backslash.chars().next() else {
        return after_backslash;
    };

    if first == '\\' {
        out.push(' ');
        return &after_backslash[1..];
    }
    if !first.is_ascii_alphabetic() {
        // \%, \&, \$, \#, \_, \{, \} and spacing commands like "\ " or "\,".
        if "%&$#_{}".contains(first) {
            out.push(first);
        } else {
            out.push(' ');
        }
        return &after_backslash[first.len_utf8()..];
    }

    let name_len = after_backslash
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(after_backslash.len());
    let name = &after_backslash[..name_len];
    let mut rest = &after_backslash[name_len..];

    if name == "href" {
        if let Some((_, after_url)) = read_group(rest) {
            rest = after_url;
        }
        return rest;
    }

    if DISCARD_ARG_COMMANDS.contains(&name) {
        if let Some((_, remainder)) = read_group(rest) {
            rest = remainder;
        }
        // Optional [..] arguments, e.g. \begin{itemize}[leftmargin=0.15in].
        if let Some(stripped) = rest.strip_prefix('[') {
            if let Some(close) = stripped.find(']') {
                rest = &stripped[close + 1..];
            }
        }
        return rest;
    }

    // Every other command is dropped; a following group, if any, is kept as
    // plain text by the caller's brace skipping.
    out.push(' ');
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::prompts::RESUME_TEMPLATE;
    use crate::render::font_metrics::FontStyle;
    use crate::render::layout::{layout_resume, DrawOp};

    fn filled_template() -> String {
        RESUME_TEMPLATE
            .replace("{full_name}", "Jane Doe")
            .replace("{email}", "jane@doe.dev")
            .replace("{linkedin}", "linkedin.com/in/janedoe")
            .replace("{github}", "github.com/janedoe")
            .replace("LIST OF LANGUAGES", "Rust, Go, Python")
            .replace("LIST OF FRAMEWORKS", "Tokio, Axum")
            .replace("LIST OF TOOLS", "Git, Docker")
            .replace("LIST OF LIBRARIES", "Serde, Rayon")
            .replace("COMPANY NAME", "Acme Corp")
            .replace("JOB TITLE", "Backend Engineer")
            .replace("UNIVERSITY NAME", "State University")
            .replace("DEGREE", "B.S. Computer Science")
            .replace("PROJECT NAME", "Tailor")
            .replace("TECHNOLOGIES USED", "Rust")
    }

    fn section<'a>(model: &'a LogicalResumeModel, title: &str) -> &'a Section {
        model
            .sections
            .iter()
            .find(|s| s.title == title)
            .unwrap_or_else(|| panic!("missing section {title}"))
    }

    #[test]
    fn test_round_trip_header_fields() {
        let model = parse_markup(&filled_template());
        assert_eq!(model.full_name, "Jane Doe");
        assert_eq!(
            model.contact_line,
            "jane@doe.dev | linkedin.com/in/janedoe | github.com/janedoe"
        );
    }

    #[test]
    fn test_round_trip_sections_in_template_order() {
        let model = parse_markup(&filled_template());
        let titles: Vec<&str> = model.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, TEMPLATE_SECTIONS.to_vec());
    }

    #[test]
    fn test_round_trip_entries() {
        let model = parse_markup(&filled_template());

        assert_eq!(
            section(&model, "Experience").entries,
            vec![
                Entry::Subheading {
                    org: "Acme Corp".into(),
                    location: "LOCATION".into(),
                    title: "Backend Engineer".into(),
                    dates: "DATES".into(),
                },
                Entry::BulletItem { text: "BULLET POINT ABOUT ACHIEVEMENT".into() },
                Entry::BulletItem { text: "BULLET POINT ABOUT ACHIEVEMENT".into() },
            ]
        );

        assert_eq!(
            section(&model, "Projects").entries[0],
            Entry::ProjectHeading { summary: "Tailor | Rust".into(), dates: "DATES".into() }
        );

        assert_eq!(
            section(&model, "Technical Skills").entries,
            vec![
                Entry::SkillCategory { label: "Languages".into(), items: "Rust, Go, Python".into() },
                Entry::SkillCategory { label: "Frameworks".into(), items: "Tokio, Axum".into() },
                Entry::SkillCategory { label: "Developer Tools".into(), items: "Git, Docker".into() },
                Entry::SkillCategory { label: "Libraries".into(), items: "Serde, Rayon".into() },
            ]
        );

        assert_eq!(
            section(&model, "Summary").entries,
            vec![Entry::Paragraph {
                text: "A tailored summary that highlights the qualifications most relevant to the target position.".into()
            }]
        );
    }

    #[test]
    fn test_preamble_commands_are_not_parsed_as_entries() {
        let model = parse_markup(&filled_template());
        let education = section(&model, "Education");
        assert_eq!(education.entries.len(), 1);
        assert!(matches!(education.entries[0], Entry::Subheading { .. }));
    }

    #[test]
    fn test_two_subheadings_three_bullets_in_source_order() {
        let markup = r"\begin{document}
\section{Experience}
  \resumeSubHeadingListStart
    \resumeSubheading{Acme}{Remote}{Engineer}{2019 -- 2020}
    \resumeSubheading{Globex}{Berlin}{Senior Engineer}{2020 -- 2023}
      \resumeItemListStart
        \resumeItem{Cut p99 latency by \textbf{40\%}}
        \resumeItem{Led migration to \emph{Rust}}
        \resumeItem{Mentored 4 engineers}
      \resumeItemListEnd
  \resumeSubHeadingListEnd
\end{document}";
        let model = parse_markup(markup);
        let entries = &section(&model, "Experience").entries;
        assert_eq!(entries.len(), 5);
        assert!(matches!(&entries[0], Entry::Subheading { org, dates, .. } if org == "Acme" && dates == "2019 – 2020"));
        assert!(matches!(&entries[1], Entry::Subheading { org, .. } if org == "Globex"));
        assert_eq!(entries[2], Entry::BulletItem { text: "Cut p99 latency by 40%".into() });
        assert_eq!(entries[3], Entry::BulletItem { text: "Led migration to Rust".into() });
        assert_eq!(entries[4], Entry::BulletItem { text: "Mentored 4 engineers".into() });

        let layout = layout_resume(&model);
        assert_eq!(layout.pages.len(), 1);
        let texts: Vec<(FontStyle, f32, &str)> = layout.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { font, size, text, .. } => Some((*font, *size, text.as_str())),
                DrawOp::Rule { .. } => None,
            })
            .collect();
        let with = |style: FontStyle, pt: f32| -> Vec<&str> {
            texts
                .iter()
                .filter(|(font, size, _)| *font == style && (*size - pt).abs() < f32::EPSILON)
                .map(|(_, _, text)| *text)
                .collect()
        };

        assert_eq!(with(FontStyle::Bold, 11.0), vec!["Acme", "Remote", "Globex", "Berlin"]);
        assert_eq!(
            with(FontStyle::Oblique, 10.0),
            vec!["Engineer", "2019 – 2020", "Senior Engineer", "2020 – 2023"]
        );
        let body = with(FontStyle::Regular, 10.0);
        assert_eq!(body.iter().filter(|t| **t == "•").count(), 3);
        assert_eq!(
            body.into_iter().filter(|t| *t != "•").collect::<Vec<_>>(),
            vec!["Cut p99 latency by 40%", "Led migration to Rust", "Mentored 4 engineers"]
        );
    }

    #[test]
    fn test_trailing_comments_are_cut() {
        let markup = r"\begin{document}
\section{Summary}
Ships reliable services at 50\% lower cost. % draft note {
\section{Experience} % reordered
  \resumeSubheading{Acme}{Remote}{Engineer}{2020} %{
  \resumeItem{Kept intact}
\end{document}";
        let model = parse_markup(markup);
        assert_eq!(
            section(&model, "Summary").entries,
            vec![Entry::Paragraph { text: "Ships reliable services at 50% lower cost.".into() }]
        );
        let experience = &section(&model, "Experience").entries;
        assert_eq!(experience.len(), 2);
        assert!(matches!(&experience[0], Entry::Subheading { org, .. } if org == "Acme"));
        assert_eq!(experience[1], Entry::BulletItem { text: "Kept intact".into() });
    }

    #[test]
    fn test_cut_comment() {
        assert_eq!(cut_comment(r"50\% done % note"), r"50\% done ");
        assert_eq!(cut_comment(r"line\\% note"), r"line\\");
        assert_eq!(cut_comment("no comment"), "no comment");
    }

    #[test]
    fn test_unterminated_section_heading_does_not_disturb_others() {
        let markup = r"\begin{document}
\section{Technical Skills}
  \textbf{Languages}{: Rust, Go}
\section{Experience
  \resumeSubheading{Acme}{Remote}{Engineer}{2020}
  \resumeItem{Should not leak}
\section{Projects}
  \resumeProjectHeading{\textbf{Tailor} $|$ \emph{Rust}}{2024}
  \resumeItem{Parses markup}
\section{Education}
  \resumeSubheading{State U}{Springfield}{B.S.}{2018}
\end{document}";
        let model = parse_markup(markup);
        let titles: Vec<&str> = model.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Technical Skills", "Projects", "Education"]);

        assert_eq!(
            section(&model, "Technical Skills").entries,
            vec![Entry::SkillCategory { label: "Languages".into(), items: "Rust, Go".into() }]
        );
        assert_eq!(
            section(&model, "Projects").entries,
            vec![
                Entry::ProjectHeading { summary: "Tailor | Rust".into(), dates: "2024".into() },
                Entry::BulletItem { text: "Parses markup".into() },
            ]
        );
        assert_eq!(section(&model, "Education").entries.len(), 1);
    }

    #[test]
    fn test_missing_end_document_keeps_last_section() {
        let markup = "\\section{Projects}\n\\resumeItem{Still here}\n";
        let model = parse_markup(markup);
        assert_eq!(model.sections.len(), 1);
        assert_eq!(
            model.sections[0].entries,
            vec![Entry::BulletItem { text: "Still here".into() }]
        );
    }

    #[test]
    fn test_malformed_item_is_skipped() {
        let markup = "\\section{Experience}\n\\resumeSubheading{Acme}{Remote}\n\\resumeItem{Kept}\n";
        let model = parse_markup(markup);
        // Only two groups follow the subheading, so it is skipped.
        let entries = &model.sections[0].entries;
        assert!(entries.iter().all(|e| !matches!(e, Entry::Subheading { .. })));
        assert!(entries.contains(&Entry::BulletItem { text: "Kept".into() }));
    }

    #[test]
    fn test_empty_and_garbage_input_yield_defaults() {
        for input in ["", "no latex here", "}}}{{{", "\\section{"] {
            let model = parse_markup(input);
            assert_eq!(model.full_name, DEFAULT_NAME);
            assert!(model.sections.is_empty(), "input {input:?}");
        }
    }

    #[test]
    fn test_contact_falls_back_to_small_line() {
        let markup = "\\textbf{\\Huge \\scshape Ada Lovelace}\n\\small ada@engine.org $|$ London\n";
        let model = parse_markup(markup);
        assert_eq!(model.full_name, "Ada Lovelace");
        assert_eq!(model.contact_line, "ada@engine.org | London");
    }

    #[test]
    fn test_skills_only_parsed_in_technical_skills() {
        let markup = "\\section{Summary}\n\\textbf{Languages}{: Rust}\n";
        let model = parse_markup(markup);
        assert!(model.sections[0]
            .entries
            .iter()
            .all(|e| !matches!(e, Entry::SkillCategory { .. })));
    }

    #[test]
    fn test_skills_bare_colon_form() {
        let markup = "\\section{Technical Skills}\n\\textbf{Languages}: Rust, C++ \\\\\n\\textbf{Libraries}: Serde\n";
        let model = parse_markup(markup);
        assert_eq!(
            model.sections[0].entries,
            vec![
                Entry::SkillCategory { label: "Languages".into(), items: "Rust, C++".into() },
                Entry::SkillCategory { label: "Libraries".into(), items: "Serde".into() },
            ]
        );
    }

    #[test]
    fn test_clean_latex() {
        assert_eq!(clean_latex(r"\textbf{Tailor} $|$ \emph{Rust}"), "Tailor | Rust");
        assert_eq!(clean_latex(r"\href{https://x.dev}{\underline{x.dev}}"), "x.dev");
        assert_eq!(clean_latex(r"R\&D at 50\% \_ \#1"), "R&D at 50% _ #1");
        assert_eq!(clean_latex("2019 -- 2022"), "2019 – 2022");
        assert_eq!(clean_latex(r"a\\b~c"), "a b c");
        assert_eq!(clean_latex(r"\begin{itemize}[leftmargin=0.15in] x \end{itemize}"), "x");
    }

    #[test]
    fn test_read_group_nested_and_escaped() {
        assert_eq!(read_group("  {a{b}c} tail"), Some(("a{b}c", " tail")));
        assert_eq!(read_group(r"{50\} off}"), Some((r"50\} off", "")));
        assert_eq!(read_group("{open"), None);
        assert_eq!(read_group("x{a}"), None);
    }

    #[test]
    fn test_command_positions_ignores_longer_names() {
        let text = r"\resumeItemListStart \resumeItem{a} \resumeItems";
        let found = command_positions(text, "resumeItem");
        assert_eq!(found.len(), 1);
        assert_eq!(&text[found[0].1..found[0].1 + 3], "{a}");
    }
}
