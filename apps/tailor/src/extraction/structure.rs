//! Structure Analyzer — classifies raw resume text into a `StructuralSummary`.
//!
//! Pure and infallible: empty or garbage input yields the default summary.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{IndentationStyle, StructuralSummary};

/// Section labels the analyzer knows about, in reporting order.
pub const CANONICAL_SECTIONS: [&str; 10] = [
    "EXPERIENCE",
    "EDUCATION",
    "SKILLS",
    "PROJECTS",
    "CERTIFICATIONS",
    "SUMMARY",
    "OBJECTIVE",
    "CONTACT",
    "REFERENCES",
    "PUBLICATIONS",
];

pub const BULLET_GLYPHS: [char; 12] = ['•', '●', '■', '◦', '○', '◘', '►', '▪', '▫', '▸', '▹', '◆'];

static SECTION_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    CANONICAL_SECTIONS
        .iter()
        .map(|label| {
            let re = Regex::new(&format!(r"(?i)\b{label}\b")).expect("section label regex");
            (*label, re)
        })
        .collect()
});

pub fn analyze_structure(text: &str) -> StructuralSummary {
    StructuralSummary {
        recognized_sections: detect_sections(text),
        has_bullet_points: text.contains(&BULLET_GLYPHS[..]),
        has_tabular_hints: detect_tabular_hints(text),
        indentation_style: detect_indentation(text),
    }
}

fn detect_sections(text: &str) -> Vec<String> {
    SECTION_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(label, _)| label.to_string())
        .collect()
}

/// Samples the first run of three consecutive non-empty lines and flags a
/// tabular layout when their token counts differ by at most one.
fn detect_tabular_hints(text: &str) -> bool {
    let lines: Vec<&str> = text.split('\n').collect();
    let Some(window) = lines
        .windows(3)
        .find(|w| w.iter().all(|line| !line.is_empty()))
    else {
        return false;
    };

    let counts: Vec<usize> = window
        .iter()
        .map(|line| line.split_whitespace().count())
        .collect();
    let (min, max) = counts
        .iter()
        .fold((usize::MAX, 0), |(lo, hi), &c| (lo.min(c), hi.max(c)));
    max - min <= 1
}

fn detect_indentation(text: &str) -> IndentationStyle {
    if text.contains("\n  ") {
        IndentationStyle::Spaces
    } else if text.contains("\n\t") {
        IndentationStyle::Tabs
    } else {
        IndentationStyle::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_default_summary() {
        assert_eq!(analyze_structure(""), StructuralSummary::default());
    }

    #[test]
    fn test_garbage_never_reports_unknown_labels() {
        let inputs = [
            "\u{0}\u{1}\u{2}",
            "}}}{{{\\\\",
            "experienced EXPERIENCES skill-set",
            "💼 résumé — ★★★",
            "\n\n\n\t\t  \r\n",
        ];
        for input in inputs {
            let summary = analyze_structure(input);
            for section in &summary.recognized_sections {
                assert!(
                    CANONICAL_SECTIONS.contains(&section.as_str()),
                    "unexpected label {section} for input {input:?}"
                );
            }
        }
    }

    #[test]
    fn test_labels_match_whole_words_only() {
        let summary = analyze_structure("Experienced engineer with many skillsets");
        assert!(summary.recognized_sections.is_empty());
    }

    #[test]
    fn test_sections_follow_canonical_order() {
        let text = "Projects\nsummary\nEducation\nexperience";
        let summary = analyze_structure(text);
        assert_eq!(
            summary.recognized_sections,
            vec!["EXPERIENCE", "EDUCATION", "PROJECTS", "SUMMARY"]
        );
    }

    #[test]
    fn test_experience_excerpt_scenario() {
        let text = "EXPERIENCE\nAcme Corp\nBackend Engineer\n2019-2022\n• Built service X";
        let summary = analyze_structure(text);
        assert_eq!(summary.recognized_sections, vec!["EXPERIENCE"]);
        assert!(summary.has_bullet_points);
    }

    #[test]
    fn test_bullet_detection() {
        assert!(analyze_structure("▪ shipped it").has_bullet_points);
        assert!(!analyze_structure("- shipped it").has_bullet_points);
    }

    // The tabular check is a heuristic; these only pin its documented behaviour.
    #[test]
    fn test_tabular_hint_on_uniform_lines() {
        let text = "Rust Go Python\nTokio Gin Flask\nCargo Mod Pip";
        assert!(analyze_structure(text).has_tabular_hints);
    }

    #[test]
    fn test_tabular_hint_skips_blank_lines() {
        let text = "one\n\nJane Doe\na b c d e f g h\nx";
        assert!(!analyze_structure(text).has_tabular_hints);
    }

    #[test]
    fn test_tabular_hint_needs_three_lines() {
        assert!(!analyze_structure("just\ntwo").has_tabular_hints);
    }

    #[test]
    fn test_indentation_spaces_take_priority() {
        let text = "a\n\tb\n   c";
        assert_eq!(analyze_structure(text).indentation_style, IndentationStyle::Spaces);
    }

    #[test]
    fn test_indentation_tabs_and_unknown() {
        assert_eq!(analyze_structure("a\n\tb").indentation_style, IndentationStyle::Tabs);
        assert_eq!(analyze_structure("a\n b").indentation_style, IndentationStyle::Unknown);
    }
}
