use serde::{Deserialize, Serialize};

/// Text pulled out of the source resume, in page order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub full_text: String,
    /// Character count per page, for diagnostics only.
    pub per_page_char_counts: Vec<usize>,
}

impl ExtractedDocument {
    pub fn page_count(&self) -> usize {
        self.per_page_char_counts.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentationStyle {
    Spaces,
    Tabs,
    #[default]
    Unknown,
}

impl IndentationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndentationStyle::Spaces => "spaces",
            IndentationStyle::Tabs => "tabs",
            IndentationStyle::Unknown => "unknown",
        }
    }
}

/// Lightweight classification of the source resume's layout.
///
/// `recognized_sections` holds canonical labels only, in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralSummary {
    pub recognized_sections: Vec<String>,
    pub has_bullet_points: bool,
    /// Approximate: three consecutive lines with similar token counts.
    pub has_tabular_hints: bool,
    pub indentation_style: IndentationStyle,
}
