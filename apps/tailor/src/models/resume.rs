use serde::{Deserialize, Serialize};

/// Resume content recovered from generated markup. Built and consumed within
/// a single rendering pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalResumeModel {
    pub full_name: String,
    pub contact_line: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub entries: Vec<Entry>,
}

/// A single renderable element inside a section, in source order.
///
/// `Subheading` fields are positional: `org` and `location` form the first
/// row, `title` and `dates` the second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Subheading {
        org: String,
        location: String,
        title: String,
        dates: String,
    },
    ProjectHeading {
        summary: String,
        dates: String,
    },
    SkillCategory {
        label: String,
        items: String,
    },
    BulletItem {
        text: String,
    },
    /// Free prose in a section without structured entries (e.g. Summary).
    Paragraph {
        text: String,
    },
}
