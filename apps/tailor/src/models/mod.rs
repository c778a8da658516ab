pub mod document;
pub mod resume;

pub use document::{ExtractedDocument, IndentationStyle, StructuralSummary};
pub use resume::{Entry, LogicalResumeModel, Section};
