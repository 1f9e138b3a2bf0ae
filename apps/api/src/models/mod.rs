pub mod document;
pub mod issue;
pub mod score;

pub use document::{
    ExtractedDocument, NormalizedDocument, PosTag, Section, SectionLabel, Sentence,
    StructuralUnit, TextRange, Token,
};
pub use issue::{Issue, IssueCategory, Location, Severity};
pub use score::{AnalysisResult, ComponentScore, ComponentScores, Dimension};
