//! Document structure types
//!
//! The uniform hierarchy every source format is converted into:
//! document -> chapters -> paragraphs -> sentences, plus flat elements,
//! metadata and validation results.

pub mod element;
pub mod entity;
pub mod metadata;
pub mod validation;

pub use element::{DocumentElement, ElementType};
pub use entity::{
    estimate_duration, Chapter, ConfidenceBreakdown, DocumentStats, DocumentStructure, Paragraph,
    ParagraphType, ProcessingMetrics, Sentence, WORDS_PER_MINUTE,
};
pub use metadata::{DocumentMetadata, UNTITLED_DOCUMENT};
pub use validation::{IssueLocation, Severity, ValidationIssue, ValidationReport};
