//! Structural validation results

use serde::{Deserialize, Serialize};

pub const NO_CHAPTERS: &str = "NO_CHAPTERS";
pub const NO_PARAGRAPHS: &str = "NO_PARAGRAPHS";
pub const EMPTY_CHAPTER_TITLE: &str = "EMPTY_CHAPTER_TITLE";
pub const EMPTY_CHAPTER: &str = "EMPTY_CHAPTER";
pub const EMPTY_PARAGRAPH: &str = "EMPTY_PARAGRAPH";
pub const SENTENCE_TOO_SHORT: &str = "SENTENCE_TOO_SHORT";
pub const SENTENCE_TOO_LONG: &str = "SENTENCE_TOO_LONG";

/// Weight of an error against the check total
pub const ERROR_WEIGHT: f64 = 1.0;
/// Weight of a warning against the check total
pub const WARNING_WEIGHT: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Where in the structure an issue was found; indices are zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence: Option<usize>,
}

impl IssueLocation {
    pub fn document() -> Self {
        Self::default()
    }

    pub fn chapter(chapter: usize) -> Self {
        Self {
            chapter: Some(chapter),
            ..Self::default()
        }
    }

    /// `chapter` is `None` for preamble paragraphs
    pub fn paragraph(chapter: Option<usize>, paragraph: usize) -> Self {
        Self {
            chapter,
            paragraph: Some(paragraph),
            sentence: None,
        }
    }

    pub fn sentence(chapter: Option<usize>, paragraph: usize, sentence: usize) -> Self {
        Self {
            chapter,
            paragraph: Some(paragraph),
            sentence: Some(sentence),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub location: IssueLocation,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn error(code: impl Into<String>, message: impl Into<String>, location: IssueLocation) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            location,
            severity: Severity::Error,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>, location: IssueLocation) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            location,
            severity: Severity::Warning,
        }
    }
}

/// Errors and warnings found in a finished structure, with a score measuring
/// violation density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    /// Weighted number of checks performed
    pub total_checks: f64,
    pub score: f64,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ValidationReport {
    pub fn new(total_checks: f64) -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            total_checks,
            score: 1.0,
        }
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
        self.rescore();
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|issue| issue.code == code)
    }

    fn rescore(&mut self) {
        self.is_valid = self.errors.is_empty();

        let weighted =
            self.errors.len() as f64 * ERROR_WEIGHT + self.warnings.len() as f64 * WARNING_WEIGHT;

        self.score = if self.total_checks <= 0.0 {
            if weighted > 0.0 { 0.0 } else { 1.0 }
        } else {
            (1.0 - weighted / self.total_checks).clamp(0.0, 1.0)
        };
    }
}
