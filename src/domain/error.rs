use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    EmptyContent,
    FileTooLarge,
    EncodingError,
    InvalidSyntax,
    MalformedHeading,
    MalformedCodeBlock,
    MalformedTable,
    MalformedList,
    NestingTooDeep,
    LowConfidence,
    InvalidConfiguration,
    UnsupportedFormat,
    InternalError,
}

/// Broad family an error code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Rejected before tokenization
    Input,
    /// Raised by the tokenizer or builder, fatal to the attempt
    Structural,
    /// Policy rejection after a complete parse
    Confidence,
    Configuration,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::EncodingError => "ENCODING_ERROR",
            Self::InvalidSyntax => "INVALID_SYNTAX",
            Self::MalformedHeading => "MALFORMED_HEADING",
            Self::MalformedCodeBlock => "MALFORMED_CODE_BLOCK",
            Self::MalformedTable => "MALFORMED_TABLE",
            Self::MalformedList => "MALFORMED_LIST",
            Self::NestingTooDeep => "NESTING_TOO_DEEP",
            Self::LowConfidence => "LOW_CONFIDENCE",
            Self::InvalidConfiguration => "INVALID_CONFIGURATION",
            Self::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput | Self::EmptyContent | Self::FileTooLarge | Self::EncodingError => {
                ErrorCategory::Input
            }
            Self::InvalidSyntax
            | Self::MalformedHeading
            | Self::MalformedCodeBlock
            | Self::MalformedTable
            | Self::MalformedList
            | Self::NestingTooDeep => ErrorCategory::Structural,
            Self::LowConfidence => ErrorCategory::Confidence,
            Self::InvalidConfiguration | Self::UnsupportedFormat => ErrorCategory::Configuration,
            Self::InternalError => ErrorCategory::Internal,
        }
    }

    /// Default human readable message for the code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::InvalidInput => "Input could not be read as a document",
            Self::EmptyContent => "Document is empty or contains only whitespace",
            Self::FileTooLarge => "Document exceeds the maximum allowed size",
            Self::EncodingError => "Document is not valid UTF-8",
            Self::InvalidSyntax => "Document contains markup the tokenizer could not process",
            Self::MalformedHeading => "Heading has no text",
            Self::MalformedCodeBlock => "Fenced code block is never closed",
            Self::MalformedTable => "Table rows do not match the header column count",
            Self::MalformedList => "List structure is inconsistent",
            Self::NestingTooDeep => "Blockquotes or lists are nested too deeply",
            Self::LowConfidence => "Parsed structure is below the confidence threshold",
            Self::InvalidConfiguration => "Parser configuration is invalid",
            Self::UnsupportedFormat => "Document format is not handled by this parser",
            Self::InternalError => "Unexpected internal error",
        }
    }

    /// Remediation hints shown alongside the error
    pub fn suggested_actions(&self) -> &'static [&'static str] {
        match self {
            Self::InvalidInput => &["Pass the document as UTF-8 text or raw bytes"],
            Self::EmptyContent => &[
                "Check that the file was read completely",
                "Use the lenient strategy to accept empty documents",
            ],
            Self::FileTooLarge => &[
                "Raise max_file_size in the parser configuration",
                "Split the document into smaller files",
                "Enable streaming for large documents",
            ],
            Self::EncodingError => &[
                "Re-encode the document as UTF-8",
                "Strip binary content before parsing",
            ],
            Self::InvalidSyntax => &["Validate the Markdown with a linter"],
            Self::MalformedHeading => &[
                "Add text after the heading markers",
                "Use the lenient strategy to downgrade this to a warning",
            ],
            Self::MalformedCodeBlock => &[
                "Close the fenced code block with a matching fence",
                "Use the lenient strategy to downgrade this to a warning",
            ],
            Self::MalformedTable => &[
                "Give every table row the same number of cells as the header",
                "Use the lenient strategy to downgrade this to a warning",
            ],
            Self::MalformedList => &["Indent nested list items consistently"],
            Self::NestingTooDeep => &[
                "Flatten nested blockquotes and lists",
                "Raise max_nesting_depth in the parser configuration",
                "Use the recover strategy to fall back to a line-based structure",
            ],
            Self::LowConfidence => &[
                "Lower confidence_threshold",
                "Adjust chapter_header_levels to match the document headings",
                "Try a different preset",
            ],
            Self::InvalidConfiguration => &["Check the parser configuration values"],
            Self::UnsupportedFormat => &[
                "Extract the text with a format-specific extractor first",
                "Convert the document to Markdown",
            ],
            Self::InternalError => &["Retry the operation", "Report the issue with the input"],
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-based position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

/// Error returned by every parsing entry point
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
            suggestions: code
                .suggested_actions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Error carrying the code's default message
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.location = Some(SourceLocation { line, column });
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn empty_content() -> Self {
        Self::from_code(ErrorCode::EmptyContent)
    }

    pub fn file_too_large(size: usize, max: usize) -> Self {
        Self::new(
            ErrorCode::FileTooLarge,
            format!("Document is {} bytes, maximum is {} bytes", size, max),
        )
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EncodingError, message)
    }

    pub fn nesting_too_deep(depth: usize, max: usize) -> Self {
        Self::new(
            ErrorCode::NestingTooDeep,
            format!("Nesting depth {} exceeds maximum of {}", depth, max),
        )
    }

    pub fn low_confidence(score: f64, threshold: f64) -> Self {
        Self::new(
            ErrorCode::LowConfidence,
            format!(
                "Structure confidence {:.2} is below threshold {:.2}",
                score, threshold
            ),
        )
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    pub fn unsupported_format(format: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnsupportedFormat,
            format!("{} documents need an external extractor", format),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    pub fn is_structural(&self) -> bool {
        self.category() == ErrorCategory::Structural
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_uses_stable_code() {
        let err = ParseError::file_too_large(20, 10);
        assert_eq!(
            err.to_string(),
            "FILE_TOO_LARGE: Document is 20 bytes, maximum is 10 bytes"
        );
    }

    #[test]
    fn test_error_carries_suggestions() {
        let err = ParseError::from_code(ErrorCode::LowConfidence);
        assert!(!err.suggestions.is_empty());
        assert_eq!(err.message, ErrorCode::LowConfidence.default_message());
    }

    #[test]
    fn test_error_location() {
        let err = ParseError::from_code(ErrorCode::MalformedHeading).at(3, 1);
        assert_eq!(err.location, Some(SourceLocation { line: 3, column: 1 }));
    }

    #[test]
    fn test_categories() {
        assert_eq!(ErrorCode::FileTooLarge.category(), ErrorCategory::Input);
        assert_eq!(ErrorCode::NestingTooDeep.category(), ErrorCategory::Structural);
        assert_eq!(ErrorCode::LowConfidence.category(), ErrorCategory::Confidence);
        assert!(ParseError::nesting_too_deep(5, 4).is_structural());
        assert!(!ParseError::low_confidence(0.1, 0.5).is_structural());
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::NestingTooDeep).unwrap();
        assert_eq!(json, "\"NESTING_TOO_DEEP\"");
    }
}
