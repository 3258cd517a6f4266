//! Parser configuration and presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::document::ParagraphType;
use crate::domain::ParseError;

/// Default maximum input size (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default sentence boundary: terminal punctuation, optional closing quote or
/// bracket, then whitespace or end of text
pub const DEFAULT_SENTENCE_BOUNDARY: &str = r#"[.!?]+["')\]]*(?:\s+|$)"#;

/// How the top-level entry point treats non-fatal issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandlingStrategy {
    /// Every issue is an error
    Strict,
    /// Tokenizer diagnostics and low confidence become validation warnings
    #[default]
    Lenient,
    /// Lenient, plus a line-based fallback when a structural error is fatal
    Recover,
}

impl ErrorHandlingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
            Self::Recover => "recover",
        }
    }
}

impl fmt::Display for ErrorHandlingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorHandlingStrategy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            "recover" => Ok(Self::Recover),
            other => Err(ParseError::invalid_configuration(format!(
                "Unknown error handling strategy '{}'",
                other
            ))),
        }
    }
}

/// Configuration consumed by the structure pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Minimum acceptable structure confidence (0.0 - 1.0)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Heading depths that open a chapter
    #[serde(default = "default_chapter_header_levels")]
    pub chapter_header_levels: Vec<u8>,
    #[serde(default)]
    pub include_code_blocks: bool,
    #[serde(default)]
    pub include_tables: bool,
    #[serde(default = "default_true")]
    pub include_blockquotes: bool,
    #[serde(default = "default_true")]
    pub include_lists: bool,
    /// Minimum sentence length in characters
    #[serde(default = "default_min_sentence_length")]
    pub min_sentence_length: usize,
    /// Maximum sentence length in characters
    #[serde(default = "default_max_sentence_length")]
    pub max_sentence_length: usize,
    /// Regular expressions combined with OR into one boundary matcher
    #[serde(default = "default_sentence_boundary_patterns")]
    pub sentence_boundary_patterns: Vec<String>,
    #[serde(default)]
    pub error_handling_strategy: ErrorHandlingStrategy,
    #[serde(default)]
    pub enable_streaming: bool,
    /// Lines per fallback chunk when streaming
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    /// Maximum input size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    /// Maximum combined blockquote/list nesting
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
    /// Input at or above this many bytes is streamed
    #[serde(default = "default_streaming_threshold")]
    pub streaming_threshold: usize,
}

fn default_confidence_threshold() -> f64 {
    0.6
}

fn default_chapter_header_levels() -> Vec<u8> {
    vec![2]
}

fn default_true() -> bool {
    true
}

fn default_min_sentence_length() -> usize {
    10
}

fn default_max_sentence_length() -> usize {
    1000
}

fn default_sentence_boundary_patterns() -> Vec<String> {
    vec![DEFAULT_SENTENCE_BOUNDARY.to_string()]
}

fn default_max_chunk_size() -> usize {
    100
}

fn default_max_file_size() -> usize {
    DEFAULT_MAX_FILE_SIZE
}

fn default_max_nesting_depth() -> usize {
    16
}

fn default_streaming_threshold() -> usize {
    1024 * 1024
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            chapter_header_levels: default_chapter_header_levels(),
            include_code_blocks: false,
            include_tables: false,
            include_blockquotes: default_true(),
            include_lists: default_true(),
            min_sentence_length: default_min_sentence_length(),
            max_sentence_length: default_max_sentence_length(),
            sentence_boundary_patterns: default_sentence_boundary_patterns(),
            error_handling_strategy: ErrorHandlingStrategy::default(),
            enable_streaming: false,
            max_chunk_size: default_max_chunk_size(),
            max_file_size: default_max_file_size(),
            max_nesting_depth: default_max_nesting_depth(),
            streaming_threshold: default_streaming_threshold(),
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chapter_levels(mut self, levels: impl Into<Vec<u8>>) -> Self {
        self.chapter_header_levels = levels.into();
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_strategy(mut self, strategy: ErrorHandlingStrategy) -> Self {
        self.error_handling_strategy = strategy;
        self
    }

    pub fn with_sentence_lengths(mut self, min: usize, max: usize) -> Self {
        self.min_sentence_length = min;
        self.max_sentence_length = max;
        self
    }

    pub fn with_boundary_patterns(mut self, patterns: Vec<String>) -> Self {
        self.sentence_boundary_patterns = patterns;
        self
    }

    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.enable_streaming = enabled;
        self
    }

    pub fn with_max_chunk_size(mut self, lines: usize) -> Self {
        self.max_chunk_size = lines;
        self
    }

    pub fn with_max_file_size(mut self, bytes: usize) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn is_chapter_level(&self, depth: u8) -> bool {
        self.chapter_header_levels.contains(&depth)
    }

    /// Whether paragraphs of the given type are voiced
    pub fn includes_in_audio(&self, paragraph_type: ParagraphType) -> bool {
        match paragraph_type {
            ParagraphType::Text => true,
            ParagraphType::Code => self.include_code_blocks,
            ParagraphType::Table => self.include_tables,
            ParagraphType::Blockquote => self.include_blockquotes,
            ParagraphType::List => self.include_lists,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ParseError> {
        super::validation::validate_parser_config(self)
    }
}

/// Bundled configurations tuned for common document styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPreset {
    Technical,
    Narrative,
    Academic,
    Blog,
}

impl ConfigPreset {
    pub fn all() -> [ConfigPreset; 4] {
        [Self::Technical, Self::Narrative, Self::Academic, Self::Blog]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Narrative => "narrative",
            Self::Academic => "academic",
            Self::Blog => "blog",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Technical => "Documentation and manuals: H1/H2 chapters, code and tables skipped",
            Self::Narrative => "Fiction and long-form prose: H1/H2 chapters, only prose voiced",
            Self::Academic => "Papers and theses: H1-H3 chapters, strict threshold",
            Self::Blog => "Articles and posts: H2 chapters, permissive threshold",
        }
    }

    pub fn config(&self) -> ParserConfig {
        let base = ParserConfig::default();

        match self {
            Self::Technical => ParserConfig {
                chapter_header_levels: vec![1, 2],
                include_code_blocks: false,
                include_tables: false,
                include_blockquotes: true,
                include_lists: true,
                confidence_threshold: 0.6,
                ..base
            },
            Self::Narrative => ParserConfig {
                chapter_header_levels: vec![1, 2],
                include_code_blocks: false,
                include_tables: false,
                include_blockquotes: true,
                include_lists: false,
                confidence_threshold: 0.7,
                ..base
            },
            Self::Academic => ParserConfig {
                chapter_header_levels: vec![1, 2, 3],
                include_code_blocks: false,
                include_tables: true,
                include_blockquotes: true,
                include_lists: true,
                confidence_threshold: 0.75,
                ..base
            },
            Self::Blog => ParserConfig {
                chapter_header_levels: vec![2],
                include_code_blocks: false,
                include_tables: false,
                include_blockquotes: true,
                include_lists: true,
                confidence_threshold: 0.5,
                ..base
            },
        }
    }
}

impl fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigPreset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "technical" => Ok(Self::Technical),
            "narrative" => Ok(Self::Narrative),
            "academic" => Ok(Self::Academic),
            "blog" => Ok(Self::Blog),
            other => Err(ParseError::invalid_configuration(format!(
                "Unknown preset '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.chapter_header_levels, vec![2]);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.error_handling_strategy, ErrorHandlingStrategy::Lenient);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_includes_in_audio() {
        let config = ParserConfig::default();
        assert!(config.includes_in_audio(ParagraphType::Text));
        assert!(!config.includes_in_audio(ParagraphType::Code));
        assert!(!config.includes_in_audio(ParagraphType::Table));
        assert!(config.includes_in_audio(ParagraphType::Blockquote));
        assert!(config.includes_in_audio(ParagraphType::List));
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in ConfigPreset::all() {
            let config = preset.config();
            assert!(config.validate().is_ok(), "{} preset is invalid", preset);
        }

        assert_eq!(ConfigPreset::Academic.config().chapter_header_levels, vec![1, 2, 3]);
        assert!(ConfigPreset::Academic.config().include_tables);
        assert!(!ConfigPreset::Narrative.config().include_lists);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("Blog".parse::<ConfigPreset>().unwrap(), ConfigPreset::Blog);
        assert!("poetry".parse::<ConfigPreset>().is_err());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "recover".parse::<ErrorHandlingStrategy>().unwrap(),
            ErrorHandlingStrategy::Recover
        );
        assert!("panic".parse::<ErrorHandlingStrategy>().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ParserConfig =
            serde_json::from_str(r#"{"chapter_header_levels": [1], "error_handling_strategy": "strict"}"#)
                .unwrap();

        assert_eq!(config.chapter_header_levels, vec![1]);
        assert_eq!(config.error_handling_strategy, ErrorHandlingStrategy::Strict);
        assert_eq!(config.min_sentence_length, 10);
        assert!(config.include_lists);
    }
}
