//! Parser seam: the source formats, the raw input a parser receives, and
//! the async trait every format implements.

use std::ffi::OsStr;
use std::fmt::{self, Debug};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::document::DocumentStructure;
use crate::domain::ParseError;

use super::stream::StructureStream;
use super::validation::detect_format_from_filename;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Markdown,
    PlainText,
    Epub,
    Pdf,
}

impl SourceFormat {
    /// Containers must be unpacked into tokens before the pipeline sees them
    pub fn needs_extractor(&self) -> bool {
        matches!(self, Self::Epub | Self::Pdf)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Markdown => "Markdown",
            Self::PlainText => "Plain text",
            Self::Epub => "EPUB",
            Self::Pdf => "PDF",
        })
    }
}

/// Document body as received from the caller
#[derive(Debug, Clone)]
pub enum ParserContent {
    Decoded(String),
    /// Undecoded bytes, expected to be UTF-8
    Raw(Vec<u8>),
}

impl ParserContent {
    /// Size in bytes, measured before any decoding
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Decoded(text) => text.len(),
            Self::Raw(bytes) => bytes.len(),
        }
    }

    pub fn into_text(self) -> Result<String, ParseError> {
        match self {
            Self::Decoded(text) => Ok(text),
            Self::Raw(bytes) => String::from_utf8(bytes).map_err(|e| {
                ParseError::encoding(format!(
                    "Invalid UTF-8 at byte {}",
                    e.utf8_error().valid_up_to()
                ))
            }),
        }
    }
}

impl From<String> for ParserContent {
    fn from(text: String) -> Self {
        Self::Decoded(text)
    }
}

impl From<&str> for ParserContent {
    fn from(text: &str) -> Self {
        Self::Decoded(text.to_owned())
    }
}

impl From<Vec<u8>> for ParserContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Raw(bytes)
    }
}

/// One document handed to a parser
#[derive(Debug, Clone)]
pub struct ParserInput {
    pub content: ParserContent,
    pub filename: Option<String>,
}

impl ParserInput {
    pub fn new(content: impl Into<ParserContent>) -> Self {
        Self {
            content: content.into(),
            filename: None,
        }
    }

    pub fn named(filename: impl Into<String>, content: impl Into<ParserContent>) -> Self {
        Self {
            content: content.into(),
            filename: Some(filename.into()),
        }
    }

    pub fn byte_len(&self) -> usize {
        self.content.byte_len()
    }

    /// Format implied by the filename, if any
    pub fn format(&self) -> Option<SourceFormat> {
        self.filename.as_deref().and_then(detect_format_from_filename)
    }
}

/// A parser producing the uniform document structure
#[async_trait]
pub trait DocumentStructureParser: Send + Sync + Debug {
    /// Lowercase extensions without the dot
    fn supported_extensions(&self) -> &[&str];

    fn supported_mime_types(&self) -> &[&str];

    /// Parse into a complete structure
    async fn parse(&self, input: ParserInput) -> Result<DocumentStructure, ParseError>;

    /// Parse into an ordered chunk stream
    async fn parse_stream(&self, input: ParserInput) -> Result<StructureStream, ParseError>;

    fn supports_file(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| {
                self.supported_extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }

    /// Matches on the MIME essence, ignoring parameters such as `charset`
    fn supports_mime(&self, mime: &str) -> bool {
        let essence = mime.split(';').next().unwrap_or_default().trim();

        self.supported_mime_types()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(essence))
    }
}
