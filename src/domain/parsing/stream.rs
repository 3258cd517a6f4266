//! Streaming chunk types

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::domain::document::{Chapter, DocumentMetadata, Sentence};
use crate::domain::ParseError;

/// Lazily produced, ordered sequence of structure chunks
pub type StructureStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ParseError>> + Send>>;

/// Progress reported on the final chunk
pub const PROGRESS_COMPLETE: u8 = 100;
/// Highest progress any intermediate chunk reports
pub const PROGRESS_CAP: u8 = 99;

/// Fixed window of raw source lines, used when no chapters were found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWindow {
    /// 1-based first line
    pub start_line: usize,
    /// 1-based last line, inclusive
    pub end_line: usize,
    pub text: String,
    pub sentences: Vec<Sentence>,
    pub word_count: usize,
}

/// Totals reported on completion
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamSummary {
    pub total_chapters: usize,
    pub total_windows: usize,
    pub total_sentences: usize,
    pub total_word_count: usize,
    pub estimated_total_duration: f64,
    /// Present when chapters came from a full parse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChunkPayload {
    Metadata(DocumentMetadata),
    Chapter(Box<Chapter>),
    Lines(LineWindow),
    Complete(StreamSummary),
}

impl ChunkPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Metadata(_) => "metadata",
            Self::Chapter(_) => "chapter",
            Self::Lines(_) => "lines",
            Self::Complete(_) => "complete",
        }
    }
}

/// One increment of a streamed parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// 0-based emission order
    pub sequence: usize,
    /// 0-100, monotonic; 100 only on the completion chunk
    pub progress: u8,
    pub payload: ChunkPayload,
}

impl StreamChunk {
    pub fn new(sequence: usize, progress: u8, payload: ChunkPayload) -> Self {
        Self {
            sequence,
            progress,
            payload,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.payload, ChunkPayload::Complete(_))
    }
}
