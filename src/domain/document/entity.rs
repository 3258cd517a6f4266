//! Document structure entities

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::element::DocumentElement;
use super::metadata::DocumentMetadata;
use super::validation::ValidationReport;

/// Average narration speed used for duration estimates
pub const WORDS_PER_MINUTE: f64 = 150.0;

/// Estimated speaking time in seconds for a word count
pub fn estimate_duration(word_count: usize) -> f64 {
    word_count as f64 * 60.0 / WORDS_PER_MINUTE
}

/// A segmented sentence of a text-bearing paragraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: String,
    /// Trimmed sentence text
    pub text: String,
    /// Index within the paragraph
    pub position: usize,
    /// Byte offset of the sentence span in the segmented text
    pub start: usize,
    /// Byte offset one past the sentence span
    pub end: usize,
    pub word_count: usize,
    /// Seconds
    pub estimated_duration: f64,
    pub has_formatting: bool,
}

/// Paragraph classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphType {
    Text,
    Code,
    Blockquote,
    List,
    Table,
}

impl ParagraphType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Blockquote => "blockquote",
            Self::List => "list",
            Self::Table => "table",
        }
    }

    /// Whether paragraphs of this type are segmented into sentences
    pub fn has_sentences(&self) -> bool {
        !matches!(self, Self::Code | Self::Table)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: String,
    #[serde(rename = "type")]
    pub paragraph_type: ParagraphType,
    /// Empty for code and table paragraphs
    pub sentences: Vec<Sentence>,
    /// Index within the chapter (or preamble)
    pub position: usize,
    pub word_count: usize,
    pub raw_text: String,
    pub include_in_audio: bool,
    pub confidence: f64,
}

impl Paragraph {
    /// Speaking time of the paragraph's sentences in seconds
    pub fn estimated_duration(&self) -> f64 {
        self.sentences.iter().map(|s| s.estimated_duration).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    /// Heading depth (1-6)
    pub level: u8,
    pub paragraphs: Vec<Paragraph>,
    /// Index within the document
    pub position: usize,
    pub word_count: usize,
    /// Seconds, voiced paragraphs only
    pub estimated_duration: f64,
    /// Byte offset of the chapter heading
    pub start_position: usize,
    /// Byte offset where the chapter ends
    pub end_position: usize,
}

impl Chapter {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        level: u8,
        position: usize,
        start_position: usize,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            level,
            paragraphs: Vec::new(),
            position,
            word_count: 0,
            estimated_duration: 0.0,
            start_position,
            end_position: start_position,
        }
    }

    /// Recompute the aggregates from the attached paragraphs
    pub fn recompute_aggregates(&mut self) {
        self.word_count = self.paragraphs.iter().map(|p| p.word_count).sum();
        self.estimated_duration = self
            .paragraphs
            .iter()
            .filter(|p| p.include_in_audio)
            .map(Paragraph::estimated_duration)
            .sum();
    }

    pub fn sentence_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.sentences.len()).sum()
    }
}

/// Timing and diagnostics of one parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetrics {
    pub parse_start_time: DateTime<Utc>,
    pub parse_end_time: DateTime<Utc>,
    pub parse_duration_ms: u64,
    /// Input length in bytes
    pub source_length: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processing_errors: Vec<String>,
}

impl ProcessingMetrics {
    pub fn started(source_length: usize) -> Self {
        let now = Utc::now();
        Self {
            parse_start_time: now,
            parse_end_time: now,
            parse_duration_ms: 0,
            source_length,
            processing_errors: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.parse_end_time = Utc::now();
        self.parse_duration_ms = (self.parse_end_time - self.parse_start_time)
            .num_milliseconds()
            .max(0) as u64;
    }
}

/// How the confidence score was assembled
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub base: f64,
    pub chapter_bonus: f64,
    pub paragraph_ratio_bonus: f64,
    pub sentence_ratio_bonus: f64,
    pub word_count_bonus: f64,
    /// Score before the override ladder
    pub raw_score: f64,
    /// Override rule that matched, if any changed the outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_rule: Option<String>,
    pub score: f64,
}

/// Aggregate statistics over the finished structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentStats {
    pub paragraphs_by_type: BTreeMap<ParagraphType, usize>,
    pub chapters_by_level: BTreeMap<u8, usize>,
    pub audio_paragraphs: usize,
    pub preamble_paragraphs: usize,
    pub average_paragraphs_per_chapter: f64,
    pub average_sentences_per_paragraph: f64,
    pub average_words_per_sentence: f64,
    pub confidence: ConfidenceBreakdown,
}

/// Root of a parsed document; a read-only snapshot once returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub metadata: DocumentMetadata,
    pub chapters: Vec<Chapter>,
    /// Paragraphs before the first chapter heading
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preamble: Vec<Paragraph>,
    /// Flat, chapter-independent elements
    pub elements: Vec<DocumentElement>,
    pub total_paragraphs: usize,
    pub total_sentences: usize,
    pub total_word_count: usize,
    pub total_chapters: usize,
    /// Seconds, voiced paragraphs only
    pub estimated_total_duration: f64,
    pub confidence: f64,
    pub processing_metrics: ProcessingMetrics,
    pub stats: DocumentStats,
    pub validation: ValidationReport,
}

impl DocumentStructure {
    /// All paragraphs, preamble first
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.preamble
            .iter()
            .chain(self.chapters.iter().flat_map(|c| c.paragraphs.iter()))
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.paragraphs().flat_map(|p| p.sentences.iter())
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }
}
