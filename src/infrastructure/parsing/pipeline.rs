//! Structure pipeline
//!
//! raw text -> tokenizer -> {metadata, elements, chapter builder}
//! -> confidence scorer -> structure validator -> `DocumentStructure`
//!
//! All work is synchronous; each call owns its tokens and output. The error
//! handling strategy decides whether tokenizer diagnostics and low confidence
//! fail the call or become validation warnings.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument, warn};

use crate::domain::document::{
    Chapter, ConfidenceBreakdown, DocumentElement, DocumentMetadata, DocumentStats,
    DocumentStructure, IssueLocation, Paragraph, ParagraphType, ProcessingMetrics, Sentence,
    ValidationIssue,
};
use crate::domain::parsing::{ErrorHandlingStrategy, ParserConfig, Token, TokenKind};
use crate::domain::{ErrorCode, ParseError};

use super::builder::{BuiltChapters, ChapterBuilder};
use super::elements::ElementExtractor;
use super::metadata::MetadataExtractor;
use super::scorer::{ConfidenceScorer, ScoreInput};
use super::segmentation::SentenceSegmenter;
use super::tokenizer::MarkdownTokenizer;
use super::validator::StructureValidator;

/// Runs the full structure pipeline under one configuration
#[derive(Debug, Clone)]
pub struct StructurePipeline {
    config: ParserConfig,
    segmenter: SentenceSegmenter,
    tokenizer: MarkdownTokenizer,
    metadata: MetadataExtractor,
    elements: ElementExtractor,
    scorer: ConfidenceScorer,
    validator: StructureValidator,
}

impl StructurePipeline {
    /// Create a pipeline, rejecting invalid configuration
    pub fn new(config: ParserConfig) -> Result<Self, ParseError> {
        config.validate()?;

        Ok(Self {
            segmenter: SentenceSegmenter::from_config(&config)?,
            tokenizer: MarkdownTokenizer::from_config(&config),
            metadata: MetadataExtractor::default(),
            elements: ElementExtractor::new(),
            scorer: ConfidenceScorer::new(),
            validator: StructureValidator::new(
                config.min_sentence_length,
                config.max_sentence_length,
            ),
            config,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn strategy(&self) -> ErrorHandlingStrategy {
        self.config.error_handling_strategy
    }

    /// Header metadata from raw content, without tokenizing
    pub fn scan_metadata(&self, content: &str) -> DocumentMetadata {
        self.metadata.scan_raw(content)
    }

    /// Segment text with the configured boundary patterns
    pub fn segment(&self, text: &str, id_prefix: &str) -> Vec<Sentence> {
        self.segmenter.segment(text, id_prefix)
    }

    /// Reject input larger than the configured maximum
    pub fn check_size(&self, size: usize) -> Result<(), ParseError> {
        if size > self.config.max_file_size {
            return Err(ParseError::file_too_large(size, self.config.max_file_size));
        }
        Ok(())
    }

    /// Parse Markdown text into a structure
    #[instrument(skip(self, content), fields(source_length = content.len()))]
    pub fn parse_text(&self, content: &str) -> Result<DocumentStructure, ParseError> {
        let mut metrics = ProcessingMetrics::started(content.len());
        self.check_size(content.len())?;

        if content.trim().is_empty() {
            if self.strategy() == ErrorHandlingStrategy::Strict {
                return Err(ParseError::empty_content());
            }
            debug!("Empty content, returning empty structure");
            return self.assemble(content, &[], Vec::new(), metrics);
        }

        let stream = match self.tokenizer.tokenize(content) {
            Ok(stream) => stream,
            Err(err)
                if err.is_structural() && self.strategy() == ErrorHandlingStrategy::Recover =>
            {
                warn!("Tokenization failed, recovering with line-based structure: {}", err);
                metrics.processing_errors.push(err.to_string());
                return Ok(self.line_structure(content, metrics));
            }
            Err(err) => return Err(err),
        };

        debug!(
            "Tokenized {} tokens with {} diagnostics",
            stream.tokens.len(),
            stream.issues.len()
        );

        if self.strategy() == ErrorHandlingStrategy::Strict {
            if let Some(issue) = stream.issues.into_iter().next() {
                return Err(issue);
            }
            return self.assemble(content, &stream.tokens, Vec::new(), metrics);
        }

        self.assemble(content, &stream.tokens, stream.issues, metrics)
    }

    /// Build a structure from tokens produced by an external extractor
    #[instrument(skip(self, tokens, raw), fields(tokens = tokens.len()))]
    pub fn from_tokens(&self, tokens: &[Token], raw: &str) -> Result<DocumentStructure, ParseError> {
        let mut metrics = ProcessingMetrics::started(raw.len());
        self.check_size(raw.len())?;

        if tokens.is_empty() && self.strategy() == ErrorHandlingStrategy::Strict {
            return Err(ParseError::empty_content());
        }

        let mut issues: Vec<ParseError> = tokens.iter().filter_map(check_token).collect();
        if issues.is_empty() {
            return self.assemble(raw, tokens, Vec::new(), metrics);
        }

        match self.strategy() {
            ErrorHandlingStrategy::Strict => Err(issues.remove(0)),
            ErrorHandlingStrategy::Lenient => {
                warn!("Dropping {} invalid tokens", issues.len());
                let valid: Vec<Token> = tokens
                    .iter()
                    .filter(|token| check_token(token).is_none())
                    .cloned()
                    .collect();
                self.assemble(raw, &valid, issues, metrics)
            }
            ErrorHandlingStrategy::Recover => {
                warn!("Invalid tokens, recovering with line-based structure");
                metrics
                    .processing_errors
                    .extend(issues.iter().map(ToString::to_string));
                Ok(self.line_structure(raw, metrics))
            }
        }
    }

    /// Like `from_tokens`, with extractor-supplied metadata taking precedence
    /// over what the token scan finds. Word and character counts always come
    /// from the raw content.
    pub fn from_tokens_with_metadata(
        &self,
        tokens: &[Token],
        raw: &str,
        supplied: DocumentMetadata,
    ) -> Result<DocumentStructure, ParseError> {
        let mut structure = self.from_tokens(tokens, raw)?;

        let derived = std::mem::take(&mut structure.metadata);
        let (word_count, character_count) = (derived.word_count, derived.character_count);
        structure.metadata = DocumentMetadata {
            word_count,
            character_count,
            ..supplied.merge(derived)
        };

        Ok(structure)
    }

    /// Minimal structure used when a full parse is not possible: the content
    /// split on blank lines into text paragraphs, with no chapters
    pub fn fallback_structure(&self, content: &str, cause: &ParseError) -> DocumentStructure {
        let mut metrics = ProcessingMetrics::started(content.len());
        metrics.processing_errors.push(cause.to_string());
        self.line_structure(content, metrics)
    }

    fn line_structure(&self, content: &str, metrics: ProcessingMetrics) -> DocumentStructure {
        let built = BuiltChapters {
            chapters: Vec::new(),
            preamble: self.line_paragraphs(content),
        };
        let metadata = self.metadata.scan_raw(content);

        // Low confidence is only ever a warning here
        self.finalize(metadata, built, Vec::new(), Vec::new(), metrics, false)
    }

    fn line_paragraphs(&self, content: &str) -> Vec<Paragraph> {
        let mut blocks: Vec<Vec<&str>> = vec![Vec::new()];
        for line in content.lines() {
            if line.trim().is_empty() {
                if blocks.last().is_some_and(|b| !b.is_empty()) {
                    blocks.push(Vec::new());
                }
            } else if let Some(block) = blocks.last_mut() {
                block.push(line.trim());
            }
        }

        blocks
            .into_iter()
            .filter(|block| !block.is_empty())
            .enumerate()
            .map(|(position, block)| {
                let id = format!("preamble-p{}", position + 1);
                let text = block.join("\n");
                let sentences = self.segmenter.segment(&text, &id);

                Paragraph {
                    id,
                    paragraph_type: ParagraphType::Text,
                    word_count: sentences.iter().map(|s| s.word_count).sum(),
                    sentences,
                    position,
                    raw_text: text,
                    include_in_audio: true,
                    confidence: 0.5,
                }
            })
            .collect()
    }

    fn assemble(
        &self,
        content: &str,
        tokens: &[Token],
        diagnostics: Vec<ParseError>,
        metrics: ProcessingMetrics,
    ) -> Result<DocumentStructure, ParseError> {
        let metadata = self.metadata.extract(content, tokens);
        let elements = self.elements.extract(tokens);
        let built = ChapterBuilder::new(&self.config, &self.segmenter).build(tokens);

        let strict = self.strategy() == ErrorHandlingStrategy::Strict;
        let structure = self.finalize(metadata, built, elements, diagnostics, metrics, strict);

        if strict && structure.confidence < self.config.confidence_threshold {
            return Err(ParseError::low_confidence(
                structure.confidence,
                self.config.confidence_threshold,
            ));
        }

        Ok(structure)
    }

    fn finalize(
        &self,
        mut metadata: DocumentMetadata,
        built: BuiltChapters,
        elements: Vec<DocumentElement>,
        diagnostics: Vec<ParseError>,
        mut metrics: ProcessingMetrics,
        strict: bool,
    ) -> DocumentStructure {
        let BuiltChapters { chapters, preamble } = built;

        let breakdown = self.scorer.score(&ScoreInput::from_structure(&chapters, &preamble));
        let confidence = breakdown.score;

        let mut validation = self.validator.validate(&chapters, &preamble);

        for diagnostic in diagnostics {
            let message = match diagnostic.location {
                Some(location) => format!(
                    "{} (line {}, column {})",
                    diagnostic.message, location.line, location.column
                ),
                None => diagnostic.message,
            };
            validation.push(ValidationIssue::warning(
                diagnostic.code.as_str(),
                message,
                IssueLocation::document(),
            ));
        }

        if !strict && confidence < self.config.confidence_threshold {
            validation.push(ValidationIssue::warning(
                ErrorCode::LowConfidence.as_str(),
                format!(
                    "Confidence {:.2} is below the threshold of {:.2}",
                    confidence, self.config.confidence_threshold
                ),
                IssueLocation::document(),
            ));
        }

        let totals = Totals::compute(&chapters, &preamble);
        let stats = statistics(&chapters, &preamble, &totals, breakdown);

        metadata.word_count = totals.words;
        metrics.finish();

        info!(
            "Parsed structure: chapters={}, paragraphs={}, sentences={}, confidence={:.2}, duration_ms={}",
            chapters.len(),
            totals.paragraphs,
            totals.sentences,
            confidence,
            metrics.parse_duration_ms
        );

        DocumentStructure {
            metadata,
            total_chapters: chapters.len(),
            total_paragraphs: totals.paragraphs,
            total_sentences: totals.sentences,
            total_word_count: totals.words,
            estimated_total_duration: totals.duration,
            chapters,
            preamble,
            elements,
            confidence,
            processing_metrics: metrics,
            stats,
            validation,
        }
    }
}

/// Document-wide sums over chapters and preamble
struct Totals {
    paragraphs: usize,
    sentences: usize,
    words: usize,
    /// Seconds, voiced paragraphs only
    duration: f64,
}

impl Totals {
    fn compute(chapters: &[Chapter], preamble: &[Paragraph]) -> Self {
        let voiced_preamble: f64 = preamble
            .iter()
            .filter(|p| p.include_in_audio)
            .map(Paragraph::estimated_duration)
            .sum();

        Self {
            paragraphs: preamble.len() + chapters.iter().map(|c| c.paragraphs.len()).sum::<usize>(),
            sentences: preamble.iter().map(|p| p.sentences.len()).sum::<usize>()
                + chapters.iter().map(Chapter::sentence_count).sum::<usize>(),
            words: preamble.iter().map(|p| p.word_count).sum::<usize>()
                + chapters.iter().map(|c| c.word_count).sum::<usize>(),
            duration: voiced_preamble + chapters.iter().map(|c| c.estimated_duration).sum::<f64>(),
        }
    }
}

fn statistics(
    chapters: &[Chapter],
    preamble: &[Paragraph],
    totals: &Totals,
    confidence: ConfidenceBreakdown,
) -> DocumentStats {
    let paragraphs = || {
        preamble
            .iter()
            .chain(chapters.iter().flat_map(|c| c.paragraphs.iter()))
    };

    let mut paragraphs_by_type = BTreeMap::new();
    for paragraph in paragraphs() {
        *paragraphs_by_type.entry(paragraph.paragraph_type).or_insert(0) += 1;
    }

    let mut chapters_by_level = BTreeMap::new();
    for chapter in chapters {
        *chapters_by_level.entry(chapter.level).or_insert(0) += 1;
    }

    let chapter_paragraphs = totals.paragraphs - preamble.len();

    DocumentStats {
        paragraphs_by_type,
        chapters_by_level,
        audio_paragraphs: paragraphs().filter(|p| p.include_in_audio).count(),
        preamble_paragraphs: preamble.len(),
        average_paragraphs_per_chapter: ratio(chapter_paragraphs, chapters.len()),
        average_sentences_per_paragraph: ratio(totals.sentences, totals.paragraphs),
        average_words_per_sentence: ratio(totals.words, totals.sentences),
        confidence,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Tokens the builder cannot place: a heading without a depth of 1-6, or a
/// span that ends before it starts
fn check_token(token: &Token) -> Option<ParseError> {
    let problem = match token.kind {
        TokenKind::Heading if !matches!(token.depth, Some(1..=6)) => format!(
            "{} token has depth {}, expected 1-6",
            token.kind.as_str(),
            token.depth.map_or_else(|| "none".to_string(), |d| d.to_string())
        ),
        _ if token.position.end < token.position.start => format!(
            "{} token ends at byte {} before its start at byte {}",
            token.kind.as_str(),
            token.position.end,
            token.position.start
        ),
        _ => return None,
    };

    let err = ParseError::new(ErrorCode::InvalidSyntax, problem);
    if token.position.line > 0 {
        Some(err.at(token.position.line, token.position.column))
    } else {
        Some(err)
    }
}
