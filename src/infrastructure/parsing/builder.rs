//! Chapter and paragraph builder
//!
//! A fold over the token sequence with an explicit state:
//! `NoChapter` until the first heading at a configured chapter level, then
//! `InChapter` until the stream ends. Chapter aggregates are computed in a
//! second pass once every paragraph is attached.

use tracing::debug;

use crate::domain::document::{Chapter, Paragraph, ParagraphType, Sentence};
use crate::domain::parsing::{ParserConfig, Token, TokenKind};

use super::segmentation::SentenceSegmenter;

/// Paragraph type for each token type; `None` means the token yields no
/// paragraph and is only seen by the element extractor
pub fn paragraph_type_for(kind: TokenKind) -> Option<ParagraphType> {
    match kind {
        TokenKind::Paragraph => Some(ParagraphType::Text),
        TokenKind::Code => Some(ParagraphType::Code),
        TokenKind::Blockquote => Some(ParagraphType::Blockquote),
        TokenKind::List => Some(ParagraphType::List),
        TokenKind::Table => Some(ParagraphType::Table),
        TokenKind::Heading
        | TokenKind::Link
        | TokenKind::Image
        | TokenKind::Html
        | TokenKind::Rule => None,
    }
}

/// Output of the builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltChapters {
    pub chapters: Vec<Chapter>,
    /// Paragraphs found before the first chapter heading
    pub preamble: Vec<Paragraph>,
}

#[derive(Debug)]
enum BuildState {
    NoChapter,
    InChapter(Chapter),
}

#[derive(Debug)]
struct Accumulator {
    state: BuildState,
    chapters: Vec<Chapter>,
    preamble: Vec<Paragraph>,
    /// End offset of the last token seen
    last_end: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            state: BuildState::NoChapter,
            chapters: Vec::new(),
            preamble: Vec::new(),
            last_end: 0,
        }
    }

    fn close_chapter(&mut self, end_position: usize) {
        if let BuildState::InChapter(mut chapter) =
            std::mem::replace(&mut self.state, BuildState::NoChapter)
        {
            chapter.end_position = end_position.max(chapter.start_position);
            self.chapters.push(chapter);
        }
    }
}

/// Builds chapters and typed paragraphs from tokens
#[derive(Debug)]
pub struct ChapterBuilder<'a> {
    config: &'a ParserConfig,
    segmenter: &'a SentenceSegmenter,
}

impl<'a> ChapterBuilder<'a> {
    pub fn new(config: &'a ParserConfig, segmenter: &'a SentenceSegmenter) -> Self {
        Self { config, segmenter }
    }

    pub fn build(&self, tokens: &[Token]) -> BuiltChapters {
        let mut acc = tokens
            .iter()
            .fold(Accumulator::new(), |acc, token| self.step(acc, token));

        // Done
        let end = acc.last_end;
        acc.close_chapter(end);

        let mut chapters = acc.chapters;
        for chapter in &mut chapters {
            chapter.recompute_aggregates();
        }

        debug!(
            chapters = chapters.len(),
            preamble_paragraphs = acc.preamble.len(),
            "Built chapter tree"
        );

        BuiltChapters {
            chapters,
            preamble: acc.preamble,
        }
    }

    fn step(&self, mut acc: Accumulator, token: &Token) -> Accumulator {
        if let Some(depth) = self.chapter_depth(token) {
            acc.close_chapter(token.position.start);

            let position = acc.chapters.len();
            let chapter = Chapter::new(
                format!("chapter-{}", position + 1),
                token.text.trim(),
                depth,
                position,
                token.position.start,
            );
            acc.state = BuildState::InChapter(chapter);
        } else if let Some(paragraph_type) = paragraph_type_for(token.kind) {
            match &mut acc.state {
                BuildState::InChapter(chapter) => {
                    let id = format!("{}-p{}", chapter.id, chapter.paragraphs.len() + 1);
                    let paragraph =
                        self.paragraph(id, paragraph_type, token, chapter.paragraphs.len());
                    chapter.paragraphs.push(paragraph);
                }
                BuildState::NoChapter => {
                    let id = format!("preamble-p{}", acc.preamble.len() + 1);
                    let paragraph = self.paragraph(id, paragraph_type, token, acc.preamble.len());
                    acc.preamble.push(paragraph);
                }
            }
        }

        acc.last_end = acc.last_end.max(token.position.end);
        acc
    }

    fn chapter_depth(&self, token: &Token) -> Option<u8> {
        match (token.kind, token.depth) {
            (TokenKind::Heading, Some(depth)) if self.config.is_chapter_level(depth) => Some(depth),
            _ => None,
        }
    }

    fn paragraph(
        &self,
        id: String,
        paragraph_type: ParagraphType,
        token: &Token,
        position: usize,
    ) -> Paragraph {
        let sentences = if paragraph_type.has_sentences() {
            self.segmenter.segment(&token.text, &id)
        } else {
            Vec::new()
        };

        let word_count = sentences.iter().map(|s| s.word_count).sum();
        let confidence = self.paragraph_confidence(paragraph_type, &sentences);

        Paragraph {
            id,
            paragraph_type,
            sentences,
            position,
            word_count,
            raw_text: token.raw.clone(),
            include_in_audio: self.config.includes_in_audio(paragraph_type),
            confidence,
        }
    }

    /// Share of sentences within the configured length bounds, mapped onto
    /// 0.5..=1.0; paragraphs without sentences are fully trusted unless they
    /// should have had some
    fn paragraph_confidence(
        &self,
        paragraph_type: ParagraphType,
        sentences: &[Sentence],
    ) -> f64 {
        if !paragraph_type.has_sentences() {
            return 1.0;
        }

        if sentences.is_empty() {
            return 0.5;
        }

        let within = sentences
            .iter()
            .filter(|s| {
                let length = s.text.chars().count();
                length >= self.config.min_sentence_length
                    && length <= self.config.max_sentence_length
            })
            .count();

        0.5 + 0.5 * within as f64 / sentences.len() as f64
    }
}
