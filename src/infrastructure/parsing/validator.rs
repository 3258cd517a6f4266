//! Structure validation over a finished chapter tree

use crate::domain::document::validation::{
    EMPTY_CHAPTER, EMPTY_CHAPTER_TITLE, EMPTY_PARAGRAPH, NO_CHAPTERS, NO_PARAGRAPHS,
    SENTENCE_TOO_LONG, SENTENCE_TOO_SHORT,
};
use crate::domain::document::{
    Chapter, IssueLocation, Paragraph, ParagraphType, ValidationIssue, ValidationReport,
};

/// Checks performed at document level
const DOCUMENT_CHECKS: f64 = 2.0;
const CHAPTER_CHECK_WEIGHT: f64 = 1.0;
const PARAGRAPH_CHECK_WEIGHT: f64 = 0.5;
const SENTENCE_CHECK_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct StructureValidator {
    min_sentence_length: usize,
    max_sentence_length: usize,
}

impl StructureValidator {
    pub fn new(min_sentence_length: usize, max_sentence_length: usize) -> Self {
        Self {
            min_sentence_length,
            max_sentence_length,
        }
    }

    /// Weighted number of checks for a structure of this size
    pub fn total_checks(chapters: usize, paragraphs: usize, sentences: usize) -> f64 {
        DOCUMENT_CHECKS
            + chapters as f64 * CHAPTER_CHECK_WEIGHT
            + paragraphs as f64 * PARAGRAPH_CHECK_WEIGHT
            + sentences as f64 * SENTENCE_CHECK_WEIGHT
    }

    pub fn validate(&self, chapters: &[Chapter], preamble: &[Paragraph]) -> ValidationReport {
        let paragraphs = preamble.len() + chapters.iter().map(|c| c.paragraphs.len()).sum::<usize>();
        let sentences = preamble.iter().map(|p| p.sentences.len()).sum::<usize>()
            + chapters.iter().map(Chapter::sentence_count).sum::<usize>();

        let mut report =
            ValidationReport::new(Self::total_checks(chapters.len(), paragraphs, sentences));

        if chapters.is_empty() {
            report.push(ValidationIssue::error(
                NO_CHAPTERS,
                "Document has no chapters",
                IssueLocation::document(),
            ));
        }

        if paragraphs == 0 {
            report.push(ValidationIssue::error(
                NO_PARAGRAPHS,
                "Document has no paragraphs",
                IssueLocation::document(),
            ));
        }

        for (index, paragraph) in preamble.iter().enumerate() {
            self.check_paragraph(&mut report, None, index, paragraph);
        }

        for (chapter_index, chapter) in chapters.iter().enumerate() {
            if chapter.title.trim().is_empty() {
                report.push(ValidationIssue::warning(
                    EMPTY_CHAPTER_TITLE,
                    format!("Chapter {} has an empty title", chapter_index + 1),
                    IssueLocation::chapter(chapter_index),
                ));
            }

            if chapter.paragraphs.is_empty() {
                report.push(ValidationIssue::warning(
                    EMPTY_CHAPTER,
                    format!("Chapter '{}' has no paragraphs", chapter.title),
                    IssueLocation::chapter(chapter_index),
                ));
            }

            for (index, paragraph) in chapter.paragraphs.iter().enumerate() {
                self.check_paragraph(&mut report, Some(chapter_index), index, paragraph);
            }
        }

        report
    }

    fn check_paragraph(
        &self,
        report: &mut ValidationReport,
        chapter: Option<usize>,
        index: usize,
        paragraph: &Paragraph,
    ) {
        if paragraph.paragraph_type == ParagraphType::Text && paragraph.sentences.is_empty() {
            report.push(ValidationIssue::warning(
                EMPTY_PARAGRAPH,
                format!("Paragraph {} has no sentences", paragraph.id),
                IssueLocation::paragraph(chapter, index),
            ));
        }

        for (sentence_index, sentence) in paragraph.sentences.iter().enumerate() {
            let length = sentence.text.chars().count();
            let location = IssueLocation::sentence(chapter, index, sentence_index);

            if length < self.min_sentence_length {
                report.push(ValidationIssue::warning(
                    SENTENCE_TOO_SHORT,
                    format!(
                        "Sentence {} is {} characters, below the minimum of {}",
                        sentence.id, length, self.min_sentence_length
                    ),
                    location,
                ));
            } else if length > self.max_sentence_length {
                report.push(ValidationIssue::error(
                    SENTENCE_TOO_LONG,
                    format!(
                        "Sentence {} is {} characters, above the maximum of {}",
                        sentence.id, length, self.max_sentence_length
                    ),
                    location,
                ));
            }
        }
    }
}
