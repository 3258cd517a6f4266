//! Confidence scoring
//!
//! The score is a base value plus graduated bonuses, then passed through an
//! ordered override ladder where the first matching rule wins.

use crate::domain::document::{Chapter, ConfidenceBreakdown, Paragraph};

pub const BASE_SCORE: f64 = 0.3;
/// Score of a document holding a single word
pub const MINIMAL_CONTENT_FLOOR: f64 = 0.3;
/// Lowest score any document with real content receives
pub const DEFAULT_FLOOR: f64 = 0.4;

/// Structural counts the score is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreInput {
    pub chapters: usize,
    pub paragraphs: usize,
    pub sentences: usize,
    pub words: usize,
}

impl ScoreInput {
    pub fn from_structure(chapters: &[Chapter], preamble: &[Paragraph]) -> Self {
        let paragraphs = chapters.iter().flat_map(|c| c.paragraphs.iter()).chain(preamble);

        let (paragraph_count, sentences, words) =
            paragraphs.fold((0, 0, 0), |(p, s, w), paragraph| {
                (p + 1, s + paragraph.sentences.len(), w + paragraph.word_count)
            });

        Self {
            chapters: chapters.len(),
            paragraphs: paragraph_count,
            sentences,
            words,
        }
    }

    fn paragraphs_per_chapter(&self) -> f64 {
        self.paragraphs as f64 / self.chapters.max(1) as f64
    }

    fn sentences_per_paragraph(&self) -> f64 {
        if self.paragraphs == 0 {
            0.0
        } else {
            self.sentences as f64 / self.paragraphs as f64
        }
    }
}

/// What a matching override does to the raw score
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Override {
    /// Replace the score
    Fix(f64),
    /// Raise the score to at least this value
    Raise(f64),
}

impl Override {
    fn apply(&self, score: f64) -> f64 {
        match *self {
            Self::Fix(value) => value,
            Self::Raise(value) => score.max(value),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OverrideRule {
    pub name: &'static str,
    pub applies: fn(&ScoreInput) -> bool,
    pub effect: Override,
}

fn is_single_word(input: &ScoreInput) -> bool {
    input.words == 1
}

fn is_near_empty(input: &ScoreInput) -> bool {
    input.chapters == 0 && input.words < 10
}

fn has_zero_structure(input: &ScoreInput) -> bool {
    input.chapters == 0
}

fn has_minimal_structure(input: &ScoreInput) -> bool {
    input.chapters > 0 && input.paragraphs <= input.chapters
}

fn is_good_enough(input: &ScoreInput) -> bool {
    input.words >= 500 || input.chapters >= 3
}

fn always(_: &ScoreInput) -> bool {
    true
}

/// Evaluated top to bottom; the first rule whose predicate holds decides
pub static OVERRIDE_LADDER: [OverrideRule; 6] = [
    OverrideRule {
        name: "single_word",
        applies: is_single_word,
        effect: Override::Fix(MINIMAL_CONTENT_FLOOR),
    },
    OverrideRule {
        name: "near_empty",
        applies: is_near_empty,
        effect: Override::Fix(MINIMAL_CONTENT_FLOOR),
    },
    OverrideRule {
        name: "zero_structure",
        applies: has_zero_structure,
        effect: Override::Fix(DEFAULT_FLOOR),
    },
    OverrideRule {
        name: "minimal_structure",
        applies: has_minimal_structure,
        effect: Override::Raise(0.5),
    },
    OverrideRule {
        name: "good_enough",
        applies: is_good_enough,
        effect: Override::Raise(0.65),
    },
    OverrideRule {
        name: "default_floor",
        applies: always,
        effect: Override::Raise(DEFAULT_FLOOR),
    },
];

fn chapter_bonus(chapters: usize) -> f64 {
    match chapters {
        0 => 0.0,
        1 => 0.1,
        2..=20 => 0.2,
        _ => 0.15,
    }
}

fn paragraph_ratio_bonus(ratio: f64) -> f64 {
    if (2.0..=50.0).contains(&ratio) {
        0.15
    } else if (1.0..2.0).contains(&ratio) || (50.0..=100.0).contains(&ratio) {
        0.075
    } else {
        0.0
    }
}

fn sentence_ratio_bonus(ratio: f64) -> f64 {
    if (1.0..=10.0).contains(&ratio) {
        0.15
    } else if (0.5..1.0).contains(&ratio) || (10.0..=20.0).contains(&ratio) {
        0.075
    } else {
        0.0
    }
}

fn word_count_bonus(words: usize) -> f64 {
    match words {
        1000.. => 0.2,
        300..=999 => 0.15,
        100..=299 => 0.1,
        20..=99 => 0.05,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, input: &ScoreInput) -> ConfidenceBreakdown {
        let chapter_bonus = chapter_bonus(input.chapters);
        let paragraph_ratio_bonus = if input.chapters > 0 {
            paragraph_ratio_bonus(input.paragraphs_per_chapter())
        } else {
            0.0
        };
        let sentence_ratio_bonus = sentence_ratio_bonus(input.sentences_per_paragraph());
        let word_count_bonus = word_count_bonus(input.words);

        let raw_score = BASE_SCORE
            + chapter_bonus
            + paragraph_ratio_bonus
            + sentence_ratio_bonus
            + word_count_bonus;

        let (score, applied_rule) = match OVERRIDE_LADDER.iter().find(|rule| (rule.applies)(input)) {
            Some(rule) => {
                let score = rule.effect.apply(raw_score);
                let changed = (score - raw_score).abs() > f64::EPSILON;
                (score, changed.then(|| rule.name.to_string()))
            }
            None => (raw_score, None),
        };

        ConfidenceBreakdown {
            base: BASE_SCORE,
            chapter_bonus,
            paragraph_ratio_bonus,
            sentence_ratio_bonus,
            word_count_bonus,
            raw_score,
            applied_rule,
            score: score.clamp(0.0, 1.0),
        }
    }
}
