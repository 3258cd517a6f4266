//! Sentence segmentation and word counting
//!
//! Boundary patterns are OR-combined into one regular expression. Sentence
//! spans are contiguous: concatenating every span reproduces the input, and
//! each sentence's text is its span with surrounding whitespace trimmed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::document::{estimate_duration, Sentence};
use crate::domain::parsing::ParserConfig;
use crate::domain::ParseError;

/// URLs collapse to one placeholder word. Bounded repetition keeps matching
/// cost flat on long near-matches.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?://|ftp://|www\.)[^\s<>()\[\]]{1,256}").unwrap()
});

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]{1,64}@[A-Za-z0-9-]{1,63}(?:\.[A-Za-z0-9-]{1,63}){0,8}\.[A-Za-z]{2,24}\b")
        .unwrap()
});

/// Inline markup that marks a sentence as formatted
static FORMATTING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\*\*[^*\n]{1,256}\*\*",
        r"__[^_\n]{1,256}__",
        r"\*[^*\s][^*\n]{0,256}\*",
        r"\b_[^_\s][^_\n]{0,256}_\b",
        r"`[^`\n]{1,256}`",
        r"~~[^~\n]{1,256}~~",
        r"!?\[[^\]\n]{1,256}\]\([^)\n]{1,512}\)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const URL_PLACEHOLDER: &str = "URL";
const EMAIL_PLACEHOLDER: &str = "EMAIL";

/// Count whitespace-delimited words with URLs and e-mail addresses collapsed
pub fn count_words(text: &str) -> usize {
    let without_emails = EMAIL_PATTERN.replace_all(text, EMAIL_PLACEHOLDER);
    let collapsed = URL_PATTERN.replace_all(&without_emails, URL_PLACEHOLDER);

    collapsed.split_whitespace().count()
}

/// Whether the text contains inline markup
pub fn has_formatting(text: &str) -> bool {
    FORMATTING_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Splits text into sentences with a combined boundary expression
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    boundary: Regex,
    min_length: usize,
}

impl SentenceSegmenter {
    /// Combine the patterns with OR into one boundary matcher
    pub fn new(patterns: &[String], min_length: usize) -> Result<Self, ParseError> {
        if patterns.is_empty() {
            return Err(ParseError::invalid_configuration(
                "at least one sentence boundary pattern is required",
            ));
        }

        let combined = patterns
            .iter()
            .map(|p| format!("(?:{})", p))
            .collect::<Vec<_>>()
            .join("|");

        let boundary = Regex::new(&combined).map_err(|e| {
            ParseError::invalid_configuration(format!("invalid sentence boundary pattern: {}", e))
        })?;

        Ok(Self {
            boundary,
            min_length,
        })
    }

    pub fn from_config(config: &ParserConfig) -> Result<Self, ParseError> {
        Self::new(&config.sentence_boundary_patterns, config.min_sentence_length)
    }

    /// Byte spans of each sentence; contiguous and covering the whole text
    pub fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let long_enough = |span: &str| {
            let trimmed = span.trim();
            !trimmed.is_empty() && trimmed.chars().count() > self.min_length
        };

        let mut spans: Vec<(usize, usize)> = Vec::new();
        let mut start = 0;

        for m in self.boundary.find_iter(text) {
            if m.end() <= start {
                continue;
            }

            if long_enough(&text[start..m.end()]) {
                spans.push((start, m.end()));
                start = m.end();
            }
        }

        if start < text.len() {
            let tail = &text[start..];

            match spans.last_mut() {
                Some(last) if !long_enough(tail) => last.1 = text.len(),
                _ => spans.push((start, text.len())),
            }
        }

        spans
    }

    /// Segment text into sentences whose ids are prefixed with `id_prefix`
    pub fn segment(&self, text: &str, id_prefix: &str) -> Vec<Sentence> {
        self.spans(text)
            .into_iter()
            .enumerate()
            .map(|(position, (start, end))| {
                let sentence_text = text[start..end].trim();
                let word_count = count_words(sentence_text);

                Sentence {
                    id: format!("{}-s{}", id_prefix, position + 1),
                    text: sentence_text.to_string(),
                    position,
                    start,
                    end,
                    word_count,
                    estimated_duration: estimate_duration(word_count),
                    has_formatting: has_formatting(sentence_text),
                }
            })
            .collect()
    }
}

/// Split `text` into sentences closing at boundary matches longer than
/// `min_length` characters
pub fn extract_sentences(
    text: &str,
    min_length: usize,
    boundary_patterns: &[String],
) -> Result<Vec<Sentence>, ParseError> {
    let segmenter = SentenceSegmenter::new(boundary_patterns, min_length)?;
    Ok(segmenter.segment(text, "sentence"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parsing::config::DEFAULT_SENTENCE_BOUNDARY;

    fn patterns() -> Vec<String> {
        vec![DEFAULT_SENTENCE_BOUNDARY.to_string()]
    }

    fn texts(sentences: &[Sentence]) -> Vec<&str> {
        sentences.iter().map(|s| s.text.as_str()).collect()
    }

    fn assert_reconstructs(text: &str, sentences: &[Sentence]) {
        let joined: String = sentences.iter().map(|s| &text[s.start..s.end]).collect();
        assert_eq!(joined, text);

        for sentence in sentences {
            assert_eq!(sentence.text, text[sentence.start..sentence.end].trim());
        }
    }

    #[test]
    fn test_two_sentences() {
        let text = "Hello world. This is a test.";
        let sentences = extract_sentences(text, 10, &patterns()).unwrap();

        assert_eq!(texts(&sentences), vec!["Hello world.", "This is a test."]);
        assert_eq!(sentences[0].word_count, 2);
        assert_eq!(sentences[1].word_count, 4);
        assert_eq!(sentences[1].position, 1);
        assert_reconstructs(text, &sentences);
    }

    #[test]
    fn test_no_boundary_is_one_sentence() {
        let sentences = extract_sentences("Hello", 10, &patterns()).unwrap();

        assert_eq!(texts(&sentences), vec!["Hello"]);
        assert_eq!(sentences[0].word_count, 1);
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_sentences("", 10, &patterns()).unwrap().is_empty());
        assert!(extract_sentences("  \n\t", 10, &patterns()).unwrap().is_empty());
    }

    #[test]
    fn test_short_spans_merge_forward() {
        let text = "Dr. Smith went home. He slept.";
        let sentences = extract_sentences(text, 5, &patterns()).unwrap();

        assert_eq!(texts(&sentences), vec!["Dr. Smith went home.", "He slept."]);
        assert_reconstructs(text, &sentences);
    }

    #[test]
    fn test_span_of_exactly_min_length_does_not_close() {
        let text = "Hello world. Second part here.";

        let at_min = extract_sentences(text, 12, &patterns()).unwrap();
        assert_eq!(texts(&at_min), vec!["Hello world. Second part here."]);

        let below_min = extract_sentences(text, 11, &patterns()).unwrap();
        assert_eq!(texts(&below_min), vec!["Hello world.", "Second part here."]);
        assert_reconstructs(text, &below_min);
    }

    #[test]
    fn test_short_trailing_span_joins_previous() {
        let text = "This sentence is long enough. Ok";
        let sentences = extract_sentences(text, 10, &patterns()).unwrap();

        assert_eq!(texts(&sentences), vec!["This sentence is long enough. Ok"]);
        assert_reconstructs(text, &sentences);
    }

    #[test]
    fn test_reconstructs_with_irregular_whitespace() {
        let text = "  First one here!   Second one here?\n\nThird one here.  ";
        let sentences = extract_sentences(text, 5, &patterns()).unwrap();

        assert_eq!(sentences.len(), 3);
        assert_reconstructs(text, &sentences);
    }

    #[test]
    fn test_patterns_are_or_combined() {
        let custom = vec![r"[.!?]\s+".to_string(), r";\s+".to_string()];
        let sentences =
            extract_sentences("First clause here; second clause here. Done now.", 5, &custom)
                .unwrap();

        assert_eq!(
            texts(&sentences),
            vec!["First clause here;", "second clause here.", "Done now."]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let err = extract_sentences("text", 1, &["(unclosed".to_string()]).unwrap_err();
        assert_eq!(err.code, crate::domain::ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_count_words_collapses_urls_and_emails() {
        assert_eq!(count_words("Visit https://example.com/a/b?c=d today"), 3);
        assert_eq!(count_words("Mail jane.doe@example.co.uk now"), 3);
        assert_eq!(count_words("one  two\tthree\nfour"), 4);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_has_formatting() {
        assert!(has_formatting("This is **bold** text"));
        assert!(has_formatting("Some `code` here"));
        assert!(has_formatting("A [link](http://x.y) here"));
        assert!(has_formatting("~~gone~~"));
        assert!(!has_formatting("Plain text with a * star"));
        assert!(!has_formatting("snake_case_name"));
    }

    #[test]
    fn test_durations() {
        let sentences = extract_sentences("One two three four five.", 1, &patterns()).unwrap();
        assert_eq!(sentences[0].estimated_duration, estimate_duration(5));
    }

    #[test]
    fn test_adversarial_near_matches_stay_linear() {
        let near_url = format!("http{}", ":/".repeat(20_000));
        let near_email = format!("{}@{}", "a".repeat(50_000), "b.".repeat(20_000));
        let long_markup = format!("**{}", "*a".repeat(20_000));

        assert_eq!(count_words(&near_url), 1);
        assert_eq!(count_words(&near_email), 1);
        assert!(!has_formatting(&"_".repeat(50_000)));
        let _ = has_formatting(&long_markup);

        let text = "word ".repeat(20_000);
        let sentences = extract_sentences(&text, 10, &patterns()).unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].word_count, 20_000);
    }
}
