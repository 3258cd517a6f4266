//! Metadata extraction
//!
//! The title comes from the first level-1 heading, then a `title:` header
//! line, then a placeholder. Other fields are read from `key: value` lines at
//! the start of the raw content. The scan ends after two consecutive content
//! lines or a fixed line cap, whichever comes first.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::document::{DocumentMetadata, UNTITLED_DOCUMENT};
use crate::domain::parsing::{Token, TokenKind};

use super::segmentation::count_words;

/// Lines examined before giving up on header metadata
pub const MAX_SCAN_LINES: usize = 50;

/// Consecutive content lines that mark the start of the body
const CONTENT_STARTED_AFTER: usize = 2;

static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:[-*+]\s+)?(?:\*\*|__)?(?P<key>[a-z][a-z0-9 _-]{0,31}?)\s*(?:\*\*|__)?:(?:\*\*|__)?\s+(?P<value>\S.{0,511}?)\s*$",
    )
    .unwrap()
});

static ATX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<marks>#{1,6})(?:\s+(?P<text>.*?))?\s*#*\s*$").unwrap());

static THEMATIC_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,}|\+{3,}|={3,})$").unwrap());

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderField {
    Title,
    Author,
    Created,
    Modified,
    Language,
    Custom,
}

fn header_field(key: &str) -> HeaderField {
    match key {
        "title" => HeaderField::Title,
        "author" | "authors" | "by" | "written by" | "creator" => HeaderField::Author,
        "date" | "created" | "created date" | "created at" | "published" | "publish date" => {
            HeaderField::Created
        }
        "modified" | "updated" | "last modified" | "last updated" | "modified date" => {
            HeaderField::Modified
        }
        "language" | "lang" | "locale" => HeaderField::Language,
        _ => HeaderField::Custom,
    }
}

fn custom_key(key: &str) -> String {
    key.chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Parse a calendar date in one of the common header formats
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            // Timestamps such as 2024-03-01T10:00:00Z
            value
                .get(..10)
                .filter(|_| value.len() > 10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Result of the raw header scan
#[derive(Debug, Default)]
struct HeaderScan {
    metadata: DocumentMetadata,
    header_title: Option<String>,
    heading_title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    max_lines: usize,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(MAX_SCAN_LINES)
    }
}

impl MetadataExtractor {
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }

    /// Metadata for a tokenized document
    pub fn extract(&self, content: &str, tokens: &[Token]) -> DocumentMetadata {
        let scan = self.scan(content);

        let title = first_top_level_heading(tokens).or(scan.header_title);

        DocumentMetadata {
            title: title.unwrap_or_else(|| UNTITLED_DOCUMENT.to_string()),
            ..scan.metadata
        }
    }

    /// Metadata from the raw content alone, without tokenizing. Only
    /// headings within the scanned lines are seen.
    pub fn scan_raw(&self, content: &str) -> DocumentMetadata {
        let scan = self.scan(content);

        let title = scan.heading_title.or(scan.header_title);

        DocumentMetadata {
            title: title.unwrap_or_else(|| UNTITLED_DOCUMENT.to_string()),
            ..scan.metadata
        }
    }

    fn scan(&self, content: &str) -> HeaderScan {
        let mut scan = HeaderScan {
            metadata: DocumentMetadata {
                word_count: count_words(content),
                character_count: content.graphemes(true).count(),
                ..DocumentMetadata::default()
            },
            ..HeaderScan::default()
        };

        let mut content_lines = 0;
        let mut fence: Option<Fence> = None;

        for line in content.lines().take(self.max_lines) {
            let line = line.trim();

            // Fenced code is body content; nothing inside it is a header
            if let Some(open) = fence {
                if open.is_closed_by(line) {
                    fence = None;
                }
                continue;
            }
            if let Some(open) = Fence::opened_by(line) {
                fence = Some(open);
                content_lines += 1;
                if content_lines >= CONTENT_STARTED_AFTER {
                    break;
                }
                continue;
            }

            if let Some(captures) = ATX_HEADING.captures(line) {
                let is_top_level = captures.name("marks").map(|m| m.as_str().len()) == Some(1);
                let text = captures.name("text").map(|t| t.as_str().trim()).unwrap_or("");

                if is_top_level && !text.is_empty() && scan.heading_title.is_none() {
                    scan.heading_title = Some(text.to_string());
                }
                continue;
            }

            if is_formatting_line(line) {
                continue;
            }

            match HEADER_LINE.captures(line) {
                Some(captures) => {
                    content_lines = 0;
                    let key = captures["key"].trim().to_lowercase();
                    let value = captures["value"].trim().to_string();
                    apply_header(&mut scan, &key, value);
                }
                None => {
                    content_lines += 1;
                    if content_lines >= CONTENT_STARTED_AFTER {
                        break;
                    }
                }
            }
        }

        scan
    }
}

/// Opening code fence: three or more backticks or tildes
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn opened_by(line: &str) -> Option<Self> {
        let marker = line.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = line.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    fn is_closed_by(&self, line: &str) -> bool {
        let run = line.chars().take_while(|c| *c == self.marker).count();
        run >= self.len && run == line.chars().count()
    }
}

fn is_formatting_line(line: &str) -> bool {
    line.is_empty() || THEMATIC_BREAK.is_match(line) || line.starts_with("<!--")
}

fn apply_header(scan: &mut HeaderScan, key: &str, value: String) {
    let metadata = &mut scan.metadata;

    match header_field(key) {
        HeaderField::Title => {
            scan.header_title.get_or_insert(value);
        }
        HeaderField::Author => {
            metadata.author.get_or_insert(value);
        }
        HeaderField::Language => {
            metadata.language.get_or_insert(value);
        }
        field @ (HeaderField::Created | HeaderField::Modified) => {
            let slot = if field == HeaderField::Created {
                &mut metadata.created_date
            } else {
                &mut metadata.modified_date
            };

            match parse_date(&value) {
                Some(date) if slot.is_none() => *slot = Some(date),
                Some(_) => {}
                None => {
                    metadata
                        .custom_metadata
                        .entry(custom_key(key))
                        .or_insert(Value::String(value));
                }
            }
        }
        HeaderField::Custom => {
            metadata
                .custom_metadata
                .entry(custom_key(key))
                .or_insert(Value::String(value));
        }
    }
}

fn first_top_level_heading(tokens: &[Token]) -> Option<String> {
    tokens
        .iter()
        .find(|t| t.kind == TokenKind::Heading && t.depth == Some(1) && !t.text.trim().is_empty())
        .map(|t| t.text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(content: &str) -> DocumentMetadata {
        MetadataExtractor::default().scan_raw(content)
    }

    #[test]
    fn test_title_from_first_level_one_heading() {
        let tokens = vec![
            Token::heading(2, "Not this"),
            Token::heading(1, "The Book"),
            Token::heading(1, "Second"),
        ];

        let metadata = MetadataExtractor::default().extract("", &tokens);
        assert_eq!(metadata.title, "The Book");
    }

    #[test]
    fn test_title_falls_back_to_header_then_placeholder() {
        let extractor = MetadataExtractor::default();

        let metadata = extractor.extract("Title: From Header\n\nBody text.", &[]);
        assert_eq!(metadata.title, "From Header");

        let metadata = extractor.extract("Just body text.", &[]);
        assert_eq!(metadata.title, UNTITLED_DOCUMENT);
        assert!(metadata.is_untitled());
    }

    #[test]
    fn test_header_fields() {
        let metadata = scan(
            "# My Book\n\nAuthor: Jane Doe\nDate: 2024-03-01\nUpdated: March 5, 2024\nLanguage: en\n\nOnce upon a time.",
        );

        assert_eq!(metadata.title, "My Book");
        assert_eq!(metadata.author.as_deref(), Some("Jane Doe"));
        assert_eq!(metadata.created_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(metadata.modified_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(metadata.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_keys_are_case_insensitive_and_may_be_bold() {
        let metadata = scan("**AUTHOR:** Sam Lee\n- lang: de");

        assert_eq!(metadata.author.as_deref(), Some("Sam Lee"));
        assert_eq!(metadata.language.as_deref(), Some("de"));
    }

    #[test]
    fn test_unknown_keys_and_unparsed_dates_go_to_custom() {
        let metadata = scan("Publisher: Acme Press\nDate: sometime soon\nSeries Name: Tales");

        assert_eq!(
            metadata.custom_metadata.get("publisher"),
            Some(&Value::String("Acme Press".into()))
        );
        assert_eq!(
            metadata.custom_metadata.get("date"),
            Some(&Value::String("sometime soon".into()))
        );
        assert!(metadata.custom_metadata.contains_key("series_name"));
        assert!(metadata.created_date.is_none());
    }

    #[test]
    fn test_scan_stops_after_two_content_lines() {
        let metadata = scan("First content line here\nSecond content line here\nAuthor: Too Late");
        assert!(metadata.author.is_none());

        let metadata = scan("One content line here\nAuthor: Still Read");
        assert_eq!(metadata.author.as_deref(), Some("Still Read"));
    }

    #[test]
    fn test_formatting_lines_do_not_reset_the_count() {
        let metadata = scan("Content one here\n\n---\nContent two here\nAuthor: Too Late");
        assert!(metadata.author.is_none());
    }

    #[test]
    fn test_fenced_code_is_not_metadata() {
        let content = "```bash\n# install deps\nauthor: not a header\n```\n\n# Real Title\n\n## One\n\nChapter text here.";
        let metadata = scan(content);

        assert_eq!(metadata.title, "Real Title");
        assert!(metadata.author.is_none());
        assert!(metadata.custom_metadata.is_empty());
    }

    #[test]
    fn test_tilde_fence_needs_matching_close() {
        let metadata = scan("~~~~\n# inside\n~~~\n# still inside\n~~~~\n# Outside");
        assert_eq!(metadata.title, "Outside");
    }

    #[test]
    fn test_scan_is_capped() {
        let mut content: String = (0..MAX_SCAN_LINES).map(|i| format!("Key{}: value\n", i)).collect();
        content.push_str("Author: Beyond Cap\n");

        let metadata = scan(&content);
        assert!(metadata.author.is_none());
        assert_eq!(metadata.custom_metadata.len(), MAX_SCAN_LINES);
    }

    #[test]
    fn test_urls_are_not_headers() {
        let metadata = scan("https://example.com/page\nmore text");
        assert!(metadata.custom_metadata.is_empty());
    }

    #[test]
    fn test_counts() {
        let metadata = scan("Cafe\u{301} au lait");

        assert_eq!(metadata.character_count, 12);
        assert_eq!(metadata.word_count, 3);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31);

        assert_eq!(parse_date("2023-12-31"), expected);
        assert_eq!(parse_date("2023/12/31"), expected);
        assert_eq!(parse_date("31.12.2023"), expected);
        assert_eq!(parse_date("December 31, 2023"), expected);
        assert_eq!(parse_date("31 Dec 2023"), expected);
        assert_eq!(parse_date("2023-12-31T08:00:00Z"), expected);
        assert_eq!(parse_date("not a date"), None);
    }
}
