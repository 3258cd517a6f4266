//! Document-level metadata

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Title used when the document names none
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Metadata derived from a document, or supplied by an extractor. Missing
/// fields deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub word_count: usize,
    /// Grapheme clusters in the source
    pub character_count: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_metadata: BTreeMap<String, serde_json::Value>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            title: UNTITLED_DOCUMENT.to_string(),
            author: None,
            created_date: None,
            modified_date: None,
            language: None,
            word_count: 0,
            character_count: 0,
            custom_metadata: BTreeMap::new(),
        }
    }
}

impl DocumentMetadata {
    pub fn is_untitled(&self) -> bool {
        self.title == UNTITLED_DOCUMENT
    }

    /// Merge with another metadata, preferring self's values
    pub fn merge(mut self, other: DocumentMetadata) -> Self {
        if self.is_untitled() {
            self.title = other.title;
        }

        if self.author.is_none() {
            self.author = other.author;
        }

        if self.created_date.is_none() {
            self.created_date = other.created_date;
        }

        if self.modified_date.is_none() {
            self.modified_date = other.modified_date;
        }

        if self.language.is_none() {
            self.language = other.language;
        }

        for (key, value) in other.custom_metadata {
            self.custom_metadata.entry(key).or_insert(value);
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> DocumentMetadata {
        DocumentMetadata {
            title: title.to_string(),
            ..DocumentMetadata::default()
        }
    }

    #[test]
    fn test_default_title_is_placeholder() {
        let meta = DocumentMetadata::default();
        assert_eq!(meta.title, UNTITLED_DOCUMENT);
        assert!(meta.is_untitled());
    }

    #[test]
    fn test_merge_prefers_self() {
        let mut second = DocumentMetadata {
            author: Some("Ada".into()),
            ..titled("Other")
        };
        second.custom_metadata.insert("isbn".into(), serde_json::json!("123"));

        let merged = titled("Book").merge(second);
        assert_eq!(merged.title, "Book");
        assert_eq!(merged.author.as_deref(), Some("Ada"));
        assert_eq!(merged.custom_metadata.get("isbn"), Some(&serde_json::json!("123")));
    }

    #[test]
    fn test_merge_replaces_placeholder_title() {
        let merged = DocumentMetadata::default().merge(titled("Found"));
        assert_eq!(merged.title, "Found");
    }

    #[test]
    fn test_partial_json() {
        let meta: DocumentMetadata =
            serde_json::from_str(r#"{"author": "Ada", "created_date": "2024-03-01"}"#).unwrap();

        assert!(meta.is_untitled());
        assert_eq!(meta.author.as_deref(), Some("Ada"));
        assert_eq!(meta.created_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
