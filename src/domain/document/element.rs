//! Flat document elements extracted independently of chapters

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Code,
    Table,
    Blockquote,
    List,
    Image,
    Link,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Table => "table",
            Self::Blockquote => "blockquote",
            Self::List => "list",
            Self::Image => "image",
            Self::Link => "link",
        }
    }
}

/// A table, code block, list, quote, image or link found anywhere in the
/// document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentElement {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub raw: String,
    pub content: String,
    /// Byte offset in the source
    pub position: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl DocumentElement {
    pub fn new(
        id: impl Into<String>,
        element_type: ElementType,
        raw: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            element_type,
            raw: raw.into(),
            content: content.into(),
            position: 0,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    pub fn attribute_u64(&self, key: &str) -> Option<u64> {
        self.attribute(key).and_then(serde_json::Value::as_u64)
    }

    pub fn attribute_bool(&self, key: &str) -> Option<bool> {
        self.attribute(key).and_then(serde_json::Value::as_bool)
    }
}
