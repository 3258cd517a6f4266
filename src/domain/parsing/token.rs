//! Tokens handed from a tokenizer to the structure pipeline
//!
//! Tokens are ephemeral: they exist for the duration of one parse and are
//! discarded once the structure is built. Any extractor (Markdown, EPUB, PDF)
//! that produces this shape can feed the pipeline.

use serde::{Deserialize, Serialize};

/// Block-level token type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Heading,
    Paragraph,
    Code,
    Table,
    List,
    Blockquote,
    Link,
    Image,
    Html,
    Rule,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::Code => "code",
            Self::Table => "table",
            Self::List => "list",
            Self::Blockquote => "blockquote",
            Self::Link => "link",
            Self::Image => "image",
            Self::Html => "html",
            Self::Rule => "rule",
        }
    }
}

/// Location of a token in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenPosition {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// 1-based line of `start`
    pub line: usize,
    /// 1-based column of `start`
    pub column: usize,
}

/// Inline content of a list item, kept as a tree so callers can choose which
/// node types to read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InlineNode {
    Text(String),
    Emphasis(Vec<InlineNode>),
    Strong(Vec<InlineNode>),
    Strikethrough(Vec<InlineNode>),
    Code(String),
    Link(Vec<InlineNode>),
    Image(Vec<InlineNode>),
    /// Nested list
    List(Vec<ListItem>),
    /// Any other nested block (code block, blockquote, table)
    Other(Vec<InlineNode>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Plain text of the item, nested lists excluded
    pub text: String,
    pub inline: Vec<InlineNode>,
    /// Task list state, if the item is a task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl ListItem {
    pub fn nested_items(&self) -> impl Iterator<Item = &ListItem> {
        self.inline.iter().flat_map(|node| match node {
            InlineNode::List(items) => items.as_slice(),
            _ => &[],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn has_header(&self) -> bool {
        self.header.iter().any(|cell| !cell.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListData {
    pub ordered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    pub items: Vec<ListItem>,
}

/// Type-specific token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenDetail {
    #[default]
    None,
    Code {
        language: Option<String>,
    },
    Table(TableData),
    List(ListData),
    Link {
        href: String,
        title: Option<String>,
    },
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
}

/// One block-level (or link/image) unit of tokenized content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Text used for segmentation
    pub text: String,
    /// Source slice the token was produced from
    pub raw: String,
    /// Heading depth (1-6), headings only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u8>,
    pub position: TokenPosition,
    #[serde(default)]
    pub detail: TokenDetail,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            raw: raw.into(),
            depth: None,
            position: TokenPosition::default(),
            detail: TokenDetail::None,
        }
    }

    pub fn heading(depth: u8, text: impl Into<String>) -> Self {
        let text = text.into();
        let raw = format!("{} {}", "#".repeat(depth as usize), text);
        Self {
            depth: Some(depth),
            ..Self::new(TokenKind::Heading, text, raw)
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(TokenKind::Paragraph, text.clone(), text)
    }

    pub fn with_position(mut self, position: TokenPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_detail(mut self, detail: TokenDetail) -> Self {
        self.detail = detail;
        self
    }
}
