//! Flat element extraction
//!
//! One pass over every token, independent of chapter membership.

use crate::domain::document::{DocumentElement, ElementType};
use crate::domain::parsing::{InlineNode, ListItem, Token, TokenDetail, TokenKind};

/// Element type for a token type, if it is extracted at all
fn element_type_for(kind: TokenKind) -> Option<ElementType> {
    match kind {
        TokenKind::Code => Some(ElementType::Code),
        TokenKind::Table => Some(ElementType::Table),
        TokenKind::Blockquote => Some(ElementType::Blockquote),
        TokenKind::List => Some(ElementType::List),
        TokenKind::Image => Some(ElementType::Image),
        TokenKind::Link => Some(ElementType::Link),
        TokenKind::Heading | TokenKind::Paragraph | TokenKind::Html | TokenKind::Rule => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ElementExtractor;

impl ElementExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, tokens: &[Token]) -> Vec<DocumentElement> {
        tokens
            .iter()
            .filter_map(|token| element_type_for(token.kind).map(|t| (t, token)))
            .enumerate()
            .map(|(index, (element_type, token))| {
                let id = format!("element-{}", index + 1);
                Self::element(id, element_type, token)
            })
            .collect()
    }

    fn element(id: String, element_type: ElementType, token: &Token) -> DocumentElement {
        let base = DocumentElement::new(id, element_type, token.raw.clone(), token.text.clone())
            .with_position(token.position.start);

        match &token.detail {
            TokenDetail::Code { language } => {
                let element = base.with_attribute("line_count", token.text.lines().count());
                match language {
                    Some(language) => element.with_attribute("language", language.clone()),
                    None => element,
                }
            }
            TokenDetail::Table(table) => base
                .with_attribute("has_header", table.has_header())
                .with_attribute("row_count", table.rows.len())
                .with_attribute("column_count", table.column_count()),
            TokenDetail::List(list) => {
                let content = list
                    .items
                    .iter()
                    .map(flatten_item)
                    .collect::<Vec<_>>()
                    .join("\n");

                let mut element = DocumentElement {
                    content,
                    ..base
                }
                .with_attribute("ordered", list.ordered)
                .with_attribute("item_count", list.items.len());

                if let Some(start) = list.start {
                    element = element.with_attribute("start", start);
                }
                element
            }
            TokenDetail::Link { href, title } => {
                let element = base.with_attribute("href", href.clone());
                match title {
                    Some(title) => element.with_attribute("title", title.clone()),
                    None => element,
                }
            }
            TokenDetail::Image { src, alt, title } => {
                let element = DocumentElement {
                    content: alt.clone(),
                    ..base
                }
                .with_attribute("src", src.clone())
                .with_attribute("alt", alt.clone());
                match title {
                    Some(title) => element.with_attribute("title", title.clone()),
                    None => element,
                }
            }
            TokenDetail::None => base,
        }
    }
}

/// Concatenate an item's text and emphasis nodes, recursively. Any other
/// nested node, nested lists included, is skipped.
pub fn flatten_item(item: &ListItem) -> String {
    let mut out = String::new();
    flatten_nodes(&item.inline, &mut out);
    out.trim().to_string()
}

fn flatten_nodes(nodes: &[InlineNode], out: &mut String) {
    for node in nodes {
        match node {
            InlineNode::Text(text) => out.push_str(text),
            InlineNode::Emphasis(children) | InlineNode::Strong(children) => {
                flatten_nodes(children, out)
            }
            _ => {}
        }
    }
}
