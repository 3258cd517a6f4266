//! Markdown tokenizer adapter
//!
//! Wraps `pulldown-cmark` and folds its event stream into block-level
//! `Token`s. Links and images are emitted as additional flat tokens. Output
//! is ordered by source position and is deterministic for identical input.

use std::mem;
use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::domain::parsing::{
    InlineNode, ListData, ListItem, ParserConfig, TableData, Token, TokenDetail, TokenKind,
    TokenPosition,
};
use crate::domain::{ErrorCode, ParseError};

/// Tokens plus non-fatal diagnostics found while tokenizing
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    /// Structural problems the caller may escalate or downgrade
    pub issues: Vec<ParseError>,
}

/// Tokenizer over CommonMark with GFM tables, strikethrough and task lists
#[derive(Debug, Clone)]
pub struct MarkdownTokenizer {
    max_nesting_depth: usize,
}

impl MarkdownTokenizer {
    pub fn new(max_nesting_depth: usize) -> Self {
        Self { max_nesting_depth }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.max_nesting_depth)
    }

    fn options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
    }

    /// Tokenize Markdown content.
    ///
    /// Fails only on nesting beyond the configured depth; every other
    /// irregularity is reported through `TokenStream::issues`.
    pub fn tokenize(&self, content: &str) -> Result<TokenStream, ParseError> {
        let lines = LineIndex::new(content);
        let mut tokens: Vec<Token> = Vec::new();
        let mut issues = Vec::new();
        let mut block: Option<BlockCollector> = None;
        let mut references: Vec<PendingReference> = Vec::new();
        let mut depth = 0usize;
        let mut nesting = 0usize;

        for (event, range) in Parser::new_ext(content, Self::options()).into_offset_iter() {
            match &event {
                Event::Start(tag) => {
                    if matches!(tag, Tag::BlockQuote | Tag::List(_)) {
                        nesting += 1;

                        if nesting > self.max_nesting_depth {
                            let (line, column) = lines.locate(range.start);
                            return Err(ParseError::nesting_too_deep(
                                nesting,
                                self.max_nesting_depth,
                            )
                            .at(line, column));
                        }
                    }

                    match tag {
                        Tag::Link(_, dest, title) => references.push(PendingReference::new(
                            TokenKind::Link,
                            dest,
                            title,
                            range.clone(),
                        )),
                        Tag::Image(_, dest, title) => references.push(PendingReference::new(
                            TokenKind::Image,
                            dest,
                            title,
                            range.clone(),
                        )),
                        _ => {}
                    }

                    if depth == 0 {
                        block = Some(BlockCollector::open(tag, range.clone()));
                    } else if let Some(collector) = block.as_mut() {
                        collector.start(tag);
                    }

                    depth += 1;
                }
                Event::End(tag) => {
                    depth = depth.saturating_sub(1);

                    if matches!(tag, Tag::BlockQuote | Tag::List(_)) {
                        nesting = nesting.saturating_sub(1);
                    }

                    if matches!(tag, Tag::Link(..) | Tag::Image(..)) {
                        if let Some(reference) = references.pop() {
                            tokens.push(reference.into_token(content, &lines));
                        }
                    }

                    if depth == 0 {
                        if let Some(collector) = block.take() {
                            let (token, issue) = collector.finish(content, &lines);
                            tokens.push(token);
                            issues.extend(issue);
                        }
                    } else if let Some(collector) = block.as_mut() {
                        collector.end(tag);
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    for reference in references.iter_mut() {
                        reference.text.push_str(text);
                    }

                    if let Some(collector) = block.as_mut() {
                        collector.text(text, matches!(event, Event::Code(_)));
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    for reference in references.iter_mut() {
                        reference.text.push(' ');
                    }

                    if let Some(collector) = block.as_mut() {
                        collector.line_break();
                    }
                }
                Event::TaskListMarker(checked) => {
                    if let Some(collector) = block.as_mut() {
                        collector.task(*checked);
                    }
                }
                Event::Html(html) if depth == 0 => {
                    push_html(&mut tokens, html, range.clone(), &lines);
                }
                Event::Rule if depth == 0 => {
                    let raw = slice(content, &range);
                    tokens.push(
                        Token::new(TokenKind::Rule, "", raw).with_position(lines.position(&range)),
                    );
                }
                _ => {}
            }
        }

        if let Some(collector) = block.take() {
            let (token, issue) = collector.finish(content, &lines);
            tokens.push(token);
            issues.extend(issue);
        }

        tokens.sort_by_key(|t| t.position.start);

        Ok(TokenStream { tokens, issues })
    }
}

fn slice<'a>(content: &'a str, range: &Range<usize>) -> &'a str {
    content.get(range.clone()).unwrap_or_default()
}

/// Consecutive HTML lines at the top level form one token
fn push_html(tokens: &mut Vec<Token>, html: &str, range: Range<usize>, lines: &LineIndex<'_>) {
    if let Some(last) = tokens.last_mut() {
        if last.kind == TokenKind::Html && last.position.end == range.start {
            last.raw.push_str(html);
            last.text.push_str(html);
            last.position.end = range.end;
            return;
        }
    }

    tokens.push(Token::new(TokenKind::Html, html, html).with_position(lines.position(&range)));
}

/// Byte offset to line/column lookup
struct LineIndex<'a> {
    content: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(content: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self { content, starts }
    }

    /// 1-based line and column (in characters) of a byte offset
    fn locate(&self, offset: usize) -> (usize, usize) {
        let index = self.starts.partition_point(|&s| s <= offset).saturating_sub(1);
        let line_start = self.starts.get(index).copied().unwrap_or(0);
        let column = self
            .content
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);

        (index + 1, column + 1)
    }

    fn position(&self, range: &Range<usize>) -> TokenPosition {
        let (line, column) = self.locate(range.start);
        TokenPosition {
            start: range.start,
            end: range.end,
            line,
            column,
        }
    }
}

/// Link or image waiting for its end event
struct PendingReference {
    kind: TokenKind,
    target: String,
    title: Option<String>,
    range: Range<usize>,
    text: String,
}

impl PendingReference {
    fn new(kind: TokenKind, target: &str, title: &str, range: Range<usize>) -> Self {
        Self {
            kind,
            target: target.to_string(),
            title: (!title.is_empty()).then(|| title.to_string()),
            range,
            text: String::new(),
        }
    }

    fn into_token(self, content: &str, lines: &LineIndex<'_>) -> Token {
        let raw = slice(content, &self.range);
        let text = self.text.trim().to_string();

        let detail = match self.kind {
            TokenKind::Image => TokenDetail::Image {
                src: self.target,
                alt: text.clone(),
                title: self.title,
            },
            _ => TokenDetail::Link {
                href: self.target,
                title: self.title,
            },
        };

        Token::new(self.kind, text, raw)
            .with_position(lines.position(&self.range))
            .with_detail(detail)
    }
}

enum BlockState {
    Plain,
    Code { language: Option<String>, fenced: bool },
    Table(TableBuilder),
    List(ListBuilder),
}

/// Accumulates one top-level block until its end event
struct BlockCollector {
    kind: TokenKind,
    range: Range<usize>,
    depth: Option<u8>,
    text: String,
    state: BlockState,
}

impl BlockCollector {
    fn open(tag: &Tag<'_>, range: Range<usize>) -> Self {
        let (kind, depth, state) = match tag {
            Tag::Heading(level, ..) => (TokenKind::Heading, Some(*level as u8), BlockState::Plain),
            Tag::BlockQuote => (TokenKind::Blockquote, None, BlockState::Plain),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                let language = info
                    .split_whitespace()
                    .next()
                    .map(|s| s.to_string());
                (
                    TokenKind::Code,
                    None,
                    BlockState::Code {
                        language,
                        fenced: true,
                    },
                )
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => (
                TokenKind::Code,
                None,
                BlockState::Code {
                    language: None,
                    fenced: false,
                },
            ),
            Tag::Table(_) => (
                TokenKind::Table,
                None,
                BlockState::Table(TableBuilder::default()),
            ),
            Tag::List(start) => (
                TokenKind::List,
                None,
                BlockState::List(ListBuilder::new(*start)),
            ),
            _ => (TokenKind::Paragraph, None, BlockState::Plain),
        };

        Self {
            kind,
            range,
            depth,
            text: String::new(),
            state,
        }
    }

    fn start(&mut self, tag: &Tag<'_>) {
        match &mut self.state {
            BlockState::Plain => {
                let opens_block = matches!(
                    tag,
                    Tag::Paragraph | Tag::Heading(..) | Tag::CodeBlock(_) | Tag::List(_) | Tag::Item
                );

                if opens_block && !self.text.is_empty() && !self.text.ends_with('\n') {
                    self.text.push('\n');
                }
            }
            BlockState::Code { .. } => {}
            BlockState::Table(table) => table.start(tag),
            BlockState::List(list) => list.start(tag),
        }
    }

    fn end(&mut self, tag: &Tag<'_>) {
        match &mut self.state {
            BlockState::Table(table) => table.end(tag),
            BlockState::List(list) => list.end(tag),
            BlockState::Plain | BlockState::Code { .. } => {}
        }
    }

    fn text(&mut self, text: &str, is_code: bool) {
        match &mut self.state {
            BlockState::Table(table) => table.cell.push_str(text),
            BlockState::List(list) => list.text(text, is_code),
            BlockState::Plain | BlockState::Code { .. } => self.text.push_str(text),
        }
    }

    fn line_break(&mut self) {
        match &mut self.state {
            BlockState::Table(table) => table.cell.push(' '),
            BlockState::List(list) => list.text(" ", false),
            BlockState::Plain | BlockState::Code { .. } => self.text.push(' '),
        }
    }

    fn task(&mut self, checked: bool) {
        if let BlockState::List(list) = &mut self.state {
            list.task(checked);
        }
    }

    fn finish(self, content: &str, lines: &LineIndex<'_>) -> (Token, Option<ParseError>) {
        let raw = slice(content, &self.range);
        let position = lines.position(&self.range);
        let at = |code: ErrorCode| ParseError::from_code(code).at(position.line, position.column);

        let (text, detail, issue) = match self.state {
            BlockState::Plain => match self.kind {
                TokenKind::Heading => {
                    let text = self.text.trim().to_string();
                    let issue = text.is_empty().then(|| at(ErrorCode::MalformedHeading));
                    (text, TokenDetail::None, issue)
                }
                // Inline source, markup kept for formatting detection
                TokenKind::Paragraph => (raw.trim().to_string(), TokenDetail::None, None),
                _ => (self.text.trim().to_string(), TokenDetail::None, None),
            },
            BlockState::Code { language, fenced } => {
                // An unclosed fence always runs to the end of the document
                let runs_to_end = self.range.end >= content.trim_end().len();
                let issue = (fenced && runs_to_end && is_unterminated_fence(raw))
                    .then(|| at(ErrorCode::MalformedCodeBlock));
                (self.text, TokenDetail::Code { language }, issue)
            }
            BlockState::Table(table) => {
                let data = table.finish();
                let issue = has_ragged_rows(raw).then(|| at(ErrorCode::MalformedTable));
                let text = std::iter::once(&data.header)
                    .chain(data.rows.iter())
                    .map(|row| row.join(" | "))
                    .collect::<Vec<_>>()
                    .join("\n");
                (text, TokenDetail::Table(data), issue)
            }
            BlockState::List(list) => {
                let data = list.finish();
                let mut lines_out = Vec::new();
                for item in &data.items {
                    push_item_lines(item, &mut lines_out);
                }
                let issue = data
                    .items
                    .iter()
                    .any(has_empty_item)
                    .then(|| at(ErrorCode::MalformedList));
                (lines_out.join("\n"), TokenDetail::List(data), issue)
            }
        };

        let token = Token {
            kind: self.kind,
            text,
            raw: raw.to_string(),
            depth: self.depth,
            position,
            detail,
        };

        (token, issue)
    }
}

fn push_item_lines(item: &ListItem, out: &mut Vec<String>) {
    if !item.text.is_empty() {
        out.push(item.text.clone());
    }

    for child in item.nested_items() {
        push_item_lines(child, out);
    }
}

/// An item with no text, no task box and no nested content, at any depth
fn has_empty_item(item: &ListItem) -> bool {
    let is_empty = item.text.trim().is_empty() && item.checked.is_none() && item.inline.is_empty();
    is_empty || item.nested_items().any(has_empty_item)
}

/// A fenced block whose last line is not a closing fence of at least the
/// opening length
fn is_unterminated_fence(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    let fence_char = match trimmed.chars().next() {
        Some(c @ ('`' | '~')) => c,
        _ => return false,
    };
    let fence_len = trimmed.chars().take_while(|c| *c == fence_char).count();

    let mut body = trimmed.trim_end().lines();
    body.next();

    match body.last() {
        Some(last) => {
            let last = last.trim();
            let run = last.chars().take_while(|c| *c == fence_char).count();
            !(run >= fence_len && run == last.chars().count())
        }
        None => true,
    }
}

/// Body rows whose cell count differs from the header row
fn has_ragged_rows(raw: &str) -> bool {
    let mut rows = raw.lines().filter(|l| !l.trim().is_empty());

    let Some(header) = rows.next() else {
        return false;
    };
    let expected = count_cells(header);

    rows.skip(1).any(|row| count_cells(row) != expected)
}

fn count_cells(line: &str) -> usize {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => inner,
    };

    let mut count = 1;
    let mut escaped = false;

    for c in inner.chars() {
        if escaped {
            escaped = false;
            continue;
        }

        match c {
            '\\' => escaped = true,
            '|' => count += 1,
            _ => {}
        }
    }

    count
}

#[derive(Default)]
struct TableBuilder {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    current_row: Vec<String>,
    cell: String,
}

impl TableBuilder {
    fn start(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::TableHead | Tag::TableRow => self.current_row.clear(),
            Tag::TableCell => self.cell.clear(),
            _ => {}
        }
    }

    fn end(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::TableCell => {
                let cell = mem::take(&mut self.cell);
                self.current_row.push(cell.trim().to_string());
            }
            Tag::TableHead => self.header = mem::take(&mut self.current_row),
            Tag::TableRow => self.rows.push(mem::take(&mut self.current_row)),
            _ => {}
        }
    }

    fn finish(self) -> TableData {
        TableData {
            header: self.header,
            rows: self.rows,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum InlineFrame {
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image,
    Other,
}

impl InlineFrame {
    fn for_tag(tag: &Tag<'_>) -> Self {
        match tag {
            Tag::Emphasis => Self::Emphasis,
            Tag::Strong => Self::Strong,
            Tag::Strikethrough => Self::Strikethrough,
            Tag::Link(..) => Self::Link,
            Tag::Image(..) => Self::Image,
            _ => Self::Other,
        }
    }

    fn wrap(self, children: Vec<InlineNode>) -> InlineNode {
        match self {
            Self::Emphasis => InlineNode::Emphasis(children),
            Self::Strong => InlineNode::Strong(children),
            Self::Strikethrough => InlineNode::Strikethrough(children),
            Self::Link => InlineNode::Link(children),
            Self::Image => InlineNode::Image(children),
            Self::Other => InlineNode::Other(children),
        }
    }
}

/// Builds the inline node tree of one list item
#[derive(Default)]
struct InlineBuilder {
    root: Vec<InlineNode>,
    frames: Vec<(InlineFrame, Vec<InlineNode>)>,
}

impl InlineBuilder {
    fn nodes(&mut self) -> &mut Vec<InlineNode> {
        match self.frames.last_mut() {
            Some((_, nodes)) => nodes,
            None => &mut self.root,
        }
    }

    fn push(&mut self, node: InlineNode) {
        self.nodes().push(node);
    }

    fn text(&mut self, text: &str) {
        let nodes = self.nodes();

        if let Some(InlineNode::Text(existing)) = nodes.last_mut() {
            existing.push_str(text);
            return;
        }

        nodes.push(InlineNode::Text(text.to_string()));
    }

    fn open(&mut self, frame: InlineFrame) {
        self.frames.push((frame, Vec::new()));
    }

    fn close(&mut self) {
        if let Some((frame, children)) = self.frames.pop() {
            let node = frame.wrap(children);
            self.push(node);
        }
    }

    fn finish(mut self) -> Vec<InlineNode> {
        while !self.frames.is_empty() {
            self.close();
        }
        self.root
    }
}

#[derive(Default)]
struct ItemFrame {
    text: String,
    inline: InlineBuilder,
    checked: Option<bool>,
}

impl ItemFrame {
    fn finish(self) -> ListItem {
        ListItem {
            text: self.text.split_whitespace().collect::<Vec<_>>().join(" "),
            inline: self.inline.finish(),
            checked: self.checked,
        }
    }
}

/// Builds a list, including nested lists, from its inner events
struct ListBuilder {
    start: Option<u64>,
    lists: Vec<Vec<ListItem>>,
    items: Vec<ItemFrame>,
}

impl ListBuilder {
    fn new(start: Option<u64>) -> Self {
        Self {
            start,
            lists: vec![Vec::new()],
            items: Vec::new(),
        }
    }

    fn start(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::List(_) => self.lists.push(Vec::new()),
            Tag::Item => self.items.push(ItemFrame::default()),
            Tag::Paragraph => {
                if let Some(item) = self.items.last_mut() {
                    if !item.text.is_empty() {
                        item.text.push(' ');
                        item.inline.text(" ");
                    }
                }
            }
            other => {
                if let Some(item) = self.items.last_mut() {
                    item.inline.open(InlineFrame::for_tag(other));
                }
            }
        }
    }

    fn end(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::List(_) => {
                if self.lists.len() > 1 {
                    let nested = self.lists.pop().unwrap_or_default();
                    if let Some(item) = self.items.last_mut() {
                        item.inline.push(InlineNode::List(nested));
                    }
                }
            }
            Tag::Item => {
                if let Some(frame) = self.items.pop() {
                    if let Some(list) = self.lists.last_mut() {
                        list.push(frame.finish());
                    }
                }
            }
            Tag::Paragraph => {}
            _ => {
                if let Some(item) = self.items.last_mut() {
                    item.inline.close();
                }
            }
        }
    }

    fn text(&mut self, text: &str, is_code: bool) {
        if let Some(item) = self.items.last_mut() {
            item.text.push_str(text);

            if is_code {
                item.inline.push(InlineNode::Code(text.to_string()));
            } else {
                item.inline.text(text);
            }
        }
    }

    fn task(&mut self, checked: bool) {
        if let Some(item) = self.items.last_mut() {
            item.checked = Some(checked);
        }
    }

    fn finish(mut self) -> ListData {
        while let Some(frame) = self.items.pop() {
            if let Some(list) = self.lists.last_mut() {
                list.push(frame.finish());
            }
        }

        ListData {
            ordered: self.start.is_some(),
            start: self.start,
            items: self.lists.into_iter().next().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(content: &str) -> TokenStream {
        MarkdownTokenizer::new(16).tokenize(content).unwrap()
    }

    fn kinds(stream: &TokenStream) -> Vec<TokenKind> {
        stream.tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_content() {
        let stream = tokenize("");
        assert!(stream.tokens.is_empty());
        assert!(stream.issues.is_empty());
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let stream = tokenize("# Title\n\nHello **world**.\n\n## Part\n");

        assert_eq!(
            kinds(&stream),
            vec![TokenKind::Heading, TokenKind::Paragraph, TokenKind::Heading]
        );
        assert_eq!(stream.tokens[0].depth, Some(1));
        assert_eq!(stream.tokens[0].text, "Title");
        assert_eq!(stream.tokens[1].text, "Hello **world**.");
        assert_eq!(stream.tokens[2].depth, Some(2));
        assert_eq!(stream.tokens[2].position.line, 5);
        assert_eq!(stream.tokens[2].position.column, 1);
    }

    #[test]
    fn test_code_block_language() {
        let stream = tokenize("```rust\nlet x = 1;\n```\n");

        assert_eq!(stream.tokens.len(), 1);
        let token = &stream.tokens[0];
        assert_eq!(token.kind, TokenKind::Code);
        assert_eq!(token.text, "let x = 1;\n");
        assert_eq!(
            token.detail,
            TokenDetail::Code {
                language: Some("rust".to_string())
            }
        );
        assert!(stream.issues.is_empty());
    }

    #[test]
    fn test_unterminated_fence_is_reported() {
        let stream = tokenize("Intro text.\n\n```\nnever closed\n");

        assert_eq!(stream.issues.len(), 1);
        assert_eq!(stream.issues[0].code, ErrorCode::MalformedCodeBlock);
        assert_eq!(stream.issues[0].location.map(|l| l.line), Some(3));
    }

    #[test]
    fn test_empty_heading_is_reported() {
        let stream = tokenize("#\n\nText here.");

        assert_eq!(stream.issues.len(), 1);
        assert_eq!(stream.issues[0].code, ErrorCode::MalformedHeading);
    }

    #[test]
    fn test_table_token() {
        let stream = tokenize("| A | B | C |\n|---|---|---|\n| 1 | 2 | 3 |\n| 4 | 5 | 6 |\n");

        assert_eq!(stream.tokens.len(), 1);
        let TokenDetail::Table(table) = &stream.tokens[0].detail else {
            panic!("expected table detail");
        };
        assert_eq!(table.header, vec!["A", "B", "C"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["4", "5", "6"]);
        assert_eq!(stream.tokens[0].text, "A | B | C\n1 | 2 | 3\n4 | 5 | 6");
        assert!(stream.issues.is_empty());
    }

    #[test]
    fn test_ragged_table_is_reported() {
        let stream = tokenize("| A | B |\n|---|---|\n| 1 | 2 | 3 |\n");
        assert_eq!(stream.issues.len(), 1);
        assert_eq!(stream.issues[0].code, ErrorCode::MalformedTable);
    }

    #[test]
    fn test_empty_list_item_is_reported() {
        let stream = tokenize("Intro text.\n\n- foo\n-\n- bar\n");

        assert_eq!(stream.issues.len(), 1);
        assert_eq!(stream.issues[0].code, ErrorCode::MalformedList);
        assert_eq!(stream.issues[0].location.map(|l| l.line), Some(3));
        assert_eq!(stream.tokens[1].text, "foo\nbar");
    }

    #[test]
    fn test_empty_nested_item_is_reported() {
        let stream = tokenize("- parent\n  - child\n  -\n");
        assert_eq!(stream.issues.len(), 1);
        assert_eq!(stream.issues[0].code, ErrorCode::MalformedList);

        assert!(tokenize("- parent\n  - child\n").issues.is_empty());
    }

    #[test]
    fn test_count_cells_ignores_escaped_pipes() {
        assert_eq!(count_cells("| a | b \\| c |"), 2);
        assert_eq!(count_cells("a | b"), 2);
    }

    #[test]
    fn test_list_token() {
        let stream = tokenize("1. First *item*\n2. Second `code`\n   - nested\n");

        assert_eq!(stream.tokens.len(), 1);
        let token = &stream.tokens[0];
        assert_eq!(token.kind, TokenKind::List);
        assert_eq!(token.text, "First item\nSecond code\nnested");

        let TokenDetail::List(list) = &token.detail else {
            panic!("expected list detail");
        };
        assert!(list.ordered);
        assert_eq!(list.start, Some(1));
        assert_eq!(list.items.len(), 2);
        assert_eq!(
            list.items[0].inline,
            vec![
                InlineNode::Text("First ".to_string()),
                InlineNode::Emphasis(vec![InlineNode::Text("item".to_string())]),
            ]
        );
        assert_eq!(list.items[1].nested_items().count(), 1);
    }

    #[test]
    fn test_task_list() {
        let stream = tokenize("- [x] done\n- [ ] todo\n");

        let TokenDetail::List(list) = &stream.tokens[0].detail else {
            panic!("expected list detail");
        };
        assert!(!list.ordered);
        assert_eq!(list.items[0].checked, Some(true));
        assert_eq!(list.items[1].checked, Some(false));
    }

    #[test]
    fn test_blockquote_is_one_token() {
        let stream = tokenize("> First line.\n>\n> Second paragraph.\n");

        assert_eq!(kinds(&stream), vec![TokenKind::Blockquote]);
        assert_eq!(stream.tokens[0].text, "First line.\nSecond paragraph.");
    }

    #[test]
    fn test_links_and_images_follow_their_paragraph() {
        let stream = tokenize("See [the docs](https://example.com \"Docs\") and ![logo](logo.png).");

        assert_eq!(
            kinds(&stream),
            vec![TokenKind::Paragraph, TokenKind::Link, TokenKind::Image]
        );
        assert_eq!(stream.tokens[1].text, "the docs");
        assert_eq!(
            stream.tokens[1].detail,
            TokenDetail::Link {
                href: "https://example.com".to_string(),
                title: Some("Docs".to_string()),
            }
        );
        assert_eq!(
            stream.tokens[2].detail,
            TokenDetail::Image {
                src: "logo.png".to_string(),
                alt: "logo".to_string(),
                title: None,
            }
        );
    }

    #[test]
    fn test_nesting_too_deep() {
        let content = "> > > > deep";
        let err = MarkdownTokenizer::new(3).tokenize(content).unwrap_err();

        assert_eq!(err.code, ErrorCode::NestingTooDeep);
        assert_eq!(err.location.map(|l| l.line), Some(1));
        assert!(MarkdownTokenizer::new(4).tokenize(content).is_ok());
    }

    #[test]
    fn test_rule_and_html_tokens() {
        let stream = tokenize("Text here.\n\n---\n\n<div>\nblock\n</div>\n");

        assert_eq!(
            kinds(&stream),
            vec![TokenKind::Paragraph, TokenKind::Rule, TokenKind::Html]
        );
    }

    #[test]
    fn test_deterministic() {
        let content = "# A\n\n- x\n- y\n\n| a |\n|---|\n| 1 |\n\n[l](u)";
        let first = tokenize(content);
        let second = tokenize(content);
        assert_eq!(first.tokens, second.tokens);
    }

    #[test]
    fn test_locate_multibyte_columns() {
        let index = LineIndex::new("héllo\nwörld");
        assert_eq!(index.locate(0), (1, 1));
        assert_eq!(index.locate(7), (2, 1));
        assert_eq!(index.locate(10), (2, 3));
    }
}
