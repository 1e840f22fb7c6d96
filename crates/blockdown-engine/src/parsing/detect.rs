use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Attrs, BlockKind, attr};

/// Result of block-level markdown detection: the block a line should become.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDescriptor {
    pub kind: BlockKind,
    pub content: String,
    pub attrs: Attrs,
}

impl BlockDescriptor {
    fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            attrs: Attrs::new(),
        }
    }

    fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }
}

fn ordered_item_regex() -> &'static Regex {
    static ORDERED_ITEM: OnceLock<Regex> = OnceLock::new();
    ORDERED_ITEM.get_or_init(|| Regex::new(r"^\d+\. ").expect("invalid ordered-item regex"))
}

/// Classify a line of text as block-level markdown.
///
/// Patterns are tried in a fixed priority order, each anchored at the start
/// of the line; the first match wins:
///
/// 1. heading — 1–6 `#` then exactly one space
/// 2. unordered list item — `-`, `*`, or `+` then one space
/// 3. ordered list item — digits, `.`, one space
/// 4. quote — `>` then one space
/// 5. fenced code open — three backticks, optional language token
///
/// Returns `None` when no pattern matches; the caller treats the line as
/// plain paragraph text. The fence descriptor's content is empty: the fence
/// line itself carries no body text, the body is accumulated by the caller
/// on subsequent input.
pub fn detect_block_markdown(line: &str) -> Option<BlockDescriptor> {
    if let Some(d) = detect_heading(line) {
        return Some(d);
    }
    if let Some(d) = detect_unordered_item(line) {
        return Some(d);
    }
    if let Some(d) = detect_ordered_item(line) {
        return Some(d);
    }
    if let Some(d) = detect_quote(line) {
        return Some(d);
    }
    detect_code_fence(line)
}

fn detect_heading(line: &str) -> Option<BlockDescriptor> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    let content = rest.strip_prefix(' ')?;
    Some(
        BlockDescriptor::new(BlockKind::Heading, content)
            .with_attr(attr::LEVEL, hashes.to_string()),
    )
}

fn detect_unordered_item(line: &str) -> Option<BlockDescriptor> {
    let mut bytes = line.bytes();
    if !matches!(bytes.next(), Some(b'-' | b'*' | b'+')) || bytes.next() != Some(b' ') {
        return None;
    }
    Some(
        BlockDescriptor::new(BlockKind::ListItem, &line[2..])
            .with_attr(attr::LIST_TYPE, attr::LIST_TYPE_UNORDERED),
    )
}

fn detect_ordered_item(line: &str) -> Option<BlockDescriptor> {
    let m = ordered_item_regex().find(line)?;
    Some(
        BlockDescriptor::new(BlockKind::ListItem, &line[m.end()..])
            .with_attr(attr::LIST_TYPE, attr::LIST_TYPE_ORDERED),
    )
}

fn detect_quote(line: &str) -> Option<BlockDescriptor> {
    let content = line.strip_prefix("> ")?;
    Some(BlockDescriptor::new(BlockKind::Quote, content))
}

fn detect_code_fence(line: &str) -> Option<BlockDescriptor> {
    let rest = line.strip_prefix("```")?;
    let language = rest.trim();
    let mut d = BlockDescriptor::new(BlockKind::CodeBlock, "");
    if !language.is_empty() {
        d = d.with_attr(attr::LANGUAGE, language);
    }
    Some(d)
}
