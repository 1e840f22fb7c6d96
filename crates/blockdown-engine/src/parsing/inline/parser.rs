use std::sync::OnceLock;

use regex::Regex;

use super::cursor::Scan;
use crate::model::{Attrs, Block, BlockKind, ContentItem, attr};

fn dimension_regex() -> &'static Regex {
    static DIMENSIONS: OnceLock<Regex> = OnceLock::new();
    DIMENSIONS.get_or_init(|| Regex::new(r"^\d+x\d+$").expect("invalid dimension regex"))
}

/// Tokenize a text run into plain-text fragments and inline blocks.
///
/// Single left-to-right scan. At each position the constructs are tried in
/// order — bold, italic, inline code, image, link — and the first match
/// consumes through its closing delimiter. Text between constructs
/// accumulates and is flushed whenever a construct begins.
///
/// A construct whose closing delimiter is missing is not consumed: the
/// triggering character stays in the accumulator and the scan advances by
/// one. The result always has at least one element; an empty input yields a
/// single empty text fragment.
pub fn process_inline_markdown(text: &str) -> Vec<ContentItem> {
    let mut cur = Scan::new(text);
    let mut out = Vec::new();
    let mut text_start = 0;

    while !cur.eof() {
        let at = cur.pos();
        let parsed = try_parse_bold(&mut cur)
            .or_else(|| try_parse_italic(&mut cur))
            .or_else(|| try_parse_code_span(&mut cur))
            .or_else(|| try_parse_image(&mut cur))
            .or_else(|| try_parse_link(&mut cur));

        match parsed {
            Some(block) => {
                flush_text(&mut out, cur.slice(text_start, at));
                out.push(ContentItem::Nested(block));
                text_start = cur.pos();
            }
            None => cur.bump(),
        }
    }

    flush_text(&mut out, cur.slice(text_start, cur.pos()));

    if out.is_empty() {
        out.push(ContentItem::Text(String::new()));
    }
    out
}

fn flush_text(out: &mut Vec<ContentItem>, text: &str) {
    if !text.is_empty() {
        out.push(ContentItem::Text(text.to_string()));
    }
}

/// `**…**` with a required literal closing `**`.
fn try_parse_bold(cur: &mut Scan<'_>) -> Option<Block> {
    if !cur.starts_with(b"**") {
        return None;
    }

    let saved = cur.clone();
    cur.bump_n(2);
    let inner_start = cur.pos();

    while !cur.eof() && !cur.starts_with(b"**") {
        cur.bump();
    }
    if !cur.starts_with(b"**") {
        // Not closed: the opening falls through to italic/literal handling.
        *cur = saved;
        return None;
    }
    let inner = cur.slice(inner_start, cur.pos());
    cur.bump_n(2);

    Some(Block::with_text(BlockKind::Bold, inner))
}

/// Single `*…*`, only tried when the opener is not immediately followed by a
/// second `*` (that case belongs to bold).
fn try_parse_italic(cur: &mut Scan<'_>) -> Option<Block> {
    if cur.peek() != Some(b'*') || cur.peek_at(1) == Some(b'*') {
        return None;
    }

    let saved = cur.clone();
    cur.bump();
    let inner_start = cur.pos();

    while !cur.eof() && cur.peek() != Some(b'*') {
        cur.bump();
    }
    if cur.peek() != Some(b'*') {
        *cur = saved;
        return None;
    }
    let inner = cur.slice(inner_start, cur.pos());
    cur.bump();

    Some(Block::with_text(BlockKind::Italic, inner))
}

/// `` `…` `` with a required literal closing backtick.
fn try_parse_code_span(cur: &mut Scan<'_>) -> Option<Block> {
    if cur.peek() != Some(b'`') {
        return None;
    }

    let saved = cur.clone();
    cur.bump();
    let inner_start = cur.pos();

    while !cur.eof() && cur.peek() != Some(b'`') {
        cur.bump();
    }
    if cur.peek() != Some(b'`') {
        *cur = saved;
        return None;
    }
    let inner = cur.slice(inner_start, cur.pos());
    cur.bump();

    Some(Block::with_text(BlockKind::Code, inner))
}

/// `![alt](url)` with an optional `{WxH}` dimension suffix.
///
/// Requires exact adjacency: `]` immediately followed by `(`, and a present
/// closing `)`. A closed-but-malformed suffix (anything other than
/// `\d+x\d+`) is consumed and ignored; an unclosed `{` is left for the
/// plain-text accumulator.
fn try_parse_image(cur: &mut Scan<'_>) -> Option<Block> {
    if !cur.starts_with(b"![") {
        return None;
    }

    let saved = cur.clone();
    cur.bump_n(2);
    let (alt, url) = match parse_bracket_pair(cur) {
        Some(parts) => parts,
        None => {
            *cur = saved;
            return None;
        }
    };

    let mut attrs = Attrs::new();
    attrs.insert(attr::SRC.to_string(), url.to_string());
    attrs.insert(attr::ALT.to_string(), alt.to_string());

    if let Some(dims) = take_dimension_suffix(cur) {
        let (w, h) = dims;
        attrs.insert(attr::WIDTH.to_string(), w);
        attrs.insert(attr::HEIGHT.to_string(), h);
    }

    Some(Block::new(
        BlockKind::Image,
        vec![ContentItem::Text(String::new())],
        attrs,
    ))
}

/// `[text](url)` with the same adjacency requirement as images.
fn try_parse_link(cur: &mut Scan<'_>) -> Option<Block> {
    if cur.peek() != Some(b'[') {
        return None;
    }

    let saved = cur.clone();
    cur.bump();
    let (text, url) = match parse_bracket_pair(cur) {
        Some(parts) => parts,
        None => {
            *cur = saved;
            return None;
        }
    };

    let mut attrs = Attrs::new();
    attrs.insert(attr::HREF.to_string(), url.to_string());

    Some(Block::new(
        BlockKind::Link,
        vec![ContentItem::Text(text.to_string())],
        attrs,
    ))
}

/// Parse `text](url)` from just past the opening bracket. The `](` must be
/// adjacent and the `)` present, or the whole construct fails.
fn parse_bracket_pair<'a>(cur: &mut Scan<'a>) -> Option<(&'a str, &'a str)> {
    let text_start = cur.pos();
    while !cur.eof() && !cur.starts_with(b"](") {
        cur.bump();
    }
    if !cur.starts_with(b"](") {
        return None;
    }
    let text = cur.slice(text_start, cur.pos());
    cur.bump_n(2);

    let url_start = cur.pos();
    while !cur.eof() && cur.peek() != Some(b')') {
        cur.bump();
    }
    if cur.peek() != Some(b')') {
        return None;
    }
    let url = cur.slice(url_start, cur.pos());
    cur.bump();

    Some((text, url))
}

/// Consume a `{…}` suffix immediately after an image's closing `)`.
///
/// Returns the parsed `(width, height)` when the token matches `\d+x\d+`.
/// A closed suffix that doesn't match is still consumed, just without
/// yielding dimensions. An unclosed `{` is not consumed at all.
fn take_dimension_suffix(cur: &mut Scan<'_>) -> Option<(String, String)> {
    let rest = cur.rest();
    let inner = rest.strip_prefix('{')?;
    let close = inner.find('}')?;
    let token = &inner[..close];
    cur.bump_n(close + 2); // `{`, token, `}`

    if !dimension_regex().is_match(token) {
        return None;
    }
    let (w, h) = token.split_once('x')?;
    Some((w.to_string(), h.to_string()))
}
