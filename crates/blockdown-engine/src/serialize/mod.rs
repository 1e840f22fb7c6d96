//! Markdown serialization boundary.
//!
//! Serialization is recursive over nested inline blocks; deserialization is
//! line-oriented and deliberately simplified. The round trip is lossy on
//! inline markup (plain-text view and export only re-parse block structure)
//! but stable for documents made of block-level constructs with plain text.

use crate::model::{Block, BlockKind, ContentItem, attr};
use crate::parsing::detect_block_markdown;

/// Output options for [`blocks_to_markdown_with`].
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Emit `1.`-style markers for ordered list items. Off by default: the
    /// legacy output writes `- ` for every list item regardless of its
    /// `list_type`, discarding the ordered/unordered distinction.
    pub numbered_list_markers: bool,
}

/// Serialize a block sequence to markdown with default options, top-level
/// blocks joined by newlines.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    blocks_to_markdown_with(blocks, &SerializeOptions::default())
}

/// Serialize a block sequence to markdown.
pub fn blocks_to_markdown_with(blocks: &[Block], opts: &SerializeOptions) -> String {
    let mut ordinal = 0usize;
    let lines: Vec<String> = blocks
        .iter()
        .map(|block| {
            if is_ordered_item(block) {
                ordinal += 1;
            } else {
                ordinal = 0;
            }
            render_block(block, opts, ordinal)
        })
        .collect();
    lines.join("\n")
}

/// Serialize a single block (recursively) with default options.
pub fn block_to_markdown(block: &Block) -> String {
    render_block(block, &SerializeOptions::default(), 0)
}

fn is_ordered_item(block: &Block) -> bool {
    block.kind == BlockKind::ListItem && block.attr(attr::LIST_TYPE) == Some(attr::LIST_TYPE_ORDERED)
}

fn render_block(block: &Block, opts: &SerializeOptions, ordinal: usize) -> String {
    let content = render_content(block, opts);
    match block.kind {
        BlockKind::Heading => {
            let level: usize = block
                .attr(attr::LEVEL)
                .and_then(|v| v.parse().ok())
                .unwrap_or(1)
                .clamp(1, 6);
            format!("{} {}", "#".repeat(level), content)
        }
        BlockKind::Bold => format!("**{content}**"),
        BlockKind::Italic => format!("*{content}*"),
        BlockKind::Code => format!("`{content}`"),
        BlockKind::CodeBlock => {
            let language = block.attr(attr::LANGUAGE).unwrap_or("");
            format!("```{language}\n{content}\n```")
        }
        BlockKind::Link => {
            let href = block.attr(attr::HREF).unwrap_or("");
            format!("[{content}]({href})")
        }
        BlockKind::Image => {
            let alt = block.attr(attr::ALT).unwrap_or("");
            let src = block.attr(attr::SRC).unwrap_or("");
            let mut out = format!("![{alt}]({src})");
            if let (Some(w), Some(h)) = (block.attr(attr::WIDTH), block.attr(attr::HEIGHT)) {
                out.push_str(&format!("{{{w}x{h}}}"));
            }
            out
        }
        BlockKind::ListItem => {
            if opts.numbered_list_markers && is_ordered_item(block) {
                format!("{ordinal}. {content}")
            } else {
                format!("- {content}")
            }
        }
        BlockKind::Quote => format!("> {content}"),
        BlockKind::LineBreak => String::new(),
        BlockKind::Paragraph
        | BlockKind::OrderedList
        | BlockKind::UnorderedList
        | BlockKind::Text => content,
    }
}

fn render_content(block: &Block, opts: &SerializeOptions) -> String {
    let mut out = String::new();
    for item in &block.content {
        match item {
            ContentItem::Text(s) => out.push_str(s),
            ContentItem::Nested(nested) => out.push_str(&render_block(nested, opts, 0)),
        }
    }
    out
}

/// Parse markdown text into a block sequence. Line-oriented and simplified:
///
/// - blank lines become line breaks;
/// - heading/list/quote/fence lines are classified with the same priority
///   as live detection — but a fence line becomes a code block whose body
///   is *not* populated from subsequent lines;
/// - anything else becomes a paragraph whose content is the raw line.
///   Inline markup is not re-parsed into nested blocks on this path.
///
/// A post-pass collapses consecutive empty blocks (line break or empty
/// paragraph) down to at most one, and the result always holds at least
/// one block.
pub fn markdown_to_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for line in text.split('\n') {
        if line.trim().is_empty() {
            blocks.push(Block::line_break());
            continue;
        }
        match detect_block_markdown(line) {
            Some(d) => blocks.push(Block::new(
                d.kind,
                vec![ContentItem::Text(d.content)],
                d.attrs,
            )),
            None => blocks.push(Block::with_text(BlockKind::Paragraph, line)),
        }
    }

    let mut out: Vec<Block> = Vec::with_capacity(blocks.len());
    let mut prev_empty = false;
    for block in blocks {
        let empty = block.is_line_break()
            || (block.kind == BlockKind::Paragraph && block.is_empty());
        if empty && prev_empty {
            continue;
        }
        prev_empty = empty;
        out.push(block);
    }

    if out.is_empty() {
        out.push(Block::empty_paragraph());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attrs;
    use pretty_assertions::assert_eq;

    fn heading(level: u8, text: &str) -> Block {
        let mut b = Block::with_text(BlockKind::Heading, text);
        b.attrs.insert(attr::LEVEL.into(), level.to_string());
        b
    }

    fn item(list_type: &str, text: &str) -> Block {
        let mut b = Block::with_text(BlockKind::ListItem, text);
        b.attrs.insert(attr::LIST_TYPE.into(), list_type.into());
        b
    }

    // ============ serialization ============

    #[test]
    fn serializes_headings_by_level() {
        assert_eq!(block_to_markdown(&heading(1, "One")), "# One");
        assert_eq!(block_to_markdown(&heading(3, "Three")), "### Three");
    }

    #[test]
    fn serializes_nested_inline_blocks_in_reading_order() {
        let mut para = Block::empty_paragraph();
        para.set_content(vec![
            ContentItem::Text("a ".into()),
            ContentItem::Nested(Block::with_text(BlockKind::Bold, "b")),
            ContentItem::Text(" c".into()),
        ]);
        assert_eq!(block_to_markdown(&para), "a **b** c");
    }

    #[test]
    fn serializes_code_block_with_language() {
        let mut b = Block::with_text(BlockKind::CodeBlock, "fn main() {}");
        b.attrs.insert(attr::LANGUAGE.into(), "rust".into());
        assert_eq!(block_to_markdown(&b), "```rust\nfn main() {}\n```");
    }

    #[test]
    fn serializes_link_and_inline_code() {
        let mut link = Block::with_text(BlockKind::Link, "text");
        link.attrs.insert(attr::HREF.into(), "url".into());
        assert_eq!(block_to_markdown(&link), "[text](url)");

        let code = Block::with_text(BlockKind::Code, "x");
        assert_eq!(block_to_markdown(&code), "`x`");
    }

    #[test]
    fn serializes_image_with_dimensions_only_when_both_present() {
        let mut img = Block::new(BlockKind::Image, vec![], Attrs::new());
        img.attrs.insert(attr::ALT.into(), "alt".into());
        img.attrs.insert(attr::SRC.into(), "u".into());
        assert_eq!(block_to_markdown(&img), "![alt](u)");

        img.attrs.insert(attr::WIDTH.into(), "10".into());
        assert_eq!(block_to_markdown(&img), "![alt](u)");

        img.attrs.insert(attr::HEIGHT.into(), "20".into());
        assert_eq!(block_to_markdown(&img), "![alt](u){10x20}");
    }

    #[test]
    fn legacy_output_flattens_ordered_markers() {
        // Both list styles come out as `- ` by default; the ordered
        // distinction is kept in attrs but dropped on the way to text.
        let blocks = vec![item("ordered", "first"), item("unordered", "second")];
        assert_eq!(blocks_to_markdown(&blocks), "- first\n- second");
    }

    #[test]
    fn numbered_option_restores_ordinals() {
        let opts = SerializeOptions {
            numbered_list_markers: true,
        };
        let blocks = vec![
            item("ordered", "a"),
            item("ordered", "b"),
            Block::with_text(BlockKind::Paragraph, "gap"),
            item("ordered", "c"),
            item("unordered", "d"),
        ];
        assert_eq!(
            blocks_to_markdown_with(&blocks, &opts),
            "1. a\n2. b\ngap\n1. c\n- d"
        );
    }

    #[test]
    fn line_break_serializes_to_empty_line() {
        let blocks = vec![
            Block::with_text(BlockKind::Paragraph, "a"),
            Block::line_break(),
            Block::with_text(BlockKind::Paragraph, "b"),
        ];
        assert_eq!(blocks_to_markdown(&blocks), "a\n\nb");
    }

    // ============ deserialization ============

    #[test]
    fn parses_block_level_constructs() {
        let blocks = markdown_to_blocks("# Title\nplain\n> quoted\n- item");
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading,
                BlockKind::Paragraph,
                BlockKind::Quote,
                BlockKind::ListItem,
            ]
        );
        assert_eq!(blocks[0].attr(attr::LEVEL), Some("1"));
    }

    #[test]
    fn blank_lines_become_line_breaks() {
        let blocks = markdown_to_blocks("a\n\nb");
        assert_eq!(blocks.len(), 3);
        assert!(blocks[1].is_line_break());
    }

    #[test]
    fn consecutive_empties_collapse_to_one() {
        let blocks = markdown_to_blocks("a\n\n\n\n\nb");
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Paragraph, BlockKind::LineBreak, BlockKind::Paragraph]
        );
    }

    #[test]
    fn fence_bodies_are_not_accumulated() {
        // Each line is classified independently: the body of a fenced block
        // comes through as paragraphs, and both fence lines come through as
        // empty code blocks.
        let blocks = markdown_to_blocks("```rust\nlet x = 1;\n```");
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::CodeBlock, BlockKind::Paragraph, BlockKind::CodeBlock]
        );
        assert_eq!(blocks[0].attr(attr::LANGUAGE), Some("rust"));
        assert_eq!(blocks[0].fragment(0), Some(""));
    }

    #[test]
    fn output_always_has_at_least_one_block() {
        let blocks = markdown_to_blocks("");
        assert!(!blocks.is_empty());
    }

    #[test]
    fn inline_markup_is_not_reparsed() {
        let blocks = markdown_to_blocks("a **b** c");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content.len(), 1);
        assert_eq!(blocks[0].fragment(0), Some("a **b** c"));
    }

    // ============ round trip ============

    #[test]
    fn round_trip_is_stable_for_block_level_documents() {
        let original = vec![
            heading(2, "Title"),
            Block::with_text(BlockKind::Paragraph, "body text"),
            Block::line_break(),
            item("unordered", "one"),
            item("unordered", "two"),
            Block::with_text(BlockKind::Quote, "said so"),
        ];

        let text = blocks_to_markdown(&original);
        let reparsed = markdown_to_blocks(&text);

        let shape = |bs: &[Block]| -> Vec<(BlockKind, String)> {
            bs.iter().map(|b| (b.kind, b.plain_text())).collect()
        };
        assert_eq!(shape(&reparsed), shape(&original));

        // And a second pass through text is byte-identical.
        assert_eq!(blocks_to_markdown(&reparsed), text);
    }
}
