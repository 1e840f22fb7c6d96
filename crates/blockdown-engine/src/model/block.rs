use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::char_len;

/// Stable identifier for a block, assigned at creation and never reused.
///
/// Identity survives in-place mutation (retype, content replacement), so
/// hosts can key external state (e.g. rendered nodes) off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    pub(crate) fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

/// The closed set of block types.
///
/// Inline kinds (`Bold`, `Italic`, `Code`, `Link`, `Image`) only ever appear
/// nested inside another block's content, never at top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Heading,
    Bold,
    Italic,
    Code,
    CodeBlock,
    Link,
    Image,
    ListItem,
    OrderedList,
    UnorderedList,
    Quote,
    LineBreak,
    Text,
}

impl BlockKind {
    /// Kinds that only appear inside another block's content.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            BlockKind::Bold | BlockKind::Italic | BlockKind::Code | BlockKind::Link | BlockKind::Image
        )
    }

    /// Kinds created by markdown auto-conversion. These revert to a plain
    /// paragraph when emptied by a deletion.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            BlockKind::Heading | BlockKind::ListItem | BlockKind::Quote | BlockKind::CodeBlock
        )
    }
}

/// Attribute keys recognized per block kind.
pub mod attr {
    /// Heading level, `"1"`–`"6"`.
    pub const LEVEL: &str = "level";
    /// List item style, `"ordered"` or `"unordered"`.
    pub const LIST_TYPE: &str = "list_type";
    /// Link target.
    pub const HREF: &str = "href";
    /// Image source.
    pub const SRC: &str = "src";
    /// Image alt text.
    pub const ALT: &str = "alt";
    /// Image display width in pixels.
    pub const WIDTH: &str = "width";
    /// Image display height in pixels.
    pub const HEIGHT: &str = "height";
    /// Fenced code block language token.
    pub const LANGUAGE: &str = "language";

    pub const LIST_TYPE_ORDERED: &str = "ordered";
    pub const LIST_TYPE_UNORDERED: &str = "unordered";
}

/// Block attributes: a string-keyed, string-valued map. Recognized keys
/// depend on the block kind (see [`attr`]).
pub type Attrs = BTreeMap<String, String>;

/// One element of a block's content sequence: either a raw text fragment or
/// a nested inline block. Order is reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentItem {
    Text(String),
    Nested(Block),
}

impl ContentItem {
    /// The text of this item, if it is a fragment.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text(s) => Some(s),
            ContentItem::Nested(_) => None,
        }
    }

    /// Character length of this item. Nested blocks count as length 0 for
    /// cursor purposes.
    pub fn text_len(&self) -> usize {
        match self {
            ContentItem::Text(s) => char_len(s),
            ContentItem::Nested(_) => 0,
        }
    }
}

/// A typed, possibly-nested unit of document content.
///
/// A document is an ordered `Vec<Block>` of top-level blocks. Steady-state
/// invariant: `content` is never empty; the canonical empty form is a single
/// empty text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub content: Vec<ContentItem>,
    pub attrs: Attrs,
    /// Non-owning back-reference to the enclosing block, for upward
    /// traversal only. Stamped when content is attached.
    pub parent: Option<BlockId>,
}

impl Block {
    /// Create a block with a fresh id. Parent ids are stamped onto any
    /// nested children in `content`.
    pub fn new(kind: BlockKind, content: Vec<ContentItem>, attrs: Attrs) -> Self {
        let mut block = Self {
            id: BlockId::fresh(),
            kind,
            content: Vec::new(),
            attrs,
            parent: None,
        };
        block.set_content(content);
        block
    }

    /// A paragraph in canonical empty form.
    pub fn empty_paragraph() -> Self {
        Self::new(
            BlockKind::Paragraph,
            vec![ContentItem::Text(String::new())],
            Attrs::new(),
        )
    }

    /// A line break: a visually empty spacer block. Always carries canonical
    /// empty content and no attrs.
    pub fn line_break() -> Self {
        Self::new(
            BlockKind::LineBreak,
            vec![ContentItem::Text(String::new())],
            Attrs::new(),
        )
    }

    /// A block of `kind` holding a single text fragment.
    pub fn with_text(kind: BlockKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![ContentItem::Text(text.into())], Attrs::new())
    }

    /// Replace the content sequence wholesale, stamping `parent` on nested
    /// children.
    pub fn set_content(&mut self, items: Vec<ContentItem>) {
        self.content = items;
        let id = self.id;
        for item in &mut self.content {
            if let ContentItem::Nested(child) = item {
                child.parent = Some(id);
            }
        }
    }

    /// True iff the content is empty, or is a single text fragment whose
    /// trimmed form is empty.
    ///
    /// A block holding only nested blocks (no text element) is never
    /// considered empty by this test, even though it has no editable text.
    pub fn is_empty(&self) -> bool {
        match self.content.as_slice() {
            [] => true,
            [ContentItem::Text(s)] => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn is_line_break(&self) -> bool {
        self.kind == BlockKind::LineBreak
    }

    /// The text fragment at `item`, if that element is text.
    pub fn fragment(&self, item: usize) -> Option<&str> {
        self.content.get(item).and_then(ContentItem::as_text)
    }

    pub(crate) fn fragment_mut(&mut self, item: usize) -> Option<&mut String> {
        match self.content.get_mut(item) {
            Some(ContentItem::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Character length of the content element at `item`. Missing elements
    /// and nested blocks count as 0.
    pub fn fragment_len(&self, item: usize) -> usize {
        self.content.get(item).map_or(0, ContentItem::text_len)
    }

    /// Index of the last content element (0 for a single-element block).
    pub fn last_item(&self) -> usize {
        self.content.len().saturating_sub(1)
    }

    /// Concatenation of the block's text fragments, skipping nested blocks.
    /// This is the text the markdown auto-converter inspects.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            if let ContentItem::Text(s) = item {
                out.push_str(s);
            }
        }
        out
    }

    /// Attribute lookup.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// Collapse runs of more than two consecutive line breaks.
///
/// Single left-to-right pass: a counter tracks consecutive line-break blocks
/// and a line break is kept only while the running count is at most two. Any
/// other block resets the counter and is always kept. Relative order of kept
/// blocks is preserved, and the pass is idempotent.
pub fn clean_consecutive_line_breaks(blocks: Vec<Block>) -> Vec<Block> {
    let mut run = 0usize;
    blocks
        .into_iter()
        .filter(|block| {
            if block.is_line_break() {
                run += 1;
                run <= 2
            } else {
                run = 0;
                true
            }
        })
        .collect()
}
