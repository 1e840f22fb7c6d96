use serde::{Deserialize, Serialize};

use crate::editing::navigate::{Direction, move_cursor};
use crate::editing::{convert, ops};
use crate::model::{
    Attrs, Block, BlockId, BlockKind, ContentItem, CursorPosition, clean_consecutive_line_breaks,
};
use crate::serialize::{self, SerializeOptions};

/// Commands dispatched by a host in response to input events.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertChar(char),
    InsertText(String),
    DeleteBackward,
    DeleteForward,
    SplitBlock,
    Move(Direction),
    ConvertTo {
        kind: BlockKind,
        content: String,
        attrs: Attrs,
    },
}

/// Result of applying a command: the recomputed cursor, the document
/// version after the command, and whether anything changed.
///
/// `changed == false` means the command was declined and the document is
/// exactly as it was; hosts treat that as the "operation declined" signal
/// rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub cursor: CursorPosition,
    pub version: u64,
    pub changed: bool,
}

/// The document coordinator: sole owner of the block sequence and cursor.
///
/// All mutations go through [`Document::apply`], which executes each
/// command to completion before the next (single-threaded, event-driven
/// model — no operation blocks or suspends). The coordinator enforces the
/// invariants the primitive operations rely on: the cursor is always valid
/// after a command, auto-conversion runs after a typed space, and emptied
/// structured blocks revert to paragraphs after deletions.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
    cursor: CursorPosition,
    version: u64,
}

impl Document {
    /// A document holding a single empty paragraph, cursor at the start.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::empty_paragraph()],
            cursor: CursorPosition::START,
            version: 0,
        }
    }

    /// Build a document from markdown text via the line-oriented parser.
    ///
    /// Runs line-break cleanup so the loaded document satisfies the
    /// at-most-two-consecutive-breaks invariant, and clamps the cursor to
    /// the first valid position.
    pub fn from_markdown(text: &str) -> Self {
        let blocks = clean_consecutive_line_breaks(serialize::markdown_to_blocks(text));
        let cursor = CursorPosition::START.clamp(&blocks);
        Self {
            blocks,
            cursor,
            version: 0,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Serialize to markdown with default options.
    pub fn text(&self) -> String {
        serialize::blocks_to_markdown(&self.blocks)
    }

    /// Serialize to markdown with explicit options.
    pub fn text_with(&self, opts: &SerializeOptions) -> String {
        serialize::blocks_to_markdown_with(&self.blocks, opts)
    }

    /// Find a block anywhere in the document by id.
    pub fn find_block(&self, id: BlockId) -> Option<&Block> {
        for block in &self.blocks {
            if block.id == id {
                return Some(block);
            }
            for item in &block.content {
                if let ContentItem::Nested(child) = item
                    && child.id == id
                {
                    return Some(child);
                }
            }
        }
        None
    }

    /// Resolve a nested block's parent back-reference to the enclosing
    /// block. Top-level blocks have no parent.
    pub fn parent_of(&self, id: BlockId) -> Option<&Block> {
        let child = self.find_block(id)?;
        self.find_block(child.parent?)
    }

    /// Apply a command and return the resulting patch.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let edit = match cmd {
            Cmd::InsertChar(ch) => {
                self.promote_line_break_at_cursor();
                let mut edit = ops::insert_char(&mut self.blocks, self.cursor, ch);
                // A typed space is the auto-conversion trigger: "# " at the
                // start of a paragraph promotes it to a heading, and so on.
                if edit.changed && ch == ' ' {
                    let converted = convert::try_auto_convert_markdown(&mut self.blocks, edit.cursor);
                    if converted.converted {
                        edit.cursor = converted.cursor;
                    }
                }
                edit
            }
            Cmd::InsertText(text) => {
                self.promote_line_break_at_cursor();
                ops::insert_text(&mut self.blocks, self.cursor, &text)
            }
            Cmd::DeleteBackward => {
                let mut edit = ops::delete_backward(&mut self.blocks, self.cursor);
                if edit.changed
                    && let Some(cursor) = convert::revert_emptied_block(&mut self.blocks, edit.cursor)
                {
                    edit.cursor = cursor;
                }
                edit
            }
            Cmd::DeleteForward => {
                let mut edit = ops::delete_forward(&mut self.blocks, self.cursor);
                if edit.changed
                    && let Some(cursor) = convert::revert_emptied_block(&mut self.blocks, edit.cursor)
                {
                    edit.cursor = cursor;
                }
                edit
            }
            Cmd::SplitBlock => ops::split_block(&mut self.blocks, self.cursor),
            Cmd::Move(dir) => {
                let cursor = move_cursor(&self.blocks, self.cursor, dir);
                ops::Edit {
                    cursor,
                    changed: cursor != self.cursor,
                }
            }
            Cmd::ConvertTo {
                kind,
                content,
                attrs,
            } => convert::convert_block_to(
                &mut self.blocks,
                self.cursor,
                kind,
                vec![ContentItem::Text(content)],
                attrs,
            ),
        };

        self.cursor = edit.cursor;
        if edit.changed {
            self.version += 1;
        }
        Patch {
            cursor: self.cursor,
            version: self.version,
            changed: edit.changed,
        }
    }

    /// Line breaks carry no editable text; typing into one turns it back
    /// into a paragraph (same id) before the insert lands.
    fn promote_line_break_at_cursor(&mut self) {
        if let Some(block) = self.blocks.get_mut(self.cursor.block)
            && block.is_line_break()
        {
            block.kind = BlockKind::Paragraph;
        }
    }

    /// Replace one content fragment directly, without touching the cursor.
    /// The caller owns keeping its cursor coherent afterwards.
    pub fn set_fragment(&mut self, block: usize, item: usize, text: String) -> bool {
        let changed = ops::set_fragment(&mut self.blocks, block, item, text);
        if changed {
            self.version += 1;
        }
        changed
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
