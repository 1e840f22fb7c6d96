use crate::model::{Block, BlockKind, ContentItem, CursorPosition};
use crate::text::{byte_offset, char_len};

/// Outcome of a text operation: the recomputed cursor and whether the block
/// sequence was touched.
///
/// `changed == false` is the canonical "operation declined" signal: the
/// blocks and cursor are exactly as passed in. No operation here panics or
/// errors on malformed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub cursor: CursorPosition,
    pub changed: bool,
}

impl Edit {
    fn unchanged(cursor: CursorPosition) -> Self {
        Self {
            cursor,
            changed: false,
        }
    }

    fn applied(cursor: CursorPosition) -> Self {
        Self {
            cursor,
            changed: true,
        }
    }
}

/// Insert a character at the cursor. The addressed content element must be
/// a text fragment; otherwise the operation is declined.
pub fn insert_char(blocks: &mut [Block], pos: CursorPosition, ch: char) -> Edit {
    let mut buf = [0u8; 4];
    insert_text(blocks, pos, ch.encode_utf8(&mut buf))
}

/// Insert a string at the cursor, advancing the offset past it.
pub fn insert_text(blocks: &mut [Block], pos: CursorPosition, text: &str) -> Edit {
    let Some(frag) = blocks
        .get_mut(pos.block)
        .and_then(|b| b.fragment_mut(pos.item))
    else {
        return Edit::unchanged(pos);
    };
    if pos.offset > char_len(frag) {
        return Edit::unchanged(pos);
    }
    let at = byte_offset(frag, pos.offset);
    frag.insert_str(at, text);
    Edit::applied(CursorPosition::new(
        pos.block,
        pos.item,
        pos.offset + char_len(text),
    ))
}

/// Delete backward from the cursor.
///
/// Cases, in priority order:
/// 1. Mid-fragment: remove the preceding character.
/// 2. At a block start with a previous block:
///    a. previous is a line break — splice it out, cursor stays at the
///       (shifted) current block's start;
///    b. current is a line break or empty — delete it, cursor to the end of
///       the previous block's last fragment;
///    c. otherwise join: append the addressed fragment onto the previous
///       block's last fragment, delete the current block, cursor at the
///       join point.
/// 3. Start of document: declined.
pub fn delete_backward(blocks: &mut Vec<Block>, pos: CursorPosition) -> Edit {
    if blocks.get(pos.block).is_none() {
        return Edit::unchanged(pos);
    }

    if pos.offset > 0 {
        let Some(frag) = blocks[pos.block].fragment_mut(pos.item) else {
            return Edit::unchanged(pos);
        };
        if pos.offset > char_len(frag) {
            return Edit::unchanged(pos);
        }
        let at = byte_offset(frag, pos.offset - 1);
        frag.remove(at);
        return Edit::applied(CursorPosition::new(pos.block, pos.item, pos.offset - 1));
    }

    if pos.block == 0 {
        return Edit::unchanged(pos);
    }

    if blocks[pos.block - 1].is_line_break() {
        blocks.remove(pos.block - 1);
        return Edit::applied(CursorPosition::new(pos.block - 1, 0, 0));
    }

    if blocks[pos.block].is_line_break() || blocks[pos.block].is_empty() {
        blocks.remove(pos.block);
        let prev = &blocks[pos.block - 1];
        let item = prev.last_item();
        return Edit::applied(CursorPosition::new(
            pos.block - 1,
            item,
            prev.fragment_len(item),
        ));
    }

    // Normal join. Only the addressed fragment carries over; a non-text
    // element at the cursor declines the whole operation.
    let Some(text) = blocks[pos.block].fragment(pos.item).map(str::to_owned) else {
        return Edit::unchanged(pos);
    };
    let prev_idx = pos.block - 1;
    let last = blocks[prev_idx].last_item();
    let cursor = if let Some(frag) = blocks[prev_idx].fragment_mut(last) {
        let join_at = char_len(frag);
        frag.push_str(&text);
        CursorPosition::new(prev_idx, last, join_at)
    } else {
        // Previous block ends in a nested item: carry the text over as a new
        // trailing fragment instead of concatenating onto a block.
        blocks[prev_idx].content.push(ContentItem::Text(text));
        CursorPosition::new(prev_idx, blocks[prev_idx].content.len() - 1, 0)
    };
    blocks.remove(pos.block);
    Edit::applied(cursor)
}

/// Delete the character after the cursor. Declined at end of fragment:
/// there is no forward join across block boundaries.
pub fn delete_forward(blocks: &mut [Block], pos: CursorPosition) -> Edit {
    let Some(frag) = blocks
        .get_mut(pos.block)
        .and_then(|b| b.fragment_mut(pos.item))
    else {
        return Edit::unchanged(pos);
    };
    if pos.offset >= char_len(frag) {
        return Edit::unchanged(pos);
    }
    let at = byte_offset(frag, pos.offset);
    frag.remove(at);
    Edit::applied(pos)
}

/// Split the current block at the cursor (Enter).
///
/// Inside a code block this inserts a literal newline instead of creating a
/// new block. Splitting an already-empty block at its empty fragment
/// retypes it to a line break in place and still inserts a fresh paragraph
/// after it. In every split case the cursor lands at the start of the
/// following block.
pub fn split_block(blocks: &mut Vec<Block>, pos: CursorPosition) -> Edit {
    let Some(block) = blocks.get(pos.block) else {
        return Edit::unchanged(pos);
    };

    if block.kind == BlockKind::CodeBlock {
        let Some(frag) = blocks[pos.block].fragment_mut(pos.item) else {
            return Edit::unchanged(pos);
        };
        if pos.offset > char_len(frag) {
            return Edit::unchanged(pos);
        }
        let at = byte_offset(frag, pos.offset);
        frag.insert(at, '\n');
        return Edit::applied(CursorPosition::new(pos.block, pos.item, pos.offset + 1));
    }

    let was_empty = block.is_empty();
    let Some(frag) = blocks[pos.block].fragment_mut(pos.item) else {
        return Edit::unchanged(pos);
    };
    if pos.offset > char_len(frag) {
        return Edit::unchanged(pos);
    }
    let at = byte_offset(frag, pos.offset);
    let after = frag.split_off(at);
    let before_empty = frag.is_empty();

    if was_empty && before_empty && after.is_empty() {
        // Enter on an empty block: the block itself becomes a spacer and a
        // fresh paragraph follows it.
        let block = &mut blocks[pos.block];
        block.kind = BlockKind::LineBreak;
        block.set_content(vec![ContentItem::Text(String::new())]);
        block.attrs.clear();
        blocks.insert(pos.block + 1, Block::empty_paragraph());
    } else {
        let mut tail = Block::empty_paragraph();
        tail.set_content(vec![ContentItem::Text(after)]);
        blocks.insert(pos.block + 1, tail);
    }
    Edit::applied(CursorPosition::new(pos.block + 1, 0, 0))
}

/// Replace one content fragment wholesale. No cursor recomputation: the
/// caller owns keeping its cursor coherent.
pub fn set_fragment(blocks: &mut [Block], block_idx: usize, item_idx: usize, text: String) -> bool {
    match blocks.get_mut(block_idx).and_then(|b| b.fragment_mut(item_idx)) {
        Some(frag) => {
            *frag = text;
            true
        }
        None => false,
    }
}
