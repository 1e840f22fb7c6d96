use serde::{Deserialize, Serialize};

use crate::model::{Block, CursorPosition};

/// Arrow-key movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Compute the cursor position after a movement.
///
/// All four moves are pure and total: a missing or out-of-range block leaves
/// the position unchanged, and movement at a document edge is a no-op.
pub fn move_cursor(blocks: &[Block], pos: CursorPosition, dir: Direction) -> CursorPosition {
    match dir {
        Direction::Left => move_left(blocks, pos),
        Direction::Right => move_right(blocks, pos),
        Direction::Up => move_up(blocks, pos),
        Direction::Down => move_down(blocks, pos),
    }
}

/// One character left, or to the end of the previous block.
pub fn move_left(blocks: &[Block], pos: CursorPosition) -> CursorPosition {
    if blocks.get(pos.block).is_none() {
        return pos;
    }
    if pos.offset > 0 {
        return CursorPosition::new(pos.block, pos.item, pos.offset - 1);
    }
    if pos.block > 0 {
        let prev = &blocks[pos.block - 1];
        let item = prev.last_item();
        // Non-text trailing content counts as length 0.
        return CursorPosition::new(pos.block - 1, item, prev.fragment_len(item));
    }
    pos
}

/// One character right, or to the start of the next block.
pub fn move_right(blocks: &[Block], pos: CursorPosition) -> CursorPosition {
    let Some(block) = blocks.get(pos.block) else {
        return pos;
    };
    if pos.offset < block.fragment_len(pos.item) {
        return CursorPosition::new(pos.block, pos.item, pos.offset + 1);
    }
    if pos.block + 1 < blocks.len() {
        return CursorPosition::new(pos.block + 1, 0, 0);
    }
    pos
}

/// To the previous block's last fragment, preserving the horizontal offset
/// where possible.
pub fn move_up(blocks: &[Block], pos: CursorPosition) -> CursorPosition {
    if pos.block == 0 || blocks.get(pos.block).is_none() {
        return pos;
    }
    let target = &blocks[pos.block - 1];
    let item = target.last_item();
    let offset = pos.offset.min(target.fragment_len(item));
    CursorPosition::new(pos.block - 1, item, offset)
}

/// To the next block's first fragment, preserving the horizontal offset
/// where possible.
pub fn move_down(blocks: &[Block], pos: CursorPosition) -> CursorPosition {
    if blocks.get(pos.block).is_none() || pos.block + 1 >= blocks.len() {
        return pos;
    }
    let target = &blocks[pos.block + 1];
    let offset = pos.offset.min(target.fragment_len(0));
    CursorPosition::new(pos.block + 1, 0, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockKind;

    fn para(text: &str) -> Block {
        Block::with_text(BlockKind::Paragraph, text)
    }

    #[test]
    fn left_within_fragment() {
        let blocks = vec![para("abc")];
        let pos = move_left(&blocks, CursorPosition::new(0, 0, 2));
        assert_eq!(pos, CursorPosition::new(0, 0, 1));
    }

    #[test]
    fn left_crosses_block_boundary_to_previous_end() {
        let blocks = vec![para("abc"), para("xyz")];
        let pos = move_left(&blocks, CursorPosition::new(1, 0, 0));
        assert_eq!(pos, CursorPosition::new(0, 0, 3));
    }

    #[test]
    fn left_at_document_start_is_a_no_op() {
        let blocks = vec![para("abc")];
        let start = CursorPosition::START;
        assert_eq!(move_left(&blocks, start), start);
    }

    #[test]
    fn right_within_fragment() {
        let blocks = vec![para("abc")];
        let pos = move_right(&blocks, CursorPosition::new(0, 0, 1));
        assert_eq!(pos, CursorPosition::new(0, 0, 2));
    }

    #[test]
    fn right_crosses_block_boundary_to_next_start() {
        let blocks = vec![para("abc"), para("xyz")];
        let pos = move_right(&blocks, CursorPosition::new(0, 0, 3));
        assert_eq!(pos, CursorPosition::new(1, 0, 0));
    }

    #[test]
    fn right_at_document_end_is_a_no_op() {
        let blocks = vec![para("abc")];
        let end = CursorPosition::new(0, 0, 3);
        assert_eq!(move_right(&blocks, end), end);
    }

    #[test]
    fn up_clamps_offset_to_target_length() {
        let blocks = vec![para("ab"), para("longer line")];
        let pos = move_up(&blocks, CursorPosition::new(1, 0, 7));
        assert_eq!(pos, CursorPosition::new(0, 0, 2));
    }

    #[test]
    fn up_preserves_offset_when_it_fits() {
        let blocks = vec![para("longer line"), para("ab")];
        let pos = move_up(&blocks, CursorPosition::new(1, 0, 1));
        assert_eq!(pos, CursorPosition::new(0, 0, 1));
    }

    #[test]
    fn up_at_first_block_is_a_no_op() {
        let blocks = vec![para("abc")];
        let pos = CursorPosition::new(0, 0, 2);
        assert_eq!(move_up(&blocks, pos), pos);
    }

    #[test]
    fn down_clamps_offset_to_target_length() {
        let blocks = vec![para("longer line"), para("ab")];
        let pos = move_down(&blocks, CursorPosition::new(0, 0, 9));
        assert_eq!(pos, CursorPosition::new(1, 0, 2));
    }

    #[test]
    fn down_at_last_block_is_a_no_op() {
        let blocks = vec![para("abc")];
        let pos = CursorPosition::new(0, 0, 1);
        assert_eq!(move_down(&blocks, pos), pos);
    }

    #[test]
    fn out_of_range_block_is_returned_unchanged() {
        let blocks = vec![para("abc")];
        let bogus = CursorPosition::new(9, 0, 0);
        for dir in [
            Direction::Left,
            Direction::Right,
            Direction::Up,
            Direction::Down,
        ] {
            assert_eq!(move_cursor(&blocks, bogus, dir), bogus);
        }
    }

    #[test]
    fn moves_never_produce_invalid_positions() {
        // Walk a small document with every direction from every reachable
        // position and check the validity invariant.
        let blocks = vec![para("ab"), Block::line_break(), para("wxyz")];
        let mut frontier = vec![CursorPosition::START];
        let mut seen = std::collections::HashSet::new();

        while let Some(pos) = frontier.pop() {
            if !seen.insert((pos.block, pos.item, pos.offset)) {
                continue;
            }
            assert!(pos.is_valid(&blocks), "invalid position {pos:?}");
            for dir in [
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down,
            ] {
                frontier.push(move_cursor(&blocks, pos, dir));
            }
        }
    }
}
