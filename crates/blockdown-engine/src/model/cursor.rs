use serde::{Deserialize, Serialize};

use crate::model::block::Block;

/// A cursor coordinate: block index, content-item index, character offset.
///
/// `item` must address a text fragment (never a nested block) and `offset`
/// is a character offset into that fragment, `0 ≤ offset ≤ len`. A position
/// is only meaningful against the block sequence it was computed for; every
/// mutation that removes or shifts blocks recomputes the cursor atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub block: usize,
    pub item: usize,
    pub offset: usize,
}

impl CursorPosition {
    /// Start of document.
    pub const START: Self = Self {
        block: 0,
        item: 0,
        offset: 0,
    };

    pub fn new(block: usize, item: usize, offset: usize) -> Self {
        Self {
            block,
            item,
            offset,
        }
    }

    /// True iff this position addresses a text fragment within `blocks` and
    /// the offset is within the fragment's character length.
    pub fn is_valid(&self, blocks: &[Block]) -> bool {
        let Some(block) = blocks.get(self.block) else {
            return false;
        };
        match block.fragment(self.item) {
            Some(s) => self.offset <= crate::text::char_len(s),
            None => false,
        }
    }

    /// Clamp this position to the nearest valid coordinate in `blocks`.
    ///
    /// Falls back through: same block and item with a clamped offset, the
    /// block's first text fragment, then the start of the document.
    pub fn clamp(self, blocks: &[Block]) -> Self {
        if blocks.is_empty() {
            return Self::START;
        }
        let block_idx = self.block.min(blocks.len() - 1);
        let block = &blocks[block_idx];

        if let Some(s) = block.fragment(self.item) {
            return Self::new(block_idx, self.item, self.offset.min(crate::text::char_len(s)));
        }

        // Addressed item is missing or nested: land on the first text
        // fragment of the block, or its start if there is none.
        for (i, item) in block.content.iter().enumerate() {
            if let Some(s) = item.as_text() {
                return Self::new(block_idx, i, self.offset.min(crate::text::char_len(s)));
            }
        }
        Self::new(block_idx, 0, 0)
    }
}
