//! The block document model: blocks, content items, attributes, and cursor
//! coordinates.

pub mod block;
pub mod cursor;

pub use block::{
    Attrs, Block, BlockId, BlockKind, ContentItem, attr, clean_consecutive_line_breaks,
};
pub use cursor::CursorPosition;
