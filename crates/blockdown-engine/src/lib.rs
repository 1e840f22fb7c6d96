pub mod editing;
pub mod io;
pub mod model;
pub mod parsing;
pub mod serialize;

mod text;

// Re-export key types for easier usage
pub use editing::{Cmd, Direction, Document, Edit, Patch};
pub use model::{Attrs, Block, BlockId, BlockKind, ContentItem, CursorPosition};
pub use parsing::{BlockDescriptor, detect_block_markdown, process_inline_markdown};
pub use serialize::{SerializeOptions, blocks_to_markdown, markdown_to_blocks};
