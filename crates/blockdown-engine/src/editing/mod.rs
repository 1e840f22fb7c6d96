//! Cursor-addressed editing over the block sequence.
//!
//! The primitive operations live in [`ops`] (insert, delete, split, join),
//! movement in [`navigate`], markdown promotion/reversion in [`convert`],
//! and the state-owning coordinator in [`document`]. Primitives are total:
//! inapplicable input is declined by returning the state unchanged, never
//! by panicking.

pub mod convert;
pub mod document;
pub mod navigate;
pub mod ops;

pub use convert::{AutoConvert, convert_block_to, revert_emptied_block, try_auto_convert_markdown};
pub use document::{Cmd, Document, Patch};
pub use navigate::{Direction, move_cursor};
pub use ops::Edit;
