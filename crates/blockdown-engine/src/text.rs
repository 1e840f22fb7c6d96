//! Character-offset helpers.
//!
//! Cursor offsets are character counts, not byte indices. These helpers map
//! between the two so fragment mutations always land on UTF-8 boundaries.

/// Number of characters in `s`.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the `char_offset`-th character of `s`.
///
/// Offsets past the end clamp to `s.len()`, so the result is always a valid
/// split point.
pub(crate) fn byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
