// WHY: Rust strings are UTF-8 but fragment and token offsets are counted in UTF-16 code units
// Every slice of source text taken by the aligner goes through these helpers

use crate::error::AlignError;

/// Position in the shared virtual text, counted in UTF-16 code units
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct Utf16Pos(pub usize);

impl From<Utf16Pos> for usize {
    fn from(pos: Utf16Pos) -> Self {
        pos.0
    }
}

impl Utf16Pos {
    pub fn new(pos: usize) -> Self {
        Utf16Pos(pos)
    }

    pub fn advance(&self, units: usize) -> Self {
        Utf16Pos(self.0 + units)
    }
}

/// Number of UTF-16 code units needed to encode `text`
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 offset within `text` into a byte offset
///
/// Offsets past the end clamp to `text.len()`. An offset that lands between the
/// two halves of a surrogate pair cannot be represented in UTF-8 and is rejected.
pub fn utf16_to_byte(text: &str, units: usize) -> Result<usize, AlignError> {
    let mut consumed = 0usize;

    for (byte_idx, ch) in text.char_indices() {
        if consumed == units {
            return Ok(byte_idx);
        }
        consumed += ch.len_utf16();
        if consumed > units {
            return Err(AlignError::SplitSurrogate { offset: units });
        }
    }

    Ok(text.len())
}

/// Slice `text` by a half-open UTF-16 range, clamping the range to the text
pub fn slice_utf16(text: &str, start: usize, end: usize) -> Result<&str, AlignError> {
    let end = end.max(start);
    let start_byte = utf16_to_byte(text, start)?;
    let end_byte = utf16_to_byte(text, end)?;
    Ok(&text[start_byte..end_byte])
}

/// Take `units` UTF-16 code units of `text` starting at byte `start_byte`
///
/// Only the taken range is scanned. A split surrogate is reported relative to `start_byte`.
pub fn take_utf16(text: &str, start_byte: usize, units: usize) -> Result<&str, AlignError> {
    let tail = text.get(start_byte..).unwrap_or("");
    let len = utf16_to_byte(tail, units)?;
    Ok(&tail[..len])
}
