//! Whitespace/non-whitespace run lookup.
//!
//! A region is the maximal run of characters sharing the class (whitespace
//! or not) of the character at `pos`, clipped to caller-supplied bounds. The
//! classification uses `char::is_whitespace` so it never depends on which
//! braille backend is active.

use crate::{TextError, TextRange};

#[inline]
fn is_space(c: char) -> bool {
    c.is_whitespace()
}

/// Return the class-homogeneous run containing `pos`, clipped to `[start, end)`.
///
/// Fails with [`TextError::InvalidRange`] unless `start <= pos < end <= text.len()`.
pub fn find_region(
    text: &[char],
    pos: usize,
    start: usize,
    end: usize,
) -> Result<TextRange, TextError> {
    if end > text.len() || start > pos || pos >= end {
        return Err(TextError::InvalidRange {
            pos,
            start,
            end,
            len: text.len(),
        });
    }
    let class = is_space(text[pos]);
    let mut lo = pos;
    while lo > start && is_space(text[lo - 1]) == class {
        lo -= 1;
    }
    let mut hi = pos + 1;
    while hi < end && is_space(text[hi]) == class {
        hi += 1;
    }
    Ok(TextRange::new(lo, hi))
}
