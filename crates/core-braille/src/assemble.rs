//! Reassembly of per-chunk results into whole-input braille.
//!
//! Chunks are consumed in planning order (never completion order). For each
//! chunk the running cell count shifts its `text_to_braille` entries and the
//! chunk's source offset shifts its `braille_to_text` entries, so both tables
//! index the concatenated output.

use crate::translator::TranslationResult;
use serde::Serialize;

/// Final output of one translation: cells plus both position maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrailleOutput {
    pub cells: Vec<u8>,
    /// For each source character, the index of its first cell.
    pub text_to_braille: Vec<usize>,
    /// For each cell, the source character it came from.
    pub braille_to_text: Vec<usize>,
}

impl BrailleOutput {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.text_to_braille.is_empty() && self.braille_to_text.is_empty()
    }
}

/// A chunk result paired with the source offset its mappings are relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutput {
    pub text_start: usize,
    pub result: TranslationResult,
}

/// Concatenate chunk results in the given order.
pub fn assemble(chunks: impl IntoIterator<Item = ChunkOutput>) -> BrailleOutput {
    let mut out = BrailleOutput::default();
    for ChunkOutput { text_start, result } in chunks {
        let cell_offset = out.cells.len();
        out.text_to_braille
            .extend(result.text_to_braille.iter().map(|&cell| cell + cell_offset));
        out.braille_to_text
            .extend(result.braille_to_text.iter().map(|&pos| pos + text_start));
        out.cells.extend_from_slice(&result.cells);
    }
    out
}
