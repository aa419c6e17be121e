//! Chunk planning.
//!
//! Walks the expansion ranges and extra-cells anchors left to right and
//! produces the ordered work list for the coordinator:
//! - Gaps between expansion ranges go to the default backend, the ranges
//!   themselves to the uncontracted backend.
//! - Before a sub-chunk `[start, end)` is appended, every pending anchor
//!   `<= end` cuts it: `[start, anchor)` is emitted, then the verbatim
//!   extra-cells chunk, and planning resumes at the anchor with the same
//!   backend. Anchors are inclusive of `end` because they are insertion
//!   points between characters.
//! - Zero-length translatable sub-chunks are dropped.
//!
//! The planner is generic over the backend handle so tests can plan with
//! plain tags instead of live translators.

use core_text::{ExtraCellsAnchor, TextRange};
use tracing::debug;

/// One unit of planned work, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk<T> {
    /// Translate `range` of the source text with `translator`.
    Translate { translator: T, range: TextRange },
    /// Splice `cells` verbatim at the zero-width `position`.
    ExtraCells { position: usize, cells: Vec<u8> },
}

impl<T> Chunk<T> {
    /// Source offset the chunk's cells map back to.
    pub fn text_start(&self) -> usize {
        match self {
            Chunk::Translate { range, .. } => range.start,
            Chunk::ExtraCells { position, .. } => *position,
        }
    }
}

/// Plan chunks covering `[0, text_len)`.
///
/// `expand` must be ascending and non-overlapping (as produced by
/// `compute_expand_ranges`). Anchors are ordered by position; anchors sharing a
/// position keep their input order. Anchors past `text_len` are dropped.
pub fn plan_chunks<T: Clone>(
    text_len: usize,
    expand: &[TextRange],
    anchors: &[ExtraCellsAnchor<'_>],
    default: &T,
    uncontracted: &T,
) -> Vec<Chunk<T>> {
    let mut sorted = anchors.to_vec();
    sorted.sort_by_key(|a| a.position);
    if sorted.windows(2).any(|w| w[0].position == w[1].position) {
        debug!(target: "braille.plan", "coinciding_extra_cells_anchors");
    }

    let mut planner = Planner {
        chunks: Vec::with_capacity(expand.len() * 2 + sorted.len() + 1),
        anchors: sorted,
        next_anchor: 0,
    };
    let mut last_end = 0usize;
    for range in expand {
        planner.push(default, last_end, range.start);
        planner.push(uncontracted, range.start, range.end);
        last_end = last_end.max(range.end);
    }
    planner.push(default, last_end, text_len);

    let dropped = planner.anchors.len() - planner.next_anchor;
    if dropped > 0 {
        debug!(target: "braille.plan", dropped, text_len, "extra_cells_past_end_dropped");
    }
    debug!(
        target: "braille.plan",
        text_len,
        expand_ranges = expand.len(),
        chunks = planner.chunks.len(),
        "plan_complete"
    );
    planner.chunks
}

struct Planner<'a, T> {
    chunks: Vec<Chunk<T>>,
    anchors: Vec<ExtraCellsAnchor<'a>>,
    next_anchor: usize,
}

impl<T: Clone> Planner<'_, T> {
    fn push(&mut self, translator: &T, mut start: usize, end: usize) {
        while let Some(&anchor) = self.anchors.get(self.next_anchor)
            && anchor.position <= end
        {
            let position = anchor.position.max(start);
            self.push_translate(translator, start, position);
            self.chunks.push(Chunk::ExtraCells {
                position,
                cells: anchor.cells.to_vec(),
            });
            self.next_anchor += 1;
            start = position;
        }
        self.push_translate(translator, start, end);
    }

    fn push_translate(&mut self, translator: &T, start: usize, end: usize) {
        if start < end {
            self.chunks.push(Chunk::Translate {
                translator: translator.clone(),
                range: TextRange::new(start, end),
            });
        }
    }
}
