//! Fan-out/fan-in over backend calls.
//!
//! Every translatable chunk is handed to its backend up front; the returned
//! futures are driven together by a `FuturesUnordered` inside the caller's
//! task. Each completion is tagged with its chunk index and written into
//! that chunk's slot, so whatever order backends resolve in, assembly walks
//! the slots in planning order. Nothing is assembled until every slot is
//! filled. There is no timeout and no cancellation: a backend that never
//! resolves stalls this translation only.

use crate::assemble::{BrailleOutput, ChunkOutput, assemble};
use crate::plan::Chunk;
use crate::translator::{RawTranslation, TranslationResult, Translator};
use core_text::{AnnotatedText, BrailleStyle, TextRange};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{debug, trace};

/// Shared handle to a backend.
pub type TranslatorHandle = Arc<dyn Translator>;

struct ChunkJob {
    index: usize,
    text_len: usize,
    future: BoxFuture<'static, RawTranslation>,
}

#[derive(Debug)]
enum Slot {
    Translate(TextRange),
    ExtraCells { position: usize, cells: Vec<u8> },
}

/// A planned translation whose backend calls have been issued.
///
/// Await it (or call [`PendingTranslation::finish`]) to collect the
/// assembled [`BrailleOutput`]. The future is `Send + 'static` and may be
/// spawned onto a runtime.
pub struct PendingTranslation {
    slots: Vec<Slot>,
    jobs: Vec<ChunkJob>,
}

impl PendingTranslation {
    /// Issue one backend call per translatable chunk with the chunk's exact
    /// substring and style slice.
    pub fn dispatch(
        text: &AnnotatedText,
        chunks: Vec<Chunk<TranslatorHandle>>,
        style_map: &[BrailleStyle],
    ) -> Self {
        let mut slots = Vec::with_capacity(chunks.len());
        let mut jobs = Vec::new();
        for (index, chunk) in chunks.into_iter().enumerate() {
            match chunk {
                Chunk::Translate { translator, range } => {
                    trace!(
                        target: "braille.dispatch",
                        index,
                        backend = translator.name(),
                        start = range.start,
                        end = range.end,
                        "chunk_dispatched"
                    );
                    let styles = style_map[range.start..range.end].to_vec();
                    let future = translator.translate(text.slice(range), styles);
                    jobs.push(ChunkJob {
                        index,
                        text_len: range.len(),
                        future,
                    });
                    slots.push(Slot::Translate(range));
                }
                Chunk::ExtraCells { position, cells } => {
                    slots.push(Slot::ExtraCells { position, cells });
                }
            }
        }
        debug!(
            target: "braille.dispatch",
            chunks = slots.len(),
            dispatched = jobs.len(),
            "fan_out"
        );
        Self { slots, jobs }
    }

    /// Total number of planned chunks, extra-cells chunks included.
    pub fn chunk_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of backend calls issued.
    pub fn dispatched(&self) -> usize {
        self.jobs.len()
    }

    /// Wait for every backend call, then assemble in planning order.
    pub async fn finish(self) -> BrailleOutput {
        let Self { slots, jobs } = self;
        let mut results = fan_in(jobs, slots.len()).await;
        let outputs = slots.into_iter().enumerate().map(|(index, slot)| match slot {
            Slot::Translate(range) => ChunkOutput {
                text_start: range.start,
                result: results[index].take().unwrap_or_else(|| {
                    TranslationResult::from_raw(RawTranslation::default(), range.len())
                }),
            },
            Slot::ExtraCells { position, cells } => ChunkOutput {
                text_start: position,
                result: TranslationResult::verbatim(cells),
            },
        });
        let out = assemble(outputs);
        debug!(
            target: "braille.assemble",
            cells = out.cells.len(),
            text_len = out.text_to_braille.len(),
            "assembled"
        );
        out
    }
}

impl IntoFuture for PendingTranslation {
    type Output = BrailleOutput;
    type IntoFuture = BoxFuture<'static, BrailleOutput>;

    fn into_future(self) -> Self::IntoFuture {
        self.finish().boxed()
    }
}

async fn fan_in(jobs: Vec<ChunkJob>, slot_count: usize) -> Vec<Option<TranslationResult>> {
    let mut results: Vec<Option<TranslationResult>> = (0..slot_count).map(|_| None).collect();
    let mut pending: FuturesUnordered<_> = jobs
        .into_iter()
        .map(|job| async move {
            let raw = job.future.await;
            (job.index, TranslationResult::from_raw(raw, job.text_len))
        })
        .collect();
    while let Some((index, result)) = pending.next().await {
        trace!(
            target: "braille.dispatch",
            index,
            cells = result.cells.len(),
            remaining = pending.len(),
            "chunk_completed"
        );
        results[index] = Some(result);
    }
    results
}
