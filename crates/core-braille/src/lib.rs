//! Expanding braille translation.
//!
//! Translates annotated text with a contracted ("default") backend while
//! switching to an uncontracted backend around the edit cursor or across a
//! whole value, splicing pre-rendered extra cells at their anchors. Output is
//! one cell buffer plus `text_to_braille` / `braille_to_text` tables covering
//! the whole input.
//!
//! Pipeline:
//! 1. `expand::compute_expand_ranges` picks the uncontracted ranges.
//! 2. `style_map::build_style_map` flattens style spans per character.
//! 3. `plan::plan_chunks` orders backend chunks and extra-cells splices.
//! 4. `coordinator::PendingTranslation` fans the chunks out and joins them.
//! 5. `assemble::assemble` concatenates results in planning order.
//!
//! Structural problems (bad ranges) fail synchronously from
//! [`ExpandingTranslator::translate`] before any backend is called. Malformed
//! but recoverable spans degrade to "no expansion" instead of failing.

pub mod assemble;
pub mod coordinator;
pub mod expand;
pub mod plan;
pub mod style_map;
pub mod tables;
pub mod translator;

pub use assemble::{BrailleOutput, ChunkOutput, assemble};
pub use coordinator::{PendingTranslation, TranslatorHandle};
pub use expand::{ExpansionPolicy, ParsePolicyError, compute_expand_ranges};
pub use plan::{Chunk, plan_chunks};
pub use style_map::build_style_map;
pub use translator::{RawTranslation, TranslationResult, Translator};

use core_text::{AnnotatedText, TextError, TextRange};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error(transparent)]
    Text(#[from] TextError),
}

/// Entry point: owns the injected backends, holds no per-call state.
#[derive(Clone)]
pub struct ExpandingTranslator {
    default: TranslatorHandle,
    uncontracted: Option<TranslatorHandle>,
}

impl ExpandingTranslator {
    /// `default` is normally a contracted table; without `uncontracted` no
    /// expansion ever happens.
    pub fn new(default: TranslatorHandle, uncontracted: Option<TranslatorHandle>) -> Self {
        Self {
            default,
            uncontracted,
        }
    }

    pub fn has_uncontracted(&self) -> bool {
        self.uncontracted.is_some()
    }

    /// Plan `text` and issue all backend calls. Await the returned
    /// [`PendingTranslation`] for the assembled output.
    pub fn translate(
        &self,
        text: &AnnotatedText,
        policy: ExpansionPolicy,
    ) -> Result<PendingTranslation, TranslateError> {
        let span = tracing::debug_span!(
            target: "braille",
            "translate",
            text_len = text.len(),
            policy = policy.as_str()
        );
        let _enter = span.enter();

        let expand = compute_expand_ranges(text, policy, self.has_uncontracted())?;
        let anchors = text.extra_cells();
        let style_map = build_style_map(text);

        let chunks = if expand.is_empty() && anchors.is_empty() && !text.is_empty() {
            debug!(target: "braille.plan", "fast_path");
            vec![Chunk::Translate {
                translator: self.default.clone(),
                range: TextRange::new(0, text.len()),
            }]
        } else {
            let uncontracted = self.uncontracted.as_ref().unwrap_or(&self.default);
            plan_chunks(text.len(), &expand, &anchors, &self.default, uncontracted)
        };
        Ok(PendingTranslation::dispatch(text, chunks, &style_map))
    }

    /// Callback flavour of [`ExpandingTranslator::translate`]: `callback`
    /// receives `(cells, text_to_braille, braille_to_text)` exactly once.
    pub async fn translate_with<F>(
        &self,
        text: &AnnotatedText,
        policy: ExpansionPolicy,
        callback: F,
    ) -> Result<(), TranslateError>
    where
        F: FnOnce(Vec<u8>, Vec<usize>, Vec<usize>),
    {
        let pending = self.translate(text, policy)?;
        let BrailleOutput {
            cells,
            text_to_braille,
            braille_to_text,
        } = pending.finish().await;
        callback(cells, text_to_braille, braille_to_text);
        Ok(())
    }
}
