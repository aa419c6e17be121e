//! Backend capability consumed by the expanding translator.
//!
//! A backend turns a plain string plus one style entry per character into
//! braille cells and (optionally) two position maps. Results are delivered
//! through a boxed future so backends may resolve on any async mechanism;
//! the coordinator never assumes an order between chunks.

use core_text::BrailleStyle;
use futures_util::future::BoxFuture;
use tracing::warn;

/// Raw backend output. Any field may be missing; see [`TranslationResult::from_raw`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTranslation {
    pub cells: Option<Vec<u8>>,
    pub text_to_braille: Option<Vec<usize>>,
    pub braille_to_text: Option<Vec<usize>>,
}

impl RawTranslation {
    pub fn new(cells: Vec<u8>, text_to_braille: Vec<usize>, braille_to_text: Vec<usize>) -> Self {
        Self {
            cells: Some(cells),
            text_to_braille: Some(text_to_braille),
            braille_to_text: Some(braille_to_text),
        }
    }

    /// Cells without any mapping information.
    pub fn cells_only(cells: Vec<u8>) -> Self {
        Self {
            cells: Some(cells),
            ..Self::default()
        }
    }
}

/// A braille translation backend (contracted or uncontracted table).
///
/// Implementors must always resolve the returned future, possibly with an
/// empty [`RawTranslation`]; a future that never resolves stalls the whole
/// translation that dispatched it.
pub trait Translator: Send + Sync {
    /// Stable identifier used in logs.
    fn name(&self) -> &str;
    /// Translate `text`; `styles` holds exactly one entry per character of `text`.
    fn translate(&self, text: String, styles: Vec<BrailleStyle>) -> BoxFuture<'static, RawTranslation>;
}

/// Normalized per-chunk result with chunk-local mappings.
///
/// For a chunk of `n` characters producing `m` cells: `text_to_braille.len() == n`
/// with values in `[0, m]`, and `braille_to_text.len() == m` with values in `[0, n)`
/// (or empty when the backend supplied no mapping).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationResult {
    pub cells: Vec<u8>,
    pub text_to_braille: Vec<usize>,
    pub braille_to_text: Vec<usize>,
}

impl TranslationResult {
    /// Fill in whatever the backend left out for a chunk of `text_len` characters.
    ///
    /// Missing cells become an empty buffer, a missing `text_to_braille` becomes
    /// `text_len` zeros and a missing `braille_to_text` stays empty. A
    /// `text_to_braille` of the wrong length is padded or truncated so the
    /// assembled table still covers the whole input.
    pub fn from_raw(raw: RawTranslation, text_len: usize) -> Self {
        let cells = raw.cells.unwrap_or_default();
        let mut text_to_braille = raw.text_to_braille.unwrap_or_else(|| vec![0; text_len]);
        if text_to_braille.len() != text_len {
            warn!(
                target: "braille.dispatch",
                expected = text_len,
                got = text_to_braille.len(),
                "text_to_braille_length_mismatch"
            );
            let fill = text_to_braille.last().copied().unwrap_or(0);
            text_to_braille.resize(text_len, fill);
        }
        Self {
            cells,
            text_to_braille,
            braille_to_text: raw.braille_to_text.unwrap_or_default(),
        }
    }

    /// Pre-rendered cells spliced at a zero-width anchor: no source characters,
    /// every cell maps back to the anchor itself.
    pub fn verbatim(cells: Vec<u8>) -> Self {
        let braille_to_text = vec![0; cells.len()];
        Self {
            cells,
            text_to_braille: Vec::new(),
            braille_to_text,
        }
    }
}
