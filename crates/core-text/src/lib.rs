//! Annotated text model consumed by the braille chunk translator.
//!
//! Contract:
//! - Text is stored as Unicode scalar values; every offset in this crate is a
//!   character index, never a byte offset.
//! - Spans are half-open `[start, end)` ranges satisfying
//!   `start <= end <= len`. Attaching a span outside the text fails with
//!   [`TextError::SpanOutOfBounds`] so downstream planners can index freely.
//! - Span kinds form a closed set ([`SpanKind`]); callers use the typed
//!   accessors (`value`, `selection`, `extra_cells`, `style_spans`) instead of
//!   scanning spans by kind themselves.
//! - Safety: does not log content; callers should avoid logging raw text.

pub mod region;
pub mod style;

pub use region::find_region;
pub use style::BrailleStyle;

use std::fmt;

/// Half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True if `other` lies entirely within `self` (empty ranges included).
    pub fn contains_range(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.start <= other.end && other.end <= self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for TextRange {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// Errors raised by span attachment and region lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// Region lookup preconditions violated (`start <= pos < end <= len`).
    #[error("invalid range: pos {pos} bounds [{start},{end}) text length {len}")]
    InvalidRange {
        pos: usize,
        start: usize,
        end: usize,
        len: usize,
    },
    /// Span range not inside `[0, len]` or reversed.
    #[error("span [{start},{end}) out of bounds for text length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
}

/// Closed set of span kinds understood by the translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    /// The editable value inside a larger line (e.g. a text field).
    Value,
    /// Selection (or cursor when empty) inside the value.
    ValueSelection,
    /// Pre-rendered cells spliced verbatim at the span start.
    ExtraCells(Vec<u8>),
    /// Style bits OR'ed into every covered character.
    Style(BrailleStyle),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub range: TextRange,
}

/// Extra-cells anchor as seen by the chunk planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtraCellsAnchor<'a> {
    pub position: usize,
    pub cells: &'a [u8],
}

/// Characters plus attached spans, in attachment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedText {
    chars: Vec<char>,
    spans: Vec<Span>,
}

impl AnnotatedText {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            spans: Vec::new(),
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Owned substring for the character range `[start, end)` (clamped).
    pub fn slice(&self, range: TextRange) -> String {
        let end = range.end.min(self.chars.len());
        let start = range.start.min(end);
        self.chars[start..end].iter().collect()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Attach a span. Fails if the range is reversed or past the end of the text.
    pub fn add_span(&mut self, kind: SpanKind, range: impl Into<TextRange>) -> Result<(), TextError> {
        let range = range.into();
        if range.start > range.end || range.end > self.chars.len() {
            return Err(TextError::SpanOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.chars.len(),
            });
        }
        self.spans.push(Span { kind, range });
        Ok(())
    }

    /// Builder-style variant of [`AnnotatedText::add_span`].
    pub fn with_span(mut self, kind: SpanKind, range: impl Into<TextRange>) -> Result<Self, TextError> {
        self.add_span(kind, range)?;
        Ok(self)
    }

    /// First `Value` span, if any.
    pub fn value(&self) -> Option<TextRange> {
        self.first_range(|k| matches!(k, SpanKind::Value))
    }

    /// First `ValueSelection` span, if any.
    pub fn selection(&self) -> Option<TextRange> {
        self.first_range(|k| matches!(k, SpanKind::ValueSelection))
    }

    /// Non-empty extra-cells anchors in attachment order. Spans carrying an
    /// empty buffer are skipped entirely.
    pub fn extra_cells(&self) -> Vec<ExtraCellsAnchor<'_>> {
        self.spans
            .iter()
            .filter_map(|s| match &s.kind {
                SpanKind::ExtraCells(cells) if !cells.is_empty() => Some(ExtraCellsAnchor {
                    position: s.range.start,
                    cells: cells.as_slice(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Style spans as `(range, mask)` pairs in attachment order.
    pub fn style_spans(&self) -> impl Iterator<Item = (TextRange, BrailleStyle)> + '_ {
        self.spans.iter().filter_map(|s| match s.kind {
            SpanKind::Style(mask) => Some((s.range, mask)),
            _ => None,
        })
    }

    fn first_range(&self, pred: impl Fn(&SpanKind) -> bool) -> Option<TextRange> {
        self.spans.iter().find(|s| pred(&s.kind)).map(|s| s.range)
    }
}
