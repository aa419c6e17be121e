//! Expansion range calculation.
//!
//! Decides which parts of the editable value must bypass contraction. With
//! `Selection` the runs touching the cursor (or both selection edges) are
//! expanded so the user reads the characters being edited letter for letter;
//! with `All` the whole value is expanded.
//!
//! Merge contract: ranges are produced in ascending order and a range that
//! starts at or before the previous range's end extends it, so the output
//! never holds overlapping or touching ranges.

use core_text::{AnnotatedText, TextError, TextRange, find_region};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which part of the value (if any) uses the uncontracted translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionPolicy {
    /// Never expand.
    None,
    /// Expand the runs around the selection edges inside the value.
    #[default]
    Selection,
    /// Expand the entire value.
    All,
}

impl ExpansionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpansionPolicy::None => "none",
            ExpansionPolicy::Selection => "selection",
            ExpansionPolicy::All => "all",
        }
    }
}

impl fmt::Display for ExpansionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown expansion policy `{0}` (expected none, selection or all)")]
pub struct ParsePolicyError(pub String);

impl FromStr for ExpansionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(ExpansionPolicy::None),
            "selection" => Ok(ExpansionPolicy::Selection),
            "all" => Ok(ExpansionPolicy::All),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Ranges of `text` to translate with the uncontracted backend, ascending and
/// non-overlapping. Empty when `has_uncontracted` is false, the policy is
/// `None`, or no value span is attached.
pub fn compute_expand_ranges(
    text: &AnnotatedText,
    policy: ExpansionPolicy,
    has_uncontracted: bool,
) -> Result<Vec<TextRange>, TextError> {
    if !has_uncontracted {
        return Ok(Vec::new());
    }
    let Some(value) = text.value() else {
        return Ok(Vec::new());
    };
    match policy {
        ExpansionPolicy::None => Ok(Vec::new()),
        ExpansionPolicy::All if value.is_empty() => Ok(Vec::new()),
        ExpansionPolicy::All => Ok(vec![value]),
        ExpansionPolicy::Selection => expand_around_selection(text, value),
    }
}

fn expand_around_selection(
    text: &AnnotatedText,
    value: TextRange,
) -> Result<Vec<TextRange>, TextError> {
    let Some(sel) = text.selection() else {
        return Ok(Vec::new());
    };
    if !value.contains_range(&sel) {
        debug!(
            target: "braille.expand",
            value_start = value.start,
            value_end = value.end,
            sel_start = sel.start,
            sel_end = sel.end,
            "selection_outside_value_ignored"
        );
        return Ok(Vec::new());
    }
    // Nothing to read letter by letter in an empty field.
    if value.is_empty() {
        return Ok(Vec::new());
    }

    let cursor = sel.is_empty();
    let mut positions = Vec::with_capacity(3);
    if cursor && sel.start == value.end {
        if sel.start > value.start {
            positions.push(sel.start - 1);
        }
    } else {
        if cursor && sel.start > value.start {
            positions.push(sel.start - 1);
        }
        positions.push(sel.start);
        if sel.len() > 1 {
            positions.push(sel.end - 1);
        }
    }

    let mut ranges: Vec<TextRange> = Vec::with_capacity(positions.len());
    for pos in positions {
        let region = find_region(text.chars(), pos, value.start, value.end)?;
        match ranges.last_mut() {
            Some(last) if region.start <= last.end => last.end = last.end.max(region.end),
            _ => ranges.push(region),
        }
    }
    Ok(ranges)
}
