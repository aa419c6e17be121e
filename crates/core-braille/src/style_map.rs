//! Character-level style map.

use core_text::{AnnotatedText, BrailleStyle};

/// One [`BrailleStyle`] per character: the union of every style span covering it.
pub fn build_style_map(text: &AnnotatedText) -> Vec<BrailleStyle> {
    let mut map = vec![BrailleStyle::empty(); text.len()];
    for (range, mask) in text.style_spans() {
        for slot in &mut map[range.start..range.end] {
            *slot |= mask;
        }
    }
    map
}
