//! Reference backends.
//!
//! Two small table translators that let the expanding translator run end to
//! end without an external braille library:
//! - [`ComputerBrailleTable`]: one cell per character using the North
//!   American computer braille (Braille ASCII) layout. Uppercase letters and
//!   `@[\]^_` carry dot 7; anything outside printable ASCII renders as
//!   [`UNKNOWN_CELL`], whitespace as a blank cell.
//! - [`ContractedTable`]: the same cells, except that the whole-word
//!   wordsigns `and`, `for`, `of`, `the` and `with` contract to a single cell.
//!   Words containing any character styled `COMPUTER_BRAILLE` are never
//!   contracted.
//!
//! Both resolve immediately; they exist to exercise mappings, not to be
//! complete braille codes.

use crate::translator::{RawTranslation, Translator};
use core_text::BrailleStyle;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

/// Cell patterns for 0x20..=0x5F indexed by dot bits (dot 1 = bit 0 ... dot 6 = bit 5).
const BRAILLE_ASCII: &[u8; 64] = b" A1B'K2L@CIF/MSP\"E3H9O6R^DJG>NTQ,*5<-U8V.%[$+X!&;:4\\0Z7(_?W]#Y)=";
const DOT7: u8 = 0b0100_0000;
/// Dots 1-8, used for characters the table cannot represent.
pub const UNKNOWN_CELL: u8 = 0xff;

const WORDSIGNS: &[(&str, u8)] = &[
    ("and", 0x2f),
    ("for", 0x3f),
    ("of", 0x37),
    ("the", 0x2e),
    ("with", 0x3e),
];

/// Computer-braille cell for a single character.
pub fn computer_braille_cell(c: char) -> u8 {
    if c.is_whitespace() {
        return 0;
    }
    if !c.is_ascii() {
        return UNKNOWN_CELL;
    }
    let b = c as u8;
    let (key, extra) = match b {
        0x20..=0x3f => (b, 0),
        0x40..=0x5f => (b, DOT7),
        0x60..=0x7e => (b - 0x20, 0),
        _ => return UNKNOWN_CELL,
    };
    match BRAILLE_ASCII.iter().position(|&p| p == key) {
        Some(dots) => dots as u8 | extra,
        None => UNKNOWN_CELL,
    }
}

/// One cell per character, identity mappings.
#[derive(Debug, Clone, Default)]
pub struct ComputerBrailleTable;

impl ComputerBrailleTable {
    pub fn translate_now(&self, text: &str) -> RawTranslation {
        let cells: Vec<u8> = text.chars().map(computer_braille_cell).collect();
        let identity: Vec<usize> = (0..cells.len()).collect();
        RawTranslation::new(cells, identity.clone(), identity)
    }
}

impl Translator for ComputerBrailleTable {
    fn name(&self) -> &str {
        "computer-braille"
    }

    fn translate(&self, text: String, _styles: Vec<BrailleStyle>) -> BoxFuture<'static, RawTranslation> {
        std::future::ready(self.translate_now(&text)).boxed()
    }
}

/// Computer braille plus whole-word wordsign contractions.
#[derive(Debug, Clone, Default)]
pub struct ContractedTable;

impl ContractedTable {
    pub fn translate_now(&self, text: &str, styles: &[BrailleStyle]) -> RawTranslation {
        let chars: Vec<char> = text.chars().collect();
        let mut cells = Vec::with_capacity(chars.len());
        let mut text_to_braille = Vec::with_capacity(chars.len());
        let mut braille_to_text = Vec::with_capacity(chars.len());

        let mut i = 0;
        while i < chars.len() {
            if chars[i].is_alphabetic() {
                let start = i;
                while i < chars.len() && chars[i].is_alphabetic() {
                    i += 1;
                }
                let word_styles = styles.get(start..i).unwrap_or(&[]);
                if let Some(cell) = wordsign(&chars[start..i], word_styles) {
                    text_to_braille.extend(std::iter::repeat_n(cells.len(), i - start));
                    braille_to_text.push(start);
                    cells.push(cell);
                } else {
                    for (offset, &c) in chars[start..i].iter().enumerate() {
                        text_to_braille.push(cells.len());
                        braille_to_text.push(start + offset);
                        cells.push(computer_braille_cell(c));
                    }
                }
            } else {
                text_to_braille.push(cells.len());
                braille_to_text.push(i);
                cells.push(computer_braille_cell(chars[i]));
                i += 1;
            }
        }
        RawTranslation::new(cells, text_to_braille, braille_to_text)
    }
}

fn wordsign(word: &[char], styles: &[BrailleStyle]) -> Option<u8> {
    if styles.iter().any(|s| s.contains(BrailleStyle::COMPUTER_BRAILLE)) {
        return None;
    }
    let word: String = word.iter().collect();
    WORDSIGNS
        .iter()
        .find(|(sign, _)| *sign == word)
        .map(|&(_, cell)| cell)
}

impl Translator for ContractedTable {
    fn name(&self) -> &str {
        "contracted"
    }

    fn translate(&self, text: String, styles: Vec<BrailleStyle>) -> BoxFuture<'static, RawTranslation> {
        std::future::ready(self.translate_now(&text, &styles)).boxed()
    }
}
