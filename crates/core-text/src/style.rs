//! Per-character braille style flags.

bitflags::bitflags! {
    /// Typeform bits handed to braille backends alongside each character.
    /// The empty set is plain text.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct BrailleStyle: u32 {
        const ITALIC           = 0b0000_0001;
        const UNDERLINE        = 0b0000_0010;
        const BOLD             = 0b0000_0100;
        const COMPUTER_BRAILLE = 0b0000_1000;
    }
}
