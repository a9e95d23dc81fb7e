//! Character to segment-pattern mapping for 7-segment cells.
//!
//! Bit layout of a pattern (one byte per digit):
//!
//! ```text
//!      a            bit 7 = a   bit 3 = e
//!   f     b         bit 6 = b   bit 2 = f
//!      g            bit 5 = c   bit 1 = g
//!   e     c         bit 4 = d   bit 0 = dp
//!      d    dp
//! ```

/// Constants for 7-segment LED displays.
pub struct Leds;

impl Leds {
    /// Segment A of the 7-segment display.
    pub const SEG_A: u8 = 0b_1000_0000;
    /// Segment B of the 7-segment display.
    pub const SEG_B: u8 = 0b_0100_0000;
    /// Segment C of the 7-segment display.
    pub const SEG_C: u8 = 0b_0010_0000;
    /// Segment D of the 7-segment display.
    pub const SEG_D: u8 = 0b_0001_0000;
    /// Segment E of the 7-segment display.
    pub const SEG_E: u8 = 0b_0000_1000;
    /// Segment F of the 7-segment display.
    pub const SEG_F: u8 = 0b_0000_0100;
    /// Segment G of the 7-segment display.
    pub const SEG_G: u8 = 0b_0000_0010;
    /// Decimal point of the 7-segment display.
    pub const DECIMAL: u8 = 0b_0000_0001;

    /// Representation of a blank cell.
    pub const BLANK: u8 = 0b_0000_0000;

    /// Minus sign (middle bar only).
    pub const MINUS: u8 = Self::SEG_G;

    /// Two horizontal bars.
    pub const EQUALS: u8 = Self::SEG_D | Self::SEG_G;

    /// Array representing the segments for digits 0-9 on a 7-segment display.
    pub const DIGITS: [u8; 10] = [
        0b_1111_1100, // Digit 0
        0b_0110_0000, // Digit 1
        0b_1101_1010, // Digit 2
        0b_1111_0010, // Digit 3
        0b_0110_0110, // Digit 4
        0b_1011_0110, // Digit 5
        0b_1011_1110, // Digit 6
        0b_1110_0000, // Digit 7
        0b_1111_1110, // Digit 8
        0b_1111_0110, // Digit 9
    ];
}

/// Returns the segment pattern for `char`.
///
/// Letters are case-insensitive and share one glyph set. K, M, V, W and X are
/// approximations, and Q leaves out segment d so it differs from 9. Anything without
/// a glyph comes back blank.
#[must_use]
pub const fn glyph(char: char) -> u8 {
    match char {
        '0'..='9' => digit((char as u8).wrapping_sub(b'0')),
        'A' | 'a' => Leds::SEG_A | Leds::SEG_B | Leds::SEG_C | Leds::SEG_E | Leds::SEG_F | Leds::SEG_G,
        'B' | 'b' => Leds::SEG_C | Leds::SEG_D | Leds::SEG_E | Leds::SEG_F | Leds::SEG_G,
        'C' | 'c' => Leds::SEG_A | Leds::SEG_D | Leds::SEG_E | Leds::SEG_F,
        'D' | 'd' => Leds::SEG_B | Leds::SEG_C | Leds::SEG_D | Leds::SEG_E | Leds::SEG_G,
        'E' | 'e' => Leds::SEG_A | Leds::SEG_D | Leds::SEG_E | Leds::SEG_F | Leds::SEG_G,
        'F' | 'f' => Leds::SEG_A | Leds::SEG_E | Leds::SEG_F | Leds::SEG_G,
        'G' | 'g' => Leds::SEG_A | Leds::SEG_C | Leds::SEG_D | Leds::SEG_E | Leds::SEG_F,
        'H' | 'h' => Leds::SEG_B | Leds::SEG_C | Leds::SEG_E | Leds::SEG_F | Leds::SEG_G,
        'I' | 'i' => Leds::SEG_B | Leds::SEG_C,
        'J' | 'j' => Leds::SEG_B | Leds::SEG_C | Leds::SEG_D | Leds::SEG_E,
        'K' | 'k' => Leds::SEG_E | Leds::SEG_F | Leds::SEG_G,
        'L' | 'l' => Leds::SEG_D | Leds::SEG_E | Leds::SEG_F,
        'M' | 'm' => Leds::SEG_A | Leds::SEG_C | Leds::SEG_E,
        'N' | 'n' => Leds::SEG_C | Leds::SEG_E | Leds::SEG_G,
        'O' | 'o' => Leds::SEG_A | Leds::SEG_B | Leds::SEG_C | Leds::SEG_D | Leds::SEG_E | Leds::SEG_F,
        'P' | 'p' => Leds::SEG_A | Leds::SEG_B | Leds::SEG_E | Leds::SEG_F | Leds::SEG_G,
        'Q' | 'q' => Leds::SEG_A | Leds::SEG_B | Leds::SEG_C | Leds::SEG_F | Leds::SEG_G,
        'R' | 'r' => Leds::SEG_E | Leds::SEG_G,
        'S' | 's' => Leds::SEG_A | Leds::SEG_C | Leds::SEG_D | Leds::SEG_F | Leds::SEG_G,
        'T' | 't' => Leds::SEG_D | Leds::SEG_E | Leds::SEG_F | Leds::SEG_G,
        'U' | 'u' => Leds::SEG_B | Leds::SEG_C | Leds::SEG_D | Leds::SEG_E | Leds::SEG_F,
        'V' | 'v' => Leds::SEG_C | Leds::SEG_D | Leds::SEG_E,
        'W' | 'w' => Leds::SEG_B | Leds::SEG_D | Leds::SEG_F,
        'X' | 'x' => Leds::SEG_B | Leds::SEG_E | Leds::SEG_F | Leds::SEG_G,
        'Y' | 'y' => Leds::SEG_B | Leds::SEG_C | Leds::SEG_D | Leds::SEG_F | Leds::SEG_G,
        'Z' | 'z' => Leds::SEG_A | Leds::SEG_B | Leds::SEG_D | Leds::SEG_E | Leds::SEG_G,
        '-' => Leds::MINUS,
        '=' => Leds::EQUALS,
        '.' => Leds::DECIMAL,
        _ => Leds::BLANK,
    }
}

/// Returns the pattern for decimal digit `value`, or blank if `value > 9`.
#[expect(clippy::indexing_slicing, reason = "Bounds checked before indexing")]
#[must_use]
pub const fn digit(value: u8) -> u8 {
    if value < 10 {
        Leds::DIGITS[value as usize]
    } else {
        Leds::BLANK
    }
}

/// Recovers the decimal digit shown by `pattern`, ignoring the decimal point.
#[must_use]
pub fn digit_of(pattern: u8) -> Option<u8> {
    let bare = pattern & !Leds::DECIMAL;
    (0..10u8).find(|&value| digit(value) == bare)
}
