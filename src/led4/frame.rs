//! Segment state for a 4-digit 7-segment display, plus the encoders that produce it.

use core::fmt;
use core::ops::{Index, IndexMut};

use super::glyph::{Leds, digit, digit_of, glyph};
use crate::shared_constants::{CELL_COUNT, MAX_VALUE};
use crate::{Error, Result};

/// Powers of ten used to shift a float's decimals into the integer part.
const SCALES: [f64; CELL_COUNT] = [1.0, 10.0, 100.0, 1000.0];

/// Largest magnitude shown next to a minus sign (three digits).
const MAX_NEGATIVE_SCALED: u32 = 999;

/// LED segment state for a 4-digit 7-segment display.
///
/// Cell 0 is the leftmost digit. Each byte uses the layout documented in
/// [`glyph`](crate::glyph).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame([u8; CELL_COUNT]);

impl Frame {
    /// All segments off.
    pub const BLANK: Self = Self([Leds::BLANK; CELL_COUNT]);

    /// Shown by [`Led4::set_float`](crate::Led4::set_float) for NaN and infinities.
    pub const ERROR: Self = Self([glyph('E'), glyph('r'), glyph('r'), Leds::BLANK]);

    /// Shown for negative values whose magnitude does not fit.
    pub const NEGATIVE_OVERFLOW: Self = Self([Leds::MINUS, glyph('9'), glyph('9'), glyph('9')]);

    #[must_use]
    pub const fn new(bits: [u8; CELL_COUNT]) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(&self) -> [u8; CELL_COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &u8> {
        self.0.iter()
    }

    /// Packs the four cells into one word so the frame can be published atomically.
    #[must_use]
    pub const fn to_word(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    #[must_use]
    pub const fn from_word(word: u32) -> Self {
        Self(word.to_be_bytes())
    }

    /// Maps up to four characters through the glyph table, padding with blanks on the right.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `text` has more than four characters.
    pub fn from_text(text: &str) -> Result<Self> {
        if text.chars().count() > CELL_COUNT {
            return Err(Error::InvalidArgument);
        }
        let mut frame = Self::BLANK;
        for (bits, char) in frame.0.iter_mut().zip(text.chars()) {
            *bits = glyph(char);
        }
        Ok(frame)
    }

    /// Creates a frame from a number, clamped to 9999.
    ///
    /// `decimal_point` lights the point of that cell; positions past the last cell are
    /// ignored. With `leading_zeros` off, zeros before the first significant digit are
    /// blanked, except in the last cell. The point is lit afterwards, so a blanked cell
    /// can still carry it: `5` with the point on cell 1 shows `  . 5`.
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Modulo is required for digit extraction"
    )]
    #[must_use]
    pub fn from_number(value: u16, decimal_point: Option<u8>, leading_zeros: bool) -> Self {
        let mut remaining = value.min(MAX_VALUE);
        let mut frame = Self::BLANK;

        for bits in frame.0.iter_mut().rev() {
            #[expect(clippy::cast_possible_truncation, reason = "Remainder is below 10")]
            let value = (remaining % 10) as u8;
            *bits = digit(value);
            remaining /= 10;
        }

        if !leading_zeros {
            // The last cell always shows a digit.
            let zero = digit(0);
            for bits in frame.0.iter_mut().take(CELL_COUNT - 1) {
                if *bits != zero {
                    break;
                }
                *bits = Leds::BLANK;
            }
        }

        if let Some(bits) = decimal_point.and_then(|index| frame.0.get_mut(usize::from(index))) {
            *bits |= Leds::DECIMAL;
        }

        frame
    }

    /// Treats `value` as hundredths; an out-of-range `decimal_point` falls back to cell 2.
    #[must_use]
    pub fn from_hundredths(value: u16, decimal_point: Option<u8>, leading_zeros: bool) -> Self {
        let decimal_point = match decimal_point {
            Some(index) if usize::from(index) >= CELL_COUNT => Some(2),
            other => other,
        };
        Self::from_number(value, decimal_point, leading_zeros)
    }

    /// Renders a float with the decimal point placed by magnitude.
    ///
    /// Non-negative values use as many integer digits as they need (1 to 4) and fill
    /// the remaining cells with decimals. Negative values give up the leftmost cell to
    /// the minus sign and show two decimals below 10, one decimal below 100, and
    /// `-999` beyond that. Returns `None` for NaN and infinities.
    #[must_use]
    pub fn from_float(value: f32, leading_zeros: bool) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        if value < 0.0 {
            if value <= -100.0 {
                return Some(Self::NEGATIVE_OVERFLOW);
            }
            let magnitude = f64::from(-value);
            let (scale, decimal_point) = if magnitude < 10.0 { (100.0, 1) } else { (10.0, 2) };
            let scaled = round_to_u16(magnitude * scale, MAX_NEGATIVE_SCALED);
            let mut frame = Self::from_number(scaled, Some(decimal_point), leading_zeros);
            if let Some(sign) = frame.0.first_mut() {
                *sign = Leds::MINUS;
            }
            return Some(frame);
        }

        let integer_digits: u8 = if value >= 1000.0 {
            4
        } else if value >= 100.0 {
            3
        } else if value >= 10.0 {
            2
        } else {
            1
        };
        let decimals = CELL_COUNT - usize::from(integer_digits);
        let decimal_point = (usize::from(integer_digits) < CELL_COUNT).then(|| integer_digits - 1);
        let scale = SCALES.get(decimals).copied().unwrap_or(1.0);
        let scaled = round_to_u16(f64::from(value) * scale, u32::from(MAX_VALUE));

        Some(Self::from_number(scaled, decimal_point, leading_zeros))
    }

    /// Renders the frame as text: one character per cell plus `.` where a point is lit.
    ///
    /// Patterns that match no glyph come out as `?`.
    #[must_use]
    pub fn to_text(&self) -> heapless::String<{ 2 * CELL_COUNT }> {
        self.chars().collect()
    }

    fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().flat_map(|&bits| {
            let decimal_point = bits & Leds::DECIMAL != 0;
            core::iter::once(char_of(bits & !Leds::DECIMAL)).chain(decimal_point.then_some('.'))
        })
    }
}

/// Rounds half up and clamps a non-negative value to `max`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Float to int casts saturate and the input is non-negative"
)]
fn round_to_u16(value: f64, max: u32) -> u16 {
    let rounded = (value + 0.5) as u32;
    u16::try_from(rounded.min(max)).unwrap_or(MAX_VALUE)
}

fn char_of(bits: u8) -> char {
    if let Some(value) = digit_of(bits) {
        return char::from(b'0'.wrapping_add(value));
    }
    ('A'..='Z')
        .chain([' ', '-', '='])
        .find(|&char| glyph(char) == bits)
        .unwrap_or('?')
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use core::fmt::Write;
        for char in self.chars() {
            f.write_char(char)?;
        }
        Ok(())
    }
}

impl Index<usize> for Frame {
    type Output = u8;

    #[expect(clippy::indexing_slicing, reason = "Caller's responsibility")]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Frame {
    #[expect(clippy::indexing_slicing, reason = "Caller's responsibility")]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl IntoIterator for Frame {
    type Item = u8;
    type IntoIter = core::array::IntoIter<u8, CELL_COUNT>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a u8;
    type IntoIter = core::slice::Iter<'a, u8>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<[u8; CELL_COUNT]> for Frame {
    fn from(bits: [u8; CELL_COUNT]) -> Self {
        Self(bits)
    }
}
