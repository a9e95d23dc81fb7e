//! Interrupt-driven multiplexing for common-cathode 4-digit 7-segment LED displays.
//!
//! A periodic timer interrupt lights one digit per tick through [`TickSlot::fire`],
//! while the application renders numbers, floats and text into a [`Frame`] that is
//! published atomically. See [`Led4`] to get started.
#![cfg_attr(not(test), no_std)]

mod error;
pub mod led4;
#[cfg(feature = "pico1")]
pub mod pico;
mod shared_constants;
mod tick;

// Re-export commonly used items
pub use error::{Error, Result};
pub use led4::glyph::{self, Leds};
pub use led4::{BlinkState, Frame, GpioSink, Led4, OutputArray, PinConfig};
pub use shared_constants::*;
pub use tick::{Clock, Multiplex, TickSlot, TickSource};
