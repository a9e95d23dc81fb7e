//! A device abstraction for a 4-digit, 7-segment LED display with blinking support.
//!
//! This module provides hardware abstractions for controlling common-cathode
//! 4-digit 7-segment LED displays by time-division multiplexing from a periodic
//! timer interrupt. Supports displaying numbers, fixed-point values, floats and
//! text with optional blinking.
//!
//! See [`Led4`] for the main device abstraction and usage examples.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

#[cfg(feature = "display-trace")]
use defmt::info;

use crate::shared_constants::{
    CELL_COUNT, CELL_COUNT_U8, DEFAULT_BLINK_INTERVAL, DEFAULT_REFRESH_INTERVAL, MAX_PIN,
    MAX_REFRESH_INTERVAL_MS, MIN_REFRESH_INTERVAL_MS, SEGMENT_COUNT,
};
use crate::tick::{Clock, Multiplex, TickSlot, TickSource};
use crate::{Error, Result};

// ============================================================================
// Submodules
// ============================================================================

mod blink_state;
mod frame;
pub mod glyph;
mod output_array;

pub use blink_state::BlinkState;
use blink_state::BlinkTimer;
pub use frame::Frame;
use glyph::Leds;
pub use output_array::{GpioSink, OutputArray};

const LAST_CELL: u8 = CELL_COUNT_U8 - 1;

// ============================================================================
// PinConfig
// ============================================================================

/// Pin numbers for the 8 segment lines (a..g, dp) and the 4 digit lines.
///
/// Checked by [`Led4::begin`] before any pin is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    segments: &'static [u8],
    digits: &'static [u8],
    digit_active: PinState,
    max_pin: u8,
}

impl PinConfig {
    /// Segment pins in a..g, dp order; digit pins leftmost first.
    ///
    /// Digit lines default to active-high (transistor-switched cathodes); see
    /// [`PinConfig::with_digit_active`] for direct-drive wiring.
    #[must_use]
    pub const fn new(segments: &'static [u8], digits: &'static [u8]) -> Self {
        Self {
            segments,
            digits,
            digit_active: PinState::High,
            max_pin: MAX_PIN,
        }
    }

    /// Level that enables a digit.
    #[must_use]
    pub const fn with_digit_active(self, digit_active: PinState) -> Self {
        Self {
            digit_active,
            ..self
        }
    }

    /// Highest pin number the platform accepts.
    #[must_use]
    pub const fn with_max_pin(self, max_pin: u8) -> Self {
        Self { max_pin, ..self }
    }

    #[must_use]
    pub const fn segments(&self) -> &'static [u8] {
        self.segments
    }

    #[must_use]
    pub const fn digits(&self) -> &'static [u8] {
        self.digits
    }

    #[must_use]
    pub const fn digit_active(&self) -> PinState {
        self.digit_active
    }

    fn digit_inactive(&self) -> PinState {
        !self.digit_active
    }

    /// # Errors
    ///
    /// [`Error::NullPointer`] for an empty pin list, [`Error::InvalidArgument`] for
    /// the wrong number of pins, [`Error::InvalidPin`] for a pin above `max_pin`.
    pub fn validate(&self) -> Result<()> {
        if self.segments.is_empty() || self.digits.is_empty() {
            return Err(Error::NullPointer);
        }
        if self.segments.len() != SEGMENT_COUNT || self.digits.len() != CELL_COUNT {
            return Err(Error::InvalidArgument);
        }
        if self
            .segments
            .iter()
            .chain(self.digits)
            .any(|&pin| pin > self.max_pin)
        {
            return Err(Error::InvalidPin);
        }
        Ok(())
    }

    fn all_pins(&self) -> impl Iterator<Item = &u8> {
        self.segments.iter().chain(self.digits)
    }
}

// ============================================================================
// Led4 Virtual Device
// ============================================================================

/// A device abstraction for a 4-digit, 7-segment LED display with blinking support.
///
/// # Hardware Requirements
///
/// This abstraction is designed for common-cathode 7-segment displays where:
/// - Digit pins select which digit is lit (active level set in [`PinConfig`])
/// - Segment pins control which segments light up (HIGH = on, LOW = off)
///
/// A timer interrupt calls [`TickSlot::fire`] every few milliseconds; each call lights
/// the next digit. Renderer calls build a whole [`Frame`] and publish it with one
/// atomic store, so a tick never shows half of one update and half of another.
///
/// # Example
///
/// ```
/// use core::convert::Infallible;
/// use embassy_time::{Duration, Instant};
/// use embedded_hal::digital::{ErrorType, OutputPin};
/// use led4_mux::{Clock, Led4, OutputArray, PinConfig, TickSlot, TickSource};
///
/// # struct Pin;
/// # impl ErrorType for Pin { type Error = Infallible; }
/// # impl OutputPin for Pin {
/// #     fn set_low(&mut self) -> Result<(), Infallible> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Infallible> { Ok(()) }
/// # }
/// # struct Timer;
/// # impl TickSource for Timer {
/// #     fn start(&mut self, _period: Duration) -> led4_mux::Result<()> { Ok(()) }
/// #     fn stop(&mut self) {}
/// # }
/// # struct Uptime;
/// # impl Clock for Uptime { fn now(&self) -> Instant { Instant::from_millis(0) } }
/// static TIMER_SLOT: TickSlot = TickSlot::new();
///
/// static DISPLAY: Led4<OutputArray<Pin, 12>, Timer, Uptime> = Led4::new(
///     PinConfig::new(&[2, 3, 4, 5, 6, 7, 8, 9], &[10, 11, 12, 13]),
///     OutputArray::new([
///         (2, Pin), (3, Pin), (4, Pin), (5, Pin), (6, Pin), (7, Pin),
///         (8, Pin), (9, Pin), (10, Pin), (11, Pin), (12, Pin), (13, Pin),
///     ]),
///     Timer,
///     Uptime,
///     &TIMER_SLOT,
/// );
///
/// fn main() -> led4_mux::Result<()> {
///     DISPLAY.begin()?;
///     DISPLAY.set_float(12.34)?;
///     assert_eq!(DISPLAY.frame().to_text().as_str(), "12.34");
///
///     // Display "rUSt" blinking
///     DISPLAY.set_text("rUSt")?;
///     DISPLAY.start_blink(Duration::from_millis(500));
///
///     // The timer interrupt does this:
///     TIMER_SLOT.fire();
///     Ok(())
/// }
/// ```
pub struct Led4<G, T, C> {
    config: PinConfig,
    gpio: CriticalSectionMutex<RefCell<G>>,
    tick: CriticalSectionMutex<RefCell<T>>,
    clock: C,
    slot: &'static TickSlot,
    frame: AtomicU32,
    cursor: AtomicU8,
    active: AtomicBool,
    leading_zeros: AtomicBool,
    refresh_interval_ms: AtomicU8,
    blink_state: AtomicU8,
    blink_timer: CriticalSectionMutex<Cell<BlinkTimer>>,
    last_error: CriticalSectionMutex<Cell<Option<Error>>>,
}

impl<G, T, C> Led4<G, T, C> {
    /// Creates the display, blank and not blinking. Nothing is driven until [`Led4::begin`].
    ///
    /// The display must live in `'static` storage (a `static`, or a
    /// `static_cell::StaticCell`) so the timer slot can reach it.
    #[must_use]
    pub const fn new(config: PinConfig, gpio: G, tick: T, clock: C, slot: &'static TickSlot) -> Self {
        #[expect(clippy::cast_possible_truncation, reason = "Default interval is a few milliseconds")]
        let refresh_interval_ms = DEFAULT_REFRESH_INTERVAL.as_millis() as u8;
        Self {
            config,
            gpio: CriticalSectionMutex::new(RefCell::new(gpio)),
            tick: CriticalSectionMutex::new(RefCell::new(tick)),
            clock,
            slot,
            frame: AtomicU32::new(Frame::BLANK.to_word()),
            cursor: AtomicU8::new(LAST_CELL),
            active: AtomicBool::new(false),
            leading_zeros: AtomicBool::new(true),
            refresh_interval_ms: AtomicU8::new(refresh_interval_ms),
            blink_state: AtomicU8::new(BlinkState::Solid as u8),
            blink_timer: CriticalSectionMutex::new(Cell::new(BlinkTimer::new(DEFAULT_BLINK_INTERVAL))),
            last_error: CriticalSectionMutex::new(Cell::new(None)),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &PinConfig {
        &self.config
    }

    /// `true` between a successful [`Led4::begin`] and [`Led4::end`].
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Result of the most recent fallible operation; `None` if it succeeded.
    #[must_use]
    pub fn last_error(&self) -> Option<Error> {
        self.last_error.lock(Cell::get)
    }

    /// The four patterns the multiplex cycle is currently showing.
    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame::from_word(self.frame.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn leading_zeros(&self) -> bool {
        self.leading_zeros.load(Ordering::Relaxed)
    }

    /// `true` shows leading zeros (`0012`), `false` blanks them (`  12`). Applies to the
    /// next render.
    pub fn set_leading_zeros(&self, show: bool) {
        self.leading_zeros.store(show, Ordering::Relaxed);
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.refresh_interval_ms.load(Ordering::Relaxed)))
    }

    #[must_use]
    pub fn blink_state(&self) -> BlinkState {
        BlinkState::from_u8(self.blink_state.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn is_blinking(&self) -> bool {
        self.blink_state().is_blinking()
    }

    /// Stops blinking; every following tick drives its digit.
    pub fn stop_blink(&self) {
        self.blink_state
            .store(BlinkState::Solid as u8, Ordering::Release);
    }

    // ------------------------------------------------------------------------
    // Renderers
    // ------------------------------------------------------------------------

    /// Shows `value` (clamped to 9999) with an optional decimal point.
    ///
    /// `decimal_point` is a cell index, 0 = leftmost; `Some(1)` shows `12.34`.
    /// Indexes past the last cell mean no decimal point.
    pub fn set_number(&self, value: u16, decimal_point: Option<u8>) {
        self.publish(Frame::from_number(value, decimal_point, self.leading_zeros()));
    }

    /// Shows `value` as a fixed-point number without float math: `1234` with `Some(1)`
    /// reads `12.34`.
    ///
    /// Same cell indexing as [`Led4::set_number`]. An out-of-range `decimal_point`
    /// falls back to cell 2; `None` shows no point.
    pub fn set_hundredths(&self, value: u16, decimal_point: Option<u8>) {
        self.publish(Frame::from_hundredths(value, decimal_point, self.leading_zeros()));
    }

    /// Shows a float with the decimal point placed by magnitude; see [`Frame::from_float`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for NaN or an infinity, after showing `Err `.
    pub fn set_float(&self, value: f32) -> Result<()> {
        let result = match Frame::from_float(value, self.leading_zeros()) {
            Some(frame) => {
                self.publish(frame);
                Ok(())
            }
            None => {
                self.publish(Frame::ERROR);
                Err(Error::InvalidArgument)
            }
        };
        self.record(result)
    }

    /// Shows up to four characters, left-aligned.
    ///
    /// Accepts `&str` or `Option<&str>`.
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for `None`, [`Error::InvalidArgument`] for more than four
    /// characters. The display is left unchanged on error.
    pub fn set_text<'t>(&self, text: impl Into<Option<&'t str>>) -> Result<()> {
        let result = text
            .into()
            .ok_or(Error::NullPointer)
            .and_then(Frame::from_text)
            .map(|frame| self.publish(frame));
        self.record(result)
    }

    /// Shows four raw patterns as given; bit 7 = a ... bit 0 = dp.
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for `None`.
    pub fn set_segments<'p>(&self, patterns: impl Into<Option<&'p [u8; CELL_COUNT]>>) -> Result<()> {
        let result = patterns
            .into()
            .ok_or(Error::NullPointer)
            .map(|&patterns| self.publish(Frame::new(patterns)));
        self.record(result)
    }

    /// Blanks all digits.
    pub fn clear(&self) {
        self.publish(Frame::BLANK);
    }

    fn publish(&self, frame: Frame) {
        #[cfg(feature = "display-trace")]
        info!("frame: {}", frame.to_text().as_str());
        self.frame.store(frame.to_word(), Ordering::Release);
    }

    fn record<R>(&self, result: Result<R>) -> Result<R> {
        let error = result.as_ref().err().copied();
        self.last_error.lock(|last_error| last_error.set(error));
        result
    }
}

impl<G, T, C> Led4<G, T, C>
where
    G: GpioSink + Send + 'static,
    T: TickSource + Send + 'static,
    C: Clock + Sync + 'static,
{
    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Validates the pins, configures them as outputs, claims the timer slot and arms
    /// the timer.
    ///
    /// Calling `begin` again on a running display reconfigures it.
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`], [`Error::InvalidArgument`] or [`Error::InvalidPin`] for a
    /// bad [`PinConfig`], before any pin is touched. [`Error::TimerInitFailed`] if the
    /// slot serves another display or the timer cannot be armed.
    pub fn begin(&'static self) -> Result<()> {
        let result = self.try_begin();
        #[cfg(feature = "defmt")]
        match result {
            Ok(()) => defmt::info!(
                "led4: started, {} ms per digit",
                self.refresh_interval().as_millis()
            ),
            Err(err) => defmt::warn!("led4: begin failed: {}", err),
        }
        self.record(result)
    }

    fn try_begin(&'static self) -> Result<()> {
        self.config.validate()?;
        self.active.store(false, Ordering::Release);
        self.slot.register(self)?;

        let digit_inactive = self.config.digit_inactive();
        self.with_gpio(|gpio| {
            for &pin in self.config.all_pins() {
                gpio.configure_output(pin);
            }
            for &pin in self.config.segments {
                gpio.set_level(pin, PinState::Low);
            }
            for &pin in self.config.digits {
                gpio.set_level(pin, digit_inactive);
            }
        });
        // The first tick lights cell 0.
        self.cursor.store(LAST_CELL, Ordering::Relaxed);

        self.active.store(true, Ordering::Release);
        self.arm()
    }

    /// Disarms the timer, releases the slot, turns every digit off and blanks the frame.
    ///
    /// Safe to call at any time, including before [`Led4::begin`].
    pub fn end(&self) {
        self.disarm();
        self.slot.unregister(self);
        self.all_off();
        self.clear();
        #[cfg(feature = "defmt")]
        defmt::info!("led4: stopped");
    }

    /// Sets the time each digit stays lit, clamped to 1..=255 ms, and re-arms a running
    /// timer with it.
    ///
    /// # Errors
    ///
    /// [`Error::TimerInitFailed`] if the running timer cannot be re-armed; the display
    /// is then stopped.
    pub fn set_refresh_interval(&self, ms: u8) -> Result<()> {
        self.refresh_interval_ms
            .store(ms.clamp(MIN_REFRESH_INTERVAL_MS, MAX_REFRESH_INTERVAL_MS), Ordering::Relaxed);
        let result = if self.is_initialized() {
            self.with_tick(TickSource::stop);
            self.arm()
        } else {
            Ok(())
        };
        self.record(result)
    }

    fn arm(&self) -> Result<()> {
        let period = self.refresh_interval();
        let result = self
            .tick
            .lock(|tick| {
                tick.try_borrow_mut()
                    .map_err(|_| Error::TimerInitFailed)
                    .and_then(|mut tick| tick.start(period))
            })
            .map_err(|_| Error::TimerInitFailed);
        if result.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("led4: timer could not be armed");
            self.disarm();
            self.slot.unregister(self);
        }
        result
    }

    fn disarm(&self) {
        self.active.store(false, Ordering::Release);
        self.with_tick(TickSource::stop);
    }

    // ------------------------------------------------------------------------
    // Blinking
    // ------------------------------------------------------------------------

    /// Starts blinking, lit first, flipping every `interval` as [`Led4::refresh`] is polled.
    pub fn start_blink(&self, interval: Duration) {
        let now = self.clock.now();
        self.blink_timer.lock(|timer| {
            timer.set(BlinkTimer {
                interval,
                last_toggle: now,
            });
        });
        self.blink_state
            .store(BlinkState::BlinkingAndOn as u8, Ordering::Release);
    }

    /// Advances the blink phase from the wall clock. Call it often from the main loop;
    /// it does nothing when not blinking.
    pub fn refresh(&self) {
        let state = self.blink_state();
        if !state.is_blinking() {
            return;
        }
        let now = self.clock.now();
        let due = self.blink_timer.lock(|timer| {
            let mut current = timer.get();
            let due = current.expire(now);
            timer.set(current);
            due
        });
        if due {
            // Loses to a concurrent stop_blink, which is what we want.
            let _ = self.blink_state.compare_exchange(
                state as u8,
                state.toggled() as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
    }

    // ------------------------------------------------------------------------
    // Multiplexing
    // ------------------------------------------------------------------------

    /// One scan step: turns the current digit off, moves to the next one and, unless
    /// blinking has the display dark, drives its segments and turns it on.
    ///
    /// Normally reached through [`TickSlot::fire`]; does nothing until [`Led4::begin`].
    pub fn multiplex(&self) {
        if !self.is_initialized() {
            return;
        }
        let digit_active = self.config.digit_active;
        let digit_inactive = self.config.digit_inactive();
        self.with_gpio(|gpio| {
            let previous = self.cursor.load(Ordering::Relaxed);
            if let Some(&pin) = self.config.digits.get(usize::from(previous)) {
                gpio.set_level(pin, digit_inactive);
            }

            let current = previous.wrapping_add(1) % CELL_COUNT_U8;
            self.cursor.store(current, Ordering::Relaxed);

            if !self.blink_state().is_lit() {
                return;
            }

            let Some(&bits) = self.frame().bits().get(usize::from(current)) else {
                return;
            };
            let mut mask = Leds::SEG_A;
            for &pin in self.config.segments {
                gpio.set_level(pin, PinState::from(bits & mask != 0));
                mask >>= 1;
            }
            if let Some(&pin) = self.config.digits.get(usize::from(current)) {
                gpio.set_level(pin, digit_active);
            }
        });
    }

    /// Blocking wiring check: stops multiplexing, turns all four digits on and lights
    /// each segment line (a..g, then dp) alone for `hold`, then resumes.
    ///
    /// Only for one-time hardware verification.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before [`Led4::begin`]; [`Error::TimerInitFailed`] if
    /// the timer cannot be re-armed afterwards.
    pub fn test_wiring(&self, delay: &mut impl DelayNs, hold: Duration) -> Result<()> {
        let result = if self.is_initialized() {
            self.run_wiring_test(delay, hold)
        } else {
            Err(Error::NotInitialized)
        };
        self.record(result)
    }

    fn run_wiring_test(&self, delay: &mut impl DelayNs, hold: Duration) -> Result<()> {
        self.disarm();
        let hold_ms = u32::try_from(hold.as_millis()).unwrap_or(u32::MAX);
        let digit_active = self.config.digit_active;

        self.with_gpio(|gpio| {
            for &pin in self.config.segments {
                gpio.set_level(pin, PinState::Low);
            }
            for &pin in self.config.digits {
                gpio.set_level(pin, digit_active);
            }
        });
        for &pin in self.config.segments {
            #[cfg(feature = "defmt")]
            defmt::info!("led4: wiring test, segment pin {}", pin);
            self.with_gpio(|gpio| gpio.set_level(pin, PinState::High));
            delay.delay_ms(hold_ms);
            self.with_gpio(|gpio| gpio.set_level(pin, PinState::Low));
        }
        self.all_off();

        self.active.store(true, Ordering::Release);
        self.arm()
    }

    fn all_off(&self) {
        let digit_inactive = self.config.digit_inactive();
        self.with_gpio(|gpio| {
            for &pin in self.config.digits {
                gpio.set_level(pin, digit_inactive);
            }
            for &pin in self.config.segments {
                gpio.set_level(pin, PinState::Low);
            }
        });
    }

    fn with_gpio(&self, f: impl FnOnce(&mut G)) {
        self.gpio.lock(|gpio| {
            if let Ok(mut gpio) = gpio.try_borrow_mut() {
                f(&mut *gpio);
            }
        });
    }

    fn with_tick(&self, f: impl FnOnce(&mut T)) {
        self.tick.lock(|tick| {
            if let Ok(mut tick) = tick.try_borrow_mut() {
                f(&mut *tick);
            }
        });
    }
}

impl<G, T, C> Multiplex for Led4<G, T, C>
where
    G: GpioSink + Send + 'static,
    T: TickSource + Send + 'static,
    C: Clock + Sync + 'static,
{
    fn multiplex(&self) {
        Self::multiplex(self);
    }
}
