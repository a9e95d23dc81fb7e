use embedded_hal::digital::{OutputPin, PinState};

/// The GPIO capability the display drives its lines through.
///
/// Pins are addressed by number, as handed over in [`PinConfig`](crate::PinConfig).
/// Both operations are infallible: the multiplex cycle runs in interrupt context and
/// has nowhere to report an error.
pub trait GpioSink {
    /// Puts `pin` into push-pull output mode.
    fn configure_output(&mut self, pin: u8);

    /// Drives `pin` to `state`.
    fn set_level(&mut self, pin: u8, state: PinState);
}

/// Array of GPIO output pins keyed by pin number.
///
/// Adapts any set of `embedded-hal` [`OutputPin`]s (for example
/// `embassy_rp::gpio::Output`) to [`GpioSink`]. Pins are already outputs once
/// constructed, so `configure_output` just parks the line low. Unknown pin numbers
/// and driver errors are ignored.
///
/// See the [`Led4`](crate::Led4) documentation for usage examples.
pub struct OutputArray<P, const N: usize>([(u8, P); N]);

impl<P: OutputPin, const N: usize> OutputArray<P, N> {
    pub const fn new(outputs: [(u8, P); N]) -> Self {
        Self(outputs)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, pin: u8) -> Option<&mut P> {
        self.0
            .iter_mut()
            .find_map(|(number, output)| (*number == pin).then_some(output))
    }

    /// Gives the pins back.
    pub fn release(self) -> [(u8, P); N] {
        self.0
    }
}

impl<P: OutputPin, const N: usize> GpioSink for OutputArray<P, N> {
    #[inline]
    fn configure_output(&mut self, pin: u8) {
        self.set_level(pin, PinState::Low);
    }

    #[inline]
    fn set_level(&mut self, pin: u8, state: PinState) {
        if let Some(output) = self.get_mut(pin) {
            // A failed write leaves the line as it was until the next tick.
            let _ = output.set_state(state);
        }
    }
}
