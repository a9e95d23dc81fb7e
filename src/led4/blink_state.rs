use embassy_time::{Duration, Instant};

/// Blinking behavior for 4-digit LED displays.
///
/// Set through [`Led4::start_blink`](crate::Led4::start_blink) and
/// [`Led4::stop_blink`](crate::Led4::stop_blink); advanced by
/// [`Led4::refresh`](crate::Led4::refresh). The multiplex cycle leaves the display
/// dark while the state is [`BlinkState::BlinkingButOff`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BlinkState {
    #[default]
    Solid = 0,
    BlinkingAndOn = 1,
    BlinkingButOff = 2,
}

impl BlinkState {
    #[must_use]
    pub const fn is_lit(self) -> bool {
        !matches!(self, Self::BlinkingButOff)
    }

    #[must_use]
    pub const fn is_blinking(self) -> bool {
        !matches!(self, Self::Solid)
    }

    /// The phase after one blink interval has elapsed.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Solid => Self::Solid,
            Self::BlinkingAndOn => Self::BlinkingButOff,
            Self::BlinkingButOff => Self::BlinkingAndOn,
        }
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::BlinkingAndOn,
            2 => Self::BlinkingButOff,
            _ => Self::Solid,
        }
    }
}

/// When the blink phase last flipped, and how often it should.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlinkTimer {
    pub(crate) interval: Duration,
    pub(crate) last_toggle: Instant,
}

impl BlinkTimer {
    pub(crate) const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_toggle: Instant::from_ticks(0),
        }
    }

    /// Restarts the interval at `now` if it has run out.
    pub(crate) fn expire(&mut self, now: Instant) -> bool {
        let due = now.saturating_duration_since(self.last_toggle) >= self.interval;
        if due {
            self.last_toggle = now;
        }
        due
    }
}
