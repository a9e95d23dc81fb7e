use embassy_time::Duration;

/// The number of cells (digits) in the display.
pub const CELL_COUNT_U8: u8 = 4;
pub const CELL_COUNT: usize = CELL_COUNT_U8 as usize;

/// The number of segment lines per digit (a..g plus the decimal point).
pub const SEGMENT_COUNT: usize = 8;

/// Largest value [`Led4::set_number`](crate::Led4::set_number) can show.
pub const MAX_VALUE: u16 = 9999;

/// Highest GPIO number accepted by default (Pico 2 tops out at GPIO 47).
pub const MAX_PIN: u8 = 47;

/// Time each digit stays lit before the next tick moves on.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(3);

/// Bounds for [`Led4::set_refresh_interval`](crate::Led4::set_refresh_interval), in milliseconds.
pub const MIN_REFRESH_INTERVAL_MS: u8 = 1;
pub const MAX_REFRESH_INTERVAL_MS: u8 = u8::MAX;

/// Blink half-period used when the caller has no preference.
pub const DEFAULT_BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// How long the wiring test holds each segment lit.
pub const DEFAULT_WIRING_HOLD: Duration = Duration::from_millis(500);
