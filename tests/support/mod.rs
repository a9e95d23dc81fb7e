//! Recording fakes for the display's hardware seams.
#![allow(dead_code, reason = "Each test crate uses a different subset")]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use embassy_time::{Duration, Instant};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use led4_mux::{Clock, Error, GpioSink, Led4, PinConfig, TickSlot, TickSource};

/// Segment pins a..g, dp.
pub const SEGMENT_PINS: &[u8] = &[2, 3, 4, 5, 6, 7, 8, 9];
/// Digit pins D1..D4, leftmost first.
pub const DIGIT_PINS: &[u8] = &[10, 11, 12, 13];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Configure(u8),
    Level(u8, PinState),
    Start(Duration),
    Stop,
    DelayMs(u32),
}

/// Shared, ordered record of everything the fakes were asked to do.
#[derive(Debug, Clone, Default)]
pub struct Log(Arc<Mutex<Vec<Event>>>);

impl Log {
    pub fn push(&self, event: Event) {
        self.0.lock().expect("log lock").push(event);
    }

    /// Returns and forgets everything recorded so far.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.0.lock().expect("log lock"))
    }

    /// Level changes only, in order.
    pub fn take_levels(&self) -> Vec<(u8, PinState)> {
        self.take()
            .into_iter()
            .filter_map(|event| match event {
                Event::Level(pin, state) => Some((pin, state)),
                _ => None,
            })
            .collect()
    }
}

pub struct FakeGpio(pub Log);

impl GpioSink for FakeGpio {
    fn configure_output(&mut self, pin: u8) {
        self.0.push(Event::Configure(pin));
    }

    fn set_level(&mut self, pin: u8, state: PinState) {
        self.0.push(Event::Level(pin, state));
    }
}

pub struct FakeTimer {
    pub log: Log,
    pub fail: Arc<AtomicBool>,
}

impl TickSource for FakeTimer {
    fn start(&mut self, period: Duration) -> led4_mux::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::TimerInitFailed);
        }
        self.log.push(Event::Start(period));
        Ok(())
    }

    fn stop(&mut self) {
        self.log.push(Event::Stop);
    }
}

/// Millisecond clock moved by hand.
#[derive(Debug, Clone, Default)]
pub struct FakeClock(Arc<AtomicU64>);

impl FakeClock {
    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.0.load(Ordering::SeqCst))
    }
}

pub struct FakeDelay(pub Log);

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.0.push(Event::DelayMs(ms));
    }
}

pub type TestDisplay = Led4<FakeGpio, FakeTimer, FakeClock>;

/// A leaked display wired to fakes, with handles to observe and steer them.
pub struct Rig {
    pub display: &'static TestDisplay,
    pub slot: &'static TickSlot,
    pub log: Log,
    pub clock: FakeClock,
    pub timer_fails: Arc<AtomicBool>,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(PinConfig::new(SEGMENT_PINS, DIGIT_PINS))
    }

    pub fn with_config(config: PinConfig) -> Self {
        Self::with_slot(config, Box::leak(Box::new(TickSlot::new())))
    }

    pub fn with_slot(config: PinConfig, slot: &'static TickSlot) -> Self {
        let log = Log::default();
        let clock = FakeClock::default();
        let timer_fails = Arc::new(AtomicBool::new(false));
        let display = Box::leak(Box::new(Led4::new(
            config,
            FakeGpio(log.clone()),
            FakeTimer {
                log: log.clone(),
                fail: Arc::clone(&timer_fails),
            },
            clock.clone(),
            slot,
        )));
        Self {
            display,
            slot,
            log,
            clock,
            timer_fails,
        }
    }

    /// A display that has been through `begin`, with the log cleared.
    pub fn started() -> Self {
        let rig = Self::new();
        rig.display.begin().expect("begin");
        rig.log.take();
        rig
    }
}
