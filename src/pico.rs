//! Raspberry Pi Pico glue: an Embassy-driven tick source and the uptime clock.
//!
//! [`TickerTrigger`] runs a small Embassy task that calls [`TickSlot::fire`] once per
//! refresh interval. [`Led4::begin`](crate::Led4::begin) arms it through
//! [`TickSource::start`] and [`Led4::end`](crate::Led4::end) parks it again.
//!
//! Spawn the task on an [`InterruptExecutor`](embassy_executor::InterruptExecutor) so
//! the scan preempts application code. A thread-mode spawner works too, through
//! [`Spawner::make_send`](embassy_executor::Spawner::make_send), but then the display
//! only refreshes while the application awaits.
//!
//! ```no_run
//! #![no_std]
//! #![no_main]
//!
//! use embassy_rp::gpio::{Level, Output};
//! use led4_mux::pico::{SystemClock, TickerStatic, TickerTrigger};
//! use led4_mux::{Led4, OutputArray, PinConfig};
//! use static_cell::StaticCell;
//! # use embassy_executor::SendSpawner;
//! # use core::panic::PanicInfo;
//! # #[panic_handler]
//! # fn panic(_: &PanicInfo) -> ! { loop {} }
//!
//! type Display = Led4<OutputArray<Output<'static>, 12>, TickerTrigger, SystemClock>;
//!
//! fn example(p: embassy_rp::Peripherals, spawner: SendSpawner) -> led4_mux::Result<()> {
//!     static TICKER_STATIC: TickerStatic = TickerTrigger::new_static();
//!     static DISPLAY: StaticCell<Display> = StaticCell::new();
//!
//!     let pins = OutputArray::new([
//!         (2, Output::new(p.PIN_2, Level::Low)),
//!         (3, Output::new(p.PIN_3, Level::Low)),
//!         (4, Output::new(p.PIN_4, Level::Low)),
//!         (5, Output::new(p.PIN_5, Level::Low)),
//!         (6, Output::new(p.PIN_6, Level::Low)),
//!         (7, Output::new(p.PIN_7, Level::Low)),
//!         (8, Output::new(p.PIN_8, Level::Low)),
//!         (9, Output::new(p.PIN_9, Level::Low)),
//!         (10, Output::new(p.PIN_10, Level::Low)),
//!         (11, Output::new(p.PIN_11, Level::Low)),
//!         (12, Output::new(p.PIN_12, Level::Low)),
//!         (13, Output::new(p.PIN_13, Level::Low)),
//!     ]);
//!     let trigger = TickerTrigger::new(&TICKER_STATIC, spawner)?;
//!     let display: &'static Display = DISPLAY.init(Led4::new(
//!         PinConfig::new(&[2, 3, 4, 5, 6, 7, 8, 9], &[10, 11, 12, 13]),
//!         pins,
//!         trigger,
//!         SystemClock,
//!         TICKER_STATIC.slot(),
//!     ));
//!     display.begin()?;
//!     display.set_number(1234, None);
//!     Ok(())
//! }
//! ```

use embassy_executor::SendSpawner;
use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Instant, Ticker};

use crate::Result;
use crate::tick::{Clock, TickSlot, TickSource};

/// [`Clock`] reading the Embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Static resources for a [`TickerTrigger`]: the slot it fires and its command signal.
pub struct TickerStatic {
    slot: TickSlot,
    period: Signal<CriticalSectionRawMutex, Option<Duration>>,
}

impl TickerStatic {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: TickSlot::new(),
            period: Signal::new(),
        }
    }

    /// The slot a display registers in to be driven by this ticker.
    #[must_use]
    pub const fn slot(&'static self) -> &'static TickSlot {
        &self.slot
    }
}

impl Default for TickerStatic {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`TickSource`] backed by an Embassy [`Ticker`] task.
pub struct TickerTrigger(&'static TickerStatic);

impl TickerTrigger {
    /// Creates static resources for the ticker.
    #[must_use]
    pub const fn new_static() -> TickerStatic {
        TickerStatic::new()
    }

    /// Spawns the ticker task, parked until [`TickSource::start`].
    ///
    /// `spawner` is usually the one returned by `InterruptExecutor::start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskSpawn`](crate::Error::TaskSpawn) if the task is already running.
    pub fn new(ticker_static: &'static TickerStatic, spawner: SendSpawner) -> Result<Self> {
        let token = tick_task(ticker_static)?;
        spawner.spawn(token);
        Ok(Self(ticker_static))
    }
}

impl TickSource for TickerTrigger {
    fn start(&mut self, period: Duration) -> Result<()> {
        self.0.period.signal(Some(period));
        Ok(())
    }

    fn stop(&mut self) {
        self.0.period.signal(None);
    }
}

#[embassy_executor::task]
async fn tick_task(ticker_static: &'static TickerStatic) -> ! {
    let mut period = None;
    loop {
        period = match period {
            None => ticker_static.period.wait().await,
            Some(every) => run_ticker(ticker_static, every).await,
        };
    }
}

/// Fires the slot every `every` until the next start or stop command, which it returns.
async fn run_ticker(ticker_static: &'static TickerStatic, every: Duration) -> Option<Duration> {
    let mut ticker = Ticker::every(every);
    loop {
        match select(ticker.next(), ticker_static.period.wait()).await {
            Either::First(()) => ticker_static.slot.fire(),
            Either::Second(command) => return command,
        }
    }
}
