//! Float counter on a 4-digit 7-segment display, Raspberry Pi Pico.
//!
//! Counts 0.00, 0.01, ... 99.99 in steps of 0.01 every 100 ms, then wraps. The
//! multiplexing runs from the ticker task on a software-interrupt executor, so the
//! loop below only renders.
#![no_std]
#![no_main]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt::{self, InterruptExt, Priority};
use embassy_time::{Duration, Instant, Ticker};
use led4_mux::pico::{SystemClock, TickerStatic, TickerTrigger};
use led4_mux::{Led4, OutputArray, PinConfig};
use panic_probe as _;
use static_cell::StaticCell;

type Display = Led4<OutputArray<Output<'static>, 12>, TickerTrigger, SystemClock>;

const SEGMENT_PINS: &[u8] = &[2, 3, 4, 5, 6, 7, 8, 9];
const DIGIT_PINS: &[u8] = &[10, 11, 12, 13];

const UPDATE_INTERVAL: Duration = Duration::from_millis(100);
const LOG_INTERVAL: Duration = Duration::from_millis(500);
const INCREMENT: f32 = 0.01;
const MAX_COUNTER: f32 = 99.99;

/// Runs the ticker task from a software interrupt so the scan preempts `main`.
#[expect(unsafe_code, reason = "Interrupt handlers and the executor hook are unsafe")]
mod high_priority {
    use embassy_executor::InterruptExecutor;
    use embassy_rp::interrupt;

    pub static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

    #[interrupt]
    unsafe fn SWI_IRQ_1() {
        // SAFETY: SWI_IRQ_1 is reserved for this executor.
        unsafe { EXECUTOR_HIGH.on_interrupt() }
    }
}

#[embassy_executor::main]
pub async fn main(_spawner: Spawner) -> ! {
    let Err(err) = run().await;
    core::panic!("{err}");
}

async fn run() -> led4_mux::Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    static TICKER_STATIC: TickerStatic = TickerTrigger::new_static();
    static DISPLAY: StaticCell<Display> = StaticCell::new();

    let pins = OutputArray::new([
        (2, Output::new(p.PIN_2, Level::Low)),
        (3, Output::new(p.PIN_3, Level::Low)),
        (4, Output::new(p.PIN_4, Level::Low)),
        (5, Output::new(p.PIN_5, Level::Low)),
        (6, Output::new(p.PIN_6, Level::Low)),
        (7, Output::new(p.PIN_7, Level::Low)),
        (8, Output::new(p.PIN_8, Level::Low)),
        (9, Output::new(p.PIN_9, Level::Low)),
        (10, Output::new(p.PIN_10, Level::Low)),
        (11, Output::new(p.PIN_11, Level::Low)),
        (12, Output::new(p.PIN_12, Level::Low)),
        (13, Output::new(p.PIN_13, Level::Low)),
    ]);
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner_high = high_priority::EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    let trigger = TickerTrigger::new(&TICKER_STATIC, spawner_high)?;
    let display: &'static Display = DISPLAY.init(Led4::new(
        PinConfig::new(SEGMENT_PINS, DIGIT_PINS),
        pins,
        trigger,
        SystemClock,
        TICKER_STATIC.slot(),
    ));

    display.begin()?;
    // Below 1.0 the integer zero goes dark: " . 50" rather than "0.050".
    display.set_leading_zeros(false);

    let mut counter = 0.0_f32;
    display.set_float(counter)?;
    info!("Counter started at 0.00");

    let mut ticker = Ticker::every(UPDATE_INTERVAL);
    let mut last_log = Instant::now();
    loop {
        ticker.next().await;

        counter += INCREMENT;
        if counter > MAX_COUNTER {
            counter = 0.0;
            info!("Counter reset to 0.00");
        }
        display.set_float(counter)?;
        display.refresh();

        if last_log.elapsed() >= LOG_INTERVAL {
            last_log = Instant::now();
            info!("Counter: {} ({})", counter, display.frame().to_text().as_str());
        }
    }
}
