//! Tour of the display features on a Raspberry Pi Pico: numbers, floats, text,
//! decimal point placement, blinking, the error display and integer hundredths.
//!
//! Steps every 2 seconds through a fixed script, then counts hundredths for a
//! while, then starts over.
#![no_std]
#![no_main]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt::{self, InterruptExt, Priority};
use embassy_time::{Duration, Instant, Timer};
use led4_mux::pico::{SystemClock, TickerStatic, TickerTrigger};
use led4_mux::{Led4, OutputArray, PinConfig};
use panic_probe as _;
use static_cell::StaticCell;

type Display = Led4<OutputArray<Output<'static>, 12>, TickerTrigger, SystemClock>;

const SEGMENT_PINS: &[u8] = &[2, 3, 4, 5, 6, 7, 8, 9];
const DIGIT_PINS: &[u8] = &[10, 11, 12, 13];

const DEMO_STEP_INTERVAL: Duration = Duration::from_secs(2);
const HUNDREDTHS_STEP_INTERVAL: Duration = Duration::from_millis(50);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One scripted step of the tour.
#[derive(Debug, Clone, Copy, defmt::Format)]
enum DemoStep {
    Number,
    Float,
    Help,
    Good,
    LeadingDecimal,
    StartBlink,
    StopBlink,
    NotANumber,
    Hundredths,
}

impl DemoStep {
    const ALL: [Self; 9] = [
        Self::Number,
        Self::Float,
        Self::Help,
        Self::Good,
        Self::LeadingDecimal,
        Self::StartBlink,
        Self::StopBlink,
        Self::NotANumber,
        Self::Hundredths,
    ];

    async fn execute(self, display: &'static Display) -> led4_mux::Result<()> {
        info!("Demo step: {}", self);
        match self {
            Self::Number => display.set_number(1234, None),
            Self::Float => display.set_float(56.78)?,
            Self::Help => display.set_text("HELP")?,
            Self::Good => display.set_text("GOOD")?,
            Self::LeadingDecimal => display.set_number(5678, Some(0)),
            Self::StartBlink => display.start_blink(Duration::from_millis(300)),
            Self::StopBlink => {
                display.stop_blink();
                display.set_text("END")?;
            }
            Self::NotANumber => {
                // Shows "Err " and reports the error
                if let Err(err) = display.set_float(f32::NAN) {
                    info!("set_float(NaN) failed as expected: {}", err);
                }
            }
            Self::Hundredths => {
                count_hundredths(display).await;
                return Ok(());
            }
        }
        hold(display, DEMO_STEP_INTERVAL).await;
        Ok(())
    }
}

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
    display.set_leading_zeros(false);
    info!("Display initialized, running demo");

    loop {
        for step in DemoStep::ALL {
            step.execute(display).await?;
        }
        info!("Demo complete, looping");
    }
}

/// Integer-only counting: 0.00 to 99.90 in steps of 0.10.
async fn count_hundredths(display: &'static Display) {
    for hundredths in (0..=9999_u16).step_by(10) {
        display.set_hundredths(hundredths, Some(1));
        Timer::after(HUNDREDTHS_STEP_INTERVAL).await;
    }
}

/// Waits `duration`, polling the blink phase.
async fn hold(display: &'static Display, duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        display.refresh();
        Timer::after(POLL_INTERVAL).await;
    }
}
