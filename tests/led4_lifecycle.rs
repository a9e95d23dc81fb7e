//! Lifecycle, multiplexing, blinking and wiring-test behavior against recording fakes.
#![cfg(test)]

mod support;

use std::sync::atomic::Ordering;

use embassy_time::Duration;
use embedded_hal::digital::PinState;
use led4_mux::glyph::glyph;
use led4_mux::{
    BlinkState, DEFAULT_WIRING_HOLD, Error, Frame, Leds, MAX_REFRESH_INTERVAL_MS, PinConfig,
    TickSlot,
};
use support::{DIGIT_PINS, Event, FakeDelay, Rig, SEGMENT_PINS};

const DEFAULT_PERIOD: Duration = Duration::from_millis(3);

/// Level changes one tick should make: `off` dark, segments from `bits`, `on` lit.
fn tick_levels(off: u8, bits: u8, on: u8) -> Vec<(u8, PinState)> {
    let mut levels = vec![(off, PinState::Low)];
    let mut mask = Leds::SEG_A;
    for &pin in SEGMENT_PINS {
        levels.push((pin, PinState::from(bits & mask != 0)));
        mask >>= 1;
    }
    levels.push((on, PinState::High));
    levels
}

fn levels_for(pins: &[u8], state: PinState) -> impl Iterator<Item = (u8, PinState)> + '_ {
    pins.iter().map(move |&pin| (pin, state))
}

// ----------------------------------------------------------------------------
// begin / end
// ----------------------------------------------------------------------------

#[test]
fn begin_configures_pins_then_arms_the_timer() {
    let rig = Rig::new();
    assert!(!rig.display.is_initialized());
    rig.display.begin().expect("begin");

    let mut expected: Vec<Event> = SEGMENT_PINS
        .iter()
        .chain(DIGIT_PINS)
        .map(|&pin| Event::Configure(pin))
        .collect();
    expected.extend(levels_for(SEGMENT_PINS, PinState::Low).map(|(pin, state)| Event::Level(pin, state)));
    expected.extend(levels_for(DIGIT_PINS, PinState::Low).map(|(pin, state)| Event::Level(pin, state)));
    expected.push(Event::Start(DEFAULT_PERIOD));

    assert_eq!(rig.log.take(), expected);
    assert!(rig.display.is_initialized());
    assert!(rig.slot.is_registered());
    assert_eq!(rig.display.last_error(), None);
}

#[test]
fn invalid_pin_configs_fail_before_touching_gpio() {
    let cases = [
        (PinConfig::new(&[], DIGIT_PINS), Error::NullPointer),
        (PinConfig::new(SEGMENT_PINS, &[]), Error::NullPointer),
        (PinConfig::new(&[2, 3, 4, 5, 6, 7, 8], DIGIT_PINS), Error::InvalidArgument),
        (PinConfig::new(SEGMENT_PINS, &[10, 11, 12, 13, 14]), Error::InvalidArgument),
        (PinConfig::new(&[2, 3, 4, 5, 6, 7, 8, 48], DIGIT_PINS), Error::InvalidPin),
        (PinConfig::new(SEGMENT_PINS, &[10, 11, 12, 200]), Error::InvalidPin),
        (PinConfig::new(SEGMENT_PINS, &[10, 11, 12, 30]).with_max_pin(29), Error::InvalidPin),
    ];
    for (config, error) in cases {
        let rig = Rig::with_config(config);
        assert_eq!(rig.display.begin(), Err(error), "{config:?}");
        assert_eq!(rig.display.last_error(), Some(error));
        assert!(rig.log.take().is_empty(), "{config:?}");
        assert!(!rig.display.is_initialized());
        assert!(!rig.slot.is_registered());
    }
}

#[test]
fn highest_pin_is_accepted() {
    let rig = Rig::with_config(PinConfig::new(SEGMENT_PINS, &[10, 11, 12, 47]));
    rig.display.begin().expect("pin 47 is valid");
}

#[test]
fn timer_failure_leaves_the_display_stopped() {
    let rig = Rig::new();
    rig.timer_fails.store(true, Ordering::SeqCst);
    assert_eq!(rig.display.begin(), Err(Error::TimerInitFailed));
    assert_eq!(rig.display.last_error(), Some(Error::TimerInitFailed));
    assert!(!rig.display.is_initialized());
    assert!(!rig.slot.is_registered());

    rig.timer_fails.store(false, Ordering::SeqCst);
    rig.display.begin().expect("begin after the timer recovers");
    assert_eq!(rig.display.last_error(), None);
}

#[test]
fn one_display_per_slot() {
    let slot: &'static TickSlot = Box::leak(Box::new(TickSlot::new()));
    let config = PinConfig::new(SEGMENT_PINS, DIGIT_PINS);
    let first = Rig::with_slot(config, slot);
    let second = Rig::with_slot(config, slot);

    first.display.begin().expect("first display");
    assert_eq!(second.display.begin(), Err(Error::TimerInitFailed));
    assert!(second.log.take().is_empty());

    first.display.end();
    second.display.begin().expect("slot released by end");
}

#[test]
fn begin_twice_reconfigures() {
    let rig = Rig::started();
    rig.display.begin().expect("second begin");
    assert!(rig.display.is_initialized());
    assert!(rig.log.take().contains(&Event::Start(DEFAULT_PERIOD)));
}

#[test]
fn end_turns_everything_off_and_blanks() {
    let rig = Rig::started();
    rig.display.set_number(1234, None);
    rig.display.end();

    let mut expected = vec![Event::Stop];
    expected.extend(levels_for(DIGIT_PINS, PinState::Low).map(|(pin, state)| Event::Level(pin, state)));
    expected.extend(levels_for(SEGMENT_PINS, PinState::Low).map(|(pin, state)| Event::Level(pin, state)));
    assert_eq!(rig.log.take(), expected);
    assert_eq!(rig.display.frame(), Frame::BLANK);
    assert!(!rig.display.is_initialized());
    assert!(!rig.slot.is_registered());

    rig.slot.fire();
    rig.display.multiplex();
    assert!(rig.log.take().is_empty());
}

#[test]
fn end_before_begin_is_harmless() {
    let rig = Rig::new();
    rig.display.end();
    assert!(!rig.display.is_initialized());
    assert_eq!(rig.display.frame(), Frame::BLANK);
}

// ----------------------------------------------------------------------------
// Multiplexing
// ----------------------------------------------------------------------------

#[test]
fn ticks_before_begin_do_nothing() {
    let rig = Rig::new();
    rig.display.set_number(8888, None);
    rig.display.multiplex();
    rig.slot.fire();
    assert!(rig.log.take().is_empty());
}

#[test]
fn each_tick_lights_the_next_digit() {
    let rig = Rig::started();
    rig.display.set_number(1234, Some(1));
    let bits = rig.display.frame().bits();

    let mut expected = Vec::new();
    let mut previous = DIGIT_PINS[3];
    for _round in 0..2 {
        for (&pin, &cell) in DIGIT_PINS.iter().zip(&bits) {
            rig.slot.fire();
            expected.extend(tick_levels(previous, cell, pin));
            previous = pin;
        }
    }
    assert_eq!(rig.log.take_levels(), expected);
}

#[test]
fn renderer_changes_show_on_the_next_tick() {
    let rig = Rig::started();
    rig.display.set_text("A").expect("text");
    rig.slot.fire();
    assert_eq!(
        rig.log.take_levels(),
        tick_levels(DIGIT_PINS[3], glyph('A'), DIGIT_PINS[0])
    );

    rig.display.set_text("-").expect("text");
    rig.slot.fire();
    assert_eq!(
        rig.log.take_levels(),
        tick_levels(DIGIT_PINS[0], Leds::BLANK, DIGIT_PINS[1])
    );
}

#[test]
fn active_low_digits() {
    let config = PinConfig::new(SEGMENT_PINS, DIGIT_PINS).with_digit_active(PinState::Low);
    let rig = Rig::with_config(config);
    rig.display.begin().expect("begin");
    let parked: Vec<_> = rig
        .log
        .take_levels()
        .into_iter()
        .filter(|(pin, _)| DIGIT_PINS.contains(pin))
        .collect();
    assert_eq!(parked, levels_for(DIGIT_PINS, PinState::High).collect::<Vec<_>>());

    rig.display.set_number(8, None);
    rig.slot.fire();
    let levels = rig.log.take_levels();
    assert_eq!(levels.first(), Some(&(DIGIT_PINS[3], PinState::High)));
    assert_eq!(levels.last(), Some(&(DIGIT_PINS[0], PinState::Low)));
}

// ----------------------------------------------------------------------------
// Blinking
// ----------------------------------------------------------------------------

#[test]
fn blink_alternates_lit_and_dark_phases() {
    let rig = Rig::started();
    rig.display.set_number(1234, None);
    rig.display.start_blink(Duration::from_millis(500));
    assert_eq!(rig.display.blink_state(), BlinkState::BlinkingAndOn);
    assert!(rig.display.is_blinking());

    rig.clock.advance(499);
    rig.display.refresh();
    assert_eq!(rig.display.blink_state(), BlinkState::BlinkingAndOn);

    rig.clock.advance(1);
    rig.display.refresh();
    assert_eq!(rig.display.blink_state(), BlinkState::BlinkingButOff);

    // Dark phase: the previous digit goes off and nothing else is driven.
    rig.slot.fire();
    assert_eq!(rig.log.take_levels(), vec![(DIGIT_PINS[3], PinState::Low)]);

    rig.clock.advance(500);
    rig.display.refresh();
    assert_eq!(rig.display.blink_state(), BlinkState::BlinkingAndOn);
    rig.slot.fire();
    let bits = rig.display.frame().bits();
    assert_eq!(
        rig.log.take_levels(),
        tick_levels(DIGIT_PINS[0], bits[1], DIGIT_PINS[1])
    );
}

#[test]
fn stop_blink_keeps_the_display_lit() {
    let rig = Rig::started();
    rig.display.start_blink(Duration::from_millis(100));
    rig.clock.advance(100);
    rig.display.refresh();
    assert_eq!(rig.display.blink_state(), BlinkState::BlinkingButOff);

    rig.display.stop_blink();
    assert_eq!(rig.display.blink_state(), BlinkState::Solid);
    for _ in 0..10 {
        rig.clock.advance(100);
        rig.display.refresh();
        assert_eq!(rig.display.blink_state(), BlinkState::Solid);
    }
    rig.slot.fire();
    let levels = rig.log.take_levels();
    assert_eq!(levels.last(), Some(&(DIGIT_PINS[0], PinState::High)));
}

#[test]
fn refresh_without_blinking_does_nothing() {
    let rig = Rig::started();
    rig.clock.advance(10_000);
    rig.display.refresh();
    assert_eq!(rig.display.blink_state(), BlinkState::Solid);
    assert!(rig.log.take().is_empty());
}

// ----------------------------------------------------------------------------
// Refresh interval
// ----------------------------------------------------------------------------

#[test]
fn refresh_interval_defaults_to_3_ms() {
    assert_eq!(Rig::new().display.refresh_interval(), DEFAULT_PERIOD);
}

#[test]
fn refresh_interval_before_begin_is_used_by_begin() {
    let rig = Rig::new();
    rig.display.set_refresh_interval(10).expect("not running");
    assert!(rig.log.take().is_empty());
    rig.display.begin().expect("begin");
    assert_eq!(rig.log.take().last(), Some(&Event::Start(Duration::from_millis(10))));
}

#[test]
fn refresh_interval_rearms_a_running_timer() {
    let rig = Rig::started();
    rig.display.set_refresh_interval(7).expect("re-arm");
    assert_eq!(rig.log.take(), vec![Event::Stop, Event::Start(Duration::from_millis(7))]);

    rig.display.set_refresh_interval(0).expect("clamped");
    assert_eq!(rig.display.refresh_interval(), Duration::from_millis(1));
    assert_eq!(rig.log.take(), vec![Event::Stop, Event::Start(Duration::from_millis(1))]);

    rig.display
        .set_refresh_interval(MAX_REFRESH_INTERVAL_MS)
        .expect("upper bound");
    assert_eq!(rig.display.refresh_interval(), Duration::from_millis(255));
}

#[test]
fn failed_rearm_stops_the_display() {
    let rig = Rig::started();
    rig.timer_fails.store(true, Ordering::SeqCst);
    assert_eq!(rig.display.set_refresh_interval(5), Err(Error::TimerInitFailed));
    assert_eq!(rig.display.last_error(), Some(Error::TimerInitFailed));
    assert!(!rig.display.is_initialized());
    assert!(!rig.slot.is_registered());
}

// ----------------------------------------------------------------------------
// Wiring test
// ----------------------------------------------------------------------------

#[test]
fn wiring_test_requires_begin() {
    let rig = Rig::new();
    let mut delay = FakeDelay(rig.log.clone());
    assert_eq!(
        rig.display.test_wiring(&mut delay, Duration::from_millis(10)),
        Err(Error::NotInitialized)
    );
    assert_eq!(rig.display.last_error(), Some(Error::NotInitialized));
    assert!(rig.log.take().is_empty());
}

#[test]
fn wiring_test_lights_each_segment_on_all_digits() {
    let rig = Rig::started();
    let mut delay = FakeDelay(rig.log.clone());
    rig.display
        .test_wiring(&mut delay, DEFAULT_WIRING_HOLD)
        .expect("wiring test");

    let mut expected = vec![Event::Stop];
    expected.extend(levels_for(SEGMENT_PINS, PinState::Low).map(|(pin, state)| Event::Level(pin, state)));
    expected.extend(levels_for(DIGIT_PINS, PinState::High).map(|(pin, state)| Event::Level(pin, state)));
    for &pin in SEGMENT_PINS {
        expected.push(Event::Level(pin, PinState::High));
        expected.push(Event::DelayMs(500));
        expected.push(Event::Level(pin, PinState::Low));
    }
    expected.extend(levels_for(DIGIT_PINS, PinState::Low).map(|(pin, state)| Event::Level(pin, state)));
    expected.extend(levels_for(SEGMENT_PINS, PinState::Low).map(|(pin, state)| Event::Level(pin, state)));
    expected.push(Event::Start(DEFAULT_PERIOD));

    assert_eq!(rig.log.take(), expected);
    assert!(rig.display.is_initialized());
    assert_eq!(rig.display.last_error(), None);
}

#[test]
fn multiplexing_resumes_after_the_wiring_test() {
    let rig = Rig::started();
    rig.display.set_number(5, None);
    let mut delay = FakeDelay(rig.log.clone());
    rig.display
        .test_wiring(&mut delay, Duration::from_millis(1))
        .expect("wiring test");
    rig.log.take();

    rig.slot.fire();
    assert_eq!(rig.log.take_levels().len(), 1 + SEGMENT_PINS.len() + 1);
}
