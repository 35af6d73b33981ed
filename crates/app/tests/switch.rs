//! Switch debounce, click and hold against scripted pin levels.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use std::io::ErrorKind;

use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};
use embedded_hal_mock::eh1::MockError;
use timebase::TickService;
use tracer_app::switch::CLICK_HOLD_MS;
use tracer_app::{Switch, SwitchState};
use tracer_hal::mocks::MockTickTimer;

fn ticks() -> TickService<MockTickTimer> {
    TickService::new(MockTickTimer::running(1, 71_999))
}

fn levels(states: &[State]) -> Vec<Transaction> {
    states.iter().map(|&s| Transaction::get(s)).collect()
}

#[test]
fn released_switch_scans_off() {
    let ticks = ticks();
    let mut sw = Switch::new(PinMock::new(&levels(&[State::High, State::High])));
    assert_eq!(sw.scan(&ticks), SwitchState::Off);
    sw.free().done();
}

#[test]
fn bounce_is_rescanned_until_stable() {
    let ticks = ticks();
    let mut sw = Switch::new(PinMock::new(&levels(&[
        State::Low,
        State::High,
        State::High,
        State::Low,
        State::Low,
        State::Low,
    ])));
    assert_eq!(sw.scan(&ticks), SwitchState::On);
    assert!(ticks.now() >= 3 * 50, "each sample pair waits the debounce time");
    sw.free().done();
}

#[test]
fn click_waits_for_release() {
    let ticks = ticks();
    let mut sw = Switch::new(PinMock::new(&levels(&[
        State::Low,
        State::Low,
        State::Low,
        State::Low,
        State::High,
        State::High,
    ])));
    assert_eq!(sw.click(&ticks), SwitchState::On);
    sw.free().done();
}

#[test]
fn click_without_press_is_off() {
    let ticks = ticks();
    let mut sw = Switch::new(PinMock::new(&levels(&[State::High, State::High])));
    assert_eq!(sw.click(&ticks), SwitchState::Off);
    sw.free().done();
}

#[test]
fn standby_skips_idle_polls() {
    let ticks = ticks();
    let mut sw = Switch::new(PinMock::new(&levels(&[
        State::High,
        State::High,
        State::High,
        State::High,
        State::Low,
        State::Low,
        State::High,
        State::High,
    ])));
    sw.standby(&ticks);
    sw.free().done();
}

#[test]
fn short_press_is_a_click() {
    let ticks = ticks();
    let mut sw = Switch::new(PinMock::new(&levels(&[
        State::Low,
        State::Low,
        State::High,
        State::High,
    ])));
    assert_eq!(sw.click_hold(&ticks, CLICK_HOLD_MS), SwitchState::On);
    sw.free().done();
}

#[test]
fn long_press_is_a_hold() {
    let ticks = ticks();
    let mut sw = Switch::new(PinMock::new(&levels(&[
        State::Low,
        State::Low,
        State::Low,
        State::Low,
        State::Low,
        State::Low,
        State::Low,
        State::Low,
        State::High,
        State::High,
    ])));
    // Three more pressed scans at 50 ms each
    assert_eq!(sw.click_hold(&ticks, 120), SwitchState::Hold);
    sw.free().done();
}

#[test]
fn read_error_counts_as_released() {
    let ticks = ticks();
    let mut sw = Switch::new(PinMock::new(&[
        Transaction::get(State::Low).with_error(MockError::Io(ErrorKind::NotConnected)),
        Transaction::get(State::Low).with_error(MockError::Io(ErrorKind::NotConnected)),
    ]));
    assert_eq!(sw.scan(&ticks), SwitchState::Off);
    sw.free().done();
}
