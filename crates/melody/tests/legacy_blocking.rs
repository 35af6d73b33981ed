//! Foreground playback on the legacy buzzer, including the loop-until-
//! cancelled pattern used by the kit's demo programs.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use core::sync::atomic::{AtomicBool, Ordering};

use melody::{duration, play_blocking, LegacyBuzzer, Note, Shared, TimingProfile};
use timebase::{TickService, WaitOutcome};
use tracer_hal::mocks::{MockPin, MockTickTimer, MockToneTimer};

type Buzzer = LegacyBuzzer<MockToneTimer, MockPin>;

static SCORE: [Note; 3] = [
    Note::new(358, duration::EIGHTH),
    Note::rest(duration::SIXTEENTH),
    Note::new(179, duration::EIGHTH),
];

fn buzzer() -> Shared<Buzzer> {
    let shared = Shared::new();
    shared.install(Buzzer::new(MockToneTimer::new(), MockPin::new()));
    shared
}

#[test]
fn single_pass_holds_each_note_for_its_length() {
    let shared = buzzer();
    let ticks = TickService::new(MockTickTimer::running(1, 71_999));

    let start = ticks.now();
    assert_eq!(play_blocking(&shared, &ticks, &SCORE, 132, 0), WaitOutcome::Elapsed);

    let expected: u32 = SCORE
        .iter()
        .map(|n| TimingProfile::LEGACY.legacy_note_ms(n.duration, 132))
        .sum();
    assert!(ticks.elapsed_since(start) >= expected);
    assert!(!shared.is_playing(), "buzzer left on after the last note");
}

#[test]
fn looping_play_ends_on_cancel() {
    let shared = buzzer();
    let ticks = TickService::new(MockTickTimer::running(1, 71_999));
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        s.spawn(|| {
            // Let a few passes go by, then keep cancelling until it ends
            while ticks.now() < 5_000 && !done.load(Ordering::SeqCst) {
                std::thread::yield_now();
            }
            while !done.load(Ordering::SeqCst) {
                ticks.cancel();
                std::thread::yield_now();
            }
        });
        let outcome = play_blocking(&shared, &ticks, &SCORE, 132, 250);
        done.store(true, Ordering::SeqCst);
        assert_eq!(outcome, WaitOutcome::Cancelled);
    });

    assert!(!shared.is_playing(), "cancelled play left the buzzer on");
}
