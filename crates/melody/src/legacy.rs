//! Legacy start/stop buzzer.
//!
//! The robot kit's stock driver: the counter runs undivided at 72 MHz
//! with a fixed 0x10000-count cycle on MR3, and MR2 accumulates the half
//! period exactly like PWM mode. There is no sequencing in the interrupt;
//! [`play_blocking`] walks the score in the foreground, holding each note
//! with [`TickService::wait`].

use embedded_hal::digital::OutputPin;
use tracer_hal::{MatchChannel, MatchFlags, TickTimer, ToneTimer, ToneTimerSetup};

use timebase::{TickService, WaitOutcome};

use crate::score::Note;
use crate::shared::{Shared, TonePlayer};
use crate::strategy::{self, Voice};
use crate::timing::TimingProfile;

/// MR3: counts per cycle.
const CYCLE: u32 = 0x0001_0000;
/// MR2 after power-up.
const PHASE_AT_INIT: u32 = 0x0001_1000;
/// MR2 after a stop.
const PHASE_AT_STOP: u32 = 0x0001_3000;

/// Foreground-driven buzzer on the tone timer.
pub struct LegacyBuzzer<T, P> {
    timer: T,
    pin: P,
    voice: Voice,
    pitch_scale: u32,
}

impl<T: ToneTimer, P: OutputPin> LegacyBuzzer<T, P> {
    /// Take the tone timer and pin and start the free-running cycle.
    ///
    /// The interrupt stays disabled until [`Self::start`].
    pub fn new(mut timer: T, mut pin: P) -> Self {
        timer.set_irq_enabled(false);
        timer.configure(ToneTimerSetup {
            prescale: 0,
            interrupts: MatchFlags::MR2 | MatchFlags::MR3,
            reset_on: Some(MatchChannel::Mr3),
            pwm_outputs: MatchFlags::MR2,
        });
        timer.take_flags();
        timer.set_match(MatchChannel::Mr3, CYCLE);
        timer.set_match(MatchChannel::Mr2, PHASE_AT_INIT);
        timer.restart();
        pin.set_low().ok();
        Self {
            timer,
            pin,
            voice: Voice::default(),
            pitch_scale: TimingProfile::LEGACY.pitch_scale,
        }
    }

    /// Set the pitch used by the next [`Self::start`].
    pub fn set_pitch(&mut self, pitch: u16) {
        self.voice.increment = u32::from(pitch).saturating_mul(self.pitch_scale);
    }

    /// Start sounding. No effect while already active.
    pub fn start(&mut self) {
        if self.voice.sounding {
            return;
        }
        let phase = self.timer.match_value(MatchChannel::Mr2);
        self.timer
            .set_match(MatchChannel::Mr2, phase.wrapping_add(self.voice.increment));
        self.voice.sounding = true;
        self.timer.take_flags();
        self.timer.set_irq_enabled(true);
    }

    /// Stop sounding and drive the pin low.
    ///
    /// The interrupt disables itself on its next run.
    pub fn stop(&mut self) {
        self.timer.take_flags();
        self.timer.set_match(MatchChannel::Mr2, PHASE_AT_STOP);
        self.voice.sounding = false;
        self.voice.silence(&mut self.pin);
    }

    /// `true` between [`Self::start`] and [`Self::stop`].
    pub fn is_active(&self) -> bool {
        self.voice.sounding
    }

    /// Tone interrupt body.
    pub fn on_interrupt(&mut self) {
        self.timer.take_flags();
        if self.voice.sounding {
            strategy::accumulate(&mut self.timer, &mut self.pin, &mut self.voice);
        } else {
            self.timer.set_irq_enabled(false);
        }
    }

    /// The tone timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The buzzer pin.
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Mutable access to the tone timer.
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}

impl<T: ToneTimer, P: OutputPin> TonePlayer for LegacyBuzzer<T, P> {
    fn stop(&mut self) {
        LegacyBuzzer::stop(self);
    }

    fn is_playing(&self) -> bool {
        self.is_active()
    }

    fn on_interrupt(&mut self) {
        LegacyBuzzer::on_interrupt(self);
    }
}

/// Play `score` in the foreground at `tempo` BPM (0 for the default).
///
/// With a nonzero `loop_ms` the score repeats after `loop_ms` milliseconds
/// until a wait is cancelled. Returns [`WaitOutcome::Cancelled`] as soon
/// as any wait is cancelled, with the buzzer stopped.
pub fn play_blocking<T, P, K>(
    buzzer: &Shared<LegacyBuzzer<T, P>>,
    ticks: &TickService<K>,
    score: &[Note],
    tempo: u16,
    loop_ms: u32,
) -> WaitOutcome
where
    T: ToneTimer,
    P: OutputPin,
    K: TickTimer,
{
    loop {
        for note in score {
            if !note.is_rest() {
                buzzer.lock(|b| {
                    b.set_pitch(note.pitch);
                    b.start();
                });
            }
            let hold = TimingProfile::LEGACY.legacy_note_ms(note.duration, tempo);
            let outcome = ticks.wait(hold);
            buzzer.stop();
            if outcome == WaitOutcome::Cancelled {
                return outcome;
            }
        }
        if ticks.wait(loop_ms) == WaitOutcome::Cancelled {
            return WaitOutcome::Cancelled;
        }
        if loop_ms == 0 {
            return WaitOutcome::Elapsed;
        }
    }
}
