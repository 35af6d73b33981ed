//! Tone generation strategies.
//!
//! Each strategy wires the tone timer's match registers differently, so
//! the choice is made at build time (`tone-toggle` or `tone-pwm`) and the
//! sequencer is generic over it. Strategies are stateless; the per-note
//! output state lives in a [`Voice`] owned by the sequencer.
//!
//! ```text
//! toggle:  MR3 = half period, reset on MR3      pin flips on every MR3
//! pwm:     MR3 = fixed cycle, reset on MR3      MR2 accumulates the half
//!          MR2 = phase                          period across cycles
//! ```

use core::cmp::Ordering;

use embedded_hal::digital::{OutputPin, PinState};
use tracer_hal::{MatchChannel, MatchFlags, ToneTimer, ToneTimerSetup};

use crate::score::Note;
use crate::timing::TimingProfile;

/// Output state of the note being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Voice {
    /// `false` for rests and loop silences.
    pub sounding: bool,
    /// Last level driven on the buzzer pin.
    pub level: bool,
    /// PWM mode: phase added to MR2 per half period.
    pub increment: u32,
}

impl Voice {
    /// Drive the pin to the opposite level.
    pub fn flip<P: OutputPin>(&mut self, pin: &mut P) {
        self.level = !self.level;
        pin.set_state(PinState::from(self.level)).ok();
    }

    /// Drive the pin low.
    pub fn silence<P: OutputPin>(&mut self, pin: &mut P) {
        self.level = false;
        pin.set_low().ok();
    }
}

/// Render-one-tick interface shared by the background strategies.
pub trait ToneStrategy {
    /// Short name for logs.
    const NAME: &'static str;

    /// Match register wiring.
    fn setup(profile: &TimingProfile) -> ToneTimerSetup;

    /// Idle match values, applied after [`ToneTimer::configure`] and after
    /// every stop.
    fn release<T: ToneTimer>(timer: &mut T, profile: &TimingProfile);

    /// Interrupts that `note` lasts at `tempo`.
    fn note_ticks(profile: &TimingProfile, note: Note, tempo: u16) -> u32;

    /// Interrupts that a loop silence of `interval` lasts at `tempo`.
    fn silence_ticks(profile: &TimingProfile, interval: u32, tempo: u16) -> u32 {
        let reference = Self::note_ticks(profile, profile.reference_note(), tempo);
        TimingProfile::interval_ticks(reference, interval, tempo)
    }

    /// Load `note` into the timer. Rests are loaded silent.
    fn load_note<T: ToneTimer>(timer: &mut T, profile: &TimingProfile, voice: &mut Voice, note: Note);

    /// Load a loop silence.
    fn load_silence<T: ToneTimer>(timer: &mut T, profile: &TimingProfile, voice: &mut Voice);

    /// One interrupt's worth of output for a note that keeps sounding.
    fn render<T: ToneTimer, P: OutputPin>(
        timer: &mut T,
        pin: &mut P,
        voice: &mut Voice,
        flags: MatchFlags,
    );
}

// ─── Toggle mode ────────────────────────────────────────────────────────────

/// MR3 holds the half period and resets the counter; the pin flips on
/// every match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleMode;

impl ToneStrategy for ToggleMode {
    const NAME: &'static str = "toggle";

    fn setup(profile: &TimingProfile) -> ToneTimerSetup {
        ToneTimerSetup {
            prescale: profile.prescale.saturating_sub(1),
            interrupts: MatchFlags::MR3,
            reset_on: Some(MatchChannel::Mr3),
            pwm_outputs: MatchFlags::NONE,
        }
    }

    fn release<T: ToneTimer>(_timer: &mut T, _profile: &TimingProfile) {}

    fn note_ticks(profile: &TimingProfile, note: Note, tempo: u16) -> u32 {
        profile.toggle_note_ticks(note, tempo)
    }

    fn load_note<T: ToneTimer>(timer: &mut T, profile: &TimingProfile, voice: &mut Voice, note: Note) {
        let pitch = if note.is_rest() {
            profile.rest_pitch()
        } else {
            note.pitch
        };
        timer.set_match(MatchChannel::Mr3, profile.match_count(pitch));
        voice.sounding = !note.is_rest();
    }

    fn load_silence<T: ToneTimer>(timer: &mut T, profile: &TimingProfile, voice: &mut Voice) {
        // Silence ticks are counted against the reference pitch
        timer.set_match(MatchChannel::Mr3, profile.match_count(profile.reference_pitch()));
        voice.sounding = false;
    }

    fn render<T: ToneTimer, P: OutputPin>(
        _timer: &mut T,
        pin: &mut P,
        voice: &mut Voice,
        flags: MatchFlags,
    ) {
        if !flags.contains(MatchFlags::MR3) {
            return;
        }
        if voice.sounding {
            voice.flip(pin);
        } else {
            voice.silence(pin);
        }
    }
}

// ─── PWM mode ───────────────────────────────────────────────────────────────

/// MR3 fixes the interrupt cycle; MR2 carries the output phase from cycle
/// to cycle, flipping the pin each time a half period has accumulated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PwmMode;

impl ToneStrategy for PwmMode {
    const NAME: &'static str = "pwm";

    fn setup(profile: &TimingProfile) -> ToneTimerSetup {
        ToneTimerSetup {
            prescale: profile.prescale.saturating_sub(1),
            interrupts: MatchFlags::MR2 | MatchFlags::MR3,
            reset_on: Some(MatchChannel::Mr3),
            pwm_outputs: MatchFlags::MR2,
        }
    }

    fn release<T: ToneTimer>(timer: &mut T, profile: &TimingProfile) {
        let last = profile.pwm_cycle.saturating_sub(1);
        timer.set_match(MatchChannel::Mr2, last);
        timer.set_match(MatchChannel::Mr3, last);
    }

    fn note_ticks(profile: &TimingProfile, note: Note, tempo: u16) -> u32 {
        profile.pwm_note_ticks(note, tempo)
    }

    fn load_note<T: ToneTimer>(timer: &mut T, profile: &TimingProfile, voice: &mut Voice, note: Note) {
        voice.sounding = !note.is_rest();
        if voice.sounding {
            voice.increment = profile.match_count(note.pitch);
            let phase = timer.match_value(MatchChannel::Mr2);
            timer.set_match(MatchChannel::Mr2, phase.wrapping_add(voice.increment));
        } else {
            voice.increment = profile.match_count(profile.rest_pitch());
        }
    }

    fn load_silence<T: ToneTimer>(_timer: &mut T, _profile: &TimingProfile, voice: &mut Voice) {
        voice.sounding = false;
    }

    fn render<T: ToneTimer, P: OutputPin>(
        timer: &mut T,
        pin: &mut P,
        voice: &mut Voice,
        _flags: MatchFlags,
    ) {
        accumulate(timer, pin, voice);
    }
}

/// MR2/MR3 phase accumulator step, shared with the legacy buzzer.
pub(crate) fn accumulate<T: ToneTimer, P: OutputPin>(timer: &mut T, pin: &mut P, voice: &mut Voice) {
    let phase = timer.match_value(MatchChannel::Mr2);
    let cycle = timer.match_value(MatchChannel::Mr3);
    match phase.cmp(&cycle) {
        Ordering::Less => {
            if voice.sounding {
                voice.flip(pin);
                timer.set_match(MatchChannel::Mr2, phase.wrapping_add(voice.increment));
            }
        }
        Ordering::Equal => {
            if voice.sounding {
                voice.flip(pin);
                timer.set_match(MatchChannel::Mr2, voice.increment);
            }
        }
        Ordering::Greater => timer.set_match(MatchChannel::Mr2, phase.saturating_sub(cycle)),
    }
}
