//! Background score sequencer.
//!
//! Plays a borrowed score entirely from the tone interrupt. The foreground
//! starts a tune with [`Sequencer::play`] and carries on; every tone
//! interrupt calls [`Sequencer::on_interrupt`], which either renders one
//! step of output or, once the note's tick budget is spent, moves on.
//!
//! ```text
//!          play(score)           last note, loop interval > 0
//!  Idle ──────────────▶ Note ─────────────────────────────▶ LoopSilence
//!   ▲                   │  ▲ next note                          │
//!   │  last note,       │  └───┘                               │
//!   │  no loop          │                                      │
//!   └───────────────────┘  ◀── restart at note 0 of the anchor ─┘
//! ```
//!
//! Starting a tune while another plays replaces it; the new score also
//! becomes the loop anchor.

use core::marker::PhantomData;

use embedded_hal::digital::OutputPin;
use tracer_hal::{MatchFlags, ToneTimer};

use crate::score::Note;
use crate::strategy::{ToneStrategy, Voice};
use crate::timing::{effective_tempo, ConfigError, TimingProfile};

/// Where the sequencer is in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No session; the tone interrupt is disabled.
    Idle,
    /// A note (or rest) of the score is being played.
    Note,
    /// Silence between the end of the score and its next repetition.
    LoopSilence,
}

/// Playback session state.
#[derive(Debug, Clone, Copy)]
struct Session<'a> {
    /// Notes left in this pass; the first one is the one playing.
    cursor: &'a [Note],
    /// Score to restart from after a loop silence.
    anchor: &'a [Note],
    ticks_left: u32,
    tempo: u16,
    loop_interval: u32,
    phase: Phase,
}

impl Session<'_> {
    const IDLE: Self = Self {
        cursor: &[],
        anchor: &[],
        ticks_left: 0,
        tempo: 0,
        loop_interval: 0,
        phase: Phase::Idle,
    };
}

/// Interrupt-driven melody player over a tone timer `T` and buzzer pin `P`,
/// rendering with strategy `S`.
pub struct Sequencer<'a, T, P, S> {
    timer: T,
    pin: P,
    profile: TimingProfile,
    session: Session<'a>,
    voice: Voice,
    _strategy: PhantomData<S>,
}

impl<'a, T, P, S> Sequencer<'a, T, P, S>
where
    T: ToneTimer,
    P: OutputPin,
    S: ToneStrategy,
{
    /// Take ownership of the tone timer and buzzer pin, using the
    /// [`crate::ACTIVE_PROFILE`] timing.
    pub fn new(timer: T, pin: P) -> Self {
        Self::build(timer, pin, crate::ACTIVE_PROFILE)
    }

    /// As [`Self::new`] with a custom timing profile.
    pub fn with_profile(timer: T, pin: P, profile: TimingProfile) -> Result<Self, ConfigError> {
        if let Err(e) = profile.validate() {
            warn!("melody: profile rejected");
            return Err(e);
        }
        Ok(Self::build(timer, pin, profile))
    }

    fn build(mut timer: T, mut pin: P, profile: TimingProfile) -> Self {
        timer.set_irq_enabled(false);
        timer.configure(S::setup(&profile));
        S::release(&mut timer, &profile);
        pin.set_low().ok();
        Self {
            timer,
            pin,
            profile,
            session: Session::IDLE,
            voice: Voice::default(),
            _strategy: PhantomData,
        }
    }

    /// Start `score` at `tempo` BPM (0 for [`crate::DEFAULT_TEMPO`]),
    /// replacing whatever is playing.
    ///
    /// With a nonzero `loop_interval` the score repeats after a silence of
    /// that many interval units; otherwise playback stops after the last
    /// note. An empty score leaves the sequencer idle.
    pub fn play(&mut self, score: &'a [Note], tempo: u16, loop_interval: u32) {
        self.halt_output();
        self.session = Session {
            cursor: score,
            anchor: score,
            ticks_left: 0,
            tempo: effective_tempo(tempo),
            loop_interval,
            phase: Phase::Idle,
        };
        debug!(
            "melody: play {} notes at {} bpm, loop {}",
            score.len(),
            self.session.tempo,
            loop_interval
        );
        match score.first() {
            Some(&note) => self.start_note(note),
            None => self.session = Session::IDLE,
        }
    }

    /// Stop playback and drive the pin low. Idempotent.
    pub fn stop(&mut self) {
        self.halt_output();
        if self.session.phase != Phase::Idle {
            debug!("melody: stopped");
        }
        self.session = Session::IDLE;
    }

    /// `true` while the tone interrupt is enabled.
    pub fn is_playing(&self) -> bool {
        self.timer.irq_enabled()
    }

    /// Tone interrupt body.
    pub fn on_interrupt(&mut self) {
        let flags = self.timer.take_flags();
        if self.session.phase == Phase::Idle {
            return;
        }
        if flags.contains(MatchFlags::MR3) {
            self.session.ticks_left = self.session.ticks_left.saturating_sub(1);
            if self.session.ticks_left == 0 {
                self.advance();
                return;
            }
        }
        S::render(&mut self.timer, &mut self.pin, &mut self.voice, flags);
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    /// Index in the score of the note playing, if any.
    pub fn position(&self) -> Option<usize> {
        match self.session.phase {
            Phase::Note => Some(
                self.session
                    .anchor
                    .len()
                    .saturating_sub(self.session.cursor.len()),
            ),
            Phase::Idle | Phase::LoopSilence => None,
        }
    }

    /// Notes left in this pass, including the one playing.
    pub fn remaining_notes(&self) -> usize {
        self.session.cursor.len()
    }

    /// Tone interrupts left before the current note or silence ends.
    pub fn ticks_left(&self) -> u32 {
        self.session.ticks_left
    }

    /// Tempo of the session, 0 when idle.
    pub fn tempo(&self) -> u16 {
        self.session.tempo
    }

    /// Timing profile in use.
    pub fn profile(&self) -> &TimingProfile {
        &self.profile
    }

    /// The tone timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The buzzer pin.
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Mutable access to the tone timer, for latching flags in tests and
    /// board bring-up.
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Stop and release the timer and pin.
    pub fn free(mut self) -> (T, P) {
        self.stop();
        (self.timer, self.pin)
    }

    // ─── Transitions ────────────────────────────────────────────────────────

    fn advance(&mut self) {
        self.halt_output();
        match self.session.phase {
            Phase::Note => {
                let rest = self.session.cursor.get(1..).unwrap_or_default();
                self.session.cursor = rest;
                if let Some(&next) = rest.first() {
                    trace!("melody: note {} left", rest.len());
                    self.start_note(next);
                } else if self.session.loop_interval > 0 {
                    self.start_silence();
                } else {
                    debug!("melody: finished");
                    self.session = Session::IDLE;
                }
            }
            Phase::LoopSilence => {
                debug!("melody: loop restart");
                self.session.cursor = self.session.anchor;
                match self.session.anchor.first() {
                    Some(&first) => self.start_note(first),
                    None => self.session = Session::IDLE,
                }
            }
            Phase::Idle => {}
        }
    }

    fn start_note(&mut self, note: Note) {
        S::load_note(&mut self.timer, &self.profile, &mut self.voice, note);
        let ticks = S::note_ticks(&self.profile, note, self.session.tempo);
        self.session.ticks_left = ticks.max(1);
        self.session.phase = Phase::Note;
        self.resume();
    }

    fn start_silence(&mut self) {
        S::load_silence(&mut self.timer, &self.profile, &mut self.voice);
        let ticks = S::silence_ticks(&self.profile, self.session.loop_interval, self.session.tempo);
        self.session.ticks_left = ticks.max(1);
        self.session.phase = Phase::LoopSilence;
        self.resume();
    }

    fn resume(&mut self) {
        self.timer.take_flags();
        self.timer.set_irq_enabled(true);
        self.timer.restart();
    }

    /// Interrupt off, counter stopped, match registers parked, pin low.
    fn halt_output(&mut self) {
        self.timer.set_irq_enabled(false);
        self.timer.halt();
        S::release(&mut self.timer, &self.profile);
        self.voice.silence(&mut self.pin);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::score::duration;
    use crate::strategy::ToggleMode;
    use tracer_hal::mocks::{MockPin, MockToneTimer};

    type Player<'a> = Sequencer<'a, MockToneTimer, MockPin, ToggleMode>;

    fn player<'a>() -> Player<'a> {
        Sequencer::with_profile(MockToneTimer::new(), MockPin::new(), TimingProfile::BALANCED)
            .unwrap()
    }

    fn tick(seq: &mut Player<'_>) {
        seq.timer_mut().latch(MatchFlags::MR3);
        seq.on_interrupt();
    }

    #[test]
    fn new_configures_timer_and_stays_idle() {
        let seq = player();
        assert_eq!(seq.timer().configures(), 1);
        assert!(!seq.timer().irq_enabled());
        assert!(!seq.is_playing());
        assert_eq!(seq.phase(), Phase::Idle);
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let bad = TimingProfile {
            prescale: 0,
            ..TimingProfile::BALANCED
        };
        let result = Player::with_profile(MockToneTimer::new(), MockPin::new(), bad);
        assert_eq!(result.err(), Some(ConfigError::ZeroPrescale));
    }

    #[test]
    fn empty_score_stays_idle() {
        let mut seq = player();
        seq.play(&[], 120, 500);
        assert!(!seq.is_playing());
        assert_eq!(seq.phase(), Phase::Idle);
    }

    #[test]
    fn zero_tempo_uses_default() {
        static SCORE: [Note; 1] = [Note::new(764, duration::QUARTER)];
        let mut seq = player();
        seq.play(&SCORE, 0, 0);
        assert_eq!(seq.tempo(), crate::DEFAULT_TEMPO);
        assert_eq!(seq.ticks_left(), 236);
    }

    #[test]
    fn zero_length_note_still_takes_one_tick() {
        static SCORE: [Note; 2] = [Note::new(764, 0), Note::new(382, duration::SIXTEENTH)];
        let mut seq = player();
        seq.play(&SCORE, 132, 0);
        assert_eq!(seq.ticks_left(), 1);
        tick(&mut seq);
        assert_eq!(seq.position(), Some(1));
    }

    #[test]
    fn spurious_interrupt_while_idle_is_ignored() {
        let mut seq = player();
        tick(&mut seq);
        assert_eq!(seq.phase(), Phase::Idle);
        assert_eq!(seq.pin().writes(), 1, "only the initial low");
    }

    #[test]
    fn stop_is_idempotent() {
        static SCORE: [Note; 1] = [Note::new(764, duration::WHOLE)];
        let mut seq = player();
        seq.play(&SCORE, 132, 0);
        tick(&mut seq);
        seq.stop();
        seq.stop();
        assert!(!seq.is_playing());
        assert!(!seq.timer().is_running());
        assert!(!seq.pin().is_high());
        assert_eq!(seq.position(), None);
    }

    #[test]
    fn free_returns_parked_hardware() {
        static SCORE: [Note; 1] = [Note::new(764, duration::WHOLE)];
        let mut seq = player();
        seq.play(&SCORE, 132, 0);
        let (timer, pin) = seq.free();
        assert!(!timer.irq_enabled());
        assert!(!pin.is_high());
    }
}
