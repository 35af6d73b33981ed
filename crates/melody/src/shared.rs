//! Sharing a player between the foreground and the tone interrupt.
//!
//! The player lives in a `static` [`Shared`] cell. Every access runs in a
//! critical section, so the interrupt can never observe a half-updated
//! session:
//!
//! ```ignore
//! static PLAYER: Shared<ActiveSequencer<'static, Ct32b0, BuzzerPin>> = Shared::new();
//!
//! PLAYER.install(Sequencer::new(ct32b0, buzzer));
//! PLAYER.play(&jingles::STARTUP, 155, 0);
//!
//! #[interrupt]
//! fn TIMER32_0() {
//!     PLAYER.on_interrupt();
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;
use tracer_hal::ToneTimer;

use crate::score::Note;
use crate::sequencer::Sequencer;
use crate::strategy::ToneStrategy;

/// Operations every buzzer driver offers to the foreground and interrupt.
pub trait TonePlayer {
    /// Silence the buzzer. Idempotent.
    fn stop(&mut self);

    /// `true` while the buzzer is producing (or sequencing) output.
    fn is_playing(&self) -> bool;

    /// Tone interrupt body.
    fn on_interrupt(&mut self);
}

impl<T, P, S> TonePlayer for Sequencer<'_, T, P, S>
where
    T: ToneTimer,
    P: OutputPin,
    S: ToneStrategy,
{
    fn stop(&mut self) {
        Sequencer::stop(self);
    }

    fn is_playing(&self) -> bool {
        Sequencer::is_playing(self)
    }

    fn on_interrupt(&mut self) {
        Sequencer::on_interrupt(self);
    }
}

/// Interrupt-safe cell holding a player installed at start-up.
pub struct Shared<D> {
    inner: Mutex<RefCell<Option<D>>>,
}

impl<D> Shared<D> {
    /// Empty cell, suitable for a `static`.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Put `device` in the cell, returning the previous one.
    pub fn install(&self, device: D) -> Option<D> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(device))
    }

    /// Take the device back out.
    pub fn take(&self) -> Option<D> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Run `f` on the device inside a critical section.
    ///
    /// Returns `None` when nothing is installed or when called re-entrantly
    /// from inside another `lock`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut D) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).try_borrow_mut().ok()?;
            slot.as_mut().map(f)
        })
    }
}

impl<D> Default for Shared<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: TonePlayer> Shared<D> {
    /// See [`TonePlayer::stop`].
    pub fn stop(&self) {
        self.lock(TonePlayer::stop);
    }

    /// See [`TonePlayer::is_playing`]. `false` when nothing is installed.
    pub fn is_playing(&self) -> bool {
        self.lock(|d| d.is_playing()).unwrap_or(false)
    }

    /// See [`TonePlayer::on_interrupt`].
    pub fn on_interrupt(&self) {
        self.lock(TonePlayer::on_interrupt);
    }
}

impl<'a, T, P, S> Shared<Sequencer<'a, T, P, S>>
where
    T: ToneTimer,
    P: OutputPin,
    S: ToneStrategy,
{
    /// See [`Sequencer::play`].
    pub fn play(&self, score: &'a [Note], tempo: u16, loop_interval: u32) {
        self.lock(|seq| seq.play(score, tempo, loop_interval));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::score::duration;
    use crate::strategy::ToggleMode;
    use crate::timing::TimingProfile;
    use tracer_hal::mocks::{MockPin, MockToneTimer};
    use tracer_hal::MatchFlags;

    type Player = Sequencer<'static, MockToneTimer, MockPin, ToggleMode>;

    static SCORE: [Note; 1] = [Note::new(764, duration::SIXTEENTH)];

    fn installed() -> Shared<Player> {
        let shared = Shared::new();
        let seq =
            Player::with_profile(MockToneTimer::new(), MockPin::new(), TimingProfile::BALANCED)
                .unwrap();
        assert!(shared.install(seq).is_none());
        shared
    }

    #[test]
    fn empty_cell_is_not_playing() {
        let shared: Shared<Player> = Shared::new();
        assert!(!shared.is_playing());
        shared.stop();
        shared.on_interrupt();
    }

    #[test]
    fn play_and_stop_through_the_cell() {
        let shared = installed();
        shared.play(&SCORE, 132, 0);
        assert!(shared.is_playing());
        shared.stop();
        assert!(!shared.is_playing());
    }

    #[test]
    fn interrupt_runs_to_completion() {
        let shared = installed();
        shared.play(&SCORE, 132, 0);
        let mut ticks = 0;
        while shared.is_playing() && ticks < 1_000 {
            shared.lock(|seq| seq.timer_mut().latch(MatchFlags::MR3));
            shared.on_interrupt();
            ticks += 1;
        }
        // 261 * 60 / 264 = 59 per sixteenth
        assert_eq!(ticks, 59);
    }

    #[test]
    fn reentrant_lock_is_refused() {
        let shared = installed();
        let inner = shared.lock(|_| shared.lock(|_| ()));
        assert_eq!(inner, Some(None));
    }

    #[test]
    fn take_empties_the_cell() {
        let shared = installed();
        assert!(shared.take().is_some());
        assert!(shared.take().is_none());
    }
}
