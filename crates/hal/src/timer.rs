//! Counter/timer peripheral abstractions.
//!
//! Both timers on the part are the same 32-bit counter/timer block: a
//! prescaler feeding a counter (TC), four match registers (MR0..MR3) that
//! can each raise an interrupt, reset the counter or drive a PWM output,
//! and an interrupt register (IR) latching which matches fired.
//!
//! The two users see that block differently, so it is split in two traits:
//!
//! - [`TickTimer`] is shared between the foreground and the one-shot
//!   interrupt, so every method takes `&self` and the implementation is
//!   expected to be a thin register wrapper (registers are interior-mutable
//!   by nature).
//! - [`ToneTimer`] is owned outright by the melody sequencer and is only
//!   ever touched inside its critical section, so it takes `&mut self`.

use core::ops::BitOr;

// ─── Match channels ─────────────────────────────────────────────────────────

/// One of the four match registers of a counter/timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatchChannel {
    /// MR0: used by the tick timer for one-shot wake-ups.
    Mr0,
    /// MR1: unused by the firmware core.
    Mr1,
    /// MR2: PWM-mode phase accumulator.
    Mr2,
    /// MR3: tone period / PWM cycle length.
    Mr3,
}

impl MatchChannel {
    /// The interrupt-register bit latched by this channel.
    pub const fn flag(self) -> MatchFlags {
        match self {
            Self::Mr0 => MatchFlags::MR0,
            Self::Mr1 => MatchFlags::MR1,
            Self::Mr2 => MatchFlags::MR2,
            Self::Mr3 => MatchFlags::MR3,
        }
    }
}

/// Set of match interrupt flags, laid out like the IR register (bit n = MRn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatchFlags(u8);

impl MatchFlags {
    /// No flag set.
    pub const NONE: Self = Self(0);
    /// MR0 matched.
    pub const MR0: Self = Self(1 << 0);
    /// MR1 matched.
    pub const MR1: Self = Self(1 << 1);
    /// MR2 matched.
    pub const MR2: Self = Self(1 << 2);
    /// MR3 matched.
    pub const MR3: Self = Self(1 << 3);

    const MASK: u8 = 0x0F;

    /// Build from a raw IR value. Capture bits (4 and up) are discarded.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// Raw IR layout.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `true` if every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Both sets combined.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// `true` when no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for MatchFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

// ─── Tick timer ─────────────────────────────────────────────────────────────

/// Free-running millisecond counter with a single compare channel (MR0).
///
/// Implementations must be safe to call from both the foreground and the
/// timer's own interrupt handler.
pub trait TickTimer {
    /// Load `prescale` into the prescaler, reset the counter to zero and
    /// start counting.
    fn restart(&self, prescale: u32);

    /// `true` while the counter is enabled.
    fn is_running(&self) -> bool;

    /// Current counter value.
    fn counter(&self) -> u32;

    /// Program MR0 to `compare` with its interrupt enabled (and nothing
    /// else: no reset, no stop).
    fn arm_compare(&self, compare: u32);

    /// Read and clear the interrupt register.
    fn take_flags(&self) -> MatchFlags;

    /// Clear the interrupt controller's pending bit for this timer.
    fn clear_pending_irq(&self);

    /// Enable or disable this timer's interrupt at the interrupt controller.
    fn set_irq_enabled(&self, enabled: bool);
}

// ─── Tone timer ─────────────────────────────────────────────────────────────

/// Register wiring for a tone-generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToneTimerSetup {
    /// Prescaler value (counter advances every `prescale + 1` clocks).
    pub prescale: u32,
    /// Match channels that raise an interrupt.
    pub interrupts: MatchFlags,
    /// Match channel that resets the counter, if any.
    pub reset_on: Option<MatchChannel>,
    /// Match channels switched to PWM output (PWMC register).
    pub pwm_outputs: MatchFlags,
}

/// Counter/timer dedicated to tone generation.
pub trait ToneTimer {
    /// Apply a register wiring. Leaves the counter stopped.
    fn configure(&mut self, setup: ToneTimerSetup);

    /// Write a match register.
    fn set_match(&mut self, channel: MatchChannel, value: u32);

    /// Read back a match register.
    fn match_value(&self, channel: MatchChannel) -> u32;

    /// Reset the counter to zero and start it.
    fn restart(&mut self);

    /// Stop the counter (TCR = 0).
    fn halt(&mut self);

    /// `true` while the counter is enabled.
    fn is_running(&self) -> bool;

    /// Read and clear the interrupt register.
    fn take_flags(&mut self) -> MatchFlags;

    /// Enable or disable the tone interrupt at the interrupt controller.
    fn set_irq_enabled(&mut self, enabled: bool);

    /// `true` while the tone interrupt is enabled.
    fn irq_enabled(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bits_drops_capture_flags() {
        let flags = MatchFlags::from_bits(0xF8);
        assert_eq!(flags, MatchFlags::MR3);
        assert_eq!(flags.bits(), 0x08);
    }

    #[test]
    fn contains_requires_every_flag() {
        let both = MatchFlags::MR2 | MatchFlags::MR3;
        assert!(both.contains(MatchFlags::MR3));
        assert!(both.contains(MatchFlags::MR2 | MatchFlags::MR3));
        assert!(!MatchFlags::MR3.contains(both));
        assert!(both.contains(MatchFlags::NONE));
    }

    #[test]
    fn channel_flags_follow_ir_layout() {
        assert_eq!(MatchChannel::Mr0.flag().bits(), 0b0001);
        assert_eq!(MatchChannel::Mr1.flag().bits(), 0b0010);
        assert_eq!(MatchChannel::Mr2.flag().bits(), 0b0100);
        assert_eq!(MatchChannel::Mr3.flag().bits(), 0b1000);
    }

    #[test]
    fn default_is_empty() {
        assert!(MatchFlags::default().is_empty());
        assert!(!MatchFlags::MR0.is_empty());
    }
}
