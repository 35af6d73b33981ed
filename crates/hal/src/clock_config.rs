//! Main clock sources of the LPC1343.
//!
//! The power-management code drops to the watchdog oscillator before deep
//! sleep and returns to the PLL on wake-up. Every switch changes the rate
//! at which the timers count, so whoever switches must also re-base the
//! millisecond time base (see `timebase::TickService::restart`).
//!
//! # Sources
//!
//! - UM10375 (LPC1311/13/42/43 user manual): Section 3.5.11 (MAINCLKSEL)
//! - Board crystal: 12 MHz, PLL multiplier 6

/// Selectable main clock sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal 12 MHz RC oscillator. Active out of reset.
    IrcOsc,

    /// PLL input (the system oscillator, 12 MHz crystal), PLL bypassed.
    PllIn,

    /// Watchdog oscillator at its lowest setting (0.6 MHz / 64).
    ///
    /// Used while sleeping; millisecond timing is coarse at this rate.
    WdtOsc,

    /// PLL output, 72 MHz. Normal running clock.
    PllOut,
}

impl ClockSource {
    /// Core and peripheral clock frequency produced by this source.
    pub const fn frequency_hz(self) -> u32 {
        match self {
            Self::IrcOsc | Self::PllIn => 12_000_000,
            Self::WdtOsc => 9_375,
            Self::PllOut => 72_000_000,
        }
    }
}

/// Main clock selector (SYSCON MAINCLKSEL / MAINCLKUEN).
pub trait MainClock {
    /// Switch the main clock to `source`, waiting for it to be stable.
    fn select(&mut self, source: ClockSource);

    /// Source currently feeding the main clock.
    fn current(&self) -> ClockSource;
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)] // Test arithmetic on known constants
mod tests {
    use super::*;

    #[test]
    fn pll_output_is_six_times_the_crystal() {
        assert_eq!(
            ClockSource::PllOut.frequency_hz(),
            6 * ClockSource::PllIn.frequency_hz(),
            "board PLL multiplies the 12 MHz crystal by 6"
        );
    }

    #[test]
    fn every_source_can_run_a_millisecond_prescaler() {
        for src in [
            ClockSource::IrcOsc,
            ClockSource::PllIn,
            ClockSource::WdtOsc,
            ClockSource::PllOut,
        ] {
            assert!(
                src.frequency_hz() >= 1000,
                "{src:?} must tick at least once per millisecond"
            );
        }
    }
}
