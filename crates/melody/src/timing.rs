//! Timer profiles and the pitch/duration arithmetic.
//!
//! A profile fixes the peripheral clock, the tone timer prescaler, the
//! pitch scale (how many counts one pitch unit is worth) and the PWM cycle
//! length. Pitch tables, match values and tick counts all derive from it.
//!
//! Tick counts follow the same integer evaluation order as the firmware
//! has always used: the per-second rate is divided down first and the
//! note length multiplied in last, which keeps every intermediate within
//! 32 bits.

use crate::score::{duration, Note};

/// Tempo used when `play` is given 0, in beats per minute.
pub const DEFAULT_TEMPO: u16 = 132;

/// C4 (261.626 Hz): placeholder pitch for rests.
const REST_MILLIHERTZ: u32 = 261_626;
/// C5 (523.251 Hz): reference pitch for loop silences.
const REFERENCE_MILLIHERTZ: u32 = 523_251;
/// C2 (65.406 Hz): lowest tabulated pitch.
const LOWEST_MILLIHERTZ: u32 = 65_406;

/// Scale between a loop interval and the reference note's length.
const INTERVAL_DIVISOR: u64 = 1000 * 90;

/// Extra tempo term of the legacy blocking player.
const LEGACY_TEMPO_OFFSET: u32 = 35;

/// Clocking of the tone timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingProfile {
    /// Peripheral clock in Hz.
    pub pclk_hz: u32,
    /// Counter clock divider (the PR register holds `prescale - 1`).
    pub prescale: u32,
    /// Counts per pitch unit.
    pub pitch_scale: u32,
    /// PWM cycle length in counts (MR3 in PWM mode).
    pub pwm_cycle: u32,
}

impl TimingProfile {
    /// 100 kHz counter: small pitch values, audible quantisation above C6.
    pub const COARSE: Self = Self::new(72_000_000, 720, 1, 0x100);
    /// 400 kHz counter: default for toggle and PWM modes.
    pub const BALANCED: Self = Self::new(72_000_000, 180, 1, 0x400);
    /// 1 MHz counter: fine pitch, low C2 needs 13 bits.
    pub const FINE: Self = Self::new(72_000_000, 72, 1, 0x1000);
    /// Undivided 72 MHz counter with pitch units of 384 counts, as used by
    /// the legacy buzzer.
    pub const LEGACY: Self = Self::new(72_000_000, 1, 384, 0x10000);

    /// Build a profile. Use [`Self::validate`] before trusting it.
    pub const fn new(pclk_hz: u32, prescale: u32, pitch_scale: u32, pwm_cycle: u32) -> Self {
        Self {
            pclk_hz,
            prescale,
            pitch_scale,
            pwm_cycle,
        }
    }

    /// Check that every conversion is well defined for this profile.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.prescale == 0 {
            return Err(ConfigError::ZeroPrescale);
        }
        if self.pitch_scale == 0 {
            return Err(ConfigError::ZeroPitchScale);
        }
        if self.pwm_cycle == 0 {
            return Err(ConfigError::ZeroPwmCycle);
        }
        if self.pwm_rate() == 0 || self.tone_rate(1) == 0 {
            return Err(ConfigError::ClockTooSlow);
        }
        if self.raw_pitch(LOWEST_MILLIHERTZ) > u16::MAX as u64 {
            return Err(ConfigError::PitchOverflow);
        }
        Ok(())
    }

    /// Pitch value for a frequency given in millihertz, rounded to the
    /// nearest count. 0 mHz gives 0 (a rest).
    #[allow(clippy::cast_possible_truncation)] // clamped to u16::MAX first
    pub const fn pitch_for_millihertz(&self, millihertz: u32) -> u16 {
        let raw = self.raw_pitch(millihertz);
        if raw > u16::MAX as u64 {
            u16::MAX
        } else {
            raw as u16
        }
    }

    /// Pitch substituted for rests so tick arithmetic never divides by 0.
    pub const fn rest_pitch(&self) -> u16 {
        self.pitch_for_millihertz(REST_MILLIHERTZ)
    }

    /// Pitch of the reference note that times loop silences.
    pub const fn reference_pitch(&self) -> u16 {
        self.pitch_for_millihertz(REFERENCE_MILLIHERTZ)
    }

    /// Match register value for a half period of `pitch`.
    pub const fn match_count(&self, pitch: u16) -> u32 {
        (pitch as u32).saturating_mul(self.pitch_scale).saturating_sub(1)
    }

    /// Interrupts for `note` in toggle mode, where the interrupt rate
    /// follows the pitch. Rests are timed at [`Self::rest_pitch`].
    pub const fn toggle_note_ticks(&self, note: Note, tempo: u16) -> u32 {
        let pitch = if note.is_rest() {
            self.rest_pitch()
        } else {
            note.pitch
        };
        Self::beats(self.tone_rate(pitch), tempo, note.duration)
    }

    /// Interrupts for `note` in PWM mode, where the interrupt rate is the
    /// fixed PWM cycle.
    pub const fn pwm_note_ticks(&self, note: Note, tempo: u16) -> u32 {
        Self::beats(self.pwm_rate(), tempo, note.duration)
    }

    /// Interrupts for a loop silence of `interval` given the tick count
    /// of a whole reference note at the same tempo.
    #[allow(clippy::cast_possible_truncation)] // clamped to u32::MAX first
    pub const fn interval_ticks(reference_ticks: u32, interval: u32, tempo: u16) -> u32 {
        let wide = (reference_ticks as u64)
            .saturating_mul(interval as u64)
            .saturating_mul(effective_tempo(tempo) as u64)
            / INTERVAL_DIVISOR;
        if wide > u32::MAX as u64 {
            u32::MAX
        } else {
            wide as u32
        }
    }

    /// Whole reference note, the unit of loop silences.
    pub const fn reference_note(&self) -> Note {
        Note::new(self.reference_pitch(), duration::WHOLE)
    }

    /// Milliseconds the legacy blocking player holds a note of `duration`.
    pub const fn legacy_note_ms(&self, duration: u16, tempo: u16) -> u32 {
        let denominator = (effective_tempo(tempo) as u32)
            .saturating_mul(2)
            .saturating_add(LEGACY_TEMPO_OFFSET);
        div(self.pwm_rate().saturating_mul(60), denominator).saturating_mul(duration as u32)
    }

    /// Half-periods per second of `pitch`: `pclk / (2 * prescale * scale * pitch)`.
    const fn tone_rate(&self, pitch: u16) -> u32 {
        let counts = self
            .prescale
            .saturating_mul(self.pitch_scale)
            .saturating_mul(pitch as u32)
            .saturating_mul(2);
        div(self.pclk_hz, counts)
    }

    /// `pclk / (2 * prescale * cycle)`.
    const fn pwm_rate(&self) -> u32 {
        div(
            self.pclk_hz,
            self.prescale.saturating_mul(self.pwm_cycle).saturating_mul(2),
        )
    }

    const fn beats(rate: u32, tempo: u16, duration: u16) -> u32 {
        let per_sixteenth = div(
            rate.saturating_mul(60),
            (effective_tempo(tempo) as u32).saturating_mul(2),
        );
        per_sixteenth.saturating_mul(duration as u32)
    }

    const fn raw_pitch(&self, millihertz: u32) -> u64 {
        let x = (self.pclk_hz as u64).saturating_mul(1000);
        let y = (self.prescale as u64)
            .saturating_mul(self.pitch_scale as u64)
            .saturating_mul(millihertz as u64)
            .saturating_mul(2);
        match x.saturating_mul(2).saturating_add(y).checked_div(y.saturating_mul(2)) {
            Some(v) => v,
            None => 0,
        }
    }
}

/// `tempo`, or [`DEFAULT_TEMPO`] when 0.
pub const fn effective_tempo(tempo: u16) -> u16 {
    if tempo == 0 {
        DEFAULT_TEMPO
    } else {
        tempo
    }
}

const fn div(numerator: u32, denominator: u32) -> u32 {
    match numerator.checked_div(denominator) {
        Some(v) => v,
        None => 0,
    }
}

/// Rejected [`TimingProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Prescale of 0
    ZeroPrescale,
    /// Pitch scale of 0
    ZeroPitchScale,
    /// PWM cycle of 0
    ZeroPwmCycle,
    /// Peripheral clock too slow for one interrupt per second
    ClockTooSlow,
    /// Lowest pitch does not fit a 16-bit pitch value
    PitchOverflow,
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroPrescale => write!(f, "Tone timer prescale is zero"),
            Self::ZeroPitchScale => write!(f, "Pitch scale is zero"),
            Self::ZeroPwmCycle => write!(f, "PWM cycle is zero"),
            Self::ClockTooSlow => write!(f, "Peripheral clock too slow for profile"),
            Self::PitchOverflow => write!(f, "Pitch table does not fit 16 bits"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_profiles_are_valid() {
        for profile in [
            TimingProfile::COARSE,
            TimingProfile::BALANCED,
            TimingProfile::FINE,
            TimingProfile::LEGACY,
        ] {
            assert_eq!(profile.validate(), Ok(()), "{profile:?}");
        }
    }

    #[test]
    fn degenerate_profiles_are_rejected() {
        let base = TimingProfile::BALANCED;
        assert_eq!(
            TimingProfile { prescale: 0, ..base }.validate(),
            Err(ConfigError::ZeroPrescale)
        );
        assert_eq!(
            TimingProfile { pitch_scale: 0, ..base }.validate(),
            Err(ConfigError::ZeroPitchScale)
        );
        assert_eq!(
            TimingProfile { pwm_cycle: 0, ..base }.validate(),
            Err(ConfigError::ZeroPwmCycle)
        );
        assert_eq!(
            TimingProfile { pclk_hz: 1000, ..base }.validate(),
            Err(ConfigError::ClockTooSlow)
        );
        assert_eq!(
            TimingProfile { prescale: 1, pitch_scale: 1, ..base }.validate(),
            Err(ConfigError::PitchOverflow)
        );
    }

    #[test]
    fn rounding_matches_reference_tables() {
        let p = TimingProfile::BALANCED;
        assert_eq!(p.pitch_for_millihertz(261_626), 764); // C4
        assert_eq!(p.pitch_for_millihertz(440_000), 455); // A4
        assert_eq!(p.pitch_for_millihertz(523_251), 382); // C5
        assert_eq!(p.pitch_for_millihertz(65_406), 3058); // C2
        assert_eq!(TimingProfile::COARSE.pitch_for_millihertz(2_093_005), 24);
        assert_eq!(TimingProfile::FINE.pitch_for_millihertz(65_406), 7645);
        assert_eq!(TimingProfile::LEGACY.pitch_for_millihertz(65_406), 1433);
        assert_eq!(TimingProfile::LEGACY.pitch_for_millihertz(2_093_005), 45);
        assert_eq!(p.pitch_for_millihertz(0), 0);
    }

    #[test]
    fn toggle_quarter_at_default_tempo() {
        // 72 MHz / (2 * 180 * 764) = 261; 261 * 60 / 264 = 59; 59 * 4
        let note = Note::new(764, duration::QUARTER);
        assert_eq!(TimingProfile::BALANCED.toggle_note_ticks(note, DEFAULT_TEMPO), 236);
        assert_eq!(TimingProfile::BALANCED.toggle_note_ticks(note, 0), 236);
    }

    #[test]
    fn rest_is_timed_like_c4() {
        let p = TimingProfile::BALANCED;
        assert_eq!(
            p.toggle_note_ticks(Note::rest(duration::HALF), 120),
            p.toggle_note_ticks(Note::new(p.rest_pitch(), duration::HALF), 120)
        );
    }

    #[test]
    fn pwm_ticks_ignore_pitch() {
        // 72 MHz / (2 * 180 * 1024) = 195; 195 * 60 / 264 = 44; 44 * 4
        let p = TimingProfile::BALANCED;
        assert_eq!(p.pwm_note_ticks(Note::new(764, duration::QUARTER), 132), 176);
        assert_eq!(p.pwm_note_ticks(Note::new(100, duration::QUARTER), 132), 176);
        assert_eq!(p.pwm_note_ticks(Note::rest(duration::QUARTER), 132), 176);
    }

    #[test]
    fn match_count_is_scaled_minus_one() {
        assert_eq!(TimingProfile::BALANCED.match_count(764), 763);
        assert_eq!(TimingProfile::LEGACY.match_count(2), 767);
        assert_eq!(TimingProfile::BALANCED.match_count(0), 0);
    }

    #[test]
    fn interval_scales_reference_note() {
        // 1888 * 1000 * 132 / 90_000
        assert_eq!(TimingProfile::interval_ticks(1888, 1000, 132), 2769);
        assert_eq!(TimingProfile::interval_ticks(1888, 0, 132), 0);
        assert_eq!(TimingProfile::interval_ticks(u32::MAX, u32::MAX, 255), u32::MAX);
    }

    #[test]
    fn legacy_note_length() {
        // 72 MHz / (2 * 65536) = 549; 549 * 60 / (2 * 132 + 35) = 110
        assert_eq!(TimingProfile::LEGACY.legacy_note_ms(1, 132), 110);
        assert_eq!(TimingProfile::LEGACY.legacy_note_ms(4, 132), 440);
    }

    #[test]
    fn error_display_is_human_readable() {
        let msg = std::format!("{}", ConfigError::ClockTooSlow);
        assert!(msg.contains("too slow"));
    }
}
