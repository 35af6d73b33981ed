//! Buzzer melody sequencer for the Tracer line-follower
//!
//! Turns a score, a borrowed list of (pitch, duration) [`Note`]s, into a
//! square wave on the buzzer pin. Playback runs entirely in the tone
//! timer's interrupt while the foreground keeps following the line.
//!
//! # Modules
//!
//! - [`timing`] - timer profiles, pitch and tick arithmetic
//! - [`pitch`] / [`duration`] - note tables for the active profile
//! - [`strategy`] - toggle and PWM output generation
//! - [`sequencer`] - the background score state machine
//! - [`legacy`] - the kit's stock start/stop buzzer
//! - [`shared`] - interrupt-safe cell for a player in a `static`
//!
//! # Output strategy
//!
//! Exactly one of the `tone-toggle` (default), `tone-pwm` and `tone-legacy`
//! features must be enabled. It selects [`ACTIVE_PROFILE`], which the
//! pitch tables are computed from, and the [`ActiveStrategy`] used by
//! [`ActiveSequencer`]. The legacy build drives a [`LegacyBuzzer`] instead.
//!
//! # Example
//!
//! ```
//! use melody::{duration, pitch, Note};
//!
//! static SCORE: [Note; 2] = [
//!     Note::new(pitch::A4, duration::QUARTER),
//!     Note::rest(duration::EIGHTH),
//! ];
//!
//! # #[cfg(not(feature = "tone-legacy"))]
//! # {
//! use melody::ActiveSequencer;
//! use tracer_hal::mocks::{MockPin, MockToneTimer};
//!
//! let mut player: ActiveSequencer<'_, _, _> =
//!     ActiveSequencer::new(MockToneTimer::new(), MockPin::new());
//! player.play(&SCORE, 120, 0);
//! assert!(player.is_playing());
//! # }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in interrupt context
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)] // register names in doc comments

#[macro_use]
mod fmt;

pub mod legacy;
pub mod pitch;
pub mod score;
pub mod sequencer;
pub mod shared;
pub mod strategy;
pub mod timing;

pub use legacy::{play_blocking, LegacyBuzzer};
pub use score::{duration, Note};
pub use sequencer::{Phase, Sequencer};
pub use shared::{Shared, TonePlayer};
pub use strategy::{PwmMode, ToggleMode, ToneStrategy, Voice};
pub use timing::{ConfigError, TimingProfile, DEFAULT_TEMPO};

#[cfg(not(any(feature = "tone-toggle", feature = "tone-pwm", feature = "tone-legacy")))]
compile_error!("enable one of the `tone-toggle`, `tone-pwm` or `tone-legacy` features");

#[cfg(any(
    all(feature = "tone-toggle", feature = "tone-pwm"),
    all(feature = "tone-toggle", feature = "tone-legacy"),
    all(feature = "tone-pwm", feature = "tone-legacy"),
))]
compile_error!("the `tone-toggle`, `tone-pwm` and `tone-legacy` features are mutually exclusive");

/// Timing profile the pitch tables are built for.
#[cfg(not(feature = "tone-legacy"))]
pub const ACTIVE_PROFILE: TimingProfile = TimingProfile::BALANCED;
/// Timing profile the pitch tables are built for.
#[cfg(feature = "tone-legacy")]
pub const ACTIVE_PROFILE: TimingProfile = TimingProfile::LEGACY;

/// Output strategy selected at build time.
#[cfg(feature = "tone-toggle")]
pub type ActiveStrategy = ToggleMode;
/// Output strategy selected at build time.
#[cfg(feature = "tone-pwm")]
pub type ActiveStrategy = PwmMode;

/// Background sequencer with the build's strategy.
#[cfg(not(feature = "tone-legacy"))]
pub type ActiveSequencer<'a, T, P> = Sequencer<'a, T, P, ActiveStrategy>;

