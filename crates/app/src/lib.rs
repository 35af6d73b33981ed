//! Foreground side of the Tracer firmware core
//!
//! The pieces of the robot firmware that sit on top of the time base and
//! the melody sequencer:
//!
//! - [`clock`] - main clock switching, re-basing the time base each time
//! - [`wakeup`] - periodic wake-up from sleep through the one-shot timer
//! - [`switch`] - debounced scan, click and click-and-hold of SW1
//! - [`jingles`] - short feedback tunes played on start-up and on clicks
//!
//! The motor, sensor and line-following code is not part of this crate.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod jingles;
pub mod switch;
pub mod wakeup;

pub use clock::switch_main_clock;
pub use switch::{Switch, SwitchState};
