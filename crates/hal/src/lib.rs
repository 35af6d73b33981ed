//! Hardware abstraction for the Tracer line-follower
//!
//! The firmware core needs very little of the chip: one free-running 32-bit
//! counter for the millisecond time base, one 16/32-bit counter with four
//! match registers for tone generation, a buzzer output pin and the main
//! clock selector. This crate describes each of those as a trait so the
//! time base and the melody sequencer can be exercised on the host.
//!
//! # Architecture Layers
//!
//! ```text
//! Application (tracer-app: switch scan, wake-up, jingles)
//!         ↓
//! Core (timebase, melody)
//!         ↓
//! Hardware abstraction (this crate)
//!         ↓
//! Register-level drivers (CT32B0 / CT32B1 / SYSCON)
//! ```
//!
//! # Abstractions
//!
//! - [`TickTimer`] - millisecond counter with one compare channel (MR0)
//! - [`ToneTimer`] - tone counter with four match channels
//! - [`MainClock`] - main clock source selection ([`ClockSource`])
//! - buzzer pin - any [`embedded_hal::digital::OutputPin`]
//!
//! # Features
//!
//! - `std`: expose [`mocks`] to other crates' tests
//! - `hardware`: physical hardware target
//! - `defmt`: derive `defmt::Format` on public types

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
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]

pub mod clock_config;
pub mod timer;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use clock_config::{ClockSource, MainClock};
pub use timer::{MatchChannel, MatchFlags, TickTimer, ToneTimer, ToneTimerSetup};
