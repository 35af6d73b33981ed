//! Millisecond time base for the Tracer firmware
//!
//! One free-running counter, prescaled to count milliseconds, is shared by
//! the whole firmware. On top of it this crate provides:
//!
//! - [`TickService::now`] - milliseconds since the counter was (re)started
//! - [`TickService::wait`] - blocking wait, cancellable from interrupt
//!   context, with a calibrated busy-loop fallback while the counter is
//!   stopped
//! - [`TickService::schedule_once`] - a single one-shot callback slot
//!   driven by the MR0 compare interrupt
//!
//! The service is meant to live in a `static` shared by the foreground and
//! the timer interrupt:
//!
//! ```ignore
//! static TICKS: TickService<Ct32b0> = TickService::new(Ct32b0::new());
//!
//! #[interrupt]
//! fn TIMER32_0() {
//!     TICKS.on_interrupt();
//! }
//! ```
//!
//! # Forever waits
//!
//! [`WAIT_FOREVER`] never elapses. A caller parks the foreground with
//! `wait(WAIT_FOREVER)` and some interrupt (a switch edge, a scheduled
//! [`cancel_wait`]) ends it with [`TickService::cancel`].
//!
//! # Features
//!
//! - `hardware`: cortex-m single-core critical sections, real NOPs
//! - `defmt` / `tracing`: log events on the target / on the host
//! - `std`: host builds

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

#[macro_use]
mod fmt;

mod service;

pub use service::{cancel_wait, TickService, WaitOutcome, WakeCallback};

/// Duration that never elapses: the wait ends only through a cancel.
pub const WAIT_FOREVER: u32 = u32::MAX;

/// Busy-loop iterations per millisecond at the 72 MHz PLL clock.
///
/// Used by [`TickService::wait`] while the tick counter is stopped.
pub const SOFTWARE_LOOPS_PER_MS: u32 = 2000;

/// Counter resolution, in counts per second.
pub const TICKS_PER_SECOND: u32 = 1000;
