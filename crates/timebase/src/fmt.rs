//! Logging shims.
//!
//! Each macro forwards to `defmt` on the target and to `tracing` on the
//! host, and compiles to nothing when neither feature is enabled. Only
//! plain `{}` placeholders are portable between the two backends.

#![allow(unused_macros)]

#[cfg(all(feature = "defmt", feature = "tracing"))]
compile_error!("features `defmt` and `tracing` are mutually exclusive");

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::trace!($s $(, $x)*);
            #[cfg(feature = "tracing")]
            ::tracing::trace!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt", feature = "tracing")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(feature = "tracing")]
            ::tracing::debug!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt", feature = "tracing")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(feature = "tracing")]
            ::tracing::warn!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt", feature = "tracing")))]
            let _ = ($( & $x ),*);
        }
    };
}
