//! Internal logging shims.
//!
//! With the `tracing` feature the macros forward to the `tracing` facade;
//! without it they expand to nothing, so call sites never need their own
//! `cfg` attributes.

cfg_if::cfg_if! {
    if #[cfg(feature = "tracing")] {
        macro_rules! trace {
            ($($arg:tt)*) => { tracing::trace!($($arg)*) };
        }

        macro_rules! debug {
            ($($arg:tt)*) => { tracing::debug!($($arg)*) };
        }
    } else {
        macro_rules! trace {
            ($($arg:tt)*) => {};
        }

        macro_rules! debug {
            ($($arg:tt)*) => {};
        }
    }
}

pub(crate) use debug;
pub(crate) use trace;
