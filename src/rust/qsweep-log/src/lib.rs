// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::{atomic::AtomicBool, atomic::Ordering};

#[doc(hidden)]
pub use log as _log;

#[macro_export]
macro_rules! info {
    ($msg:literal, $($arg:tt)+) => {
        qsweep_log::_log::info!(target: concat!("qsweep.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        qsweep_log::_log::info!(target: concat!("qsweep.rust::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:literal, $($arg:tt)+) => {
        qsweep_log::_log::warn!(target: concat!("qsweep.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        qsweep_log::_log::warn!(target: concat!("qsweep.rust::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! debug {
    ($msg:literal, $($arg:tt)+) => {
        qsweep_log::_log::debug!(target: concat!("qsweep.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        qsweep_log::_log::debug!(target: concat!("qsweep.rust::", module_path!()), $msg);
    };
}

/// Log a sweep-progress message at info level if progress reporting is enabled.
///
/// Progress reporting is advisory only: enabling or disabling it never
/// changes iteration order or results.
#[macro_export]
macro_rules! progress {
    ($msg:literal, $($arg:tt)+) => {
        if qsweep_log::is_progress_enabled() {
            qsweep_log::_log::info!(target: concat!("qsweep.rust::", module_path!()), $msg, $($arg)+);
        }
    };
    ($msg:literal) => {
        if qsweep_log::is_progress_enabled() {
            qsweep_log::_log::info!(target: concat!("qsweep.rust::", module_path!()), $msg);
        }
    };
}

static PROGRESS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_progress_enabled() -> bool {
    PROGRESS_ENABLED.load(Ordering::Acquire)
}

/// Enable or disable advisory progress reporting.
///
/// Meant to be called once at the start of the program; no concrete logger
/// is installed here, the host application owns the `log` backend.
pub fn set_progress_enabled(enabled: bool) {
    PROGRESS_ENABLED.store(enabled, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_toggle() {
        assert!(!is_progress_enabled());
        set_progress_enabled(true);
        assert!(is_progress_enabled());
        set_progress_enabled(false);
        assert!(!is_progress_enabled());
    }
}
