// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Process-relative monotonic clock.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Monotonic time source shared by every measurement in this crate.
///
/// The epoch is arbitrary (first use in the process). Backed by
/// [`Instant`], so it never observes wall-clock adjustments — pacing
/// decisions must never move backwards.
pub struct MonotonicClock;

impl MonotonicClock {
    /// Elapsed time since the process-relative epoch.
    #[inline]
    pub fn now() -> Duration {
        static START: OnceLock<Instant> = OnceLock::new();
        START.get_or_init(Instant::now).elapsed()
    }

    /// Current monotonic time in microseconds.
    #[inline]
    pub fn now_us() -> u64 {
        Self::now().as_micros() as u64
    }
}
