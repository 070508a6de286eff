// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Timing and synchronization for real-time rendering pipelines.
//!
//! `tempolib` measures named durations across arbitrary call sites and
//! threads, paces loops to a target budget, and carries a distributed
//! master-clock timecode so independent execution contexts agree on
//! elapsed program time.
//!
//! The entry point is [`TimingContext`]: build one at your composition
//! root and hand it to every subsystem that measures or paces.
//!
//! ```
//! use std::sync::Arc;
//! use tempolib::TimingContext;
//!
//! let timing = Arc::new(TimingContext::new());
//!
//! timing.start("frame");
//! // ... render ...
//! let overtime = timing.wait_until("frame", 8_333); // 120 Hz budget
//! if overtime {
//!     tracing::debug!(
//!         duration_us = timing.duration_us("frame"),
//!         "frame overran its budget"
//!     );
//! }
//! ```

pub mod core;

pub use crate::core::{
    MasterTime, MonotonicClock, Timecode, TimecodeError, TimingConfig, TimingContext,
    TIMECODE_RATE_HZ,
};
