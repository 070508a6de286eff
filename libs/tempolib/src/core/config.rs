// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Timing facility configuration.

use serde::{Deserialize, Serialize};

/// Bootstrap configuration for a [`TimingContext`].
///
/// Typically loaded by the hosting application's configuration layer and
/// passed to [`TimingContext::with_config`].
///
/// [`TimingContext`]: crate::core::context::TimingContext
/// [`TimingContext::with_config`]: crate::core::context::TimingContext::with_config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Gate for all measurement operations. When false, `start`, `stop`
    /// and the pacing wait are no-ops with near-zero cost.
    pub enabled: bool,

    /// Verbosity hint consulted by callers. Carries no behavior inside
    /// the facility itself.
    pub debug: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
        }
    }
}
