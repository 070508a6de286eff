// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The timing context.
//!
//! Named duration measurement, frame pacing and master-clock propagation
//! for every execution context in the process. Build one
//! [`TimingContext`] at the application's composition root and hand it
//! (by reference or `Arc`) to every subsystem that measures, paces, or
//! follows the shared timeline; nothing here enforces a singleton.
//!
//! Every operation degrades to a no-op or an "unset" return on misuse:
//! instrumentation must never take the host down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;

use super::clock::MonotonicClock;
use super::config::TimingConfig;
use super::handoff::HandoffSlot;
use super::master_clock::MasterClockCell;
use super::timecode::Timecode;

/// Decoded master-clock reading: elapsed program time plus the shared
/// paused flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterTime {
    /// Elapsed time on the shared timeline since the timecode epoch.
    pub elapsed: Duration,
    /// Whether the timeline is currently paused.
    pub paused: bool,
}

/// Concurrent name → microseconds store.
///
/// Lookups of known names share the read lock, so distinct measurement
/// sites never contend; the write lock is taken once per name, on first
/// insertion. Values are atomics: same-name writers race
/// last-writer-wins. Entries live for the process lifetime — names are a
/// small static set of instrumentation points, not user data.
#[derive(Debug, Default)]
struct SlotMap {
    inner: RwLock<HashMap<String, AtomicU64>>,
}

impl SlotMap {
    fn store(&self, name: &str, value_us: u64) {
        if let Some(slot) = self.inner.read().get(name) {
            slot.store(value_us, Ordering::Relaxed);
            return;
        }
        self.inner
            .write()
            .entry(name.to_owned())
            .or_default()
            .store(value_us, Ordering::Relaxed);
    }

    fn load(&self, name: &str) -> Option<u64> {
        self.inner
            .read()
            .get(name)
            .map(|slot| slot.load(Ordering::Relaxed))
    }

    fn contains(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    fn snapshot(&self) -> HashMap<String, u64> {
        self.inner
            .read()
            .iter()
            .map(|(name, slot)| (name.clone(), slot.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Timing and synchronization facility for a real-time pipeline.
///
/// Three jobs in one shared object:
///
/// - **Measurement** — [`start`]/[`stop`] record named durations from
///   arbitrary call sites and threads; [`set_duration`] injects values
///   measured elsewhere (e.g. received from a peer process).
/// - **Pacing** — [`wait_until`] holds a loop iteration to a minimum
///   budget and reports overtime; the [`open`]/[`publish`]/[`consume`]
///   hand-off lets a budget computed deep in unrelated logic flow into
///   the pacing call without an explicit parameter.
/// - **Master clock** — an 8-field [`Timecode`] set by the hosting
///   synchronization layer and decoded by anyone who needs the shared
///   timeline.
///
/// [`start`]: TimingContext::start
/// [`stop`]: TimingContext::stop
/// [`set_duration`]: TimingContext::set_duration
/// [`wait_until`]: TimingContext::wait_until
/// [`open`]: TimingContext::open
/// [`publish`]: TimingContext::publish
/// [`consume`]: TimingContext::consume
#[derive(Debug)]
pub struct TimingContext {
    enabled: AtomicBool,
    debug: AtomicBool,
    starts: SlotMap,
    durations: SlotMap,
    handoff: HandoffSlot,
    master_clock: MasterClockCell,
}

impl TimingContext {
    pub fn new() -> Self {
        Self::with_config(TimingConfig::default())
    }

    pub fn with_config(config: TimingConfig) -> Self {
        Self {
            enabled: AtomicBool::new(config.enabled),
            debug: AtomicBool::new(config.debug),
            starts: SlotMap::default(),
            durations: SlotMap::default(),
            handoff: HandoffSlot::new(),
            master_clock: MasterClockCell::default(),
        }
    }

    /// Enable or disable all measurement operations.
    ///
    /// While disabled, [`start`](Self::start), [`stop`](Self::stop) and
    /// [`wait_until`](Self::wait_until) are no-ops; recorded durations
    /// keep their last values.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Debug mode is a passive verbosity hint for callers; it changes
    /// nothing inside the facility.
    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Current monotonic time in microseconds since an arbitrary
    /// process-relative epoch. Never wall-clock.
    #[inline]
    pub fn now_us(&self) -> u64 {
        MonotonicClock::now_us()
    }

    /// Current monotonic time as a [`Duration`].
    #[inline]
    pub fn now(&self) -> Duration {
        MonotonicClock::now()
    }

    /// Begin a duration measurement, overwriting any prior start for
    /// `name`.
    pub fn start(&self, name: &str) {
        if !self.is_enabled() {
            return;
        }
        self.starts.store(name, MonotonicClock::now_us());
    }

    /// Complete a measurement, storing the elapsed time since the last
    /// [`start`](Self::start). Without a matching start this does
    /// nothing — "measurement never started" is tolerated, not an error.
    pub fn stop(&self, name: &str) {
        if !self.is_enabled() {
            return;
        }
        if let Some(started_us) = self.starts.load(name) {
            let now_us = MonotonicClock::now_us();
            self.durations.store(name, now_us.saturating_sub(started_us));
        }
    }

    /// Most recently completed duration for `name` in microseconds, or 0
    /// if the name never completed a measurement.
    pub fn duration_us(&self, name: &str) -> u64 {
        self.durations.load(name).unwrap_or(0)
    }

    /// Force-set the last duration for `name`, e.g. with a value
    /// received from a peer process.
    pub fn set_duration(&self, name: &str, value_us: u64) {
        self.durations.store(name, value_us);
    }

    /// Snapshot of every recorded duration, for shipping timings to a
    /// peer or dumping diagnostics.
    pub fn durations(&self) -> HashMap<String, u64> {
        self.durations.snapshot()
    }

    /// Pace the calling thread: block until the time elapsed since
    /// `name`'s last [`start`](Self::start) reaches `target_us`.
    ///
    /// Records `max(target_us, elapsed)` as the new last duration — the
    /// recorded value tracks the real cycle length, never less than the
    /// pacing budget. Returns `true` when the budget was already spent
    /// before the call (overtime), in which case nothing sleeps.
    ///
    /// Without a matching start, or while disabled, returns `false`
    /// immediately and records nothing. Once the sleep is entered it
    /// runs to completion; there is no cancellation.
    pub fn wait_until(&self, name: &str, target_us: u64) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let Some(started_us) = self.starts.load(name) else {
            return false;
        };

        let elapsed_us = MonotonicClock::now_us().saturating_sub(started_us);
        let overtime = elapsed_us >= target_us;

        // Recorded before the nap so concurrent readers see the cycle
        // length as soon as it is known.
        self.durations.store(name, target_us.max(elapsed_us));

        if overtime {
            tracing::trace!(name, elapsed_us, target_us, "pacing budget overrun");
        } else {
            thread::sleep(Duration::from_micros(target_us - elapsed_us));
        }
        overtime
    }

    /// Microseconds since the previous call with this `name`, or 0 on
    /// the first call, which arms the measurement instead. Equivalent to
    /// [`stop`](Self::stop) followed by [`start`](Self::start) — a
    /// one-call-site tick interval probe.
    pub fn since_last_seen(&self, name: &str) -> u64 {
        if !self.starts.contains(name) {
            self.start(name);
            return 0;
        }

        self.stop(name);
        let duration_us = self.duration_us(name);
        self.start(name);
        duration_us
    }

    /// Open a paced cycle: start the measurement for `name` and discard
    /// any budget this thread published but never consumed.
    pub fn open(&self, name: &str) {
        self.start(name);
        self.handoff.reset_own();
    }

    /// Publish a pacing budget for a later [`consume`](Self::consume) on
    /// this same thread.
    ///
    /// Blocks while a previously published budget is still pending — and
    /// forever if that budget is never consumed; the protocol has no
    /// timeout. Callers guarantee the matching consume eventually runs.
    pub fn publish(&self, value_us: u64) {
        self.handoff.publish(value_us);
    }

    /// Close a paced cycle with whatever budget this thread published.
    ///
    /// A positive pending budget published by the calling thread paces
    /// exactly like [`wait_until`](Self::wait_until) and returns its
    /// overtime flag. A zero budget, a budget owned by a different
    /// thread, or no budget at all degrades to a plain
    /// [`stop`](Self::stop) and returns `false` — cross-thread
    /// consumption never unblocks the pacing wait.
    pub fn consume(&self, name: &str) -> bool {
        match self.handoff.take() {
            Some(value_us) if value_us > 0 => self.wait_until(name, value_us),
            _ => {
                self.stop(name);
                false
            }
        }
    }

    /// Store a new master-clock value. Anything but an exact
    /// [`Timecode::FIELD_COUNT`]-field sequence is ignored; the caller
    /// gets no feedback beyond a debug log line.
    pub fn set_master_clock(&self, fields: &[i64]) {
        match Timecode::try_from(fields) {
            Ok(timecode) => self.master_clock.store(timecode),
            Err(err) => tracing::debug!(%err, "master clock update rejected"),
        }
    }

    /// Current master-clock value, `None` until the synchronization
    /// layer has set one.
    pub fn master_clock(&self) -> Option<Timecode> {
        self.master_clock.load()
    }

    /// Master clock decoded to elapsed program time plus the paused
    /// flag.
    ///
    /// `None` means not yet synchronized; callers treat that as a paused
    /// timeline, never as time zero.
    pub fn master_clock_time(&self) -> Option<MasterTime> {
        self.master_clock.load().map(|timecode| MasterTime {
            elapsed: timecode.as_duration(),
            paused: timecode.paused(),
        })
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}
