// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Single-slot rendezvous for moving a pacing budget between call sites.
//!
//! A producing call site publishes a duration; the consuming call site —
//! which must be the *same thread* — takes it and feeds it into the
//! pacing wait. The slot is an explicit two-state machine rather than a
//! lock held across public calls: publishing arms it, consuming disarms
//! it, and a second publisher blocks until the armed value is consumed.

use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SlotState {
    /// Nothing pending.
    #[default]
    Idle,
    /// A value is armed, waiting for the owning thread to consume it.
    Published { value_us: u64, owner: ThreadId },
}

/// Same-thread-consume rendezvous slot.
///
/// Hazard, by contract: a publish that is never consumed leaves the slot
/// armed and blocks every later publisher indefinitely. There is no
/// timeout; callers guarantee the consume call eventually runs on the
/// publishing thread.
#[derive(Debug, Default)]
pub(crate) struct HandoffSlot {
    state: Mutex<SlotState>,
    consumed: Condvar,
}

impl HandoffSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until the slot is free, then arm it with `value_us` owned
    /// by the calling thread.
    pub(crate) fn publish(&self, value_us: u64) {
        let mut state = self.state.lock();
        while matches!(*state, SlotState::Published { .. }) {
            self.consumed.wait(&mut state);
        }
        *state = SlotState::Published {
            value_us,
            owner: thread::current().id(),
        };
    }

    /// Take the armed value if the calling thread published it.
    ///
    /// Returns `None` when the slot is idle or armed by another thread;
    /// a foreign value stays armed — cross-thread consumption never
    /// succeeds.
    pub(crate) fn take(&self) -> Option<u64> {
        let mut state = self.state.lock();
        match *state {
            SlotState::Published { value_us, owner } if owner == thread::current().id() => {
                *state = SlotState::Idle;
                self.consumed.notify_one();
                Some(value_us)
            }
            _ => None,
        }
    }

    /// Zero the armed value if the calling thread owns it, keeping the
    /// slot armed. Opening a new measurement discards a budget this
    /// thread published but has not consumed yet; the eventual consume
    /// then degrades to a plain stop.
    pub(crate) fn reset_own(&self) {
        let mut state = self.state.lock();
        if let SlotState::Published {
            ref mut value_us,
            owner,
        } = *state
        {
            if owner == thread::current().id() {
                *value_us = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_take_on_idle_slot_is_none() {
        let slot = HandoffSlot::new();
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_publish_then_take_same_thread() {
        let slot = HandoffSlot::new();
        slot.publish(16_667);
        assert_eq!(slot.take(), Some(16_667));
        // Consumed: the slot is idle again.
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_take_from_other_thread_leaves_slot_armed() {
        let slot = Arc::new(HandoffSlot::new());
        slot.publish(5_000);

        let other = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.take())
        };
        assert_eq!(other.join().unwrap(), None);

        // Still armed for the publishing thread.
        assert_eq!(slot.take(), Some(5_000));
    }

    #[test]
    fn test_second_publisher_blocks_until_consume() {
        let slot = Arc::new(HandoffSlot::new());
        slot.publish(1_000);

        let second_done = Arc::new(AtomicBool::new(false));
        let second = {
            let slot = Arc::clone(&slot);
            let second_done = Arc::clone(&second_done);
            thread::spawn(move || {
                slot.publish(2_000);
                second_done.store(true, Ordering::Relaxed);
                // Clean up our own publish so the slot ends idle.
                assert_eq!(slot.take(), Some(2_000));
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(
            !second_done.load(Ordering::Relaxed),
            "second publish must block while the first value is pending"
        );

        assert_eq!(slot.take(), Some(1_000));
        second.join().unwrap();
        assert!(second_done.load(Ordering::Relaxed));
    }

    #[test]
    fn test_reset_own_zeroes_only_own_value() {
        let slot = Arc::new(HandoffSlot::new());
        slot.publish(9_000);

        // A foreign reset leaves the value untouched.
        {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.reset_own()).join().unwrap();
        }
        assert_eq!(slot.take(), Some(9_000));

        // An owning reset zeroes the pending value but keeps it armed.
        slot.publish(4_000);
        slot.reset_own();
        assert_eq!(slot.take(), Some(0));
    }
}
