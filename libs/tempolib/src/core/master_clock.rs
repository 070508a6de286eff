// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Shared master-clock cell.

use parking_lot::RwLock;

use super::timecode::Timecode;

/// Holder of the most recent master-clock value.
///
/// Readers and writers both take the lock; the critical section is a
/// copy of eight integers, so the lock's adaptive spinning resolves
/// almost all contention without a syscall. A value, once stored, is
/// only ever replaced whole.
#[derive(Debug, Default)]
pub(crate) struct MasterClockCell {
    slot: RwLock<Option<Timecode>>,
}

impl MasterClockCell {
    pub(crate) fn store(&self, timecode: Timecode) {
        *self.slot.write() = Some(timecode);
    }

    /// Copy of the current value, `None` until the first store.
    pub(crate) fn load(&self) -> Option<Timecode> {
        *self.slot.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_unset_cell_loads_none() {
        let cell = MasterClockCell::default();
        assert_eq!(cell.load(), None);
    }

    #[test]
    fn test_store_replaces_whole_value() {
        let cell = MasterClockCell::default();
        let first = Timecode::from_fields(&[0, 0, 0, 0, 0, 1, 0, 0]).unwrap();
        let second = Timecode::from_fields(&[0, 0, 0, 0, 0, 2, 0, 1]).unwrap();

        cell.store(first);
        assert_eq!(cell.load(), Some(first));

        cell.store(second);
        assert_eq!(cell.load(), Some(second));
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let cell = Arc::new(MasterClockCell::default());
        cell.store(Timecode::from_fields(&[0, 0, 0, 0, 0, 0, 0, 0]).unwrap());

        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for second in 0..50 {
                    let timecode =
                        Timecode::from_fields(&[0, 0, 0, 0, 0, second, 0, 0]).unwrap();
                    cell.store(timecode);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..200 {
                        // Readers always observe a complete value.
                        let timecode = cell.load().expect("cell was seeded");
                        assert!((0..50).contains(&timecode.seconds()));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
