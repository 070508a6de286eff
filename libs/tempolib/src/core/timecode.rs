// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Master-clock timecode.
//!
//! The 8-field hierarchical value that independent execution contexts
//! (possibly on different machines) exchange to agree on elapsed program
//! time. How the value travels between processes is the transport's
//! business; this module only validates the field count and decodes the
//! semantics.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Sub-second units per second in the timecode's frame field.
pub const TIMECODE_RATE_HZ: i64 = 120;

/// Error building a [`Timecode`] from raw fields.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimecodeError {
    /// The field sequence did not have exactly [`Timecode::FIELD_COUNT`]
    /// entries.
    #[error("timecode requires exactly 8 fields, got {0}")]
    FieldCount(usize),
}

/// A hierarchical, mixed-radix master-clock value.
///
/// Field layout:
///
/// | index | meaning                                            |
/// |-------|----------------------------------------------------|
/// | 0–1   | opaque, carried through untouched                  |
/// | 2     | day count                                          |
/// | 3     | hour of day                                        |
/// | 4     | minute of hour                                     |
/// | 5     | second of minute                                   |
/// | 6     | frame of second, at [`TIMECODE_RATE_HZ`] units/sec |
/// | 7     | paused flag (non-zero = paused)                    |
///
/// Only a full 8-field sequence constructs a value; anything else is
/// rejected, which is what lets the owning context treat malformed
/// updates as silent no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timecode {
    fields: [i64; Self::FIELD_COUNT],
}

impl Timecode {
    /// Exact number of fields a valid timecode carries.
    pub const FIELD_COUNT: usize = 8;

    /// Build a timecode from a raw field sequence.
    pub fn from_fields(fields: &[i64]) -> Result<Self, TimecodeError> {
        let fields: [i64; Self::FIELD_COUNT] = fields
            .try_into()
            .map_err(|_| TimecodeError::FieldCount(fields.len()))?;
        Ok(Self { fields })
    }

    /// Raw fields, opaque leading pair included.
    pub fn fields(&self) -> &[i64; Self::FIELD_COUNT] {
        &self.fields
    }

    /// Day count.
    pub fn days(&self) -> i64 {
        self.fields[2]
    }

    /// Hour of day.
    pub fn hours(&self) -> i64 {
        self.fields[3]
    }

    /// Minute of hour.
    pub fn minutes(&self) -> i64 {
        self.fields[4]
    }

    /// Second of minute.
    pub fn seconds(&self) -> i64 {
        self.fields[5]
    }

    /// Sub-second frame index, counted at [`TIMECODE_RATE_HZ`].
    pub fn frames(&self) -> i64 {
        self.fields[6]
    }

    /// Whether the shared timeline is paused.
    pub fn paused(&self) -> bool {
        self.fields[7] != 0
    }

    /// Absolute frame count since the timecode epoch.
    pub fn frame_count(&self) -> i64 {
        self.frames()
            + TIMECODE_RATE_HZ
                * (self.seconds()
                    + 60 * (self.minutes() + 60 * (self.hours() + 24 * self.days())))
    }

    /// Absolute microseconds since the timecode epoch.
    pub fn as_micros(&self) -> i64 {
        self.frame_count() * 1_000_000 / TIMECODE_RATE_HZ
    }

    /// Absolute elapsed time since the timecode epoch.
    ///
    /// Negative field values clamp to zero.
    pub fn as_duration(&self) -> Duration {
        Duration::from_micros(self.as_micros().max(0) as u64)
    }
}

impl TryFrom<&[i64]> for Timecode {
    type Error = TimecodeError;

    fn try_from(fields: &[i64]) -> Result<Self, Self::Error> {
        Self::from_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_field_count() {
        assert_eq!(Timecode::from_fields(&[]), Err(TimecodeError::FieldCount(0)));
        assert_eq!(
            Timecode::from_fields(&[0, 0, 1, 2, 3, 4, 60]),
            Err(TimecodeError::FieldCount(7))
        );
        assert_eq!(
            Timecode::from_fields(&[0; 9]),
            Err(TimecodeError::FieldCount(9))
        );
    }

    #[test]
    fn test_decodes_mixed_radix_fields() {
        let timecode = Timecode::from_fields(&[0, 0, 1, 2, 3, 4, 60, 0]).unwrap();
        assert_eq!(timecode.days(), 1);
        assert_eq!(timecode.hours(), 2);
        assert_eq!(timecode.minutes(), 3);
        assert_eq!(timecode.seconds(), 4);
        assert_eq!(timecode.frames(), 60);
        assert!(!timecode.paused());

        let expected_frames = 60 + 120 * (4 + 60 * (3 + 60 * (2 + 24 * 1)));
        assert_eq!(timecode.frame_count(), expected_frames);
        assert_eq!(timecode.as_micros(), expected_frames * 1_000_000 / 120);
        assert_eq!(
            timecode.as_duration(),
            Duration::from_micros((expected_frames * 1_000_000 / 120) as u64)
        );
    }

    #[test]
    fn test_paused_flag() {
        let running = Timecode::from_fields(&[0, 0, 0, 0, 0, 1, 0, 0]).unwrap();
        assert!(!running.paused());

        let paused = Timecode::from_fields(&[0, 0, 0, 0, 0, 1, 0, 1]).unwrap();
        assert!(paused.paused());
    }

    #[test]
    fn test_leading_fields_pass_through() {
        let timecode = Timecode::from_fields(&[7, -3, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(timecode.fields()[0], 7);
        assert_eq!(timecode.fields()[1], -3);
        // They never contribute to the decoded time.
        assert_eq!(timecode.as_micros(), 0);
    }

    #[test]
    fn test_half_second_of_frames() {
        let timecode = Timecode::from_fields(&[0, 0, 0, 0, 0, 0, 60, 0]).unwrap();
        assert_eq!(timecode.as_micros(), 500_000);
    }

    #[test]
    fn test_negative_time_clamps_to_zero_duration() {
        let timecode = Timecode::from_fields(&[0, 0, -1, 0, 0, 0, 0, 0]).unwrap();
        assert!(timecode.as_micros() < 0);
        assert_eq!(timecode.as_duration(), Duration::ZERO);
    }

    #[test]
    fn test_timecode_serde() {
        let timecode = Timecode::from_fields(&[0, 0, 1, 2, 3, 4, 60, 1]).unwrap();
        let json = serde_json::to_string(&timecode).unwrap();
        let deserialized: Timecode = serde_json::from_str(&json).unwrap();
        assert_eq!(timecode, deserialized);
    }
}
