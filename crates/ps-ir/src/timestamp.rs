//! Time and percentage units shared by the performance model.

use serde::{Deserialize, Serialize};

/// Absolute position in microseconds from the start of the performance.
pub type Timestamp = i64;

/// Length of a time span in microseconds.
pub type Duration = i64;

/// Fixed-point percentage: `ONE_PERCENT` units per percent.
pub type Percentage = i32;

pub const ONE_PERCENT: Percentage = 100;
pub const HUNDRED_PERCENT: Percentage = ONE_PERCENT * 100;

/// Convert a fixed-point percentage into a plain factor (10_000 -> 1.0).
pub fn percentage_to_factor(percentage: Percentage) -> f64 {
    percentage as f64 / HUNDRED_PERCENT as f64
}

/// A span of time starting at `timestamp`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampAndDuration {
    pub timestamp: Timestamp,
    pub duration: Duration,
}

impl TimestampAndDuration {
    pub const fn new(timestamp: Timestamp, duration: Duration) -> Self {
        Self { timestamp, duration }
    }

    /// Timestamp at which the span ends.
    pub const fn end(&self) -> Timestamp {
        self.timestamp + self.duration
    }
}
