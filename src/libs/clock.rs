//! Wall-clock sources for the activity monitor.
//!
//! The monitor measures every duration as the difference of two microsecond
//! readings taken from a [`Clock`]. Production code reads the system wall clock
//! through [`SystemClock`]; tests drive time explicitly with [`ManualClock`] so
//! that threshold boundaries can be hit exactly.
//!
//! ## Usage
//!
//! ```rust
//! use kaslmon::libs::clock::{Clock, ManualClock};
//!
//! let clock = ManualClock::new(1_000_000);
//! clock.advance_millis(250);
//! assert_eq!(clock.now_micros(), 1_250_000);
//! ```

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Source of wall-clock time in microseconds.
pub trait Clock: Send + Sync {
    /// Returns the current time in microseconds.
    fn now_micros(&self) -> i64;
}

/// Reads the real wall clock (microseconds since the Unix epoch).
///
/// The wall clock can jump when the system time is corrected. Owners of the
/// monitor are expected to detect such jumps and call
/// [`ActivityMonitor::shift_time`](crate::libs::activity::ActivityMonitor::shift_time).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> i64 {
        Utc::now().timestamp_micros()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_micros: i64) -> Self {
        Self {
            now: AtomicI64::new(start_micros),
        }
    }

    pub fn set_micros(&self, micros: i64) {
        self.now.store(micros, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, millis: i64) {
        self.now.fetch_add(millis.saturating_mul(1000), Ordering::SeqCst);
    }

    pub fn advance(&self, duration: Duration) {
        let micros = i64::try_from(duration.as_micros()).unwrap_or(i64::MAX);
        self.now.fetch_add(micros, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
