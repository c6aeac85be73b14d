//! Polling loop that reports activity state changes.
//!
//! The monitor only demotes Active to Idle when asked for its state, so
//! something has to ask regularly. The watcher does that on a fixed interval,
//! reports transitions, and keeps the monitor's timestamps valid when the
//! system clock is corrected underneath it.
//!
//! ## Clock Jumps
//!
//! Between two polls the watcher compares how far the wall clock moved with
//! how far the monotonic clock moved. When the wall clock fell behind by a
//! second or more it was set back, and the monitor's timestamps are shifted
//! by the same amount.
//!
//! A forward gap is left alone. The monotonic clock stops while the machine
//! sleeps, so wall time outrunning it usually means a suspend, and that time
//! really passed for the user.

use crate::libs::activity::{ActivityMonitor, ActivityState};
use crate::libs::clock::Clock;
use crate::libs::listener::ActivityCounter;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_info};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{self, MissedTickBehavior};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Smallest disagreement between the clocks treated as a clock jump.
const CLOCK_JUMP_TOLERANCE_US: i64 = MICROS_PER_SECOND;

/// A transition observed by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: ActivityState,
    pub to: ActivityState,
    /// Input events processed since the previous change.
    pub events: u64,
}

/// Returns the backward wall-clock jump in whole seconds, if any.
///
/// `wall_elapsed_us` is how far the wall clock moved, `monotonic_elapsed` how
/// much time passed while the machine was awake. The result is always
/// negative.
pub fn clock_shift(wall_elapsed_us: i64, monotonic_elapsed: Duration) -> Option<i64> {
    let real_us = i64::try_from(monotonic_elapsed.as_micros()).unwrap_or(i64::MAX);
    let drift = wall_elapsed_us.saturating_sub(real_us);
    if drift > -CLOCK_JUMP_TOLERANCE_US {
        return None;
    }
    Some((drift as f64 / MICROS_PER_SECOND as f64).round() as i64)
}

pub struct Watcher {
    monitor: Arc<ActivityMonitor>,
    counter: Arc<ActivityCounter>,
    clock: Arc<dyn Clock>,
    last_state: ActivityState,
    last_wall: i64,
    last_instant: Instant,
    pending_events: u64,
    total_events: u64,
}

impl Watcher {
    /// Creates a watcher and installs `counter` as the monitor's listener.
    pub fn new(monitor: Arc<ActivityMonitor>, counter: Arc<ActivityCounter>, clock: Arc<dyn Clock>) -> Self {
        monitor.set_listener(&counter);
        let last_state = monitor.get_current_state();
        let last_wall = clock.now_micros();
        Watcher {
            monitor,
            counter,
            clock,
            last_state,
            last_wall,
            last_instant: Instant::now(),
            pending_events: 0,
            total_events: 0,
        }
    }

    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    pub fn last_state(&self) -> ActivityState {
        self.last_state
    }

    /// Checks the clock, queries the monitor once and reports a transition.
    pub fn poll(&mut self) -> Option<StateChange> {
        let wall = self.clock.now_micros();
        let instant = Instant::now();
        if let Some(shift) = clock_shift(wall.saturating_sub(self.last_wall), instant.duration_since(self.last_instant)) {
            self.monitor.shift_time(shift);
            msg_info!(Message::ClockShifted(shift));
        }
        self.last_wall = wall;
        self.last_instant = instant;

        let events = self.counter.take();
        self.pending_events += events;
        self.total_events += events;

        let state = self.monitor.get_current_state();
        if state == self.last_state {
            return None;
        }

        let change = StateChange {
            from: self.last_state,
            to: state,
            events: self.pending_events,
        };
        self.last_state = state;
        self.pending_events = 0;
        Some(change)
    }

    /// Polls forever at `poll_interval`, printing every transition.
    pub async fn run(&mut self, poll_interval: Duration) {
        let mut interval = time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Some(change) = self.poll() {
                msg_info!(Message::ActivityStateChanged(change.from.to_string(), change.to.to_string()));
                msg_debug!(Message::ActivityEvents(change.events));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_drift_is_not_a_jump() {
        assert_eq!(clock_shift(500_400, Duration::from_millis(500)), None);
        assert_eq!(clock_shift(0, Duration::from_millis(999)), None);
    }

    #[test]
    fn backward_jump_rounds_to_seconds() {
        assert_eq!(clock_shift(-119_500_000, Duration::from_millis(500)), Some(-120));
        assert_eq!(clock_shift(-1_000_000, Duration::ZERO), Some(-1));
    }

    #[test]
    fn forward_gap_counts_as_elapsed_time() {
        // Wall time keeps running through a suspend, monotonic time does not.
        assert_eq!(clock_shift(3_600_500_000, Duration::from_millis(500)), None);
        assert_eq!(clock_shift(i64::MAX, Duration::ZERO), None);
    }
}
