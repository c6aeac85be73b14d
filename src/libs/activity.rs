//! Activity classification core.
//!
//! Turns raw keyboard and mouse events into a coarse, debounced activity state
//! that break reminders use to tell whether the user is working or resting.
//!
//! ## State Machine
//!
//! ```text
//!            first event                 burst spans activity_threshold
//!   ┌──────┐ ───────────▶ ┌───────┐ ─────────────────────────────────▶ ┌────────┐
//!   │ Idle │              │ Noise │                                    │ Active │
//!   └──────┘ ◀─────────── └───────┘                                    └────────┘
//!      ▲     force_idle /                                                   │
//!      │     set_parameters          query after idle_threshold of silence  │
//!      └────────────────────────────────────────────────────────────────────┘
//!
//!   Suspended is entered with suspend() and left with resume() only.
//! ```
//!
//! - **Noise**: activity has been seen but not yet confirmed. Every event whose
//!   gap to the previous one exceeds `noise_threshold` restarts the burst.
//! - **Active**: the current burst lasted at least `activity_threshold`.
//! - **Idle**: demotion from Active happens lazily in
//!   [`ActivityMonitor::get_current_state`] once nothing happened for longer
//!   than `idle_threshold`.
//!
//! ## Threading
//!
//! Input events arrive on the input source's thread while queries and
//! configuration changes come from the application. All state lives behind a
//! single mutex. The listener is always called with the mutex released so it
//! may call back into the monitor.
//!
//! ## Usage
//!
//! ```rust
//! use kaslmon::libs::activity::{ActivityMonitor, ActivityParameters, ActivityState};
//! use kaslmon::libs::clock::ManualClock;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new(1_000_000));
//! let monitor = ActivityMonitor::detached(clock.clone());
//! monitor.set_parameters(ActivityParameters { activity: 0, ..Default::default() });
//!
//! monitor.keyboard_notify(false);
//! assert_eq!(monitor.get_current_state(), ActivityState::Active);
//! ```

use crate::libs::clock::Clock;
use crate::libs::input::{ActivitySink, Capability, InputSource, InputSourceFactory};
use crate::libs::listener::ActivityListener;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

const MICROS_PER_MILLI: i64 = 1_000;
const MICROS_PER_SECOND: i64 = 1_000_000;

/// Sentinel for timestamps that were never recorded.
const UNSET: i64 = 0;

/// Coarse activity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    /// Monitoring is paused by the application.
    Suspended,
    /// No recent activity.
    Idle,
    /// Activity seen but not yet sustained long enough to count.
    Noise,
    /// Confirmed, sustained activity.
    Active,
}

impl Display for ActivityState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActivityState::Suspended => "suspended",
            ActivityState::Idle => "idle",
            ActivityState::Noise => "noise",
            ActivityState::Active => "active",
        };
        f.write_str(name)
    }
}

/// Monitor thresholds as exchanged with the outside world.
///
/// Durations are whole milliseconds. Internally they are kept in
/// microseconds, so every value set through [`ActivityMonitor::set_parameters`]
/// comes back unchanged from [`ActivityMonitor::get_parameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityParameters {
    /// Longest gap between two events that still belong to the same burst.
    pub noise: u64,
    /// How long a burst must last before the user counts as active.
    pub activity: u64,
    /// Silence after which an active user is considered idle.
    pub idle: u64,
    /// Minimum pointer travel, in pixels, for a move to count as activity.
    pub sensitivity: u32,
}

impl Default for ActivityParameters {
    fn default() -> Self {
        ActivityParameters {
            noise: 1_000,
            activity: 2_000,
            idle: 5_000,
            sensitivity: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Thresholds {
    noise: i64,
    activity: i64,
    idle: i64,
    sensitivity: u32,
}

impl From<ActivityParameters> for Thresholds {
    fn from(params: ActivityParameters) -> Self {
        Thresholds {
            noise: millis_to_micros(params.noise),
            activity: millis_to_micros(params.activity),
            idle: millis_to_micros(params.idle),
            sensitivity: params.sensitivity,
        }
    }
}

impl From<Thresholds> for ActivityParameters {
    fn from(thresholds: Thresholds) -> Self {
        ActivityParameters {
            noise: micros_to_millis(thresholds.noise),
            activity: micros_to_millis(thresholds.activity),
            idle: micros_to_millis(thresholds.idle),
            sensitivity: thresholds.sensitivity,
        }
    }
}

fn millis_to_micros(millis: u64) -> i64 {
    i64::try_from(millis).unwrap_or(i64::MAX).saturating_mul(MICROS_PER_MILLI)
}

fn micros_to_millis(micros: i64) -> u64 {
    u64::try_from(micros / MICROS_PER_MILLI).unwrap_or(0)
}

struct MonitorState {
    state: ActivityState,
    first_action_time: i64,
    last_action_time: i64,
    thresholds: Thresholds,
    prev_x: i32,
    prev_y: i32,
    button_is_pressed: bool,
    listener: Option<Weak<dyn ActivityListener>>,
}

impl MonitorState {
    fn new(params: ActivityParameters) -> Self {
        MonitorState {
            state: ActivityState::Idle,
            first_action_time: UNSET,
            last_action_time: UNSET,
            thresholds: params.into(),
            prev_x: 0,
            prev_y: 0,
            button_is_pressed: false,
            listener: None,
        }
    }

    fn set_state(&mut self, state: ActivityState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "activity state changed");
        }
        self.state = state;
    }

    /// Applies one activity event observed at `now`.
    fn record_action(&mut self, now: i64) {
        match self.state {
            ActivityState::Idle => {
                self.first_action_time = now;
                if self.thresholds.activity == 0 {
                    self.set_state(ActivityState::Active);
                } else {
                    self.set_state(ActivityState::Noise);
                }
            }
            ActivityState::Noise => {
                if now.saturating_sub(self.last_action_time) > self.thresholds.noise {
                    // Gap too large, the burst starts over.
                    self.first_action_time = now;
                } else if now.saturating_sub(self.first_action_time) >= self.thresholds.activity {
                    self.set_state(ActivityState::Active);
                }
            }
            ActivityState::Active | ActivityState::Suspended => {}
        }

        // Updated in every state, Suspended included.
        self.last_action_time = now;
    }
}

/// Thread-safe activity state machine fed by an input source.
///
/// Construct it with [`ActivityMonitor::new`] to attach a platform input
/// source, or [`ActivityMonitor::detached`] to drive it manually. The monitor
/// is always handed out behind an [`Arc`] because the input source keeps a weak
/// reference to it as its event sink.
pub struct ActivityMonitor {
    inner: Mutex<MonitorState>,
    clock: Arc<dyn Clock>,
    input_source: Option<Box<dyn InputSource>>,
    published: watch::Sender<ActivityState>,
}

impl ActivityMonitor {
    /// Creates a monitor and subscribes it to an activity input source.
    ///
    /// If the factory has no source for [`Capability::Activity`], or the source
    /// refuses the subscription, the monitor runs without input. It then stays
    /// idle until its state is changed explicitly.
    pub fn new(factory: &dyn InputSourceFactory, clock: Arc<dyn Clock>) -> Arc<Self> {
        let source = factory.get_monitor(Capability::Activity);

        Arc::new_cyclic(|weak: &Weak<ActivityMonitor>| {
            let sink: Weak<dyn ActivitySink> = weak.clone();
            let input_source = match source {
                Some(source) => match source.subscribe_activity(sink) {
                    Ok(()) => {
                        info!("activity monitor subscribed to input source");
                        Some(source)
                    }
                    Err(e) => {
                        warn!(error = %e, "input source rejected subscription, running without input");
                        source.terminate();
                        None
                    }
                },
                None => {
                    warn!("no activity input source available, running without input");
                    None
                }
            };
            Self::build(clock, input_source)
        })
    }

    /// Creates a monitor without any input source.
    pub fn detached(clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self::build(clock, None))
    }

    fn build(clock: Arc<dyn Clock>, input_source: Option<Box<dyn InputSource>>) -> Self {
        let (published, _) = watch::channel(ActivityState::Idle);
        ActivityMonitor {
            inner: Mutex::new(MonitorState::new(ActivityParameters::default())),
            clock,
            input_source,
            published,
        }
    }

    /// Whether an input source is attached.
    pub fn has_input_source(&self) -> bool {
        self.input_source.is_some()
    }

    /// Asks the input source to stop producing events.
    pub fn terminate(&self) {
        if let Some(source) = &self.input_source {
            source.terminate();
        }
    }

    /// Pauses monitoring until [`resume`](Self::resume).
    pub fn suspend(&self) {
        let mut inner = self.inner.lock();
        inner.set_state(ActivityState::Suspended);
        self.publish(inner.state);
    }

    /// Leaves the suspended state (or any other) for idle.
    pub fn resume(&self) {
        let mut inner = self.inner.lock();
        inner.set_state(ActivityState::Idle);
        self.publish(inner.state);
    }

    /// Drops to idle and forgets the last action, unless suspended.
    pub fn force_idle(&self) {
        let mut inner = self.inner.lock();
        if inner.state != ActivityState::Suspended {
            inner.set_state(ActivityState::Idle);
            inner.last_action_time = UNSET;
        }
        self.publish(inner.state);
    }

    /// Returns the current state, demoting Active to Idle when the user has
    /// been quiet for longer than the idle threshold.
    pub fn get_current_state(&self) -> ActivityState {
        let mut inner = self.inner.lock();
        if inner.state == ActivityState::Active {
            let now = self.clock.now_micros();
            let elapsed = now.saturating_sub(inner.last_action_time);
            trace!(elapsed_us = elapsed, idle_us = inner.thresholds.idle, "checking active state");
            if elapsed > inner.thresholds.idle {
                inner.set_state(ActivityState::Idle);
            }
        }
        self.publish(inner.state);
        inner.state
    }

    /// Replaces all thresholds at once and restarts classification from idle.
    ///
    /// Timing collected under the old thresholds is meaningless under the new
    /// ones, so any burst in progress is discarded.
    pub fn set_parameters(&self, params: ActivityParameters) {
        let mut inner = self.inner.lock();
        inner.thresholds = params.into();
        inner.set_state(ActivityState::Idle);
        debug!(?params, "activity parameters updated");
        self.publish(inner.state);
    }

    pub fn get_parameters(&self) -> ActivityParameters {
        self.inner.lock().thresholds.into()
    }

    /// Moves the stored timestamps by `delta_seconds` after the wall clock was
    /// adjusted, so elapsed-time checks stay valid across the jump.
    ///
    /// Unset timestamps stay unset.
    pub fn shift_time(&self, delta_seconds: i64) {
        let delta = delta_seconds.saturating_mul(MICROS_PER_SECOND);
        info!(delta_seconds, "activity monitor: shift");

        let mut inner = self.inner.lock();
        if inner.last_action_time != UNSET {
            inner.last_action_time = inner.last_action_time.saturating_add(delta);
        }
        if inner.first_action_time != UNSET {
            inner.first_action_time = inner.first_action_time.saturating_add(delta);
        }
    }

    /// Installs `listener` as the only subscriber, replacing any previous one.
    ///
    /// Only a weak reference is kept; the caller owns the listener.
    pub fn set_listener<L: ActivityListener + 'static>(&self, listener: &Arc<L>) {
        let weak: Weak<dyn ActivityListener> = Arc::<L>::downgrade(listener);
        self.inner.lock().listener = Some(weak);
    }

    pub fn clear_listener(&self) {
        self.inner.lock().listener = None;
    }

    pub fn has_listener(&self) -> bool {
        self.inner.lock().listener.is_some()
    }

    /// Receiver of every state published by the monitor.
    ///
    /// States are published while the monitor lock is held, so the receiver
    /// always ends on the monitor's latest state. Do not hold a
    /// [`borrow`](watch::Receiver::borrow) across calls into the monitor.
    pub fn subscribe_state(&self) -> watch::Receiver<ActivityState> {
        self.published.subscribe()
    }

    /// Time of the last processed event in microseconds, or 0 if unset.
    pub fn last_action_time(&self) -> i64 {
        self.inner.lock().last_action_time
    }

    /// Start of the current burst in microseconds, or 0 if unset.
    pub fn first_action_time(&self) -> i64 {
        self.inner.lock().first_action_time
    }

    /// Pointer movement or wheel tick reported by the input source.
    pub fn mouse_notify(&self, x: i32, y: i32, wheel_delta: i32) {
        let triggered = {
            let mut inner = self.inner.lock();
            let delta_x = i64::from(x) - i64::from(inner.prev_x);
            let delta_y = i64::from(y) - i64::from(inner.prev_y);
            inner.prev_x = x;
            inner.prev_y = y;

            let sensitivity = i64::from(inner.thresholds.sensitivity);
            let significant = delta_x.abs() >= sensitivity
                || delta_y.abs() >= sensitivity
                || wheel_delta != 0
                || inner.button_is_pressed;
            if significant {
                inner.record_action(self.clock.now_micros());
            }
            significant
        };

        if triggered {
            self.call_listener();
        }
    }

    /// Mouse button press or release. Releases alone are not activity.
    pub fn button_notify(&self, is_press: bool) {
        {
            let mut inner = self.inner.lock();
            inner.button_is_pressed = is_press;
            if is_press {
                inner.record_action(self.clock.now_micros());
            }
        }

        if is_press {
            self.call_listener();
        }
    }

    /// Key press. Auto-repeat counts the same as a fresh press.
    pub fn keyboard_notify(&self, _repeat: bool) {
        {
            let mut inner = self.inner.lock();
            inner.record_action(self.clock.now_micros());
        }
        self.call_listener();
    }

    fn call_listener(&self) {
        let Some(weak) = self.inner.lock().listener.clone() else {
            return;
        };

        let keep = match weak.upgrade() {
            Some(listener) => listener.action_notify(),
            None => false,
        };

        if !keep {
            let mut inner = self.inner.lock();
            // A listener installed while this one was running stays.
            if inner.listener.as_ref().is_some_and(|current| current.ptr_eq(&weak)) {
                inner.listener = None;
                debug!("activity listener unsubscribed");
            }
        }
    }

    /// Callers hold the monitor lock, which orders publications.
    fn publish(&self, state: ActivityState) {
        trace!(%state, "publishing activity state");
        self.published.send_replace(state);
    }
}

impl ActivitySink for ActivityMonitor {
    fn keyboard_notify(&self, repeat: bool) {
        ActivityMonitor::keyboard_notify(self, repeat);
    }

    fn mouse_notify(&self, x: i32, y: i32, wheel_delta: i32) {
        ActivityMonitor::mouse_notify(self, x, y, wheel_delta);
    }

    fn button_notify(&self, is_press: bool) {
        ActivityMonitor::button_notify(self, is_press);
    }
}

impl Drop for ActivityMonitor {
    fn drop(&mut self) {
        if let Some(source) = self.input_source.take() {
            source.terminate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(noise: u64, activity: u64) -> MonitorState {
        MonitorState::new(ActivityParameters {
            noise,
            activity,
            idle: 5_000,
            sensitivity: 3,
        })
    }

    #[test]
    fn first_event_starts_a_burst() {
        let mut state = state_with(1_000, 2_000);
        state.record_action(10_000_000);

        assert_eq!(state.state, ActivityState::Noise);
        assert_eq!(state.first_action_time, 10_000_000);
        assert_eq!(state.last_action_time, 10_000_000);
    }

    #[test]
    fn burst_exactly_reaching_threshold_is_active() {
        let mut state = state_with(1_000, 2_000);
        for ms in [0, 1_000, 2_000] {
            state.record_action(10_000_000 + ms * 1_000);
        }
        assert_eq!(state.state, ActivityState::Active);
    }

    #[test]
    fn gap_of_exactly_noise_threshold_keeps_burst() {
        let mut state = state_with(1_000, 2_000);
        state.record_action(10_000_000);
        state.record_action(11_000_000);

        assert_eq!(state.state, ActivityState::Noise);
        assert_eq!(state.first_action_time, 10_000_000);
    }

    #[test]
    fn suspended_ignores_events_but_records_time() {
        let mut state = state_with(1_000, 2_000);
        state.state = ActivityState::Suspended;
        state.record_action(42_000_000);

        assert_eq!(state.state, ActivityState::Suspended);
        assert_eq!(state.first_action_time, UNSET);
        assert_eq!(state.last_action_time, 42_000_000);
    }

    #[test]
    fn threshold_conversion_saturates() {
        let thresholds = Thresholds::from(ActivityParameters {
            noise: u64::MAX,
            activity: 1,
            idle: 0,
            sensitivity: 0,
        });
        assert_eq!(thresholds.noise, i64::MAX);
        assert_eq!(thresholds.activity, 1_000);
        assert_eq!(thresholds.idle, 0);
    }

    #[test]
    fn state_display_is_lowercase() {
        assert_eq!(ActivityState::Noise.to_string(), "noise");
        assert_eq!(serde_json::to_string(&ActivityState::Active).unwrap(), "\"active\"");
    }
}
