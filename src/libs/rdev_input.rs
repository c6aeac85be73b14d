//! Platform input source built on `rdev`.
//!
//! `rdev::listen` blocks its thread for as long as the hook is installed, so
//! the source runs it on a dedicated thread. When the hook fails (for example
//! because no display server is reachable yet) it is retried after a delay
//! until the source is terminated. `rdev` offers no way to remove the hook, so
//! termination only stops events from being forwarded.

use crate::libs::input::{ActivitySink, Capability, InputError, InputSource, InputSourceFactory};
use rdev::{listen, Event, EventType, Key};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Maps raw `rdev` events onto activity sink calls.
///
/// `rdev` reports neither key auto-repeat nor the pointer position of wheel
/// events, so both are reconstructed here from earlier events.
#[derive(Debug, Default)]
pub struct EventTranslator {
    held_keys: Vec<Key>,
    last_x: i32,
    last_y: i32,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event_type: &EventType, sink: &dyn ActivitySink) {
        match *event_type {
            EventType::KeyPress(key) => {
                let repeat = self.held_keys.contains(&key);
                if !repeat {
                    self.held_keys.push(key);
                }
                sink.keyboard_notify(repeat);
            }
            EventType::KeyRelease(key) => self.held_keys.retain(|held| *held != key),
            EventType::ButtonPress(_) => sink.button_notify(true),
            EventType::ButtonRelease(_) => sink.button_notify(false),
            EventType::MouseMove { x, y } => {
                self.last_x = to_coordinate(x);
                self.last_y = to_coordinate(y);
                sink.mouse_notify(self.last_x, self.last_y, 0);
            }
            EventType::Wheel { delta_x, delta_y } => {
                let delta = if delta_y != 0 { delta_y } else { delta_x };
                let delta = i32::try_from(delta).unwrap_or(if delta > 0 { i32::MAX } else { i32::MIN });
                sink.mouse_notify(self.last_x, self.last_y, delta);
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }
}

fn to_coordinate(value: f64) -> i32 {
    // `as` saturates and maps NaN to 0.
    value.round() as i32
}

/// Input source that hooks the desktop session through `rdev`.
#[derive(Debug)]
pub struct RdevInputSource {
    terminated: Arc<AtomicBool>,
    subscribed: AtomicBool,
}

impl RdevInputSource {
    pub fn new() -> Self {
        RdevInputSource {
            terminated: Arc::new(AtomicBool::new(false)),
            subscribed: AtomicBool::new(false),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl Default for RdevInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for RdevInputSource {
    fn subscribe_activity(&self, sink: Weak<dyn ActivitySink>) -> Result<(), InputError> {
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return Err(InputError::AlreadySubscribed);
        }

        let terminated = Arc::clone(&self.terminated);
        thread::Builder::new()
            .name("kaslmon-input".to_string())
            .spawn(move || run_listener(sink, terminated))?;
        Ok(())
    }

    fn terminate(&self) {
        if !self.terminated.swap(true, Ordering::SeqCst) {
            info!("input source terminated");
        }
    }
}

fn run_listener(sink: Weak<dyn ActivitySink>, terminated: Arc<AtomicBool>) {
    while !terminated.load(Ordering::SeqCst) {
        let sink = sink.clone();
        let stop = Arc::clone(&terminated);
        let mut translator = EventTranslator::new();

        let result = listen(move |event: Event| {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            if let Some(sink) = sink.upgrade() {
                translator.translate(&event.event_type, sink.as_ref());
            }
        });

        match result {
            Ok(()) => break,
            Err(e) => {
                warn!(error = ?e, "failed to listen for input events, retrying in {:?}", RETRY_DELAY);
                thread::sleep(RETRY_DELAY);
            }
        }
    }
    debug!("input listener thread finished");
}

/// Factory returning `rdev` sources for the activity capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct RdevFactory;

impl InputSourceFactory for RdevFactory {
    fn get_monitor(&self, capability: Capability) -> Option<Box<dyn InputSource>> {
        match capability {
            Capability::Activity => Some(Box::new(RdevInputSource::new())),
        }
    }
}
