//! Input source capability interfaces.
//!
//! An input source is whatever produces raw keyboard and mouse events on a
//! given platform. The activity monitor asks an [`InputSourceFactory`] for a
//! source with the [`Capability::Activity`] capability, hands it a weak
//! [`ActivitySink`], and from then on receives events on the source's thread.
//!
//! A factory may return `None`. The monitor treats that as a valid degraded
//! mode in which no events ever arrive.

use std::sync::Weak;
use thiserror::Error;

/// What an input source is asked to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Keyboard, pointer, button and wheel notifications.
    Activity,
}

/// Errors reported by input sources.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input source already has an activity subscriber")]
    AlreadySubscribed,
    #[error("failed to start input thread: {0}")]
    Thread(#[from] std::io::Error),
}

/// Receiver of raw activity events.
///
/// Implementations are called from the input source's own thread and must
/// return quickly.
pub trait ActivitySink: Send + Sync {
    /// A key went down. `repeat` is set for auto-repeat presses.
    fn keyboard_notify(&self, repeat: bool);
    /// The pointer is at `(x, y)`; `wheel_delta` is non-zero for wheel ticks.
    fn mouse_notify(&self, x: i32, y: i32, wheel_delta: i32);
    /// A mouse button was pressed (`true`) or released (`false`).
    fn button_notify(&self, is_press: bool);
}

/// A platform provider of input events.
pub trait InputSource: Send + Sync {
    /// Starts delivering activity events to `sink`.
    ///
    /// The sink is held weakly; once it can no longer be upgraded events are
    /// dropped.
    fn subscribe_activity(&self, sink: Weak<dyn ActivitySink>) -> Result<(), InputError>;

    /// Stops delivering events. Calling it more than once has no further effect.
    fn terminate(&self);
}

/// Creates input sources for a requested capability.
pub trait InputSourceFactory {
    fn get_monitor(&self, capability: Capability) -> Option<Box<dyn InputSource>>;
}

/// Factory for environments without any input hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInputFactory;

impl InputSourceFactory for NoInputFactory {
    fn get_monitor(&self, _capability: Capability) -> Option<Box<dyn InputSource>> {
        None
    }
}
