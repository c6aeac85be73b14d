//! Activity listener capability.
//!
//! The monitor notifies at most one listener after every processed input
//! event. The listener's return value decides whether it stays subscribed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Subscriber notified on every processed activity event.
pub trait ActivityListener: Send + Sync {
    /// Called after an event was processed, with the monitor unlocked.
    ///
    /// Returns `false` to unsubscribe.
    fn action_notify(&self) -> bool;
}

/// Listener that counts notifications.
///
/// With a limit set it unsubscribes itself on the notification that reaches
/// the limit.
#[derive(Debug, Default)]
pub struct ActivityCounter {
    count: AtomicU64,
    limit: Option<u64>,
}

impl ActivityCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: u64) -> Self {
        Self {
            count: AtomicU64::new(0),
            limit: Some(limit),
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Returns the count and resets it to zero.
    pub fn take(&self) -> u64 {
        self.count.swap(0, Ordering::Relaxed)
    }
}

impl ActivityListener for ActivityCounter {
    fn action_notify(&self) -> bool {
        let seen = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        match self.limit {
            Some(limit) => seen < limit,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_counter_stays_subscribed() {
        let counter = ActivityCounter::new();
        for _ in 0..10 {
            assert!(counter.action_notify());
        }
        assert_eq!(counter.count(), 10);
        assert_eq!(counter.take(), 10);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn limited_counter_unsubscribes_at_limit() {
        let counter = ActivityCounter::with_limit(2);
        assert!(counter.action_notify());
        assert!(!counter.action_notify());
        assert_eq!(counter.count(), 2);
    }
}
