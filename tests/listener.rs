#[cfg(test)]
mod tests {
    use kaslmon::libs::activity::{ActivityMonitor, ActivityParameters, ActivityState};
    use kaslmon::libs::clock::ManualClock;
    use kaslmon::libs::listener::{ActivityCounter, ActivityListener};
    use parking_lot::Mutex;
    use std::sync::{Arc, Weak};
    use std::thread;
    use test_context::{test_context, TestContext};

    struct ListenerTestContext {
        monitor: Arc<ActivityMonitor>,
    }

    impl TestContext for ListenerTestContext {
        fn setup() -> Self {
            let clock = Arc::new(ManualClock::new(1_700_000_000_000_000));
            let monitor = ActivityMonitor::detached(clock);
            monitor.set_parameters(ActivityParameters {
                activity: 0,
                ..ActivityParameters::default()
            });
            ListenerTestContext { monitor }
        }
    }

    /// Queries the monitor from inside the callback.
    struct ReentrantListener {
        monitor: Weak<ActivityMonitor>,
        seen: Mutex<Vec<ActivityState>>,
    }

    impl ActivityListener for ReentrantListener {
        fn action_notify(&self) -> bool {
            if let Some(monitor) = self.monitor.upgrade() {
                self.seen.lock().push(monitor.get_current_state());
            }
            true
        }
    }

    /// Replaces itself with another listener, then unsubscribes.
    struct HandoverListener {
        monitor: Weak<ActivityMonitor>,
        successor: Arc<ActivityCounter>,
    }

    impl ActivityListener for HandoverListener {
        fn action_notify(&self) -> bool {
            if let Some(monitor) = self.monitor.upgrade() {
                monitor.set_listener(&self.successor);
            }
            false
        }
    }

    #[test_context(ListenerTestContext)]
    #[test]
    fn test_listener_called_for_every_event(ctx: &mut ListenerTestContext) {
        let counter = Arc::new(ActivityCounter::new());
        ctx.monitor.set_listener(&counter);
        assert!(ctx.monitor.has_listener());

        ctx.monitor.keyboard_notify(false);
        ctx.monitor.keyboard_notify(true);
        ctx.monitor.button_notify(true);
        ctx.monitor.button_notify(false);
        ctx.monitor.mouse_notify(40, 40, 0);

        assert_eq!(counter.count(), 4);
    }

    #[test_context(ListenerTestContext)]
    #[test]
    fn test_listener_returning_false_is_dropped(ctx: &mut ListenerTestContext) {
        let counter = Arc::new(ActivityCounter::with_limit(1));
        ctx.monitor.set_listener(&counter);

        ctx.monitor.keyboard_notify(false);
        assert_eq!(counter.count(), 1);
        assert!(!ctx.monitor.has_listener());

        ctx.monitor.keyboard_notify(false);
        assert_eq!(counter.count(), 1);
        // The owner still holds it; the monitor never owned it.
        assert_eq!(Arc::strong_count(&counter), 1);
    }

    #[test_context(ListenerTestContext)]
    #[test]
    fn test_dropped_listener_is_cleared(ctx: &mut ListenerTestContext) {
        let counter = Arc::new(ActivityCounter::new());
        ctx.monitor.set_listener(&counter);
        drop(counter);

        ctx.monitor.keyboard_notify(false);
        assert!(!ctx.monitor.has_listener());
    }

    #[test_context(ListenerTestContext)]
    #[test]
    fn test_set_listener_replaces_previous(ctx: &mut ListenerTestContext) {
        let first = Arc::new(ActivityCounter::new());
        let second = Arc::new(ActivityCounter::new());
        ctx.monitor.set_listener(&first);
        ctx.monitor.set_listener(&second);

        ctx.monitor.keyboard_notify(false);
        assert_eq!(first.count(), 0);
        assert_eq!(second.count(), 1);

        ctx.monitor.clear_listener();
        ctx.monitor.keyboard_notify(false);
        assert_eq!(second.count(), 1);
    }

    #[test_context(ListenerTestContext)]
    #[test]
    fn test_listener_can_call_back_into_monitor(ctx: &mut ListenerTestContext) {
        let listener = Arc::new(ReentrantListener {
            monitor: Arc::downgrade(&ctx.monitor),
            seen: Mutex::new(Vec::new()),
        });
        ctx.monitor.set_listener(&listener);

        ctx.monitor.keyboard_notify(false);
        ctx.monitor.suspend();
        ctx.monitor.keyboard_notify(false);

        assert_eq!(*listener.seen.lock(), vec![ActivityState::Active, ActivityState::Suspended]);
    }

    #[test_context(ListenerTestContext)]
    #[test]
    fn test_replacement_installed_by_listener_survives_unsubscribe(ctx: &mut ListenerTestContext) {
        let successor = Arc::new(ActivityCounter::new());
        let handover = Arc::new(HandoverListener {
            monitor: Arc::downgrade(&ctx.monitor),
            successor: Arc::clone(&successor),
        });
        ctx.monitor.set_listener(&handover);

        ctx.monitor.keyboard_notify(false);
        assert!(ctx.monitor.has_listener());
        assert_eq!(successor.count(), 0);

        ctx.monitor.keyboard_notify(false);
        assert_eq!(successor.count(), 1);
    }

    #[test_context(ListenerTestContext)]
    #[test]
    fn test_concurrent_events_and_queries(ctx: &mut ListenerTestContext) {
        let counter = Arc::new(ActivityCounter::new());
        ctx.monitor.set_listener(&counter);

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let monitor = Arc::clone(&ctx.monitor);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        monitor.keyboard_notify(false);
                    }
                })
            })
            .collect();

        let reader = {
            let monitor = Arc::clone(&ctx.monitor);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    let state = monitor.get_current_state();
                    assert!(matches!(state, ActivityState::Idle | ActivityState::Active));
                }
            })
        };

        for producer in producers {
            producer.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(counter.count(), 4_000);
        assert_eq!(ctx.monitor.get_current_state(), ActivityState::Active);
    }
}
