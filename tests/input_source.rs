#[cfg(test)]
mod tests {
    use kaslmon::libs::activity::{ActivityMonitor, ActivityState};
    use kaslmon::libs::clock::{Clock, ManualClock};
    use kaslmon::libs::input::{ActivitySink, Capability, InputError, InputSource, InputSourceFactory, NoInputFactory};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Weak};
    use test_context::{test_context, TestContext};

    /// State shared between a fake source and the test driving it.
    #[derive(Default)]
    struct FakeHook {
        sink: Mutex<Option<Weak<dyn ActivitySink>>>,
        requested: Mutex<Vec<Capability>>,
        terminations: AtomicUsize,
    }

    impl FakeHook {
        /// Delivers a key press like a platform hook thread would.
        fn press_key(&self) -> bool {
            let sink = self.sink.lock().clone();
            match sink.and_then(|sink| sink.upgrade()) {
                Some(sink) => {
                    sink.keyboard_notify(false);
                    true
                }
                None => false,
            }
        }

        fn terminations(&self) -> usize {
            self.terminations.load(Ordering::SeqCst)
        }
    }

    struct FakeSource {
        hook: Arc<FakeHook>,
        reject: bool,
    }

    impl InputSource for FakeSource {
        fn subscribe_activity(&self, sink: Weak<dyn ActivitySink>) -> Result<(), InputError> {
            if self.reject {
                return Err(InputError::Thread(std::io::Error::new(std::io::ErrorKind::Other, "no display")));
            }
            *self.hook.sink.lock() = Some(sink);
            Ok(())
        }

        fn terminate(&self) {
            self.hook.terminations.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeFactory {
        hook: Arc<FakeHook>,
        reject: bool,
    }

    impl InputSourceFactory for FakeFactory {
        fn get_monitor(&self, capability: Capability) -> Option<Box<dyn InputSource>> {
            self.hook.requested.lock().push(capability);
            Some(Box::new(FakeSource {
                hook: Arc::clone(&self.hook),
                reject: self.reject,
            }))
        }
    }

    struct InputTestContext {
        clock: Arc<dyn Clock>,
        hook: Arc<FakeHook>,
    }

    impl TestContext for InputTestContext {
        fn setup() -> Self {
            InputTestContext {
                clock: Arc::new(ManualClock::new(1_700_000_000_000_000)),
                hook: Arc::new(FakeHook::default()),
            }
        }
    }

    impl InputTestContext {
        fn factory(&self, reject: bool) -> FakeFactory {
            FakeFactory {
                hook: Arc::clone(&self.hook),
                reject,
            }
        }
    }

    #[test_context(InputTestContext)]
    #[test]
    fn test_monitor_without_input_source_stays_idle(ctx: &mut InputTestContext) {
        let monitor = ActivityMonitor::new(&NoInputFactory, Arc::clone(&ctx.clock));

        assert!(!monitor.has_input_source());
        assert_eq!(monitor.get_current_state(), ActivityState::Idle);

        // Explicit calls still work in degraded mode.
        monitor.suspend();
        assert_eq!(monitor.get_current_state(), ActivityState::Suspended);
        monitor.terminate();
    }

    #[test_context(InputTestContext)]
    #[test]
    fn test_monitor_subscribes_for_activity(ctx: &mut InputTestContext) {
        let monitor = ActivityMonitor::new(&ctx.factory(false), Arc::clone(&ctx.clock));

        assert!(monitor.has_input_source());
        assert_eq!(*ctx.hook.requested.lock(), vec![Capability::Activity]);

        assert!(ctx.hook.press_key());
        assert_eq!(monitor.get_current_state(), ActivityState::Noise);
    }

    #[test_context(InputTestContext)]
    #[test]
    fn test_rejected_subscription_degrades(ctx: &mut InputTestContext) {
        let monitor = ActivityMonitor::new(&ctx.factory(true), Arc::clone(&ctx.clock));

        assert!(!monitor.has_input_source());
        assert_eq!(ctx.hook.terminations(), 1);
        assert!(!ctx.hook.press_key());
        assert_eq!(monitor.get_current_state(), ActivityState::Idle);
    }

    #[test_context(InputTestContext)]
    #[test]
    fn test_terminate_reaches_input_source(ctx: &mut InputTestContext) {
        let monitor = ActivityMonitor::new(&ctx.factory(false), Arc::clone(&ctx.clock));

        monitor.terminate();
        monitor.terminate();
        assert_eq!(ctx.hook.terminations(), 2);
    }

    #[test_context(InputTestContext)]
    #[test]
    fn test_dropping_monitor_releases_input_source(ctx: &mut InputTestContext) {
        let monitor = ActivityMonitor::new(&ctx.factory(false), Arc::clone(&ctx.clock));
        assert!(ctx.hook.press_key());

        drop(monitor);
        assert_eq!(ctx.hook.terminations(), 1);
        // The hook only held a weak reference.
        assert!(!ctx.hook.press_key());
    }
}
