//! Clock trait abstraction for pacing without real sleeps in tests.
//!
//! - `SystemClock`: delegates to `tokio::time`
//! - `MockClock`: records requested sleeps and returns immediately

use std::future::Future;
use std::time::Duration;

/// Abstraction over waiting between platform calls.
pub trait Clock: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Live implementation: delegates to real tokio time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "test-support"))]
mod mock {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::Clock;

    /// Mock clock for unit tests: `sleep()` returns at once and the
    /// requested durations can be inspected afterwards.
    #[derive(Debug, Clone, Default)]
    pub struct MockClock {
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl MockClock {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every duration passed to `sleep()`, in call order.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    impl Clock for MockClock {
        fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            self.sleeps.lock().unwrap().push(duration);
            std::future::ready(())
        }
    }
}
