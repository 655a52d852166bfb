//! Injected time source.
//!
//! The wheel never calls `SystemTime::now()` directly: every read of "now"
//! goes through a [`Clock`] so re-anchoring and due-checks can be driven
//! deterministically in tests without real sleeps.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

/// A source of the current wall-clock time.
///
/// Readings must be monotone non-decreasing across calls from the wheel's
/// perspective; [`SystemClock`] satisfies this in practice, and test clocks
/// must only move forward.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Production clock backed by [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually driven clock for deterministic tests.
///
/// Wrap in an [`Arc`] to share one clock between a test driver and the wheel
/// under test:
///
/// ```
/// use std::sync::Arc;
/// use std::time::{Duration, SystemTime};
/// use timewheel::ManualClock;
///
/// let clock = Arc::new(ManualClock::new(SystemTime::UNIX_EPOCH));
/// clock.advance(Duration::from_secs(5));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `d`.
    pub fn advance(&self, d: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += d;
    }

    /// Jump the clock to an absolute time. `t` must not be earlier than the
    /// current reading.
    pub fn set(&self, t: SystemTime) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        debug_assert!(t >= *now, "ManualClock must not move backwards");
        *now = t;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared clocks are clocks.
impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> SystemTime {
        (**self).now()
    }
}
