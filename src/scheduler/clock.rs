/*!
 * Scheduler Clock
 * Time source used to compute tick deadlines
 */

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to; makes tick deadlines deterministic
/// in tests.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Time elapsed since the clock was created
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}
