/*!
 * Tick Scheduler
 *
 * FIFO queue of ready continuations drained in time-budgeted ticks. A tick
 * runs queued continuations until the queue is empty or the budget is spent;
 * whatever remains waits for the next tick. Continuations are never
 * interrupted: a long step only delays the deadline check.
 */

pub mod clock;
pub mod stats;
pub mod trigger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use stats::SchedulerStats;
pub use trigger::{FrameCommand, FrameDriver, ManualTrigger, Trigger};

use crate::core::config::DEFAULT_TICK_BUDGET;
use crate::core::errors::SchedulerError;
use crossbeam_queue::SegQueue;
use parking_lot::RwLock;
use stats::AtomicSchedulerStats;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, trace};

/// Zero-argument unit of work resumed by the scheduler
pub type Continuation = Box<dyn FnOnce() + Send>;

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Continuations run during the tick
    pub executed: usize,
    /// Continuations left for a later tick
    pub remaining: usize,
    /// Tick stopped because the budget ran out
    pub deadline_reached: bool,
}

struct Inner {
    queue: SegQueue<Continuation>,
    budget: RwLock<Duration>,
    clock: Arc<dyn Clock>,
    trigger: RwLock<Option<Arc<dyn Trigger>>>,
    stats: AtomicSchedulerStats,
}

/// Time-budgeted FIFO scheduler. Cloning shares the same queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Scheduler with the default 6ms budget on the system clock
    pub fn new() -> Self {
        Self::build(DEFAULT_TICK_BUDGET, Arc::new(SystemClock))
    }

    /// Scheduler with a custom per-tick budget
    pub fn with_budget(budget: Duration) -> Result<Self, SchedulerError> {
        Self::with_clock(budget, Arc::new(SystemClock))
    }

    /// Scheduler with a custom budget and time source
    pub fn with_clock(budget: Duration, clock: Arc<dyn Clock>) -> Result<Self, SchedulerError> {
        if budget.is_zero() {
            return Err(SchedulerError::InvalidBudget(
                format!("{:?}", budget).into(),
            ));
        }
        Ok(Self::build(budget, clock))
    }

    fn build(budget: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: SegQueue::new(),
                budget: RwLock::new(budget),
                clock,
                trigger: RwLock::new(None),
                stats: AtomicSchedulerStats::default(),
            }),
        }
    }

    /// Attach the periodic trigger and arm it for the first tick
    pub fn set_trigger(&self, trigger: Arc<dyn Trigger>) {
        *self.inner.trigger.write() = Some(trigger);
        self.arm();
    }

    /// Append a continuation to the ready queue
    pub fn enqueue<F>(&self, continuation: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.queue.push(Box::new(continuation));
        self.inner.stats.inc_enqueued();
    }

    /// Run queued continuations until the queue drains or the budget is spent.
    ///
    /// A continuation that panics is logged and dropped; the tick carries on.
    /// The trigger is re-armed on every exit path.
    pub fn tick(&self) -> TickReport {
        let _rearm = RearmOnDrop(self);
        self.inner.stats.inc_ticks();

        let deadline = self.inner.clock.now() + *self.inner.budget.read();
        let mut executed = 0usize;

        while self.inner.clock.now() < deadline {
            let Some(work) = self.inner.queue.pop() else {
                trace!(executed, "tick drained queue");
                return TickReport {
                    executed,
                    remaining: 0,
                    deadline_reached: false,
                };
            };

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
                self.inner.stats.inc_panicked();
                error!(panic = %panic_message(&payload), "Dropped panicking continuation");
            }
            self.inner.stats.inc_executed();
            executed += 1;
        }

        let remaining = self.inner.queue.len();
        if remaining > 0 {
            self.inner.stats.inc_deadline_hits();
        }
        trace!(executed, remaining, "tick budget spent");
        TickReport {
            executed,
            remaining,
            deadline_reached: remaining > 0,
        }
    }

    /// Number of continuations waiting
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.queue.is_empty()
    }

    #[inline]
    pub fn budget(&self) -> Duration {
        *self.inner.budget.read()
    }

    /// Change the per-tick budget (takes effect on the next tick)
    pub fn set_budget(&self, budget: Duration) -> Result<(), SchedulerError> {
        if budget.is_zero() {
            return Err(SchedulerError::InvalidBudget(
                format!("{:?}", budget).into(),
            ));
        }
        *self.inner.budget.write() = budget;
        Ok(())
    }

    pub fn stats(&self) -> SchedulerStats {
        self.inner
            .stats
            .snapshot(self.len(), self.budget().as_micros() as u64)
    }

    fn arm(&self) {
        let trigger = self.inner.trigger.read().clone();
        if let Some(trigger) = trigger {
            trigger.arm();
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

struct RearmOnDrop<'a>(&'a Scheduler);

impl Drop for RearmOnDrop<'_> {
    fn drop(&mut self) {
        self.0.arm();
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
