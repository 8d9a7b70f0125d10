/*!
 * Lock-Free Scheduler Statistics
 * Atomic counters updated from the tick loop, read through snapshots
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of scheduler activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Continuations ever enqueued
    pub enqueued: u64,
    /// Continuations run to completion or panic
    pub executed: u64,
    /// Continuations that panicked and were dropped
    pub panicked: u64,
    /// Ticks started
    pub ticks: u64,
    /// Ticks that stopped because the deadline passed with work left
    pub deadline_hits: u64,
    /// Continuations waiting at snapshot time
    pub queue_len: usize,
    /// Configured budget per tick
    pub budget_micros: u64,
}

/// Atomic scheduler statistics for lock-free updates
///
/// All operations use relaxed ordering; individual counters are exact,
/// cross-counter consistency is not guaranteed.
#[derive(Debug, Default)]
pub(super) struct AtomicSchedulerStats {
    enqueued: AtomicU64,
    executed: AtomicU64,
    panicked: AtomicU64,
    ticks: AtomicU64,
    deadline_hits: AtomicU64,
}

impl AtomicSchedulerStats {
    #[inline(always)]
    pub fn inc_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_executed(&self) {
        self.executed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_panicked(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_ticks(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_deadline_hits(&self) {
        self.deadline_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, queue_len: usize, budget_micros: u64) -> SchedulerStats {
        SchedulerStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
            deadline_hits: self.deadline_hits.load(Ordering::Relaxed),
            queue_len,
            budget_micros,
        }
    }
}
