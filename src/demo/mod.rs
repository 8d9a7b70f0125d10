/*!
 * Demo Workloads
 *
 * Headless counter/rate widgets exercising every instruction:
 * - `controller`: takes target counts from an input channel, cancels the
 *   running counter and forks a new one; spawns a detached `rate` process
 * - `counter`: counts up with bare yields, puts a timestamp on the timing
 *   channel every `checkpoint_each`, and `Null` when finished
 * - `rate`: keeps a sliding window of checkpoint timestamps and reports
 *   throughput relative to the best seen
 *
 * Progress is published through a shared `Meter` for the host to read.
 */

pub mod controller;
pub mod counter;
pub mod rate;

pub use controller::controller_program;
pub use counter::counter_program;
pub use rate::{rate_program, RateCalculator};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tuning for the demo workloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Counter emits a checkpoint every this many counts
    pub checkpoint_each: u64,
    /// Checkpoints needed before a rate is reported (at least 2)
    pub min_rate_checkpoints: usize,
    /// Sliding window size
    pub max_rate_checkpoints: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            checkpoint_each: 3000,
            min_rate_checkpoints: 5,
            max_rate_checkpoints: 10,
        }
    }
}

/// Latest values published by the demo processes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// Last count displayed by the counter
    pub count: i64,
    /// Counts per millisecond over the current window
    pub rate_per_ms: f64,
    /// Current rate relative to the best seen, in 0..=1
    pub relative: f64,
    /// Checkpoints in the window
    pub checkpoints: usize,
    /// Times the window was cleared by a finished count
    pub clears: u64,
}

/// Shared output sink standing in for the widget's display
#[derive(Debug, Clone, Default)]
pub struct Meter {
    reading: Arc<Mutex<MeterReading>>,
}

impl Meter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reading(&self) -> MeterReading {
        *self.reading.lock()
    }

    pub(crate) fn set_count(&self, count: i64) {
        self.reading.lock().count = count;
    }

    pub(crate) fn set_rate(&self, rate_per_ms: f64, relative: f64, checkpoints: usize) {
        let mut reading = self.reading.lock();
        reading.rate_per_ms = rate_per_ms;
        reading.relative = relative;
        reading.checkpoints = checkpoints;
    }

    pub(crate) fn record_clear(&self) {
        self.reading.lock().clears += 1;
    }
}
