/*!
 * Counter Workload
 */

use super::{DemoConfig, Meter};
use crate::core::Value;
use crate::instructions::effects::put;
use crate::ipc::Channel;
use crate::process::{Computation, Program, Step};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Milliseconds since the epoch, with sub-millisecond precision
pub fn timestamp_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Counts `1..=max`, yielding each number as progress.
///
/// Every `checkpoint_each` counts a timestamp is put on the timing channel;
/// a final `Null` marks the count as finished.
pub struct Counter {
    timing: Channel,
    max: i64,
    checkpoint_each: i64,
    next: i64,
    checkpoint_due: bool,
    cleared: bool,
    meter: Meter,
}

impl Counter {
    pub fn new(timing: Channel, max: i64, checkpoint_each: u64, meter: Meter) -> Self {
        Self {
            timing,
            max,
            checkpoint_each: checkpoint_each.max(1) as i64,
            next: 1,
            checkpoint_due: false,
            cleared: false,
            meter,
        }
    }
}

impl Computation for Counter {
    fn resume(&mut self, input: Value) -> Step {
        // A bare yield comes back unchanged: that's the number on display
        if let Some(shown) = input.as_int() {
            self.meter.set_count(shown);
        }

        if self.checkpoint_due {
            self.checkpoint_due = false;
            return Step::perform(put(&self.timing, timestamp_millis()));
        }

        if self.next <= self.max {
            let i = self.next;
            self.next += 1;
            self.checkpoint_due = i % self.checkpoint_each == 0;
            return Step::emit(i);
        }

        if !self.cleared {
            self.cleared = true;
            return Step::perform(put(&self.timing, Value::Null));
        }

        Step::Done
    }
}

/// Program taking `[timing: Channel, max: Int]`
pub fn counter_program(config: DemoConfig, meter: Meter) -> Program {
    Program::new("counter", move |args| {
        let timing = args.first().and_then(Value::as_channel).cloned();
        let max = args.get(1).and_then(Value::as_int).unwrap_or(0);
        if timing.is_none() {
            warn!("counter started without a timing channel");
        }
        Counter::new(
            timing.unwrap_or_default(),
            max,
            config.checkpoint_each,
            meter.clone(),
        )
    })
}
