/*!
 * Rate Workload
 * Throughput over a sliding window of counter checkpoints
 */

use super::{DemoConfig, Meter};
use crate::core::Value;
use crate::instructions::effects::take;
use crate::ipc::Channel;
use crate::process::{Computation, Program, Step};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Turns a window of checkpoint timestamps into a rate.
///
/// Remembers the best rate it has seen so it can report the current one
/// relative to it.
#[derive(Debug, Clone)]
pub struct RateCalculator {
    checkpoint_each: f64,
    min_checkpoints: usize,
    max_rate: f64,
}

/// One rate measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    /// Counts per second
    pub per_second: f64,
    /// `per_second` over the best rate seen, in 0..=1
    pub relative: f64,
}

impl RateCalculator {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            checkpoint_each: config.checkpoint_each as f64,
            min_checkpoints: config.min_rate_checkpoints.max(2),
            max_rate: 0.0,
        }
    }

    /// Rate over `checkpoints` (millisecond timestamps, oldest first).
    ///
    /// `None` until the window holds enough checkpoints, or when they span
    /// no time at all.
    pub fn sample(&mut self, checkpoints: &VecDeque<f64>) -> Option<RateSample> {
        let count = checkpoints.len();
        if count < self.min_checkpoints {
            return None;
        }
        let oldest = *checkpoints.front()?;
        let newest = *checkpoints.back()?;
        let seconds = (newest - oldest) / 1000.0;
        if seconds <= 0.0 {
            return None;
        }

        let per_second = self.checkpoint_each * (count - 1) as f64 / seconds;
        if per_second > self.max_rate {
            self.max_rate = per_second;
        }
        Some(RateSample {
            per_second,
            relative: per_second / self.max_rate,
        })
    }

    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }
}

/// Loops forever: take a checkpoint, update the window, report the rate
pub struct Rate {
    timing: Channel,
    window: VecDeque<f64>,
    max_checkpoints: usize,
    calculator: RateCalculator,
    meter: Meter,
    awaiting: bool,
}

impl Rate {
    pub fn new(timing: Channel, config: &DemoConfig, meter: Meter) -> Self {
        Self {
            timing,
            window: VecDeque::with_capacity(config.max_rate_checkpoints + 1),
            max_checkpoints: config.max_rate_checkpoints.max(1),
            calculator: RateCalculator::new(config),
            meter,
            awaiting: false,
        }
    }

    fn record(&mut self, checkpoint: Value) -> f64 {
        match checkpoint.as_float() {
            Some(timestamp) => {
                self.window.push_back(timestamp);
                if self.window.len() > self.max_checkpoints {
                    self.window.pop_front();
                }
            }
            None if checkpoint.is_null() => {
                debug!(dropped = self.window.len(), "count finished, clearing checkpoints");
                self.window.clear();
                self.meter.record_clear();
            }
            None => warn!(kind = checkpoint.kind(), "ignoring non-numeric checkpoint"),
        }

        let (per_ms, relative) = match self.calculator.sample(&self.window) {
            Some(sample) => (sample.per_second / 1000.0, sample.relative),
            None => (0.0, 0.0),
        };
        self.meter.set_rate(per_ms, relative, self.window.len());
        relative
    }
}

impl Computation for Rate {
    fn resume(&mut self, input: Value) -> Step {
        if self.awaiting {
            self.awaiting = false;
            // Progress yield; comes straight back
            return Step::emit(self.record(input));
        }
        self.awaiting = true;
        Step::perform(take(&self.timing))
    }
}

/// Program taking `[timing: Channel]`
pub fn rate_program(config: DemoConfig, meter: Meter) -> Program {
    Program::new("rate", move |args| {
        let timing = args.first().and_then(Value::as_channel).cloned();
        if timing.is_none() {
            warn!("rate started without a timing channel");
        }
        Rate::new(timing.unwrap_or_default(), &config, meter.clone())
    })
}
