/*!
 * Runtime Configuration
 *
 * Tick budget and trigger cadence for the runtime, with environment
 * overrides:
 * - TASKTREE_TICK_BUDGET_MS: per-tick execution budget (default: 6)
 * - TASKTREE_FRAME_INTERVAL_MS: interval of the frame trigger (default: 16)
 * - TASKTREE_TRACE_JSON: JSON log output (default: false)
 */

use super::errors::ConfigError;
use super::serde::duration_millis;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-tick execution budget
pub const DEFAULT_TICK_BUDGET: Duration = Duration::from_millis(6);

/// Default interval between frame-trigger ticks (roughly 60 per second)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub const ENV_TICK_BUDGET: &str = "TASKTREE_TICK_BUDGET_MS";
pub const ENV_FRAME_INTERVAL: &str = "TASKTREE_FRAME_INTERVAL_MS";
pub const ENV_TRACE_JSON: &str = "TASKTREE_TRACE_JSON";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Wall-clock budget of a single scheduler tick
    #[serde(with = "duration_millis")]
    pub tick_budget: Duration,

    /// Cadence of the frame trigger
    #[serde(with = "duration_millis")]
    pub frame_interval: Duration,

    /// Emit JSON logs instead of the compact human format
    pub trace_json: bool,
}

impl RuntimeConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            tick_budget: DEFAULT_TICK_BUDGET,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            trace_json: false,
        }
    }

    /// Generous budget so a single tick drains everything in tests
    pub fn testing() -> Self {
        Self {
            tick_budget: Duration::from_secs(5),
            frame_interval: Duration::from_millis(1),
            trace_json: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_tick_budget(mut self, budget: Duration) -> Self {
        self.tick_budget = budget;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Load defaults and apply environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new().with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TICK_BUDGET) {
            self.tick_budget = parse_millis(ENV_TICK_BUDGET, &raw)?;
        }
        if let Some(raw) = lookup(ENV_FRAME_INTERVAL) {
            self.frame_interval = parse_millis(ENV_FRAME_INTERVAL, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TRACE_JSON) {
            self.trace_json = parse_flag(ENV_TRACE_JSON, &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject configurations the scheduler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_budget.is_zero() {
            return Err(ConfigError::Invalid("tick budget must be non-zero".into()));
        }
        if self.frame_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "frame interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_millis(var: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::Parse {
            var: var.into(),
            value: raw.to_string(),
        })
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ConfigError::Parse {
            var: var.into(),
            value: raw.to_string(),
        }),
    }
}
