/*!
 * Structured Tracing
 * Subscriber setup and per-step spans built on the tracing crate
 */

use crate::core::config::{DEFAULT_TICK_BUDGET, ENV_TRACE_JSON};
use crate::core::types::Pid;
use std::time::{Duration, Instant};
use tracing::{span, trace, warn, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// A single step running longer than this starves the rest of its tick
pub const SLOW_STEP_THRESHOLD: Duration = DEFAULT_TICK_BUDGET;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - TASKTREE_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);
    init_tracing_with(use_json);
}

/// Initialize tracing with an explicit output format.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing_with(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        tracing::info!(json, "Structured tracing initialized");
    }
}

/// Compact debug-level subscriber for tests; safe to call repeatedly
pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(tracing_subscriber::fmt::layer().compact().with_test_writer())
        .try_init();
}

/// Span around one computation step
///
/// Logs the step duration when dropped and warns about slow steps.
pub struct StepSpan {
    span: Span,
    start: Instant,
    pid: Pid,
}

impl StepSpan {
    pub fn new(pid: Pid, program: &str) -> Self {
        let span = span!(
            Level::TRACE,
            "step",
            pid = pid,
            program = program,
            outcome = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            pid,
        }
    }

    /// Record how the step ended: "yield", "done" or "panic"
    pub fn record_outcome(&self, outcome: &'static str) {
        self.span.record("outcome", outcome);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for StepSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration > SLOW_STEP_THRESHOLD {
            warn!(
                pid = self.pid,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow step detected"
            );
        } else {
            trace!(pid = self.pid, duration_us = duration.as_micros() as u64, "step completed");
        }
    }
}
