/*!
 * Monitoring Module
 * Structured tracing setup and step-level spans
 */

pub mod tracer;

pub use tracer::{init_test_tracing, init_tracing, init_tracing_with, StepSpan, SLOW_STEP_THRESHOLD};
