/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::Pid;
use crate::process::ProcessState;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use smartstring::alias::String as InlineString;
use thiserror::Error;

/// Process-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process {0} not found")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have terminated or never existed. Check the task handle.")
    )]
    NotFound(Pid),

    #[error("Invalid state transition for process {pid}: {from:?} -> {to:?}")]
    #[diagnostic(
        code(process::invalid_transition),
        help("Only Waiting -> Ready -> Waiting cycles and moves to Terminated are allowed.")
    )]
    InvalidTransition {
        pid: Pid,
        from: ProcessState,
        to: ProcessState,
    },

    #[error("Process {0} is terminated")]
    #[diagnostic(
        code(process::terminated),
        help("Terminated is absorbing. A terminated process can no longer be resumed.")
    )]
    Terminated(Pid),

    #[error("Process {0} is already stepping")]
    #[diagnostic(
        code(process::busy),
        help("A step re-entered the same process. Steps must not drive their own process.")
    )]
    Busy(Pid),
}

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Invalid tick budget: {0}")]
    #[diagnostic(
        code(scheduler::invalid_budget),
        help("The per-tick budget must be a non-zero duration.")
    )]
    InvalidBudget(InlineString),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(config::invalid),
        help("Review the runtime configuration parameters.")
    )]
    Invalid(InlineString),

    #[error("Could not parse {var}={value:?}")]
    #[diagnostic(
        code(config::parse),
        help("Environment overrides take whole numbers of milliseconds or true/false.")
    )]
    Parse { var: InlineString, value: String },
}

/// Failure delivered into a computation when its process is killed with an
/// error.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(process::fault))]
pub struct Fault {
    pub message: InlineString,
    /// Process the fault was raised in, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Pid>,
}

impl Fault {
    pub fn new(message: impl Into<InlineString>) -> Self {
        Self {
            message: message.into(),
            origin: None,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, pid: Pid) -> Self {
        self.origin = Some(pid);
        self
    }
}

/// Unified runtime error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum RuntimeError {
    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Scheduler error: {0}")]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Computation fault: {0}")]
    #[diagnostic(transparent)]
    Fault(#[from] Fault),
}
