/*!
 * Process Types
 * Common types for process management
 */

use crate::core::serde::is_none;
use crate::core::types::Pid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process state
///
/// `Waiting -> Ready -> Waiting ...`, with `Terminated` reachable from either
/// and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Suspended until something resumes it
    Waiting,
    /// Holding a resume value, step queued on the scheduler
    Ready,
    /// Removed from the process tree
    Terminated,
}

impl ProcessState {
    /// Whether moving from `self` to `next` is legal
    #[inline]
    #[must_use]
    pub const fn can_transition_to(self, next: ProcessState) -> bool {
        matches!(
            (self, next),
            (ProcessState::Waiting, ProcessState::Ready)
                | (ProcessState::Ready, ProcessState::Ready)
                | (ProcessState::Ready, ProcessState::Waiting)
                | (ProcessState::Waiting, ProcessState::Terminated)
                | (ProcessState::Ready, ProcessState::Terminated)
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, ProcessState::Terminated)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ProcessState::Waiting => "waiting",
            ProcessState::Ready => "ready",
            ProcessState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a process, returned by fork/spawn and accepted by cancel.
///
/// Holding a task does not keep the process alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Task {
    pid: Pid,
}

impl Task {
    #[inline]
    pub const fn new(pid: Pid) -> Self {
        Self { pid }
    }

    #[inline]
    pub const fn pid(&self) -> Pid {
        self.pid
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.pid)
    }
}

/// Snapshot of a live process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    #[serde(skip_serializing_if = "is_none")]
    pub parent: Option<Pid>,
    pub children: Vec<Pid>,
    /// Steps executed so far
    pub steps: u64,
}

impl ProcessInfo {
    #[inline]
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Manager-wide lifecycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerStats {
    /// Processes ever created
    pub created: u64,
    /// Processes whose computation ran to completion
    pub completed: u64,
    /// Processes removed by cancellation, including cascaded descendants
    pub cancelled: u64,
    /// Processes that had a fault delivered into them
    pub faulted: u64,
    /// Processes alive at snapshot time
    pub live: usize,
}
