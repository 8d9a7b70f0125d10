/*!
 * Process
 * One computation's suspend/resume state and its place in the process tree
 */

use super::computation::Computation;
use super::types::{ProcessInfo, ProcessState};
use crate::core::errors::ProcessError;
use crate::core::types::Pid;
use crate::core::Value;
use smartstring::alias::String as SmartString;

pub struct Process {
    pid: Pid,
    name: SmartString,
    state: ProcessState,
    /// `None` while the computation is out being stepped
    computation: Option<Box<dyn Computation>>,
    parent: Option<Pid>,
    children: Vec<Pid>,
    /// Value the next step resumes with
    pending: Value,
    steps: u64,
}

impl Process {
    pub(crate) fn new(
        pid: Pid,
        name: &str,
        computation: Box<dyn Computation>,
        parent: Option<Pid>,
    ) -> Self {
        Self {
            pid,
            name: name.into(),
            state: ProcessState::Waiting,
            computation: Some(computation),
            parent,
            children: Vec::new(),
            pending: Value::Null,
            steps: 0,
        }
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    #[inline]
    pub fn parent(&self) -> Option<Pid> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[Pid] {
        &self.children
    }

    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Store the resume value and move to Ready.
    ///
    /// Returns `true` only on a Waiting -> Ready edge, which is when a step
    /// has to be scheduled. Readying an already-Ready process just replaces
    /// the pending value.
    pub(crate) fn ready(&mut self, value: Value) -> Result<bool, ProcessError> {
        self.transition(ProcessState::Ready)?;
        let was_waiting = self.state == ProcessState::Waiting;
        self.pending = value;
        self.state = ProcessState::Ready;
        Ok(was_waiting)
    }

    /// Hand out the computation and its resume value for one step
    pub(crate) fn begin_step(&mut self) -> Result<(Box<dyn Computation>, Value), ProcessError> {
        if self.state != ProcessState::Ready {
            return Err(ProcessError::InvalidTransition {
                pid: self.pid,
                from: self.state,
                to: ProcessState::Waiting,
            });
        }
        let computation = self
            .computation
            .take()
            .ok_or(ProcessError::Busy(self.pid))?;
        Ok((computation, std::mem::take(&mut self.pending)))
    }

    /// Take the computation back after a step and suspend
    pub(crate) fn end_step(&mut self, computation: Box<dyn Computation>) {
        self.computation = Some(computation);
        self.state = ProcessState::Waiting;
        self.steps += 1;
    }

    /// Mark terminated and release the computation for finalization.
    ///
    /// `None` when the process was torn down in the middle of its own step.
    pub(crate) fn terminate(&mut self) -> Option<Box<dyn Computation>> {
        self.state = ProcessState::Terminated;
        self.computation.take()
    }

    pub(crate) fn add_child(&mut self, child: Pid) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: Pid) {
        self.children.retain(|&pid| pid != child);
    }

    #[must_use]
    pub(crate) fn orphaned(mut self) -> Self {
        self.parent = None;
        self
    }

    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            name: self.name.to_string(),
            state: self.state,
            parent: self.parent,
            children: self.children.clone(),
            steps: self.steps,
        }
    }

    fn transition(&self, next: ProcessState) -> Result<(), ProcessError> {
        if self.state.is_terminated() {
            return Err(ProcessError::Terminated(self.pid));
        }
        if !self.state.can_transition_to(next) {
            return Err(ProcessError::InvalidTransition {
                pid: self.pid,
                from: self.state,
                to: next,
            });
        }
        Ok(())
    }
}
