/*!
 * Process Manager
 *
 * Owns the process tree and routes every step result: finished processes
 * are torn down, yielded values and instructions go through the instruction
 * set, and readied processes get their next step queued on the scheduler.
 *
 * The table lock is never held while user code runs (computation steps,
 * finalizers, channel callbacks), so any of those may call back in.
 */

use super::computation::{Computation, Program, Step};
use super::process::Process;
use super::table::ProcessTable;
use super::types::{ManagerStats, ProcessInfo, ProcessState, Task};
use crate::core::errors::Fault;
use crate::core::types::{Args, Pid};
use crate::core::Value;
use crate::instructions::InstructionSet;
use crate::monitoring::StepSpan;
use crate::scheduler::{panic_message, Scheduler};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, warn};

/// How a subtree is being torn down
enum Teardown {
    /// Top process finished its computation
    Completed,
    /// Cancelled with no error
    Cancelled,
    /// Killed with a fault delivered into the top process
    Faulted(Fault),
}

#[derive(Default)]
struct AtomicManagerStats {
    created: AtomicU64,
    completed: AtomicU64,
    cancelled: AtomicU64,
    faulted: AtomicU64,
}

struct ManagerInner {
    table: Mutex<ProcessTable>,
    next_pid: AtomicU32,
    scheduler: Scheduler,
    instructions: InstructionSet,
    stats: AtomicManagerStats,
}

/// Process tree owner. Cloning shares the same tree.
#[derive(Clone)]
pub struct ProcessManager {
    inner: Arc<ManagerInner>,
}

/// Non-owning manager handle held by queued steps and channel takers
#[derive(Clone)]
pub struct WeakProcessManager {
    inner: Weak<ManagerInner>,
}

impl WeakProcessManager {
    pub fn upgrade(&self) -> Option<ProcessManager> {
        self.inner.upgrade().map(|inner| ProcessManager { inner })
    }
}

impl ProcessManager {
    /// Manager with the standard fork/cancel/take/put instruction set
    pub fn new(scheduler: Scheduler) -> Self {
        Self::with_instructions(scheduler, InstructionSet::standard())
    }

    pub fn with_instructions(scheduler: Scheduler, instructions: InstructionSet) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                table: Mutex::new(ProcessTable::new()),
                next_pid: AtomicU32::new(1),
                scheduler,
                instructions,
                stats: AtomicManagerStats::default(),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakProcessManager {
        WeakProcessManager {
            inner: Arc::downgrade(&self.inner),
        }
    }

    #[inline]
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// Instantiate `program` as a new process and queue its first step.
    ///
    /// `parent: None` makes the process a root. A parent that is no longer
    /// alive also yields a root, with a warning.
    pub fn create(&self, program: &Program, args: Args, parent: Option<Pid>) -> Task {
        let computation = program.instantiate(args);
        let pid = self.inner.next_pid.fetch_add(1, Ordering::Relaxed);
        let process = Process::new(pid, program.name(), computation, parent);

        let attached = self.inner.table.lock().insert(process);
        if !attached {
            warn!(pid, parent = ?parent, program = program.name(), "Parent gone, process created as root");
        }
        self.inner.stats.created.fetch_add(1, Ordering::Relaxed);
        debug!(pid, parent = ?parent, program = program.name(), "Process created");

        self.ready(pid, Value::Null);
        Task::new(pid)
    }

    /// Resume `pid` with `value`.
    ///
    /// Queues a step on a Waiting -> Ready edge; a process that is already
    /// Ready only has its resume value replaced. Unknown and terminated pids
    /// are a logged no-op.
    pub fn ready(&self, pid: Pid, value: Value) {
        let outcome = {
            let mut table = self.inner.table.lock();
            match table.get_mut(pid) {
                Some(process) => process.ready(value),
                None => {
                    warn!(pid, "Cannot ready a terminated process");
                    return;
                }
            }
        };

        match outcome {
            Ok(true) => self.schedule(pid, None),
            Ok(false) => {}
            Err(e) => warn!(pid, error = %e, "Ignoring ready"),
        }
    }

    /// Route a step result.
    ///
    /// `None` queues the next step, `Done` tears the process down, and a
    /// yield is handed to the instruction set.
    pub fn schedule(&self, pid: Pid, result: Option<Step>) {
        match result {
            None => {
                let manager = self.downgrade();
                self.inner.scheduler.enqueue(move || {
                    if let Some(manager) = manager.upgrade() {
                        manager.step_forward(pid);
                    }
                });
            }
            Some(Step::Done) => {
                debug!(pid, "Process finished");
                self.teardown(pid, Teardown::Completed);
            }
            Some(Step::Yield(yielded)) => {
                self.inner.instructions.dispatch(self, pid, yielded);
            }
        }
    }

    /// Advance a Ready process by exactly one suspension point.
    ///
    /// Anything but a Ready, registered process is a logged no-op. A step that
    /// panics has the panic delivered back as a fault and its subtree removed.
    pub fn step_forward(&self, pid: Pid) {
        let (mut computation, input, name) = {
            let mut table = self.inner.table.lock();
            let Some(process) = table.get_mut(pid) else {
                warn!(pid, "Cannot step a terminated process");
                return;
            };
            match process.begin_step() {
                Ok((computation, input)) => (computation, input, process.name().to_owned()),
                Err(e) => {
                    warn!(pid, error = %e, "Cannot move process forward");
                    return;
                }
            }
        };

        let span = StepSpan::new(pid, &name);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| computation.resume(input)));
        span.record_outcome(match &outcome {
            Ok(Step::Done) => "done",
            Ok(Step::Yield(_)) => "yield",
            Err(_) => "panic",
        });
        drop(span);

        let orphaned = {
            let mut table = self.inner.table.lock();
            match table.get_mut(pid) {
                Some(process) => {
                    process.end_step(computation);
                    None
                }
                None => Some(computation),
            }
        };

        // Torn down during its own step; nobody could finalize it then
        if let Some(computation) = orphaned {
            debug!(pid, "Process terminated mid-step");
            finalize(pid, computation, None);
            return;
        }

        match outcome {
            Ok(step) => self.schedule(pid, Some(step)),
            Err(payload) => {
                let message = panic_message(&payload);
                error!(pid, program = %name, panic = %message, "Process step panicked");
                self.throw_into(pid, Fault::new(message).with_origin(pid));
            }
        }
    }

    /// Cancel `pid` and all of its descendants. Unknown pids are a no-op.
    pub fn terminate(&self, pid: Pid) {
        self.teardown(pid, Teardown::Cancelled);
    }

    /// Kill `pid` and its descendants, delivering `fault` into `pid` itself.
    pub fn throw_into(&self, pid: Pid, fault: Fault) {
        self.teardown(pid, Teardown::Faulted(fault));
    }

    fn teardown(&self, pid: Pid, how: Teardown) {
        let removed = {
            let mut table = self.inner.table.lock();
            if !table.contains(pid) {
                return;
            }
            table.detach(pid);
            table.remove_subtree(pid)
        };

        let total = removed.len() as u64;
        let stats = &self.inner.stats;
        match &how {
            Teardown::Completed => {
                stats.completed.fetch_add(1, Ordering::Relaxed);
                stats.cancelled.fetch_add(total - 1, Ordering::Relaxed);
            }
            Teardown::Cancelled => {
                stats.cancelled.fetch_add(total, Ordering::Relaxed);
            }
            Teardown::Faulted(_) => {
                stats.faulted.fetch_add(1, Ordering::Relaxed);
                stats.cancelled.fetch_add(total - 1, Ordering::Relaxed);
            }
        }
        debug!(pid, removed = total, "Process tree removed");

        // Post-order: descendants first, `pid` last
        let mut fault = match how {
            Teardown::Faulted(fault) => Some(fault),
            Teardown::Completed | Teardown::Cancelled => None,
        };
        for mut process in removed {
            let current = process.pid();
            let computation = process.terminate();
            let delivered = if current == pid { fault.take() } else { None };
            match computation {
                Some(computation) => finalize(current, computation, delivered),
                None => {
                    if let Some(fault) = delivered {
                        warn!(pid = current, fault = %fault, "Fault dropped: process was mid-step");
                    }
                }
            }
        }
    }

    /// Snapshot of a live process
    pub fn info(&self, pid: Pid) -> Option<ProcessInfo> {
        self.inner.table.lock().get(pid).map(Process::info)
    }

    pub fn state(&self, pid: Pid) -> Option<ProcessState> {
        self.inner.table.lock().get(pid).map(Process::state)
    }

    /// Pids of all root processes, oldest first
    pub fn roots(&self) -> Vec<Pid> {
        self.inner.table.lock().roots().to_vec()
    }

    pub fn children_of(&self, pid: Pid) -> Option<Vec<Pid>> {
        self.inner
            .table
            .lock()
            .get(pid)
            .map(|process| process.children().to_vec())
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.inner.table.lock().contains(pid)
    }

    /// Number of live processes
    pub fn len(&self) -> usize {
        self.inner.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshots of every live process, ordered by pid
    pub fn list(&self) -> Vec<ProcessInfo> {
        let table = self.inner.table.lock();
        let mut pids: Vec<Pid> = table.pids().copied().collect();
        pids.sort_unstable();
        pids.into_iter()
            .filter_map(|pid| table.get(pid).map(Process::info))
            .collect()
    }

    pub fn stats(&self) -> ManagerStats {
        let stats = &self.inner.stats;
        ManagerStats {
            created: stats.created.load(Ordering::Relaxed),
            completed: stats.completed.load(Ordering::Relaxed),
            cancelled: stats.cancelled.load(Ordering::Relaxed),
            faulted: stats.faulted.load(Ordering::Relaxed),
            live: self.len(),
        }
    }
}

/// Run a removed computation's finalizer. Panics are contained here.
fn finalize(pid: Pid, mut computation: Box<dyn Computation>, fault: Option<Fault>) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| match fault {
        Some(fault) => computation.fail(fault),
        None => {
            computation.cancel();
            Ok(())
        }
    }));

    match result {
        Ok(Ok(())) => {}
        Ok(Err(fault)) => {
            error!(pid, fault = %fault, origin = ?fault.origin, "Unhandled fault terminated process");
        }
        Err(payload) => {
            error!(pid, panic = %panic_message(&payload), "Finalizer panicked");
        }
    }
}
