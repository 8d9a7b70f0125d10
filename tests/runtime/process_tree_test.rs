/*!
 * Process Tree Tests
 * Lifecycle states, cascade cancellation and detached processes
 */

use crate::common::{manual_runtime, parked, pump, runtime};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tasktree::process::WeakProcessManager;
use tasktree::{
    fork, spawn, take, Channel, Computation, Fault, Pid, ProcessState, Program, Step, Value,
};

/// Forks a chain `depth` levels deep, then parks; records its finalization
struct Node {
    label: i64,
    depth: i64,
    finalized: Arc<Mutex<Vec<(i64, usize)>>>,
    manager: WeakProcessManager,
    never: Channel,
    forked: bool,
}

impl Computation for Node {
    fn resume(&mut self, _input: Value) -> Step {
        if self.depth > 0 && !self.forked {
            self.forked = true;
            let child = node(self.finalized.clone(), self.manager.clone());
            return Step::perform(fork(&child, vec![Value::Int(self.label + 1), Value::Int(self.depth - 1)]));
        }
        Step::perform(take(&self.never))
    }

    fn cancel(&mut self) {
        let live = self.manager.upgrade().map(|m| m.len()).unwrap_or(0);
        self.finalized.lock().push((self.label, live));
    }
}

fn node(finalized: Arc<Mutex<Vec<(i64, usize)>>>, manager: WeakProcessManager) -> Program {
    Program::new("node", move |args| Node {
        label: args.first().and_then(Value::as_int).unwrap_or(0),
        depth: args.get(1).and_then(Value::as_int).unwrap_or(0),
        finalized: finalized.clone(),
        manager: manager.clone(),
        never: Channel::new(),
        forked: false,
    })
}

#[test]
fn test_state_cycle() {
    let runtime = runtime();
    let channel = Channel::new();
    let program = Program::from_fn("taker", {
        let channel = channel.clone();
        move |_| {
            let channel = channel.clone();
            move |_| Step::perform(take(&channel))
        }
    });

    runtime.execute(&program, vec![]);
    let pid = runtime.processes().roots()[0];
    assert_eq!(runtime.processes().state(pid), Some(ProcessState::Ready));

    pump(&runtime);
    assert_eq!(runtime.processes().state(pid), Some(ProcessState::Waiting));

    channel.put(1);
    assert_eq!(runtime.processes().state(pid), Some(ProcessState::Ready));

    pump(&runtime);
    assert_eq!(runtime.processes().state(pid), Some(ProcessState::Waiting));
    assert_eq!(runtime.processes().info(pid).map(|i| i.steps), Some(2));

    runtime.processes().terminate(pid);
    assert_eq!(runtime.processes().state(pid), None);

    // Nothing brings it back
    runtime.processes().ready(pid, Value::Null);
    runtime.processes().step_forward(pid);
    assert_eq!(runtime.processes().state(pid), None);
    assert!(runtime.scheduler().is_empty());
}

#[test]
fn test_cancel_removes_whole_subtree_before_finalizing() {
    let runtime = runtime();
    let finalized = Arc::new(Mutex::new(Vec::new()));
    let program = node(finalized.clone(), runtime.processes().downgrade());

    runtime.execute(&program, vec![Value::Int(0), Value::Int(3)]);
    pump(&runtime);
    assert_eq!(runtime.processes().len(), 4);

    let root = runtime.processes().roots()[0];
    runtime.processes().terminate(root);

    assert!(runtime.processes().is_empty());
    for pid in 1..=4 {
        assert!(!runtime.processes().contains(pid));
    }
    // Deepest first, and the registry was already empty for every finalizer
    assert_eq!(*finalized.lock(), vec![(3, 0), (2, 0), (1, 0), (0, 0)]);
}

#[test]
fn test_cancel_mid_tree_keeps_ancestors() {
    let runtime = runtime();
    let finalized = Arc::new(Mutex::new(Vec::new()));
    let program = node(finalized.clone(), runtime.processes().downgrade());

    runtime.execute(&program, vec![Value::Int(0), Value::Int(3)]);
    pump(&runtime);

    let root = runtime.processes().roots()[0];
    let child = runtime.processes().children_of(root).unwrap()[0];
    runtime.processes().terminate(child);

    assert_eq!(runtime.processes().len(), 1);
    assert_eq!(runtime.processes().children_of(root), Some(vec![]));
    assert_eq!(finalized.lock().len(), 3);
}

#[test]
fn test_child_cancelled_before_first_step() {
    let (runtime, clock) = manual_runtime();
    let child_steps = Arc::new(Mutex::new(0u32));

    let counter = child_steps.clone();
    let child = Program::from_fn("child", move |_| {
        let counter = counter.clone();
        move |_| {
            *counter.lock() += 1;
            Step::Done
        }
    });

    let parent = Program::from_fn("parent", move |_| {
        let child = child.clone();
        let clock = clock.clone();
        let never = Channel::new();
        let mut forked = false;
        move |_| {
            if forked {
                return Step::perform(take(&never));
            }
            forked = true;
            // Use up the tick so the child's first step is left queued
            clock.advance(Duration::from_millis(10));
            Step::perform(fork(&child, vec![]))
        }
    });

    runtime.execute(&parent, vec![]);
    runtime.tick();

    let parent_pid = runtime.processes().roots()[0];
    let child_pid = runtime.processes().children_of(parent_pid).unwrap()[0];
    assert_eq!(runtime.processes().info(child_pid).map(|i| i.steps), Some(0));

    runtime.processes().terminate(child_pid);
    assert!(!runtime.processes().contains(child_pid));

    pump(&runtime);
    assert_eq!(*child_steps.lock(), 0);
    assert_eq!(runtime.processes().state(parent_pid), Some(ProcessState::Waiting));
}

#[test]
fn test_spawned_survives_forked_does_not() {
    let runtime = runtime();
    let parent = Program::from_fn("parent", |_| {
        let never = Channel::new();
        let mut step = 0;
        move |_| {
            step += 1;
            match step {
                1 => Step::perform(fork(&parked(), vec![])),
                2 => Step::perform(spawn(&parked(), vec![])),
                _ => Step::perform(take(&never)),
            }
        }
    });

    runtime.execute(&parent, vec![]);
    pump(&runtime);

    let roots = runtime.processes().roots();
    assert_eq!(roots.len(), 2);
    let (parent_pid, spawned) = (roots[0], roots[1]);
    let forked = runtime.processes().children_of(parent_pid).unwrap()[0];

    runtime.processes().terminate(parent_pid);

    assert!(!runtime.processes().contains(forked));
    assert!(runtime.processes().contains(spawned));
    assert_eq!(runtime.processes().roots(), vec![spawned]);
}

#[test]
fn test_finished_parent_takes_attached_children() {
    let runtime = runtime();
    let parent = Program::from_fn("short_parent", |_| {
        let mut forked = false;
        move |_| {
            if forked {
                return Step::Done;
            }
            forked = true;
            Step::perform(fork(&parked(), vec![]))
        }
    });

    runtime.execute(&parent, vec![]);
    pump(&runtime);

    assert!(runtime.processes().is_empty());
    let stats = runtime.processes().stats();
    assert_eq!(stats.created, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.cancelled, 1);
}

/// Handles faults; records what it was given
struct Resilient {
    received: Arc<Mutex<Option<Fault>>>,
    never: Channel,
}

impl Computation for Resilient {
    fn resume(&mut self, _input: Value) -> Step {
        Step::perform(take(&self.never))
    }

    fn fail(&mut self, fault: Fault) -> Result<(), Fault> {
        *self.received.lock() = Some(fault);
        Ok(())
    }
}

#[test]
fn test_throw_into_delivers_fault_to_top_only() {
    let runtime = runtime();
    let received = Arc::new(Mutex::new(None));

    let child = {
        let received = received.clone();
        Program::new("resilient", move |_| Resilient {
            received: received.clone(),
            never: Channel::new(),
        })
    };
    let parent = Program::from_fn("parent", move |_| {
        let child = child.clone();
        let never = Channel::new();
        let mut forked = false;
        move |_| {
            if forked {
                return Step::perform(take(&never));
            }
            forked = true;
            Step::perform(fork(&child, vec![]))
        }
    });

    runtime.execute(&parent, vec![]);
    pump(&runtime);
    let parent_pid = runtime.processes().roots()[0];
    let child_pid = runtime.processes().children_of(parent_pid).unwrap()[0];

    runtime.processes().throw_into(child_pid, Fault::new("stop").with_origin(child_pid));
    assert_eq!(*received.lock(), Some(Fault::new("stop").with_origin(child_pid)));
    assert!(runtime.processes().contains(parent_pid));
    assert_eq!(runtime.processes().children_of(parent_pid), Some(vec![]));

    // The parent does not handle faults; it is removed and the fault logged
    runtime.processes().throw_into(parent_pid, Fault::new("unhandled"));
    assert!(runtime.processes().is_empty());
    assert_eq!(runtime.processes().stats().faulted, 2);
}

#[test]
fn test_panicking_process_takes_only_its_subtree() {
    let runtime = runtime();
    let bomb = Program::from_fn("bomb", |_| {
        let mut step = 0;
        move |_: Value| -> Step {
            step += 1;
            if step == 1 {
                return Step::perform(fork(&parked(), vec![]));
            }
            panic!("bomb went off")
        }
    });

    runtime.execute(&parked(), vec![]);
    runtime.execute(&bomb, vec![]);
    pump(&runtime);

    assert_eq!(runtime.processes().len(), 1);
    assert_eq!(runtime.processes().roots(), vec![1]);
    assert_eq!(runtime.processes().stats().faulted, 1);
}

#[derive(Debug, Clone)]
enum Op {
    Spawn,
    Put(usize),
    Cancel(usize),
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Spawn),
        (0usize..8).prop_map(Op::Put),
        (0usize..8).prop_map(Op::Cancel),
        Just(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn prop_terminated_processes_never_return(ops in proptest::collection::vec(op(), 1..60)) {
        let runtime = runtime();
        let channel = Channel::new();
        let listener = crate::common::listener(crate::common::log());
        let mut dead: Vec<Pid> = Vec::new();
        let mut spawned: Vec<Pid> = Vec::new();

        for op in ops {
            match op {
                Op::Spawn => {
                    runtime.execute(&listener, vec![Value::from(&channel)]);
                    if let Some(pid) = runtime.processes().roots().last().copied() {
                        spawned.push(pid);
                    }
                }
                Op::Put(n) => channel.put(n as i64),
                Op::Cancel(i) => {
                    if let Some(&pid) = spawned.get(i) {
                        runtime.processes().terminate(pid);
                        dead.push(pid);
                    }
                }
                Op::Tick => {
                    runtime.tick();
                }
            }

            for pid in &dead {
                prop_assert_eq!(runtime.processes().state(*pid), None);
            }
            for info in runtime.processes().list() {
                prop_assert!(info.state != ProcessState::Terminated);
            }
        }
    }
}
