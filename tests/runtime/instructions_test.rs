/*!
 * Instruction Tests
 * Resume values produced by each instruction and the dispatch edge cases
 */

use crate::common::{log, parked, pump, runtime, Log};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tasktree::instructions::handlers::{CancelHandler, ForkHandler, PutHandler};
use tasktree::{
    cancel, fork, put, take, Channel, InstructionSet, ProcessManager, Program, Scheduler, Step,
    Value,
};

/// Runs `script` in order, logging the value every step resumed with
fn scripted(inputs: Log, script: Vec<Step>) -> Program {
    Program::from_fn("scripted", move |_| {
        let inputs = inputs.clone();
        let mut script = script.clone().into_iter();
        let mut first = true;
        move |input| {
            if !first {
                inputs.lock().push(input);
            }
            first = false;
            script.next().unwrap_or(Step::Done)
        }
    })
}

#[test]
fn test_bare_yield_resumes_with_same_value() {
    let runtime = runtime();
    let inputs = log();
    let program = scripted(
        inputs.clone(),
        vec![Step::emit(42), Step::emit("progress"), Step::emit(Value::Null)],
    );

    runtime.execute(&program, vec![]);
    // One tick is enough: bare yields never wait
    runtime.tick();

    assert_eq!(
        *inputs.lock(),
        vec![Value::Int(42), Value::from("progress"), Value::Null]
    );
    assert!(runtime.processes().is_empty());
}

#[test]
fn test_put_resumes_with_null() {
    let runtime = runtime();
    let channel = Channel::new();
    let inputs = log();
    let program = scripted(inputs.clone(), vec![Step::perform(put(&channel, 5))]);

    runtime.execute(&program, vec![]);
    pump(&runtime);

    assert_eq!(*inputs.lock(), vec![Value::Null]);
    assert_eq!(channel.len(), 1);
}

#[test]
fn test_fork_resumes_with_child_task() {
    let runtime = runtime();
    let inputs = log();
    let program = scripted(inputs.clone(), vec![Step::perform(fork(&parked(), vec![])), Step::emit(0)]);

    runtime.execute(&program, vec![]);
    runtime.tick();

    let seen = inputs.lock().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].as_task().map(|t| t.pid()), Some(2));
}

#[test]
fn test_cancel_ignores_non_task_target() {
    let runtime = runtime();
    let inputs = log();
    runtime.execute(&parked(), vec![]);
    let program = scripted(inputs.clone(), vec![Step::perform(cancel(1i64))]);

    runtime.execute(&program, vec![]);
    pump(&runtime);

    assert_eq!(*inputs.lock(), vec![Value::Null]);
    assert!(runtime.processes().contains(1));
}

#[test]
fn test_cancel_dead_task_is_noop() {
    let runtime = runtime();
    let inputs = log();
    let victim = tasktree::Task::new(99);
    let program = scripted(inputs.clone(), vec![Step::perform(cancel(victim))]);

    runtime.execute(&program, vec![]);
    pump(&runtime);

    assert_eq!(*inputs.lock(), vec![Value::Null]);
}

#[test]
fn test_take_waits_for_channel() {
    let runtime = runtime();
    let channel = Channel::new();
    let inputs = log();
    let program = scripted(inputs.clone(), vec![Step::perform(take(&channel))]);

    runtime.execute(&program, vec![]);
    pump(&runtime);
    assert!(inputs.lock().is_empty());
    assert_eq!(runtime.processes().len(), 1);

    channel.put("go");
    pump(&runtime);
    assert_eq!(*inputs.lock(), vec![Value::from("go")]);
    assert!(runtime.processes().is_empty());
}

#[test]
fn test_missing_handler_terminates_only_yielder() {
    let scheduler = Scheduler::with_budget(std::time::Duration::from_secs(5)).unwrap();
    let instructions = InstructionSet::builder()
        .register(Arc::new(ForkHandler))
        .register(Arc::new(CancelHandler))
        .register(Arc::new(PutHandler))
        .build();
    let manager = ProcessManager::with_instructions(scheduler.clone(), instructions);

    let bystander_inputs = log();
    let bystander = scripted(bystander_inputs.clone(), vec![Step::emit(1), Step::emit(2)]);
    let channel = Channel::new();
    let offender = Program::from_fn("offender", move |_| {
        let channel = channel.clone();
        move |_| Step::perform(take(&channel))
    });

    let offender_task = manager.create(&offender, vec![], None);
    let bystander_task = manager.create(&bystander, vec![], None);
    while !scheduler.is_empty() {
        scheduler.tick();
    }

    assert!(!manager.contains(offender_task.pid()));
    assert!(!manager.contains(bystander_task.pid()));
    assert_eq!(*bystander_inputs.lock(), vec![Value::Int(1), Value::Int(2)]);
    let stats = manager.stats();
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.completed, 1);
}
