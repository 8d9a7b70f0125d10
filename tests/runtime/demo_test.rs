/*!
 * Demo Workload Tests
 * Counter checkpoints end to end, and the controller restarting counters
 */

use crate::common::{collector, log, pump, runtime};
use pretty_assertions::assert_eq;
use tasktree::demo::{controller_program, counter_program, DemoConfig, Meter};
use tasktree::{Channel, Value};

fn small() -> DemoConfig {
    DemoConfig {
        checkpoint_each: 3,
        min_rate_checkpoints: 2,
        max_rate_checkpoints: 10,
    }
}

#[test]
fn test_counter_emits_checkpoints_then_clears() {
    let runtime = runtime();
    let timing = Channel::new();
    let signals = log();
    let meter = Meter::new();

    runtime.execute(&collector(signals.clone()), vec![Value::from(&timing)]);
    runtime.execute(
        &counter_program(small(), meter.clone()),
        vec![Value::from(&timing), Value::Int(9)],
    );
    pump(&runtime);

    let signals = signals.lock().clone();
    assert_eq!(signals.len(), 4);
    assert!(signals[..3].iter().all(|v| matches!(v, Value::Float(_))));
    assert_eq!(signals[3], Value::Null);

    assert_eq!(meter.reading().count, 9);
    assert!(runtime.processes().is_empty());
}

#[test]
fn test_controller_replaces_running_counter() {
    let runtime = runtime();
    let input = Channel::new();
    let meter = Meter::new();

    runtime.execute(&controller_program(small(), meter.clone()), vec![Value::from(&input)]);
    pump(&runtime);
    // Controller waiting on input, rate waiting on timing
    assert_eq!(runtime.processes().len(), 2);
    assert_eq!(runtime.processes().roots().len(), 2);

    // Two clicks before anything runs: the second cancels the first counter
    input.put(1_000);
    input.put(6);
    pump(&runtime);

    let reading = meter.reading();
    assert_eq!(reading.count, 6);
    assert_eq!(reading.clears, 1);
    assert_eq!(runtime.processes().len(), 2);

    let stats = runtime.processes().stats();
    assert_eq!(stats.created, 4);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.completed, 1);
}

#[test]
fn test_controller_ignores_garbage_input() {
    let runtime = runtime();
    let input = Channel::new();
    let meter = Meter::new();

    runtime.execute(&controller_program(small(), meter.clone()), vec![Value::from(&input)]);
    input.put("not a number");
    input.put(3);
    pump(&runtime);

    assert_eq!(meter.reading().count, 3);
    assert_eq!(runtime.processes().len(), 2);
}
