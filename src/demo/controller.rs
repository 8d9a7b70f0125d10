/*!
 * Controller Workload
 */

use super::{counter_program, rate_program, DemoConfig, Meter};
use crate::core::Value;
use crate::instructions::effects::{cancel, fork, spawn, take};
use crate::ipc::Channel;
use crate::process::{Computation, Program, Step, Task};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    /// Rate process spawned, about to listen for input
    Spawned,
    /// Waiting on the input channel
    Listening,
    /// Previous counter cancelled; fork the next one for this target
    Cancelled(i64),
    /// Counter forked, its task is the next input
    Forked,
}

/// Restarts a counter for every target count arriving on the input channel.
///
/// Owns a timing channel shared by its counters and a detached rate process.
pub struct Controller {
    input: Channel,
    timing: Channel,
    counter: Program,
    rate: Program,
    running: Option<Task>,
    phase: Phase,
}

impl Controller {
    pub fn new(input: Channel, config: DemoConfig, meter: Meter) -> Self {
        Self {
            input,
            timing: Channel::new(),
            counter: counter_program(config, meter.clone()),
            rate: rate_program(config, meter),
            running: None,
            phase: Phase::Start,
        }
    }

    fn fork_counter(&mut self, target: i64) -> Step {
        self.phase = Phase::Forked;
        Step::perform(fork(
            &self.counter,
            vec![Value::from(&self.timing), Value::Int(target)],
        ))
    }

    fn listen(&mut self) -> Step {
        self.phase = Phase::Listening;
        Step::perform(take(&self.input))
    }
}

impl Computation for Controller {
    fn resume(&mut self, input: Value) -> Step {
        match self.phase {
            Phase::Start => {
                self.phase = Phase::Spawned;
                Step::perform(spawn(&self.rate, vec![Value::from(&self.timing)]))
            }
            Phase::Spawned => self.listen(),
            Phase::Listening => {
                let Some(target) = input.as_int() else {
                    warn!(kind = input.kind(), "controller ignoring non-integer input");
                    return self.listen();
                };
                match self.running.take() {
                    Some(task) => {
                        debug!(%task, target, "replacing running counter");
                        self.phase = Phase::Cancelled(target);
                        Step::perform(cancel(task))
                    }
                    None => self.fork_counter(target),
                }
            }
            Phase::Cancelled(target) => self.fork_counter(target),
            Phase::Forked => {
                self.running = input.as_task();
                self.listen()
            }
        }
    }
}

/// Program taking `[input: Channel]`
pub fn controller_program(config: DemoConfig, meter: Meter) -> Program {
    Program::new("controller", move |args| {
        let input = args.first().and_then(Value::as_channel).cloned();
        if input.is_none() {
            warn!("controller started without an input channel");
        }
        Controller::new(input.unwrap_or_default(), config, meter.clone())
    })
}
