/*!
 * Runtime
 *
 * Context object wiring one scheduler to one process manager. Construct it
 * once and pass it (or clones of it) to whatever starts work; there is no
 * global instance.
 */

use crate::core::config::RuntimeConfig;
use crate::core::RuntimeResult;
use crate::core::types::Args;
use crate::process::{ProcessManager, Program};
use crate::scheduler::{Clock, ManualTrigger, Scheduler, SystemClock, TickReport};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Runtime {
    config: RuntimeConfig,
    scheduler: Scheduler,
    processes: ProcessManager,
}

impl Runtime {
    /// Runtime with the default configuration
    pub fn new() -> Self {
        let scheduler = Scheduler::new();
        Self {
            config: RuntimeConfig::default(),
            processes: ProcessManager::new(scheduler.clone()),
            scheduler,
        }
    }

    /// Validate `config` and build a runtime from it
    pub fn from_config(config: RuntimeConfig) -> RuntimeResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Like `from_config`, with a custom time source for tick deadlines
    pub fn with_clock(config: RuntimeConfig, clock: Arc<dyn Clock>) -> RuntimeResult<Self> {
        config.validate()?;
        let scheduler = Scheduler::with_clock(config.tick_budget, clock)?;
        info!(
            tick_budget_ms = config.tick_budget.as_millis() as u64,
            frame_interval_ms = config.frame_interval.as_millis() as u64,
            "Runtime initialized"
        );

        Ok(Self {
            config,
            processes: ProcessManager::new(scheduler.clone()),
            scheduler,
        })
    }

    /// Start `program` as a new root process tree.
    ///
    /// Returns immediately; the first step runs on a later tick.
    pub fn execute(&self, program: &Program, args: Args) {
        let task = self.processes.create(program, args, None);
        debug!(pid = task.pid(), program = program.name(), "Executing root process");
    }

    #[inline]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[inline]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[inline]
    pub fn processes(&self) -> &ProcessManager {
        &self.processes
    }

    /// Run a single scheduler tick
    pub fn tick(&self) -> TickReport {
        self.scheduler.tick()
    }

    /// Manual pump: tick while there is queued work, up to `max_ticks`.
    ///
    /// Installs a `ManualTrigger` and only ticks while it is armed, the way
    /// a host event loop would. Returns the number of ticks run.
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let trigger = Arc::new(ManualTrigger::new());
        self.scheduler.set_trigger(trigger.clone());

        let mut ticks = 0;
        while ticks < max_ticks && trigger.take_armed() && !self.scheduler.is_empty() {
            self.scheduler.tick();
            ticks += 1;
        }
        ticks
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
