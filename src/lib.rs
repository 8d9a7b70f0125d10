/*!
 * tasktree
 *
 * Cooperative structured-concurrency runtime:
 * - Processes arranged in a tree, cancelled as whole subtrees
 * - FIFO channels with asynchronous put and suspending take
 * - Time-budgeted scheduler ticked by an external trigger
 * - Declarative effects (fork, spawn, cancel, take, put) yielded by
 *   computations and interpreted by the runtime
 */

pub mod core;
pub mod demo;
pub mod instructions;
pub mod ipc;
pub mod monitoring;
pub mod process;
pub mod runtime;
pub mod scheduler;

// Re-exports
pub use crate::core::{
    ConfigError, Fault, Pid, ProcessError, RuntimeConfig, RuntimeError, SchedulerError, Value,
};
pub use instructions::effects::{cancel, fork, put, spawn, take};
pub use instructions::{Instruction, InstructionKind, InstructionSet};
pub use ipc::Channel;
pub use monitoring::{init_tracing, init_tracing_with};
pub use process::{
    Computation, ManagerStats, ProcessInfo, ProcessManager, ProcessState, Program, Step, Task,
    Yielded,
};
pub use runtime::Runtime;
pub use scheduler::{
    Clock, FrameDriver, ManualClock, ManualTrigger, Scheduler, SchedulerStats, TickReport, Trigger,
};
