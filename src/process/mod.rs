/*!
 * Process Module
 * Process tree, per-process state machine and the computations they run
 */

pub mod computation;
pub mod manager;
#[allow(clippy::module_inception)]
pub mod process;
mod table;
pub mod types;

// Re-export for convenience
pub use computation::{Computation, FnComputation, Program, Step, Yielded};
pub use manager::{ProcessManager, WeakProcessManager};
pub use process::Process;
pub use types::{ManagerStats, ProcessInfo, ProcessState, Task};
