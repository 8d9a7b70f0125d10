/*!
 * Cancel Instruction Handler
 */

use crate::core::types::Pid;
use crate::core::Value;
use crate::instructions::handler::InstructionHandler;
use crate::instructions::{Instruction, InstructionKind};
use crate::process::ProcessManager;
use tracing::{debug, warn};

/// Terminates the tree behind a task handle; anything else is ignored
pub struct CancelHandler;

impl InstructionHandler for CancelHandler {
    fn kind(&self) -> InstructionKind {
        InstructionKind::Cancel
    }

    fn handle(&self, manager: &ProcessManager, pid: Pid, instruction: Instruction) {
        let Instruction::Cancel { target } = instruction else {
            warn!(pid, handler = self.name(), "Mismatched instruction");
            return;
        };

        match target.as_task() {
            Some(task) => manager.terminate(task.pid()),
            None => debug!(pid, target = target.kind(), "Cancel target is not a task"),
        }
        manager.ready(pid, Value::Null);
    }

    fn name(&self) -> &'static str {
        "cancel_handler"
    }
}
