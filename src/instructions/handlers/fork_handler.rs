/*!
 * Fork Instruction Handler
 * Starts a child (or detached root) process and hands its task back
 */

use crate::core::types::Pid;
use crate::core::Value;
use crate::instructions::handler::InstructionHandler;
use crate::instructions::{Instruction, InstructionKind};
use crate::process::ProcessManager;
use tracing::warn;

pub struct ForkHandler;

impl InstructionHandler for ForkHandler {
    fn kind(&self) -> InstructionKind {
        InstructionKind::Fork
    }

    fn handle(&self, manager: &ProcessManager, pid: Pid, instruction: Instruction) {
        let Instruction::Fork {
            program,
            args,
            detached,
        } = instruction
        else {
            warn!(pid, handler = self.name(), "Mismatched instruction");
            return;
        };

        let parent = if detached { None } else { Some(pid) };
        let task = manager.create(&program, args, parent);
        manager.ready(pid, Value::Task(task));
    }

    fn name(&self) -> &'static str {
        "fork_handler"
    }
}
