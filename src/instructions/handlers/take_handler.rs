/*!
 * Take Instruction Handler
 */

use crate::core::types::Pid;
use crate::instructions::handler::InstructionHandler;
use crate::instructions::{Instruction, InstructionKind};
use crate::process::ProcessManager;
use tracing::warn;

/// Leaves the process Waiting until the channel delivers to it
pub struct TakeHandler;

impl InstructionHandler for TakeHandler {
    fn kind(&self) -> InstructionKind {
        InstructionKind::Take
    }

    fn handle(&self, manager: &ProcessManager, pid: Pid, instruction: Instruction) {
        let Instruction::Take { channel } = instruction else {
            warn!(pid, handler = self.name(), "Mismatched instruction");
            return;
        };

        // Weak: channels can outlive the manager
        let manager = manager.downgrade();
        channel.take(move |value| {
            if let Some(manager) = manager.upgrade() {
                manager.ready(pid, value);
            }
        });
    }

    fn name(&self) -> &'static str {
        "take_handler"
    }
}
