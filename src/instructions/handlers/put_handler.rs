/*!
 * Put Instruction Handler
 */

use crate::core::types::Pid;
use crate::core::Value;
use crate::instructions::handler::InstructionHandler;
use crate::instructions::{Instruction, InstructionKind};
use crate::process::ProcessManager;
use tracing::warn;

/// Sends on the channel, then resumes the sender straight away
pub struct PutHandler;

impl InstructionHandler for PutHandler {
    fn kind(&self) -> InstructionKind {
        InstructionKind::Put
    }

    fn handle(&self, manager: &ProcessManager, pid: Pid, instruction: Instruction) {
        let Instruction::Put { channel, value } = instruction else {
            warn!(pid, handler = self.name(), "Mismatched instruction");
            return;
        };

        channel.put(value);
        manager.ready(pid, Value::Null);
    }

    fn name(&self) -> &'static str {
        "put_handler"
    }
}
