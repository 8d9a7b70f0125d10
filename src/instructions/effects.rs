/*!
 * Effect Constructors
 *
 * Build instructions for a computation to yield. Calling these does nothing
 * by itself.
 */

use super::Instruction;
use crate::core::types::Args;
use crate::core::Value;
use crate::ipc::Channel;
use crate::process::Program;

/// Start `program` as a child of the yielding process
pub fn fork(program: &Program, args: Args) -> Instruction {
    Instruction::Fork {
        program: program.clone(),
        args,
        detached: false,
    }
}

/// Start `program` as a new root, independent of the yielding process
pub fn spawn(program: &Program, args: Args) -> Instruction {
    Instruction::Fork {
        program: program.clone(),
        args,
        detached: true,
    }
}

/// Terminate the process tree behind `task`
pub fn cancel(task: impl Into<Value>) -> Instruction {
    Instruction::Cancel {
        target: task.into(),
    }
}

/// Wait for the next value delivered on `channel`
pub fn take(channel: &Channel) -> Instruction {
    Instruction::Take {
        channel: channel.clone(),
    }
}

/// Send `value` on `channel` and continue
pub fn put(channel: &Channel, value: impl Into<Value>) -> Instruction {
    Instruction::Put {
        channel: channel.clone(),
        value: value.into(),
    }
}
