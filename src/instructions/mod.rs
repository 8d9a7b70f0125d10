/*!
 * Instructions Module
 *
 * Effects a computation yields for the runtime to perform before resuming
 * it: fork, cancel, take and put. Instructions are plain data; nothing
 * happens until one is yielded and dispatched through the `InstructionSet`.
 */

pub mod effects;
pub mod handler;
pub mod handlers;

// Re-export public API
pub use handler::{InstructionHandler, InstructionSet, InstructionSetBuilder};

use crate::core::types::Args;
use crate::core::Value;
use crate::ipc::Channel;
use crate::process::Program;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatch tag of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    Fork,
    Cancel,
    Take,
    Put,
}

impl InstructionKind {
    pub const ALL: [InstructionKind; 4] = [
        InstructionKind::Fork,
        InstructionKind::Cancel,
        InstructionKind::Take,
        InstructionKind::Put,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            InstructionKind::Fork => "fork",
            InstructionKind::Cancel => "cancel",
            InstructionKind::Take => "take",
            InstructionKind::Put => "put",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effect request yielded by a computation
#[derive(Debug, Clone)]
pub enum Instruction {
    /// Start a new process; a child of the yielder unless `detached`
    Fork {
        program: Program,
        args: Args,
        detached: bool,
    },
    /// Terminate the tree rooted at `target` if it is a task handle
    Cancel { target: Value },
    /// Suspend until `channel` delivers a value
    Take { channel: Channel },
    /// Send `value` on `channel` without waiting
    Put { channel: Channel, value: Value },
}

impl Instruction {
    #[inline]
    pub fn kind(&self) -> InstructionKind {
        match self {
            Instruction::Fork { .. } => InstructionKind::Fork,
            Instruction::Cancel { .. } => InstructionKind::Cancel,
            Instruction::Take { .. } => InstructionKind::Take,
            Instruction::Put { .. } => InstructionKind::Put,
        }
    }
}
