/*!
 * Instruction Handler Trait
 * Defines the interface for instruction handlers and the dispatch table
 */

use super::handlers::{CancelHandler, ForkHandler, PutHandler, TakeHandler};
use super::{Instruction, InstructionKind};
use crate::core::types::Pid;
use crate::process::{ProcessManager, Yielded};
use ahash::AHashMap;
use std::sync::Arc;
use tracing::{error, trace};

/// Performs one kind of instruction on behalf of a yielding process
pub trait InstructionHandler: Send + Sync {
    /// Instruction kind this handler is registered under
    fn kind(&self) -> InstructionKind;

    /// Carry out `instruction` for `pid`.
    ///
    /// Responsible for resuming the process (now or later) through
    /// `ProcessManager::ready`.
    fn handle(&self, manager: &ProcessManager, pid: Pid, instruction: Instruction);

    /// Get the name of this handler (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Static table mapping each instruction kind to its handler.
///
/// Built once; lookups never change afterwards.
#[derive(Clone)]
pub struct InstructionSet {
    handlers: Arc<AHashMap<InstructionKind, Arc<dyn InstructionHandler>>>,
}

/// Builder for `InstructionSet`
#[derive(Default)]
pub struct InstructionSetBuilder {
    handlers: AHashMap<InstructionKind, Arc<dyn InstructionHandler>>,
}

impl InstructionSetBuilder {
    /// Register a handler under its kind, replacing any previous one
    pub fn register(mut self, handler: Arc<dyn InstructionHandler>) -> Self {
        self.handlers.insert(handler.kind(), handler);
        self
    }

    pub fn build(self) -> InstructionSet {
        InstructionSet {
            handlers: Arc::new(self.handlers),
        }
    }
}

impl InstructionSet {
    pub fn builder() -> InstructionSetBuilder {
        InstructionSetBuilder::default()
    }

    /// Fork, cancel, take and put
    pub fn standard() -> Self {
        Self::builder()
            .register(Arc::new(ForkHandler))
            .register(Arc::new(CancelHandler))
            .register(Arc::new(TakeHandler))
            .register(Arc::new(PutHandler))
            .build()
    }

    /// Handle whatever a process yielded.
    ///
    /// A plain value resumes the process right away with that same value. An
    /// instruction without a registered handler terminates the yielding
    /// process only.
    pub fn dispatch(&self, manager: &ProcessManager, pid: Pid, yielded: Yielded) {
        let instruction = match yielded {
            Yielded::Value(value) => {
                trace!(pid, kind = value.kind(), "bare yield");
                manager.ready(pid, value);
                return;
            }
            Yielded::Instruction(instruction) => instruction,
        };

        let kind = instruction.kind();
        match self.handlers.get(&kind) {
            Some(handler) => {
                trace!(pid, instruction = %kind, handler = handler.name(), "dispatch");
                handler.handle(manager, pid, instruction);
            }
            None => {
                error!(pid, instruction = %kind, "No handler for instruction");
                manager.terminate(pid);
            }
        }
    }

    pub fn supports(&self, kind: InstructionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Get the number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for InstructionSet {
    fn default() -> Self {
        Self::standard()
    }
}
