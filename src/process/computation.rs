/*!
 * Computations
 *
 * A computation is an explicit state machine the runtime advances one
 * suspension point at a time. Each `resume` either finishes or yields: a
 * plain value (progress, resumed immediately with the same value) or an
 * instruction for the runtime to carry out before resuming.
 */

use crate::core::errors::Fault;
use crate::core::types::Args;
use crate::core::Value;
use crate::instructions::Instruction;
use smartstring::alias::String as SmartString;
use std::fmt;
use std::sync::Arc;

/// What a computation handed back to the runtime at a suspension point
#[derive(Debug, Clone)]
pub enum Yielded {
    /// Plain value; the process is resumed with it unchanged
    Value(Value),
    /// Effect to perform before resuming
    Instruction(Instruction),
}

/// Result of advancing a computation by one step
#[derive(Debug, Clone)]
pub enum Step {
    Yield(Yielded),
    Done,
}

impl Step {
    /// Yield a plain progress value
    #[inline]
    pub fn emit(value: impl Into<Value>) -> Self {
        Step::Yield(Yielded::Value(value.into()))
    }

    /// Yield an instruction
    #[inline]
    pub fn perform(instruction: Instruction) -> Self {
        Step::Yield(Yielded::Instruction(instruction))
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done)
    }
}

impl From<Instruction> for Step {
    fn from(instruction: Instruction) -> Self {
        Step::perform(instruction)
    }
}

/// Resumable unit of work owned by a process.
///
/// `resume` never runs concurrently with itself or with any other
/// computation's `resume`.
pub trait Computation: Send {
    /// Advance to the next suspension point.
    ///
    /// `input` is the value the previous suspension resolved to; `Null` on the
    /// first step.
    fn resume(&mut self, input: Value) -> Step;

    /// Graceful finalization when the process is cancelled or completes
    fn cancel(&mut self) {}

    /// Deliver a fault into the computation as it is torn down.
    ///
    /// Return `Ok(())` when handled; the returned fault is logged otherwise.
    /// The process is removed either way.
    fn fail(&mut self, fault: Fault) -> Result<(), Fault> {
        Err(fault)
    }
}

/// Computation backed by a closure over its own state
pub struct FnComputation<F> {
    step: F,
}

impl<F> FnComputation<F>
where
    F: FnMut(Value) -> Step + Send,
{
    pub fn new(step: F) -> Self {
        Self { step }
    }
}

impl<F> Computation for FnComputation<F>
where
    F: FnMut(Value) -> Step + Send,
{
    fn resume(&mut self, input: Value) -> Step {
        (self.step)(input)
    }
}

type Factory = dyn Fn(Args) -> Box<dyn Computation> + Send + Sync;

/// Named factory that instantiates a computation from arguments.
///
/// Cheap to clone; this is what fork, spawn and `Runtime::execute` accept.
#[derive(Clone)]
pub struct Program {
    name: SmartString,
    factory: Arc<Factory>,
}

impl Program {
    pub fn new<F, C>(name: &str, factory: F) -> Self
    where
        F: Fn(Args) -> C + Send + Sync + 'static,
        C: Computation + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(move |args| Box::new(factory(args)) as Box<dyn Computation>),
        }
    }

    /// Program whose computation is a closure returned by `factory`
    pub fn from_fn<F, S>(name: &str, factory: F) -> Self
    where
        F: Fn(Args) -> S + Send + Sync + 'static,
        S: FnMut(Value) -> Step + Send + 'static,
    {
        Self::new(name, move |args| FnComputation::new(factory(args)))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a fresh computation
    pub fn instantiate(&self, args: Args) -> Box<dyn Computation> {
        (self.factory)(args)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program").field("name", &self.name).finish()
    }
}
