/*!
 * Core Types
 * Common types used across the runtime
 */

use super::value::Value;

/// Process ID type
///
/// Issued from a monotonically increasing counter and never reused.
pub type Pid = u32;

/// Arguments handed to a program when it is instantiated
pub type Args = Vec<Value>;

/// Common result type for runtime operations
pub type RuntimeResult<T> = Result<T, super::errors::RuntimeError>;
