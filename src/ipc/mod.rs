/*!
 * IPC Module
 * In-runtime communication between processes: FIFO channels
 */

pub mod channel;

// Re-export for convenience
pub use channel::{Channel, Taker};
