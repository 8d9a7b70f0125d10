/*!
 * Core Module
 * Fundamental runtime types, values, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod serde;
pub mod types;
pub mod value;

// Re-export for convenience
pub use config::RuntimeConfig;
pub use errors::*;
pub use types::*;
pub use value::Value;
