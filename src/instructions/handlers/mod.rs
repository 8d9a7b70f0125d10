/*!
 * Instruction Handlers
 * One handler per instruction kind
 */

mod cancel_handler;
mod fork_handler;
mod put_handler;
mod take_handler;

pub use cancel_handler::CancelHandler;
pub use fork_handler::ForkHandler;
pub use put_handler::PutHandler;
pub use take_handler::TakeHandler;
