//! Application layer: command handlers, the lifecycle service, the deadline
//! scheduler and read-side queries.

pub mod command_handlers;
pub mod lifecycle;
pub mod query_handlers;
pub mod scheduler;
pub mod store;
