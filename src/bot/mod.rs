// bot/mod.rs

// Exported functions
pub use self::dispatcher::run_dispatcher;
pub use self::processor::handle_message;
pub use self::scheduler::spawn_daily_reset;

// Exported structs and types
pub use self::dispatcher::{BotError, HandlerResult};
pub use self::scheduler::ResetPolicy;
pub use self::store::{JsonFile, Store};

// Declare submodules
mod commands;
mod dispatcher;
mod games;
mod processor;
mod scheduler;
mod store;
