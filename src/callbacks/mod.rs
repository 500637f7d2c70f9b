//! Lifecycle hooks for model, chain, tool and agent runs.

mod debug;
mod handler;
mod manager;

pub use debug::{DebugCallbackConfig, DebugCallbackHandler};
pub use handler::{CallbackHandler, HandlerRegistry};
pub use manager::CallbackManager;
pub(crate) use manager::report_error;
