//! Launching the external test engine.

mod command;
mod coordinator;

pub use command::{EngineCommand, resolve_working_dir};
pub use coordinator::{EventSender, ExecutionCoordinator, ExecutionError};
