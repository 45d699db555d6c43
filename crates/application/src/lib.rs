//! Flowdeck Application - Use cases and ports
//!
//! This crate contains the application logic:
//! - Port definitions (traits) for external dependencies
//! - Variable interpolation over requests
//! - Persisted state stores
//! - The test-suite editor session and its auto-save
//! - Use cases that orchestrate the above

pub mod editor;
pub mod error;
pub mod ports;
pub mod stores;
pub mod use_cases;
pub mod variable_resolver;

#[cfg(test)]
mod testing;

pub use editor::{AutoSaveScheduler, EditorSession};
pub use error::{ApplicationError, ApplicationResult};
pub use stores::{EnvironmentStore, HistoryStore, WorkspaceStore};
pub use use_cases::{SaveTestSuite, SaveTestSuiteInput, SendRequest, SendRequestOutput};
pub use variable_resolver::VariableResolver;
