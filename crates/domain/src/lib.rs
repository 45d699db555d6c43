//! Flowdeck Domain - Core business types
//!
//! This crate defines the domain model for the Flowdeck API client and
//! test-suite editor. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod autosave;
pub mod environment;
pub mod error;
pub mod execution;
pub mod history;
pub mod id;
pub mod request;
pub mod response;
pub mod settings;
pub mod suite;
pub mod workspace;

pub use auth::{ApiKeyLocation, AuthDescriptor, AuthType};
pub use autosave::AutoSaveSnapshot;
pub use environment::{
    Environment, EnvironmentVariable, GlobalVariables, ResolutionContext, ResolvedVariable,
    VariableScope,
};
pub use error::{DomainError, DomainResult};
pub use execution::{
    ExecutionEvent, ExecutionId, ExecutionOptions, LogEntry, LogLevel, LogStream,
};
pub use history::{HISTORY_LIMIT, HistoryEntry, RequestHistory};
pub use id::generate_id;
pub use request::{ApiRequest, BodyType, ClientCertificate, HttpMethod, KeyValue, RequestBody};
pub use response::ApiResponse;
pub use settings::AppSettings;
pub use suite::{
    EditorMode, ExecutionMode, NodeId, TestStep, TestSuiteDocument, TestSuiteFormData,
    WizardState,
};
pub use workspace::{Folder, Workspace};
