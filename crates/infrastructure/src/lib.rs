//! Flowdeck Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the YAML suite conversions
//! and the launcher of the external test engine.

pub mod adapters;
pub mod conversion;
pub mod http;
pub mod persistence;
pub mod process;
pub mod serialization;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use conversion::{
    ConversionWarning, SuiteParseError, WarningSeverity, YamlSuiteConverter,
    analyze_wizard_compatibility, validate_test_suite_yaml,
};
pub use http::{BodyBuildError, BuiltBody, build_body};
pub use persistence::{
    FileKeyValueStore, SettingsError, SettingsRepository, TokioFileSystem, resolve_data_dir,
};
pub use process::{EngineCommand, ExecutionCoordinator, ExecutionError};
pub use serialization::{
    SerializationError, YamlError, from_json_bytes, from_yaml, to_json_stable,
    to_json_stable_bytes, to_yaml,
};
