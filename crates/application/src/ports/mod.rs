//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod file_system;
mod http_client;
mod key_value_store;
mod suite_converter;

pub use clock::Clock;
pub use file_system::{FileSystem, FileSystemError};
pub use http_client::{HttpClient, HttpClientError};
pub use key_value_store::{KeyValueStore, StorageError, keys, load_json, save_json};
pub use suite_converter::{ConversionError, ParseFailure, SuiteConverter};
