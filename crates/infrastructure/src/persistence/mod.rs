//! Persistence implementations for file-based storage.

mod file_system;
mod key_value_store;
mod settings_repository;

pub use file_system::*;
pub use key_value_store::*;
pub use settings_repository::*;
