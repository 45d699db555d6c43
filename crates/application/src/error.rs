//! Application error types

use flowdeck_domain::DomainError;
use thiserror::Error;

use crate::ports::{ConversionError, FileSystemError, HttpClientError, StorageError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpClientError),

    /// A storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A file operation failed.
    #[error("file error: {0}")]
    FileSystem(#[from] FileSystemError),

    /// A suite could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A suite failed validation.
    #[error("invalid test suite: {}", .0.join("; "))]
    InvalidSuite(Vec<String>),

    /// The request is not sendable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
