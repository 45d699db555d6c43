//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A suite node identifier does not match `^[a-z0-9-]+$`.
    #[error("invalid node_id '{0}': only lowercase letters, digits and hyphens are allowed")]
    InvalidNodeId(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The editor mode is not one of the supported values.
    #[error("unsupported editor mode: {0}")]
    UnsupportedEditorMode(String),

    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
