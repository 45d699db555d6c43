//! Suite node identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A validated suite identifier matching `^[a-z0-9-]+$`.
///
/// Other suites refer to a suite through its node id in `depends`, so the
/// engine requires it to be stable and filesystem friendly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Validates and wraps an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingField`] for an empty value and
    /// [`DomainError::InvalidNodeId`] when the pattern does not match.
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::MissingField("node_id".to_string()));
        }
        if !Self::is_valid(&value) {
            return Err(DomainError::InvalidNodeId(value));
        }
        Ok(Self(value))
    }

    /// Returns true if `value` matches `^[a-z0-9-]+$`.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        !value.is_empty()
            && value
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    }

    /// Derives an identifier from a free-form name: lowercases, maps every
    /// other character to `-` and squeezes repeats.
    ///
    /// Returns `None` when nothing usable remains.
    #[must_use]
    pub fn slugify(name: &str) -> Option<Self> {
        let mut slug = String::with_capacity(name.len());
        for c in name.trim().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_matches('-');
        (!slug.is_empty()).then(|| Self(slug.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodeId {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::parse(value)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
