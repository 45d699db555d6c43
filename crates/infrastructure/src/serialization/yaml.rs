//! YAML load/dump for test suites.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::SerializationError;

/// A YAML document that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct YamlError {
    /// Parser message.
    pub message: String,
    /// 1-based line of the error, when known.
    pub line: Option<usize>,
    /// 1-based column of the error, when known.
    pub column: Option<usize>,
}

impl From<serde_yaml::Error> for YamlError {
    fn from(e: serde_yaml::Error) -> Self {
        let location = e.location();
        Self {
            line: location.as_ref().map(serde_yaml::Location::line),
            column: location.as_ref().map(serde_yaml::Location::column),
            message: e.to_string(),
        }
    }
}

/// Decodes YAML text.
///
/// # Errors
///
/// Returns the parser error with its position.
pub fn from_yaml<T: DeserializeOwned>(text: &str) -> Result<T, YamlError> {
    serde_yaml::from_str(text).map_err(YamlError::from)
}

/// Encodes a value as block-style YAML with 2-space indentation.
///
/// # Errors
///
/// Returns an error if the value has no YAML representation.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    Ok(serde_yaml::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_maps_use_two_spaces() {
        let mut inner = IndexMap::new();
        inner.insert("url", "/users");
        let mut outer = IndexMap::new();
        outer.insert("request", inner);

        assert_eq!(to_yaml(&outer).expect("yaml"), "request:\n  url: /users\n");
    }

    #[test]
    fn test_error_carries_position() {
        let err = from_yaml::<serde_json::Value>("a: 1\nb: [unclosed\n").expect_err("invalid");
        assert!(err.line.is_some());
        assert!(err.column.is_some());
    }
}
