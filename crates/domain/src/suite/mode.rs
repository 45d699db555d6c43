//! Execution and editor modes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// How the engine runs the steps of a suite.
///
/// Unknown values are kept verbatim so a document written for a newer
/// engine survives a round trip; validation reports them as warnings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionMode {
    /// One step after another.
    #[default]
    Sequential,
    /// All steps at once.
    Parallel,
    /// Any other value found in a document.
    Unknown(String),
}

impl ExecutionMode {
    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Unknown(other) => other,
        }
    }

    /// Returns true for the values the engine understands.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for ExecutionMode {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "sequential" => Self::Sequential,
            "parallel" => Self::Parallel,
            _ => Self::Unknown(value),
        }
    }
}

impl From<ExecutionMode> for String {
    fn from(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three editing views of a suite document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Step-by-step guided editor.
    Wizard,
    /// Visual form over every document field.
    #[default]
    Form,
    /// Raw YAML text.
    Yaml,
}

impl EditorMode {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wizard => "wizard",
            Self::Form => "form",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditorMode {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wizard" => Ok(Self::Wizard),
            "form" | "visual" => Ok(Self::Form),
            "yaml" => Ok(Self::Yaml),
            other => Err(DomainError::UnsupportedEditorMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_mode_from_string() {
        assert_eq!(ExecutionMode::from("parallel".to_string()), ExecutionMode::Parallel);
        assert_eq!(ExecutionMode::from(String::new()), ExecutionMode::Sequential);
        assert_eq!(
            ExecutionMode::from("round-robin".to_string()),
            ExecutionMode::Unknown("round-robin".to_string())
        );
    }

    #[test]
    fn test_unknown_mode_round_trips() {
        let mode = ExecutionMode::Unknown("round-robin".to_string());
        let json = serde_json::to_string(&mode).expect("serialize");
        assert_eq!(json, "\"round-robin\"");
        assert!(!mode.is_known());
    }

    #[test]
    fn test_editor_mode_parse() {
        assert_eq!("YAML".parse::<EditorMode>(), Ok(EditorMode::Yaml));
        assert!("monaco".parse::<EditorMode>().is_err());
    }
}
