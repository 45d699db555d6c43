//! Suite conversion port
//!
//! YAML handling lives in the infrastructure layer; the editor session only
//! sees these conversions.

use std::fmt;

use flowdeck_domain::suite::{SuiteValidation, TestSuiteFormData, WizardState};

/// Why a conversion failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The YAML text is malformed or does not describe a suite.
    #[error("{0}")]
    Parse(ParseFailure),

    /// The document could not be written as YAML.
    #[error("Failed to serialize suite: {0}")]
    Serialize(String),
}

/// A YAML parse failure with its position, when known (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Parser message.
    pub message: String,
    /// Line of the error.
    pub line: Option<usize>,
    /// Column of the error.
    pub column: Option<usize>,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(
                f,
                "YAML syntax error at line {line}, column {column}: {}",
                self.message
            ),
            _ => write!(f, "YAML syntax error: {}", self.message),
        }
    }
}

/// Converts between YAML text and the editor shapes.
pub trait SuiteConverter: Send + Sync {
    /// Serializes wizard state.
    ///
    /// # Errors
    /// Returns [`ConversionError::Serialize`] if serialization fails.
    fn wizard_to_yaml(&self, wizard: &WizardState) -> Result<String, ConversionError>;

    /// Parses YAML into wizard state, dropping what the wizard cannot show.
    ///
    /// # Errors
    /// Returns [`ConversionError::Parse`] for malformed YAML.
    fn yaml_to_wizard(&self, yaml: &str) -> Result<WizardState, ConversionError>;

    /// Serializes form state.
    ///
    /// # Errors
    /// Returns [`ConversionError::Serialize`] if serialization fails.
    fn form_to_yaml(&self, form: &TestSuiteFormData) -> Result<String, ConversionError>;

    /// Parses YAML into form state.
    ///
    /// # Errors
    /// Returns [`ConversionError::Parse`] for malformed YAML.
    fn yaml_to_form(&self, yaml: &str) -> Result<TestSuiteFormData, ConversionError>;

    /// Validates YAML text.
    fn validate(&self, yaml: &str) -> SuiteValidation;
}
