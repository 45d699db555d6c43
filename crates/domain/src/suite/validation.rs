//! Structural checks run before a suite is saved or executed

use serde::{Deserialize, Serialize};

use super::{NodeId, TestSuiteDocument};

/// Outcome of validating a suite. Errors block saving; warnings do not.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuiteValidation {
    /// True when `errors` is empty.
    pub valid: bool,
    /// Blocking problems.
    pub errors: Vec<String>,
    /// Advisory problems.
    pub warnings: Vec<String>,
}

impl SuiteValidation {
    /// Builds a result, deriving `valid` from the errors.
    #[must_use]
    pub fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A result with a single error.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self::new(vec![error.into()], Vec::new())
    }
}

impl TestSuiteDocument {
    /// Checks the fields the engine requires.
    #[must_use]
    pub fn validate(&self) -> SuiteValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.node_id.trim().is_empty() {
            errors.push("Missing required field: node_id".to_string());
        } else if !NodeId::is_valid(&self.node_id) {
            errors.push(format!(
                "Invalid node_id '{}': use only lowercase letters, numbers and hyphens",
                self.node_id
            ));
        }

        if self.suite_name.trim().is_empty() {
            errors.push("Missing required field: suite_name".to_string());
        }

        if !self.execution_mode.is_known() {
            warnings.push(format!(
                "Unknown execution_mode '{}': expected sequential or parallel",
                self.execution_mode
            ));
        }

        if self.steps.is_empty() {
            warnings.push("Suite has no steps".to_string());
        }

        for (index, step) in self.steps.iter().enumerate() {
            let position = index + 1;
            if step.name.trim().is_empty() {
                errors.push(format!("Step {position}: missing name"));
            }
            if step.request.method.trim().is_empty() {
                errors.push(format!("Step {position}: missing request.method"));
            }
            if step.request.url.trim().is_empty() {
                errors.push(format!("Step {position}: missing request.url"));
            }
        }

        SuiteValidation::new(errors, warnings)
    }
}
