//! Advisory checks before showing YAML in the wizard.
//!
//! The wizard edits a subset of the suite document. These warnings tell the
//! user what switching to it would lose; they never block the switch.

use flowdeck_domain::suite::TestSuiteDocument;
use serde::{Deserialize, Serialize};

use super::parse_suite_yaml;

/// Warning severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    /// Informational - a field is empty but the suite still converts
    Info,
    /// Warning - data will be dropped
    Warning,
    /// Error - the YAML cannot be converted at all
    Error,
}

impl std::fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A field lost or missing when converting to the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionWarning {
    /// Document path of the field (e.g. `steps[1].certificate`)
    pub path: String,
    /// Human-readable description of the issue
    pub message: String,
    /// Severity level
    pub severity: WarningSeverity,
}

impl ConversionWarning {
    fn new(path: impl Into<String>, message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity,
        }
    }

    fn lost(path: impl Into<String>, what: &str) -> Self {
        Self::new(
            path,
            format!("{what} is not supported in wizard mode and will be removed"),
            WarningSeverity::Warning,
        )
    }
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.path, self.message)
    }
}

/// Lists what converting `yaml` to the wizard would drop, and the required
/// fields it lacks.
#[must_use]
pub fn analyze_wizard_compatibility(yaml: &str) -> Vec<ConversionWarning> {
    match parse_suite_yaml(yaml) {
        Ok(doc) => document_warnings(&doc),
        Err(e) => vec![ConversionWarning::new("", e.to_string(), WarningSeverity::Error)],
    }
}

fn document_warnings(doc: &TestSuiteDocument) -> Vec<ConversionWarning> {
    let mut warnings = Vec::new();

    if doc.node_id.trim().is_empty() {
        warnings.push(ConversionWarning::new("node_id", "node_id is missing", WarningSeverity::Info));
    }
    if doc.suite_name.trim().is_empty() {
        warnings.push(ConversionWarning::new("suite_name", "suite_name is missing", WarningSeverity::Info));
    }

    if !doc.depends.is_empty() {
        warnings.push(ConversionWarning::lost("depends", "Suite dependencies"));
    }
    if !doc.exports.is_empty() {
        warnings.push(ConversionWarning::lost("exports", "Exports"));
    }
    if !doc.exports_optional.is_empty() {
        warnings.push(ConversionWarning::lost("exports_optional", "Optional exports"));
    }
    if doc.metadata.as_ref().is_some_and(|m| !m.is_empty()) {
        warnings.push(ConversionWarning::lost("metadata", "Metadata"));
    }

    for (index, step) in doc.steps.iter().enumerate() {
        let at = |field: &str| format!("steps[{index}].{field}");
        if step.certificate.is_some() {
            warnings.push(ConversionWarning::lost(at("certificate"), "Client certificate"));
        }
        if step.continue_on_failure.is_some() {
            warnings.push(ConversionWarning::lost(at("continue_on_failure"), "continue_on_failure"));
        }
        if !step.hooks_pre_request.is_empty() || !step.hooks_post_request.is_empty() {
            warnings.push(ConversionWarning::lost(at("hooks"), "Hooks"));
        }
        if !step.request.params.is_empty() {
            warnings.push(ConversionWarning::lost(at("request.params"), "Query parameters"));
        }
    }

    warnings
}
