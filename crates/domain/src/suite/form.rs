//! Visual form editing state

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ExecutionMode, SuiteDependency, SuiteMetadata, TestStep, TestSuiteDocument, WizardState};

/// Every document field, with optional text flattened to `String`
/// (empty means absent) and metadata always present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestSuiteFormData {
    /// Node id.
    #[serde(default)]
    pub node_id: String,
    /// Suite name.
    #[serde(default)]
    pub suite_name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Base URL.
    #[serde(default)]
    pub base_url: String,
    /// Step scheduling.
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    /// Suite variables.
    #[serde(default)]
    pub variables: IndexMap<String, Value>,
    /// Steps, edited field by field.
    #[serde(default)]
    pub steps: Vec<TestStep>,
    /// Exported captures.
    #[serde(default)]
    pub exports: Vec<String>,
    /// Optional exports.
    #[serde(default)]
    pub exports_optional: Vec<String>,
    /// Dependencies.
    #[serde(default)]
    pub depends: Vec<SuiteDependency>,
    /// Metadata; all-empty means none.
    #[serde(default)]
    pub metadata: SuiteMetadata,
}

impl TestSuiteFormData {
    /// Builds the document the form describes.
    #[must_use]
    pub fn to_document(&self) -> TestSuiteDocument {
        TestSuiteDocument {
            node_id: self.node_id.clone(),
            suite_name: self.suite_name.clone(),
            description: optional(&self.description),
            base_url: optional(&self.base_url),
            execution_mode: self.execution_mode.clone(),
            variables: self.variables.clone(),
            steps: self.steps.clone(),
            exports: self.exports.clone(),
            exports_optional: self.exports_optional.clone(),
            depends: self.depends.clone(),
            metadata: (!self.metadata.is_empty()).then(|| self.metadata.clone()),
        }
    }

    /// Maps a document into the form. Nothing is dropped.
    #[must_use]
    pub fn from_document(doc: &TestSuiteDocument) -> Self {
        Self {
            node_id: doc.node_id.clone(),
            suite_name: doc.suite_name.clone(),
            description: doc.description.clone().unwrap_or_default(),
            base_url: doc.base_url.clone().unwrap_or_default(),
            execution_mode: doc.execution_mode.clone(),
            variables: doc.variables.clone(),
            steps: doc.steps.clone(),
            exports: doc.exports.clone(),
            exports_optional: doc.exports_optional.clone(),
            depends: doc.depends.clone(),
            metadata: doc.metadata.clone().unwrap_or_default(),
        }
    }

    /// Form state for what the wizard describes.
    #[must_use]
    pub fn from_wizard(wizard: &WizardState) -> Self {
        Self::from_document(&wizard.to_document())
    }

    /// Wizard state for the form, dropping what the wizard cannot show.
    #[must_use]
    pub fn to_wizard(&self) -> WizardState {
        WizardState::from_document(&self.to_document())
    }
}

fn optional(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_strings_become_absent() {
        let form = TestSuiteFormData {
            node_id: "orders".to_string(),
            suite_name: "Orders".to_string(),
            description: "  ".to_string(),
            ..TestSuiteFormData::default()
        };
        let doc = form.to_document();
        assert_eq!(doc.description, None);
        assert_eq!(doc.base_url, None);
        assert_eq!(doc.metadata, None);
    }

    #[test]
    fn test_document_round_trip_keeps_everything() {
        let form = TestSuiteFormData {
            node_id: "orders".to_string(),
            suite_name: "Orders".to_string(),
            description: "Order flow".to_string(),
            base_url: "{{api_url}}".to_string(),
            execution_mode: ExecutionMode::Parallel,
            variables: IndexMap::from([("limit".to_string(), json!(10))]),
            steps: vec![TestStep::new("list", "GET", "/orders")],
            exports: vec!["order_id".to_string()],
            exports_optional: vec!["coupon".to_string()],
            depends: vec![SuiteDependency {
                path: Some("./auth.yaml".to_string()),
                required: Some(true),
                ..SuiteDependency::default()
            }],
            metadata: SuiteMetadata {
                priority: Some("high".to_string()),
                tags: vec!["smoke".to_string()],
                timeout: Some(30_000),
                estimated_duration_ms: None,
            },
        };
        assert_eq!(TestSuiteFormData::from_document(&form.to_document()), form);
    }

    #[test]
    fn test_form_to_wizard_drops_advanced_fields() {
        let form = TestSuiteFormData {
            node_id: "orders".to_string(),
            suite_name: "Orders".to_string(),
            depends: vec![SuiteDependency::default()],
            ..TestSuiteFormData::default()
        };
        let wizard = form.to_wizard();
        assert_eq!(wizard.node_id, "orders");
        assert!(TestSuiteFormData::from_wizard(&wizard).depends.is_empty());
    }
}
