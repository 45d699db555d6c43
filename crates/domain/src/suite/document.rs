//! The test-suite document consumed by the flow test engine

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ExecutionMode;
use crate::request::ClientCertificate;

/// Operator to expected value, e.g. `{ equals: 200 }` or `{ exists: true }`.
pub type FieldAssertion = IndexMap<String, Value>;

/// Operators understood by the engine for field assertions.
pub const ASSERTION_OPERATORS: &[&str] = &[
    "equals",
    "not_equals",
    "contains",
    "not_contains",
    "greater_than",
    "less_than",
    "exists",
    "regex",
    "type",
    "length",
];

/// A complete test suite.
///
/// `node_id` and `suite_name` default to empty so that a document missing
/// them still decodes and validation can report what is wrong.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestSuiteDocument {
    /// Stable identifier, `^[a-z0-9-]+$`.
    #[serde(default)]
    pub node_id: String,
    /// Human readable name.
    #[serde(default)]
    pub suite_name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Prefix for relative step URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Step scheduling.
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    /// Suite level variables.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, Value>,
    /// Ordered steps.
    #[serde(default)]
    pub steps: Vec<TestStep>,
    /// Captured variables published to dependent suites.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    /// Exports that may be missing without failing dependents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports_optional: Vec<String>,
    /// Suites that must run first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<SuiteDependency>,
    /// Scheduling metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SuiteMetadata>,
}

impl TestSuiteDocument {
    /// Creates an empty suite with the given identity.
    #[must_use]
    pub fn new(node_id: impl Into<String>, suite_name: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            suite_name: suite_name.into(),
            ..Self::default()
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn with_step(mut self, step: TestStep) -> Self {
        self.steps.push(step);
        self
    }
}

/// One HTTP call with its checks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestStep {
    /// Step name shown in reports.
    #[serde(default)]
    pub name: String,
    /// The request to send.
    #[serde(default)]
    pub request: StepRequest,
    /// Checks applied to the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assert: Option<StepAssertions>,
    /// Variable name to JMESPath-like expression.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub capture: IndexMap<String, String>,
    /// Keep running later steps when this one fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_failure: Option<bool>,
    /// Client certificate for this step only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<ClientCertificate>,
    /// Hooks run before the request, in the engine's own schema.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks_pre_request: Vec<Value>,
    /// Hooks run after the response, in the engine's own schema.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks_post_request: Vec<Value>,
}

impl TestStep {
    /// Creates a step with a request and nothing else.
    #[must_use]
    pub fn new(name: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request: StepRequest {
                method: method.into(),
                url: url.into(),
                ..StepRequest::default()
            },
            ..Self::default()
        }
    }

    /// Returns true if the step carries fields the wizard cannot show.
    #[must_use]
    pub fn has_advanced_fields(&self) -> bool {
        self.certificate.is_some()
            || self.continue_on_failure.is_some()
            || !self.hooks_pre_request.is_empty()
            || !self.hooks_post_request.is_empty()
            || !self.request.params.is_empty()
    }
}

/// The request part of a step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepRequest {
    /// HTTP method as written.
    #[serde(default)]
    pub method: String,
    /// Absolute URL or path relative to `base_url`.
    #[serde(default)]
    pub url: String,
    /// Request headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Value>,
    /// Query parameters.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, Value>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Response checks of a step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepAssertions {
    /// Either a bare status code or an operator map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Value>,
    /// Body field path to operator map.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub body: IndexMap<String, FieldAssertion>,
    /// Header name to operator map.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, FieldAssertion>,
    /// Operator map applied to the response time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<FieldAssertion>,
}

impl StepAssertions {
    /// Returns true if no check is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status_code.is_none()
            && self.body.is_empty()
            && self.headers.is_empty()
            && self.response_time_ms.as_ref().is_none_or(IndexMap::is_empty)
    }
}

/// Scheduling hints read by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuiteMetadata {
    /// `critical`, `high`, `medium` or `low`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Free-form tags used by `--tags` filtering.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Suite timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Expected duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_ms: Option<u64>,
}

impl SuiteMetadata {
    /// Returns true if every field is unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.priority.is_none()
            && self.tags.is_empty()
            && self.timeout.is_none()
            && self.estimated_duration_ms.is_none()
    }
}

/// A suite that must run before this one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuiteDependency {
    /// Node id of the dependency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Path to the dependency file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Fail when the dependency fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_missing_identity_decodes_as_empty() {
        let doc: TestSuiteDocument =
            serde_json::from_value(json!({ "steps": [] })).expect("decode");
        assert_eq!(doc.node_id, "");
        assert_eq!(doc.suite_name, "");
        assert_eq!(doc.execution_mode, ExecutionMode::Sequential);
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let doc = TestSuiteDocument::new("users", "Users")
            .with_step(TestStep::new("list", "GET", "/users"));
        let json = serde_json::to_value(&doc).expect("encode");
        assert_eq!(
            json,
            json!({
                "node_id": "users",
                "suite_name": "Users",
                "execution_mode": "sequential",
                "steps": [{ "name": "list", "request": { "method": "GET", "url": "/users" } }]
            })
        );
    }

    #[test]
    fn test_advanced_fields() {
        let mut step = TestStep::new("login", "POST", "/login");
        assert!(!step.has_advanced_fields());
        step.continue_on_failure = Some(true);
        assert!(step.has_advanced_fields());
    }

    #[test]
    fn test_assertions_empty() {
        let mut assertions = StepAssertions::default();
        assert!(assertions.is_empty());
        assertions.status_code = Some(json!(200));
        assert!(!assertions.is_empty());
    }
}
