//! Wizard editing state
//!
//! The wizard only covers the everyday subset of a suite. Mapping a document
//! into it drops `depends`, `exports`, `exports_optional`, `metadata`, step
//! certificates, hooks, query params and `continue_on_failure`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::scalar::{body_to_text, coerce_scalar, parse_body_text, scalar_to_text};
use super::{ExecutionMode, FieldAssertion, StepAssertions, StepRequest, TestStep, TestSuiteDocument};
use crate::request::{HttpMethod, KeyValue, active_pairs};

/// The full wizard state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WizardState {
    /// Suite name.
    #[serde(default)]
    pub suite_name: String,
    /// Node id.
    #[serde(default)]
    pub node_id: String,
    /// Description, empty when absent.
    #[serde(default)]
    pub description: String,
    /// Base URL, empty when absent.
    #[serde(default)]
    pub base_url: String,
    /// Step scheduling.
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    /// Suite variables as text.
    #[serde(default)]
    pub variables: Vec<WizardVariable>,
    /// Steps.
    #[serde(default)]
    pub steps: Vec<WizardStep>,
    /// Page the wizard is showing.
    #[serde(default)]
    pub current_step: usize,
}

/// A suite variable as typed in the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WizardVariable {
    /// Variable name.
    pub key: String,
    /// Value as text.
    #[serde(default)]
    pub value: String,
}

/// A step as edited in the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WizardStep {
    /// Step name.
    #[serde(default)]
    pub name: String,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// URL or path.
    #[serde(default)]
    pub url: String,
    /// Headers; disabled rows are not written out.
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    /// Body text, JSON or plain.
    #[serde(default)]
    pub body: String,
    /// Checks.
    #[serde(default)]
    pub assertions: Vec<WizardAssertion>,
    /// Captures.
    #[serde(default)]
    pub captures: Vec<WizardCapture>,
}

/// What a wizard assertion looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    /// The response status code.
    #[default]
    Status,
    /// A field of the response body.
    BodyField,
    /// A response header.
    Header,
    /// Response time in milliseconds.
    ResponseTime,
}

/// A single check as edited in the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WizardAssertion {
    /// What is checked.
    #[serde(rename = "type", default)]
    pub kind: AssertionKind,
    /// Body path or header name; unused for status and response time.
    #[serde(default)]
    pub field: String,
    /// Operator, e.g. `equals`.
    #[serde(default = "default_operator")]
    pub operator: String,
    /// Expected value as text.
    #[serde(default)]
    pub expected: String,
}

fn default_operator() -> String {
    "equals".to_string()
}

impl WizardAssertion {
    /// Creates an assertion.
    #[must_use]
    pub fn new(
        kind: AssertionKind,
        field: impl Into<String>,
        operator: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            operator: operator.into(),
            expected: expected.into(),
        }
    }

    /// Creates a `status equals <code>` assertion.
    #[must_use]
    pub fn status(code: u16) -> Self {
        Self::new(AssertionKind::Status, "", "equals", code.to_string())
    }
}

/// A capture as edited in the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WizardCapture {
    /// Variable receiving the value.
    pub name: String,
    /// Expression selecting the value from the response.
    #[serde(default)]
    pub path: String,
}

impl WizardState {
    /// Builds the document the wizard describes.
    #[must_use]
    pub fn to_document(&self) -> TestSuiteDocument {
        TestSuiteDocument {
            node_id: self.node_id.trim().to_string(),
            suite_name: self.suite_name.trim().to_string(),
            description: non_empty(&self.description),
            base_url: non_empty(&self.base_url),
            execution_mode: self.execution_mode.clone(),
            variables: self
                .variables
                .iter()
                .filter(|v| !v.key.trim().is_empty())
                .map(|v| (v.key.trim().to_string(), coerce_scalar(&v.value)))
                .collect(),
            steps: self.steps.iter().map(WizardStep::to_step).collect(),
            ..TestSuiteDocument::default()
        }
    }

    /// Maps a document into the wizard, dropping what the wizard cannot show.
    #[must_use]
    pub fn from_document(doc: &TestSuiteDocument) -> Self {
        Self {
            suite_name: doc.suite_name.clone(),
            node_id: doc.node_id.clone(),
            description: doc.description.clone().unwrap_or_default(),
            base_url: doc.base_url.clone().unwrap_or_default(),
            execution_mode: doc.execution_mode.clone(),
            variables: doc
                .variables
                .iter()
                .map(|(key, value)| WizardVariable {
                    key: key.clone(),
                    value: scalar_to_text(value),
                })
                .collect(),
            steps: doc.steps.iter().map(WizardStep::from_step).collect(),
            current_step: 0,
        }
    }
}

impl WizardStep {
    fn to_step(&self) -> TestStep {
        let headers = active_pairs(&self.headers)
            .map(|h| (h.key.trim().to_string(), Value::String(h.value.clone())))
            .collect();
        let capture = self
            .captures
            .iter()
            .filter(|c| !c.name.trim().is_empty())
            .map(|c| (c.name.trim().to_string(), c.path.clone()))
            .collect();

        TestStep {
            name: self.name.clone(),
            request: StepRequest {
                method: self.method.as_str().to_string(),
                url: self.url.clone(),
                headers,
                params: IndexMap::new(),
                body: parse_body_text(&self.body),
            },
            assert: assertions_to_document(&self.assertions),
            capture,
            ..TestStep::default()
        }
    }

    fn from_step(step: &TestStep) -> Self {
        Self {
            name: step.name.clone(),
            method: HttpMethod::parse_lenient(&step.request.method),
            url: step.request.url.clone(),
            headers: step
                .request
                .headers
                .iter()
                .map(|(k, v)| KeyValue::new(k.clone(), scalar_to_text(v)))
                .collect(),
            body: body_to_text(step.request.body.as_ref()),
            assertions: step.assert.as_ref().map(assertions_from_document).unwrap_or_default(),
            captures: step
                .capture
                .iter()
                .map(|(name, path)| WizardCapture {
                    name: name.clone(),
                    path: path.clone(),
                })
                .collect(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn assertions_to_document(assertions: &[WizardAssertion]) -> Option<StepAssertions> {
    let mut out = StepAssertions::default();
    for assertion in assertions {
        let operator = match assertion.operator.trim() {
            "" => "equals",
            op => op,
        };
        let expected = coerce_scalar(&assertion.expected);
        match assertion.kind {
            AssertionKind::Status => {
                out.status_code = Some(merge_status(out.status_code.take(), operator, expected));
            }
            AssertionKind::BodyField | AssertionKind::Header => {
                let field = assertion.field.trim();
                if field.is_empty() {
                    continue;
                }
                let target = if assertion.kind == AssertionKind::Header {
                    &mut out.headers
                } else {
                    &mut out.body
                };
                target
                    .entry(field.to_string())
                    .or_default()
                    .insert(operator.to_string(), expected);
            }
            AssertionKind::ResponseTime => {
                out.response_time_ms
                    .get_or_insert_with(FieldAssertion::new)
                    .insert(operator.to_string(), expected);
            }
        }
    }
    (!out.is_empty()).then_some(out)
}

/// A lone `equals` stays a bare code; any other mix becomes an operator map.
fn merge_status(current: Option<Value>, operator: &str, expected: Value) -> Value {
    let mut map = match current {
        None => serde_json::Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) if operator == "equals" => return expected,
        Some(bare) => std::iter::once(("equals".to_string(), bare)).collect(),
    };
    if map.is_empty() && operator == "equals" {
        return expected;
    }
    map.insert(operator.to_string(), expected);
    Value::Object(map)
}

fn assertions_from_document(assertions: &StepAssertions) -> Vec<WizardAssertion> {
    let mut out = Vec::new();
    match &assertions.status_code {
        Some(Value::Object(map)) => out.extend(
            map.iter()
                .map(|(op, v)| WizardAssertion::new(AssertionKind::Status, "", op.clone(), scalar_to_text(v))),
        ),
        Some(value) => out.push(WizardAssertion::new(
            AssertionKind::Status,
            "",
            "equals",
            scalar_to_text(value),
        )),
        None => {}
    }
    for (kind, fields) in [
        (AssertionKind::BodyField, &assertions.body),
        (AssertionKind::Header, &assertions.headers),
    ] {
        for (field, checks) in fields {
            out.extend(checks.iter().map(|(op, v)| {
                WizardAssertion::new(kind, field.clone(), op.clone(), scalar_to_text(v))
            }));
        }
    }
    if let Some(checks) = &assertions.response_time_ms {
        out.extend(checks.iter().map(|(op, v)| {
            WizardAssertion::new(AssertionKind::ResponseTime, "", op.clone(), scalar_to_text(v))
        }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ClientCertificate;
    use crate::suite::SuiteDependency;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_wizard() -> WizardState {
        WizardState {
            suite_name: "User API".to_string(),
            node_id: "user-api".to_string(),
            description: "Checks the user endpoints".to_string(),
            base_url: "https://api.example.com".to_string(),
            execution_mode: ExecutionMode::Sequential,
            variables: vec![WizardVariable {
                key: "user_id".to_string(),
                value: "42".to_string(),
            }],
            steps: vec![WizardStep {
                name: "Get user".to_string(),
                method: HttpMethod::Get,
                url: "/users/{{user_id}}".to_string(),
                headers: vec![KeyValue::new("Accept", "application/json")],
                body: String::new(),
                assertions: vec![
                    WizardAssertion::status(200),
                    WizardAssertion::new(AssertionKind::BodyField, "id", "exists", "true"),
                    WizardAssertion::new(AssertionKind::ResponseTime, "", "less_than", "500"),
                ],
                captures: vec![WizardCapture {
                    name: "user_name".to_string(),
                    path: "body.name".to_string(),
                }],
            }],
            current_step: 0,
        }
    }

    #[test]
    fn test_wizard_to_document() {
        let doc = sample_wizard().to_document();
        assert_eq!(doc.variables["user_id"], json!(42));
        let step = &doc.steps[0];
        assert_eq!(step.request.method, "GET");
        assert_eq!(step.request.body, None);
        let assert = step.assert.as_ref().expect("assertions");
        assert_eq!(assert.status_code, Some(json!(200)));
        assert_eq!(assert.body["id"]["exists"], json!(true));
        assert_eq!(assert.response_time_ms.as_ref().expect("time")["less_than"], json!(500));
        assert_eq!(step.capture["user_name"], "body.name");
    }

    #[test]
    fn test_document_round_trip_is_identity_for_wizard_fields() {
        let wizard = sample_wizard();
        assert_eq!(WizardState::from_document(&wizard.to_document()), wizard);
    }

    #[test]
    fn test_advanced_fields_are_dropped() {
        let mut doc = sample_wizard().to_document();
        doc.depends = vec![SuiteDependency {
            node_id: Some("auth".to_string()),
            ..SuiteDependency::default()
        }];
        doc.exports_optional = vec!["token".to_string()];
        doc.steps[0].certificate = Some(ClientCertificate::from_pem_files("a.crt", "a.key"));

        let back = WizardState::from_document(&doc).to_document();
        assert!(back.depends.is_empty());
        assert!(back.exports_optional.is_empty());
        assert_eq!(back.steps[0].certificate, None);
    }

    #[test]
    fn test_status_operator_map() {
        let step = WizardStep {
            assertions: vec![
                WizardAssertion::new(AssertionKind::Status, "", "greater_than", "199"),
                WizardAssertion::new(AssertionKind::Status, "", "less_than", "300"),
            ],
            ..WizardStep::default()
        };
        let status = step.to_step().assert.expect("assert").status_code;
        assert_eq!(status, Some(json!({ "greater_than": 199, "less_than": 300 })));
    }

    #[test]
    fn test_mixed_status_checks_are_all_kept() {
        let status_of = |assertions: Vec<WizardAssertion>| {
            WizardStep {
                assertions,
                ..WizardStep::default()
            }
            .to_step()
            .assert
            .expect("assert")
            .status_code
        };

        let equals_first = status_of(vec![
            WizardAssertion::status(200),
            WizardAssertion::new(AssertionKind::Status, "", "less_than", "300"),
        ]);
        assert_eq!(equals_first, Some(json!({ "equals": 200, "less_than": 300 })));

        let equals_last = status_of(vec![
            WizardAssertion::new(AssertionKind::Status, "", "greater_than", "199"),
            WizardAssertion::status(201),
        ]);
        assert_eq!(equals_last, Some(json!({ "greater_than": 199, "equals": 201 })));

        assert_eq!(status_of(vec![WizardAssertion::status(204)]), Some(json!(204)));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let wizard = WizardState {
            variables: vec![WizardVariable::default()],
            steps: vec![WizardStep {
                headers: vec![KeyValue::disabled("X-Off", "1")],
                assertions: vec![WizardAssertion::new(AssertionKind::Header, " ", "equals", "x")],
                ..WizardStep::default()
            }],
            ..WizardState::default()
        };
        let doc = wizard.to_document();
        assert!(doc.variables.is_empty());
        assert!(doc.steps[0].request.headers.is_empty());
        assert_eq!(doc.steps[0].assert, None);
    }
}
