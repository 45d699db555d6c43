//! Suite documents to and from YAML text, and the editor conversions built
//! on top.

use flowdeck_application::ports::{ConversionError, ParseFailure, SuiteConverter};
use flowdeck_domain::suite::{SuiteValidation, TestSuiteDocument, TestSuiteFormData, WizardState};

use crate::serialization::{YamlError, from_yaml, to_yaml};

/// Why YAML text is not a suite document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuiteParseError {
    /// Nothing but whitespace or comments.
    #[error("YAML document is empty")]
    Empty,

    /// Malformed YAML, or YAML of the wrong shape.
    #[error("{}", ParseFailure::from(.0.clone()))]
    Syntax(YamlError),
}

impl From<SuiteParseError> for ConversionError {
    fn from(e: SuiteParseError) -> Self {
        match e {
            SuiteParseError::Empty => Self::Parse(ParseFailure {
                message: "document is empty".to_string(),
                line: None,
                column: None,
            }),
            SuiteParseError::Syntax(yaml) => Self::Parse(yaml.into()),
        }
    }
}

impl From<YamlError> for ParseFailure {
    fn from(e: YamlError) -> Self {
        Self {
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}

/// Decodes a suite document.
///
/// # Errors
/// Returns [`SuiteParseError`] for empty, malformed or mistyped documents.
pub fn parse_suite_yaml(text: &str) -> Result<TestSuiteDocument, SuiteParseError> {
    let meaningful = text
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with('#') && line != "---");
    if !meaningful {
        return Err(SuiteParseError::Empty);
    }
    from_yaml(text).map_err(SuiteParseError::Syntax)
}

/// Encodes a suite document.
///
/// # Errors
/// Returns [`ConversionError::Serialize`] if a value has no YAML form.
pub fn suite_to_yaml(doc: &TestSuiteDocument) -> Result<String, ConversionError> {
    to_yaml(doc).map_err(|e| ConversionError::Serialize(e.to_string()))
}

/// Wizard state as YAML.
///
/// # Errors
/// See [`suite_to_yaml`].
pub fn wizard_to_yaml(wizard: &WizardState) -> Result<String, ConversionError> {
    suite_to_yaml(&wizard.to_document())
}

/// YAML as wizard state. Fields the wizard cannot show are dropped.
///
/// # Errors
/// Returns [`ConversionError::Parse`] for invalid YAML.
pub fn yaml_to_wizard(yaml: &str) -> Result<WizardState, ConversionError> {
    Ok(WizardState::from_document(&parse_suite_yaml(yaml)?))
}

/// Form state as YAML.
///
/// # Errors
/// See [`suite_to_yaml`].
pub fn form_to_yaml(form: &TestSuiteFormData) -> Result<String, ConversionError> {
    suite_to_yaml(&form.to_document())
}

/// YAML as form state.
///
/// # Errors
/// Returns [`ConversionError::Parse`] for invalid YAML.
pub fn yaml_to_form(yaml: &str) -> Result<TestSuiteFormData, ConversionError> {
    Ok(TestSuiteFormData::from_document(&parse_suite_yaml(yaml)?))
}

/// Wizard state as form state.
#[must_use]
pub fn wizard_to_form(wizard: &WizardState) -> TestSuiteFormData {
    TestSuiteFormData::from_wizard(wizard)
}

/// Form state as wizard state. Advanced fields are dropped.
#[must_use]
pub fn form_to_wizard(form: &TestSuiteFormData) -> WizardState {
    form.to_wizard()
}

/// Checks YAML text for everything that would stop the engine from
/// running it.
#[must_use]
pub fn validate_test_suite_yaml(yaml: &str) -> SuiteValidation {
    match parse_suite_yaml(yaml) {
        Ok(doc) => doc.validate(),
        Err(e) => SuiteValidation::failed(e.to_string()),
    }
}

/// [`SuiteConverter`] backed by `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlSuiteConverter;

impl SuiteConverter for YamlSuiteConverter {
    fn wizard_to_yaml(&self, wizard: &WizardState) -> Result<String, ConversionError> {
        wizard_to_yaml(wizard)
    }

    fn yaml_to_wizard(&self, yaml: &str) -> Result<WizardState, ConversionError> {
        yaml_to_wizard(yaml)
    }

    fn form_to_yaml(&self, form: &TestSuiteFormData) -> Result<String, ConversionError> {
        form_to_yaml(form)
    }

    fn yaml_to_form(&self, yaml: &str) -> Result<TestSuiteFormData, ConversionError> {
        yaml_to_form(yaml)
    }

    fn validate(&self, yaml: &str) -> SuiteValidation {
        validate_test_suite_yaml(yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdeck_domain::HttpMethod;
    use flowdeck_domain::suite::{
        AssertionKind, ExecutionMode, SuiteDependency, SuiteMetadata, TestStep, WizardAssertion,
        WizardCapture, WizardStep, WizardVariable,
    };
    use flowdeck_domain::{ClientCertificate, KeyValue};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const FULL_SUITE: &str = "\
node_id: user-api
suite_name: User API
description: Exercises the user endpoints
base_url: https://api.example.com
execution_mode: parallel
variables:
  user_id: 42
  admin: true
steps:
  - name: Fetch user
    request:
      method: GET
      url: /users/{{user_id}}
      headers:
        Accept: application/json
      params:
        expand: profile
    assert:
      status_code: 200
      body:
        id:
          equals: 42
    capture:
      user_name: body.name
    continue_on_failure: true
    certificate:
      cert_path: ./client.pem
      key_path: ./client.key
exports:
  - user_name
exports_optional:
  - user_email
depends:
  - node_id: auth-flow
    required: true
metadata:
  priority: high
  tags:
    - users
    - smoke
  timeout: 30000
";

    fn wizard() -> WizardState {
        WizardState {
            suite_name: "Login flow".into(),
            node_id: "login-flow".into(),
            description: "Signs in".into(),
            base_url: "https://auth.example.com".into(),
            execution_mode: ExecutionMode::Sequential,
            variables: vec![
                WizardVariable { key: "user".into(), value: "admin".into() },
                WizardVariable { key: "retries".into(), value: "3".into() },
            ],
            steps: vec![WizardStep {
                name: "Login".into(),
                method: HttpMethod::Post,
                url: "/login".into(),
                headers: vec![KeyValue::new("Content-Type", "application/json")],
                body: "{\n  \"user\": \"{{user}}\"\n}".into(),
                assertions: vec![
                    WizardAssertion::status(200),
                    WizardAssertion::new(AssertionKind::BodyField, "token", "exists", "true"),
                ],
                captures: vec![WizardCapture { name: "token".into(), path: "body.token".into() }],
            }],
            current_step: 0,
        }
    }

    #[test]
    fn test_parse_full_suite() {
        let doc = parse_suite_yaml(FULL_SUITE).expect("parse");

        assert_eq!(doc.node_id, "user-api");
        assert_eq!(doc.execution_mode, ExecutionMode::Parallel);
        assert_eq!(doc.variables["user_id"], json!(42));
        assert_eq!(doc.steps[0].request.params["expand"], json!("profile"));
        assert_eq!(doc.steps[0].continue_on_failure, Some(true));
        assert_eq!(
            doc.depends,
            vec![SuiteDependency {
                node_id: Some("auth-flow".into()),
                path: None,
                required: Some(true),
            }]
        );
        assert_eq!(
            doc.metadata.as_ref().map(|m| m.tags.clone()),
            Some(vec!["users".to_string(), "smoke".to_string()])
        );
    }

    #[test]
    fn test_wizard_round_trip_is_idempotent() {
        let original = wizard();
        let yaml = wizard_to_yaml(&original).expect("to yaml");
        let restored = yaml_to_wizard(&yaml).expect("to wizard");

        assert_eq!(restored, original);
        assert_eq!(wizard_to_yaml(&restored).expect("again"), yaml);
    }

    #[test]
    fn test_form_round_trip_preserves_every_field() {
        let mut step = TestStep::new("Upload", "PUT", "/files/{{id}}");
        step.continue_on_failure = Some(false);
        step.certificate = Some(ClientCertificate::from_pem_files("./c.pem", "./c.key"));
        step.hooks_pre_request = vec![json!({"calculate": {"ts": "Date.now()"}})];
        step.request.params.insert("overwrite".into(), json!(true));

        let mut variables = IndexMap::new();
        variables.insert("id".to_string(), json!("abc"));
        variables.insert("nested".to_string(), json!({"a": [1, 2]}));

        let form = TestSuiteFormData {
            node_id: "files".into(),
            suite_name: "Files".into(),
            description: "File API".into(),
            base_url: "https://files.example.com".into(),
            execution_mode: ExecutionMode::Parallel,
            variables,
            steps: vec![step],
            exports: vec!["file_id".into()],
            exports_optional: vec!["etag".into()],
            depends: vec![SuiteDependency {
                node_id: None,
                path: Some("./auth.yaml".into()),
                required: Some(false),
            }],
            metadata: SuiteMetadata {
                priority: Some("critical".into()),
                tags: vec!["files".into()],
                timeout: Some(60_000),
                estimated_duration_ms: None,
            },
        };

        let restored = yaml_to_form(&form_to_yaml(&form).expect("to yaml")).expect("to form");
        assert_eq!(restored, form);
    }

    #[test]
    fn test_wizard_drops_advanced_fields() {
        let wizard = yaml_to_wizard(FULL_SUITE).expect("to wizard");
        let doc = parse_suite_yaml(&wizard_to_yaml(&wizard).expect("to yaml")).expect("parse");

        assert!(doc.depends.is_empty());
        assert!(doc.exports.is_empty());
        assert!(doc.exports_optional.is_empty());
        assert!(doc.metadata.is_none());
        assert!(doc.steps[0].certificate.is_none());
        assert!(doc.steps[0].continue_on_failure.is_none());
        assert!(doc.steps[0].request.params.is_empty());
        assert_eq!(doc.steps[0].capture["user_name"], "body.name");
    }

    #[test]
    fn test_invalid_yaml_reports_position() {
        let err = yaml_to_form("node_id: a\nsteps: [\n  - name: x\n").expect_err("invalid");
        let ConversionError::Parse(failure) = err else {
            panic!("expected parse failure");
        };
        assert!(failure.line.is_some());
        assert!(failure.to_string().starts_with("YAML syntax error at line"));
    }

    #[test]
    fn test_empty_and_scalar_documents_are_rejected() {
        assert_eq!(parse_suite_yaml("  \n# comment\n"), Err(SuiteParseError::Empty));
        assert!(yaml_to_wizard("just text").is_err());
    }

    #[test]
    fn test_validate_reports_e2e_errors() {
        let empty_name = validate_test_suite_yaml("node_id: valid-id\nsuite_name: ''\nsteps: []\n");
        assert!(!empty_name.valid);
        assert!(empty_name.errors.contains(&"Missing required field: suite_name".to_string()));

        let bad_id = validate_test_suite_yaml("node_id: Test\nsuite_name: Suite\n");
        assert!(!bad_id.valid);
        assert!(bad_id.errors.iter().any(|e| e.contains("Invalid node_id 'Test'")));
    }

    #[test]
    fn test_validate_warnings_do_not_invalidate() {
        let result = validate_test_suite_yaml("node_id: ok\nsuite_name: Ok\nexecution_mode: random\n");
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_validate_syntax_error() {
        let result = validate_test_suite_yaml("node_id: [");
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("YAML syntax error"));
    }
}
