//! Test-suite documents and their editing representations

mod document;
mod form;
mod mode;
mod node_id;
mod scalar;
mod validation;
mod wizard;

pub use document::{
    ASSERTION_OPERATORS, FieldAssertion, StepAssertions, StepRequest, SuiteDependency,
    SuiteMetadata, TestStep, TestSuiteDocument,
};
pub use form::TestSuiteFormData;
pub use mode::{EditorMode, ExecutionMode};
pub use node_id::NodeId;
pub use scalar::{body_to_text, coerce_scalar, parse_body_text, scalar_to_text};
pub use validation::SuiteValidation;
pub use wizard::{
    AssertionKind, WizardAssertion, WizardCapture, WizardState, WizardStep, WizardVariable,
};
