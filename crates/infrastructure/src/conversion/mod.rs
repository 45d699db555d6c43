//! Conversions between the three editing views of a test suite.
//!
//! YAML is the canonical text form; the wizard and the visual form map
//! through [`TestSuiteDocument`](flowdeck_domain::suite::TestSuiteDocument).
//! Conversions into the wizard are lossy; [`analyze_wizard_compatibility`]
//! reports what would be lost.

mod compatibility;
mod suite_yaml;

pub use compatibility::{ConversionWarning, WarningSeverity, analyze_wizard_compatibility};
pub use suite_yaml::{
    SuiteParseError, YamlSuiteConverter, form_to_wizard, form_to_yaml, parse_suite_yaml,
    suite_to_yaml, validate_test_suite_yaml, wizard_to_form, wizard_to_yaml, yaml_to_form,
    yaml_to_wizard,
};
