//! Environment variable types

use serde::{Deserialize, Serialize};

use crate::generate_id;

/// A single key/value variable usable through `{{key}}` interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    /// The variable name referenced as `{{key}}`.
    pub key: String,

    /// The variable value, inserted verbatim.
    #[serde(default)]
    pub value: String,

    /// Whether this variable takes part in resolution.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Marks the value as sensitive so the UI can mask it.
    #[serde(default)]
    pub secret: bool,

    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

const fn default_enabled() -> bool {
    true
}

impl EnvironmentVariable {
    /// Creates a new enabled, non-secret variable.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
            secret: false,
            description: None,
        }
    }

    /// Creates a new enabled secret variable.
    #[must_use]
    pub fn secret(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            secret: true,
            ..Self::new(key, value)
        }
    }

    /// Creates a disabled variable.
    #[must_use]
    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }

    /// Attaches a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the value if the variable is enabled.
    #[must_use]
    pub fn enabled_value(&self) -> Option<&str> {
        if self.enabled {
            Some(&self.value)
        } else {
            None
        }
    }
}

/// Returns the value of the first enabled variable whose key matches.
#[must_use]
pub fn lookup_enabled<'a>(variables: &'a [EnvironmentVariable], key: &str) -> Option<&'a str> {
    variables
        .iter()
        .filter(|v| v.key == key)
        .find_map(EnvironmentVariable::enabled_value)
}

/// Defines the origin of a resolved variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableScope {
    /// Global variables - lowest precedence.
    Global = 0,
    /// Variables of the active environment.
    Environment = 1,
}

impl VariableScope {
    /// Returns the precedence level (higher = takes priority).
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        *self as u8
    }

    /// Returns a human-readable name for the scope.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Environment => "Environment",
        }
    }
}

/// A resolved variable with its value and origin scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariable {
    /// The variable name (without {{ }}).
    pub name: String,
    /// The resolved value.
    pub value: String,
    /// The scope from which this value was resolved.
    pub scope: VariableScope,
}

impl ResolvedVariable {
    /// Creates a new resolved variable.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, scope: VariableScope) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            scope,
        }
    }
}

/// A named set of variables, e.g. "Development" or "Production".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Unique identifier.
    pub id: String,
    /// Environment name.
    pub name: String,
    /// Ordered variables; the first enabled entry wins on duplicate keys.
    #[serde(default)]
    pub variables: Vec<EnvironmentVariable>,
}

impl Environment {
    /// Creates a new, empty environment with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            variables: Vec::new(),
        }
    }

    /// Adds a variable, or replaces the first variable with the same key.
    pub fn set_variable(&mut self, variable: EnvironmentVariable) {
        if let Some(existing) = self.variables.iter_mut().find(|v| v.key == variable.key) {
            *existing = variable;
        } else {
            self.variables.push(variable);
        }
    }

    /// Adds an enabled variable with name and value.
    pub fn add_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set_variable(EnvironmentVariable::new(key, value));
    }

    /// Gets the first variable with the given key, enabled or not.
    #[must_use]
    pub fn get_variable(&self, key: &str) -> Option<&EnvironmentVariable> {
        self.variables.iter().find(|v| v.key == key)
    }

    /// Removes every variable with the given key. Returns true if any was removed.
    pub fn remove_variable(&mut self, key: &str) -> bool {
        let before = self.variables.len();
        self.variables.retain(|v| v.key != key);
        self.variables.len() != before
    }

    /// Resolves a key to the first enabled value.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<&str> {
        lookup_enabled(&self.variables, key)
    }

    /// Returns the number of variables in this environment.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns keys of all variables marked as secret.
    #[must_use]
    pub fn secret_variable_names(&self) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|v| v.secret)
            .map(|v| v.key.as_str())
            .collect()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new("New Environment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_new() {
        let var = EnvironmentVariable::new("host", "localhost");
        assert_eq!(var.key, "host");
        assert_eq!(var.value, "localhost");
        assert!(var.enabled);
        assert!(!var.secret);
    }

    #[test]
    fn test_variable_disabled() {
        let var = EnvironmentVariable::disabled("host", "localhost");
        assert!(!var.enabled);
        assert_eq!(var.enabled_value(), None);
    }

    #[test]
    fn test_environment_set_variable_replaces_existing() {
        let mut env = Environment::new("Test");
        env.add_variable("host", "localhost");
        env.add_variable("host", "example.com");

        assert_eq!(env.variable_count(), 1);
        assert_eq!(env.resolve("host"), Some("example.com"));
    }

    #[test]
    fn test_environment_resolve_skips_disabled() {
        let mut env = Environment::new("Test");
        env.variables.push(EnvironmentVariable::disabled("token", "old"));
        env.variables.push(EnvironmentVariable::new("token", "new"));

        assert_eq!(env.resolve("token"), Some("new"));
        assert_eq!(env.get_variable("token").map(|v| v.value.as_str()), Some("old"));
    }

    #[test]
    fn test_environment_remove_variable() {
        let mut env = Environment::new("Test");
        env.add_variable("host", "localhost");

        assert!(env.remove_variable("host"));
        assert!(!env.remove_variable("host"));
        assert_eq!(env.variable_count(), 0);
    }

    #[test]
    fn test_secret_variable_names() {
        let mut env = Environment::new("Test");
        env.add_variable("host", "localhost");
        env.set_variable(EnvironmentVariable::secret("api_key", "sk-123"));

        assert_eq!(env.secret_variable_names(), vec!["api_key"]);
    }

    #[test]
    fn test_variable_scope_precedence() {
        assert!(VariableScope::Environment.precedence() > VariableScope::Global.precedence());
    }

    #[test]
    fn test_variable_deserializes_with_defaults() {
        let var: EnvironmentVariable =
            serde_json::from_str(r#"{"key": "host"}"#).expect("variable should deserialize");
        assert!(var.enabled);
        assert!(!var.secret);
        assert!(var.value.is_empty());
    }
}
