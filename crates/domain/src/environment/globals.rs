//! Global variables shared across all environments

use serde::{Deserialize, Serialize};

use super::variable::{EnvironmentVariable, lookup_enabled};

/// Global variables, consulted after the active environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVariables {
    /// Ordered global variables.
    #[serde(default)]
    pub variables: Vec<EnvironmentVariable>,
}

impl GlobalVariables {
    /// Creates a new empty globals store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            variables: Vec::new(),
        }
    }

    /// Adds or replaces a variable by key.
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

    /// Returns the number of variables.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_globals_set_variable() {
        let mut globals = GlobalVariables::new();
        globals.add_variable("app_name", "Flowdeck");

        assert_eq!(globals.variable_count(), 1);
        assert_eq!(globals.resolve("app_name"), Some("Flowdeck"));
    }

    #[test]
    fn test_globals_remove_variable() {
        let mut globals = GlobalVariables::new();
        globals.add_variable("app_name", "Flowdeck");

        assert!(globals.remove_variable("app_name"));
        assert_eq!(globals.variable_count(), 0);
    }

    #[test]
    fn test_globals_resolve_disabled() {
        let mut globals = GlobalVariables::new();
        globals.set_variable(EnvironmentVariable::disabled("token", "abc"));

        assert_eq!(globals.resolve("token"), None);
    }
}
