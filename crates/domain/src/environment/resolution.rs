//! Resolution context for variable substitution
//!
//! Holds the two variable sources consulted during interpolation.

use super::globals::GlobalVariables;
use super::variable::{
    Environment, EnvironmentVariable, ResolvedVariable, VariableScope, lookup_enabled,
};

/// Holds all variable sources for resolution.
///
/// Variables are resolved in order (first enabled match wins):
/// 1. Active environment
/// 2. Globals
///
/// A disabled entry never shadows an enabled entry further down the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    /// Active environment variables.
    pub environment: Vec<EnvironmentVariable>,

    /// Active environment name (for display purposes).
    pub environment_name: Option<String>,

    /// Global variables.
    pub globals: Vec<EnvironmentVariable>,
}

impl ResolutionContext {
    /// Creates a new empty resolution context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolution context from raw variable lists.
    #[must_use]
    pub fn from_variables(
        environment: &[EnvironmentVariable],
        globals: &[EnvironmentVariable],
    ) -> Self {
        Self {
            environment: environment.to_vec(),
            environment_name: None,
            globals: globals.to_vec(),
        }
    }

    /// Creates a resolution context from an optional active environment and the globals.
    #[must_use]
    pub fn from_sources(environment: Option<&Environment>, globals: &GlobalVariables) -> Self {
        Self {
            environment: environment.map(|e| e.variables.clone()).unwrap_or_default(),
            environment_name: environment.map(|e| e.name.clone()),
            globals: globals.variables.clone(),
        }
    }

    /// Resolves a variable name to its value and scope.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ResolvedVariable> {
        if let Some(value) = lookup_enabled(&self.environment, name) {
            return Some(ResolvedVariable::new(name, value, VariableScope::Environment));
        }

        lookup_enabled(&self.globals, name)
            .map(|value| ResolvedVariable::new(name, value, VariableScope::Global))
    }

    /// Resolves a variable name to just its value.
    #[must_use]
    pub fn resolve_value(&self, name: &str) -> Option<String> {
        self.resolve(name).map(|r| r.value)
    }

    /// Returns true if a variable with this key exists in any source, enabled or not.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.environment
            .iter()
            .chain(self.globals.iter())
            .any(|v| v.key == name)
    }

    /// Returns enabled variables in lookup order: environment first, then globals.
    pub fn enabled_variables(&self) -> impl Iterator<Item = (&EnvironmentVariable, VariableScope)> {
        self.environment
            .iter()
            .map(|v| (v, VariableScope::Environment))
            .chain(self.globals.iter().map(|v| (v, VariableScope::Global)))
            .filter(|(v, _)| v.enabled)
    }

    /// Returns all variable names across all sources, sorted and deduplicated.
    #[must_use]
    pub fn all_variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .environment
            .iter()
            .chain(self.globals.iter())
            .map(|v| v.key.clone())
            .collect();

        names.sort();
        names.dedup();
        names
    }
}
