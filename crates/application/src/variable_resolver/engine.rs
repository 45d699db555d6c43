//! Variable resolution engine
//!
//! Resolves `{{variable}}` references against the active environment and the
//! global variables, environment first.

use std::collections::BTreeSet;

use flowdeck_domain::environment::{EnvironmentVariable, ResolutionContext, ResolvedVariable};
use flowdeck_domain::request::{ApiRequest, KeyValue};

use super::parser::parse_variables;

/// Result of variable resolution for a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The string with every known variable substituted.
    pub resolved: String,

    /// Variables that were successfully resolved.
    pub resolved_variables: Vec<ResolvedVariable>,

    /// Variable names that could not be resolved, left verbatim in `resolved`.
    pub unresolved: Vec<String>,

    /// Whether all variables were successfully resolved.
    pub is_complete: bool,
}

impl ResolutionResult {
    /// Creates a result for input with no variables.
    #[must_use]
    pub fn no_variables(input: &str) -> Self {
        Self {
            resolved: input.to_string(),
            resolved_variables: Vec::new(),
            unresolved: Vec::new(),
            is_complete: true,
        }
    }

    /// Returns the count of resolved variables.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved_variables.len()
    }

    /// Returns the count of unresolved variables.
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }
}

/// Replaces every `{{name}}` token in `text` with the first enabled variable
/// of that name, looking in `environment_vars` first and `global_vars` second.
///
/// Unknown tokens are kept as written. Substituted values are inserted as
/// plain text and never interpolated again.
#[must_use]
pub fn replace_variables(
    text: &str,
    environment_vars: &[EnvironmentVariable],
    global_vars: &[EnvironmentVariable],
) -> String {
    if text.is_empty() {
        return String::new();
    }
    VariableResolver::new(ResolutionContext::from_variables(environment_vars, global_vars))
        .resolve(text)
        .resolved
}

/// The variable resolution engine.
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    context: ResolutionContext,
}

impl VariableResolver {
    /// Creates a new resolver with the given context.
    #[must_use]
    pub const fn new(context: ResolutionContext) -> Self {
        Self { context }
    }

    /// Creates a new resolver with an empty context.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(ResolutionContext::new())
    }

    /// Updates the resolution context.
    pub fn set_context(&mut self, context: ResolutionContext) {
        self.context = context;
    }

    /// Returns a reference to the current context.
    #[must_use]
    pub const fn context(&self) -> &ResolutionContext {
        &self.context
    }

    /// Resolves all variables in the input string.
    #[must_use]
    pub fn resolve(&self, input: &str) -> ResolutionResult {
        let references = parse_variables(input);

        if references.is_empty() {
            return ResolutionResult::no_variables(input);
        }

        let mut resolved_vars = Vec::new();
        let mut unresolved = Vec::new();
        let mut result = String::with_capacity(input.len());
        let mut last_end = 0;

        for var_ref in &references {
            // Append text before this variable
            result.push_str(&input[last_end..var_ref.span.start]);

            if let Some(resolved) = self.context.resolve(&var_ref.name) {
                result.push_str(&resolved.value);
                resolved_vars.push(resolved);
            } else {
                // Keep the original {{variable}} for unresolved
                result.push_str(&input[var_ref.span.clone()]);
                unresolved.push(var_ref.name.clone());
            }

            last_end = var_ref.span.end;
        }

        // Append remaining text after last variable
        result.push_str(&input[last_end..]);

        let is_complete = unresolved.is_empty();
        ResolutionResult {
            resolved: result,
            resolved_variables: resolved_vars,
            unresolved,
            is_complete,
        }
    }

    /// Resolves just the value of a single variable (without full result info).
    #[must_use]
    pub fn resolve_value(&self, name: &str) -> Option<String> {
        self.context.resolve_value(name)
    }

    /// Returns a copy of `request` with variables substituted in the URL,
    /// params, headers, body content, form entries and auth config values.
    ///
    /// The input request is left untouched.
    #[must_use]
    pub fn resolve_request(&self, request: &ApiRequest) -> ApiRequest {
        let text = |s: &str| self.resolve(s).resolved;
        let pairs = |pairs: &[KeyValue]| -> Vec<KeyValue> {
            pairs
                .iter()
                .map(|p| KeyValue {
                    key: text(&p.key),
                    value: text(&p.value),
                    ..p.clone()
                })
                .collect()
        };

        let mut resolved = request.clone();
        resolved.url = text(&request.url);
        resolved.params = pairs(&request.params);
        resolved.headers = pairs(&request.headers);
        resolved.body.raw = text(&request.body.raw);
        resolved.body.form_data = pairs(&request.body.form_data);
        resolved.body.form_urlencoded = pairs(&request.body.form_urlencoded);
        for value in resolved.auth.config.values_mut() {
            *value = text(value);
        }
        resolved
    }

    /// Returns the variables of `names` that this resolver cannot resolve.
    #[must_use]
    pub fn find_missing<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        find_missing_variables(names, &self.context)
    }
}

/// Collects the distinct variable names referenced anywhere in a request:
/// URL, params, headers, body content, form entries and auth config.
#[must_use]
pub fn extract_request_variables(request: &ApiRequest) -> BTreeSet<String> {
    let pairs = [
        &request.params,
        &request.headers,
        &request.body.form_data,
        &request.body.form_urlencoded,
    ];
    let texts = std::iter::once(request.url.as_str())
        .chain(std::iter::once(request.body.raw.as_str()))
        .chain(
            pairs
                .into_iter()
                .flatten()
                .flat_map(|p| [p.key.as_str(), p.value.as_str()]),
        )
        .chain(request.auth.config.values().map(String::as_str));

    texts
        .flat_map(parse_variables)
        .map(|r| r.name)
        .collect()
}

/// Returns the names that are not defined by any enabled variable, in the
/// order given and without duplicates. Names only defined by disabled
/// variables count as missing.
#[must_use]
pub fn find_missing_variables<'a>(
    names: impl IntoIterator<Item = &'a String>,
    context: &ResolutionContext,
) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for name in names {
        if context.resolve(name).is_none() && !missing.contains(name) {
            missing.push(name.clone());
        }
    }
    missing
}
