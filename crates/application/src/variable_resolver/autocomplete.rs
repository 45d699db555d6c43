//! Variable name completion for text being typed

use std::collections::HashSet;
use std::ops::Range;

use flowdeck_domain::environment::{ResolutionContext, VariableScope};

const SECRET_MASK: &str = "••••••";

/// A completion candidate for a partially typed `{{name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSuggestion {
    /// The variable name.
    pub name: String,
    /// Value preview; masked for secrets.
    pub preview: String,
    /// Where the variable is defined.
    pub scope: VariableScope,
    /// Byte range to replace with `{{name}}`, from the opening braces to the cursor.
    pub replace: Range<usize>,
}

/// Suggests variable names for the token under `cursor` (a byte offset).
///
/// Nothing is suggested unless an unclosed `{{` precedes the cursor. The text
/// typed after the braces is matched case-insensitively as a prefix against
/// enabled variables; environment variables come first and a key appears
/// only once.
#[must_use]
pub fn suggest_variables(
    text: &str,
    cursor: usize,
    context: &ResolutionContext,
) -> Vec<VariableSuggestion> {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    let before = &text[..cursor];

    let Some(open) = before.rfind("{{") else {
        return Vec::new();
    };
    let typed = &before[open + 2..];
    if typed.contains('}') || typed.contains('{') || typed.chars().any(char::is_whitespace) {
        return Vec::new();
    }
    let prefix = typed.to_lowercase();

    let mut seen = HashSet::new();
    context
        .enabled_variables()
        .filter(|(var, _)| var.key.to_lowercase().starts_with(&prefix))
        .filter(|(var, _)| seen.insert(var.key.clone()))
        .map(|(var, scope)| VariableSuggestion {
            name: var.key.clone(),
            preview: if var.secret {
                SECRET_MASK.to_string()
            } else {
                var.value.clone()
            },
            scope,
            replace: open..cursor,
        })
        .collect()
}
