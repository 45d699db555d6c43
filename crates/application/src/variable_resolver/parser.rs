//! Variable parser for {{variable}} syntax
//!
//! Parses strings to extract variable references with their positions.

use std::ops::Range;

/// Represents a parsed variable reference in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name (without {{ }}), trimmed.
    pub name: String,

    /// Byte range in the original string where this reference appears.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a string and extracts all variable references.
///
/// Whitespace inside the braces is ignored and empty references are
/// skipped. Parsing stops at the first `{{` without a closing `}}`.
///
/// # Examples
///
/// ```
/// use flowdeck_application::variable_resolver::parser::parse_variables;
///
/// let refs = parse_variables("Hello {{name}}, your ID is {{ user_id }}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "name");
/// assert_eq!(refs[1].name, "user_id");
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    let mut references = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != '{' || !matches!(chars.peek(), Some((_, '{'))) {
            continue;
        }
        chars.next(); // consume second {
        let mut name = String::new();
        let mut found_end = false;

        // Read until }}
        while let Some((_, ch)) = chars.next() {
            if ch == '}'
                && let Some((end_idx, '}')) = chars.peek()
            {
                let end = *end_idx + 1;
                chars.next(); // consume second }

                let trimmed_name = name.trim();
                if !trimmed_name.is_empty() {
                    references.push(VariableReference::new(trimmed_name, start..end));
                }
                found_end = true;
                break;
            }
            name.push(ch);
        }

        if !found_end {
            break;
        }
    }

    references
}

/// Validates a variable name.
/// Valid names: alphanumeric, underscore, hyphen and dot, not starting with a digit or hyphen.
#[must_use]
pub fn is_valid_variable_name(name: &str) -> bool {
    // First character must be letter or underscore
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }

    // Remaining characters must be alphanumeric, underscore, hyphen or dot
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Returns true if the input string contains any variable references.
#[must_use]
pub fn has_variables(input: &str) -> bool {
    input.contains("{{") && input.contains("}}")
}

/// Extracts just the variable names from the input without full parsing info.
#[must_use]
pub fn extract_variable_names(input: &str) -> Vec<String> {
    parse_variables(input)
        .into_iter()
        .map(|r| r.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_variable() {
        let refs = parse_variables("{{name}}");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "name");
        assert_eq!(refs[0].span, 0..8);
    }

    #[test]
    fn test_parse_multiple_variables() {
        let refs = parse_variables("{{base_url}}/api/{{version}}/users/{{id}}");
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].name, "base_url");
        assert_eq!(refs[1].name, "version");
        assert_eq!(refs[2].name, "id");
    }

    #[test]
    fn test_parse_with_whitespace() {
        let refs = parse_variables("{{ name }}");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "name");
    }

    #[test]
    fn test_no_variables() {
        let refs = parse_variables("Hello, World!");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_unclosed_variable() {
        let refs = parse_variables("{{name");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_empty_variable() {
        assert!(parse_variables("{{}}").is_empty());
        assert!(parse_variables("{{   }}").is_empty());
    }

    #[test]
    fn test_variable_in_url() {
        let refs = parse_variables("https://{{host}}:{{port}}/{{path}}?key={{api_key}}");
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["host", "port", "path", "api_key"]);
    }

    #[test]
    fn test_variable_in_json() {
        let refs = parse_variables(r#"{"name": "{{user_name}}", "nested": {"id": "{{id}}"}}"#);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "user_name");
        assert_eq!(refs[1].name, "id");
    }

    #[test]
    fn test_adjacent_variables() {
        let refs = parse_variables("{{a}}{{b}}{{c}}");
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[2].name, "c");
    }

    #[test]
    fn test_single_brace() {
        assert!(parse_variables("{name}").is_empty());
    }

    #[test]
    fn test_multibyte_text_spans() {
        let input = "héllo {{wörld}} ✓";
        let refs = parse_variables(input);
        assert_eq!(&input[refs[0].span.clone()], "{{wörld}}");
    }

    #[test]
    fn test_valid_variable_names() {
        assert!(is_valid_variable_name("name"));
        assert!(is_valid_variable_name("my_var"));
        assert!(is_valid_variable_name("myVar123"));
        assert!(is_valid_variable_name("_private"));
        assert!(is_valid_variable_name("var-name"));
        assert!(is_valid_variable_name("auth.token"));
    }

    #[test]
    fn test_invalid_variable_names() {
        assert!(!is_valid_variable_name(""));
        assert!(!is_valid_variable_name("123var"));
        assert!(!is_valid_variable_name("-start"));
        assert!(!is_valid_variable_name("has space"));
    }

    #[test]
    fn test_has_variables() {
        assert!(has_variables("Hello {{name}}!"));
        assert!(!has_variables("Hello World!"));
        assert!(!has_variables("{{incomplete"));
    }

    #[test]
    fn test_extract_variable_names() {
        let names = extract_variable_names("{{a}} and {{b}} and {{a}}");
        assert_eq!(names, vec!["a", "b", "a"]);
    }
}
