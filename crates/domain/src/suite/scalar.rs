//! Conversions between editor text fields and YAML scalars

use serde_json::Value;

/// Turns text typed into an editor field into the YAML scalar it denotes.
///
/// `true`/`false` become booleans and numbers become numbers when their
/// canonical form is exactly the input (so `"01"` or `"1e3"` stay strings).
/// Everything else stays a string.
#[must_use]
pub fn coerce_scalar(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>()
        && n.to_string() == text
    {
        return Value::from(n);
    }
    if let Ok(f) = text.parse::<f64>()
        && let Some(number) = serde_json::Number::from_f64(f)
        && number.to_string() == text
    {
        return Value::Number(number);
    }
    Value::String(text.to_string())
}

/// Renders a scalar for a text field; composite values become compact JSON.
#[must_use]
pub fn scalar_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        composite => composite.to_string(),
    }
}

/// Parses a request body typed as text: JSON objects and arrays are kept
/// structured, anything else is a plain string. Blank text means no body.
#[must_use]
pub fn parse_body_text(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => Some(Value::String(text.to_string())),
    }
}

/// Renders a body for a text field; structured bodies are pretty JSON.
#[must_use]
pub fn body_to_text(body: Option<&Value>) -> String {
    match body {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(structured) => {
            serde_json::to_string_pretty(structured).unwrap_or_else(|_| structured.to_string())
        }
    }
}
