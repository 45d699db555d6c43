//! Ordered key/value pairs used for params, headers and form entries

use serde::{Deserialize, Serialize};

/// A key/value pair that can be toggled without deleting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// The key (parameter, header or field name).
    pub key: String,
    /// The value.
    #[serde(default)]
    pub value: String,
    /// Whether this entry is sent.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Optional description for documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

const fn default_enabled() -> bool {
    true
}

impl KeyValue {
    /// Creates a new enabled pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
            description: None,
        }
    }

    /// Creates a disabled pair.
    #[must_use]
    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }

    /// Adds a description to this pair.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if the pair is enabled and has a non-blank key.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.trim().is_empty()
    }
}

/// Returns the active pairs of a list, in order.
pub fn active_pairs(pairs: &[KeyValue]) -> impl Iterator<Item = &KeyValue> {
    pairs.iter().filter(|p| p.is_active())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_creation() {
        let pair = KeyValue::new("Content-Type", "application/json");
        assert_eq!(pair.key, "Content-Type");
        assert!(pair.enabled);
        assert!(pair.is_active());
    }

    #[test]
    fn test_active_pairs_skip_disabled_and_blank() {
        let pairs = vec![
            KeyValue::new("Accept", "application/json"),
            KeyValue::disabled("X-Debug", "true"),
            KeyValue::new("  ", "orphan"),
            KeyValue::new("User-Agent", "Flowdeck"),
        ];

        let keys: Vec<&str> = active_pairs(&pairs).map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["Accept", "User-Agent"]);
    }
}
