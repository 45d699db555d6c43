//! HTTP Request body types

use serde::{Deserialize, Serialize};

use super::KeyValue;

/// The kind of request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BodyType {
    /// No body
    #[default]
    None,
    /// JSON document
    Json,
    /// XML document
    Xml,
    /// Plain text
    Text,
    /// Multipart form data
    FormData,
    /// URL encoded form
    FormUrlencoded,
    /// YAML document
    Yaml,
}

impl BodyType {
    /// Returns the default content type for raw bodies.
    #[must_use]
    pub const fn content_type(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json => Some("application/json"),
            Self::Xml => Some("application/xml"),
            Self::Text => Some("text/plain"),
            Self::FormData => Some("multipart/form-data"),
            Self::FormUrlencoded => Some("application/x-www-form-urlencoded"),
            Self::Yaml => Some("application/x-yaml"),
        }
    }

    /// Returns true for body types whose content lives in `raw`.
    #[must_use]
    pub const fn is_raw(self) -> bool {
        matches!(self, Self::Json | Self::Xml | Self::Text | Self::Yaml)
    }
}

/// HTTP request body with type and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RequestBody {
    /// The kind of body.
    #[serde(default)]
    pub body_type: BodyType,
    /// Raw content for json/xml/text/yaml bodies.
    #[serde(default)]
    pub raw: String,
    /// Entries for multipart bodies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_data: Vec<KeyValue>,
    /// Entries for URL encoded bodies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_urlencoded: Vec<KeyValue>,
}

impl RequestBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            body_type: BodyType::None,
            raw: String::new(),
            form_data: Vec::new(),
            form_urlencoded: Vec::new(),
        }
    }

    /// Creates a raw body of the given type.
    #[must_use]
    pub fn raw(body_type: BodyType, content: impl Into<String>) -> Self {
        Self {
            body_type,
            raw: content.into(),
            ..Self::none()
        }
    }

    /// Creates a JSON body.
    #[must_use]
    pub fn json(content: impl Into<String>) -> Self {
        Self::raw(BodyType::Json, content)
    }

    /// Creates a plain text body.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::raw(BodyType::Text, content)
    }

    /// Creates a URL encoded form body.
    #[must_use]
    pub fn form_urlencoded(fields: Vec<KeyValue>) -> Self {
        Self {
            body_type: BodyType::FormUrlencoded,
            form_urlencoded: fields,
            ..Self::none()
        }
    }

    /// Creates a multipart form body.
    #[must_use]
    pub fn form_data(fields: Vec<KeyValue>) -> Self {
        Self {
            body_type: BodyType::FormData,
            form_data: fields,
            ..Self::none()
        }
    }

    /// Returns whether the body is empty or none.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.body_type {
            BodyType::None => true,
            BodyType::FormData => self.form_data.is_empty(),
            BodyType::FormUrlencoded => self.form_urlencoded.is_empty(),
            _ => self.raw.is_empty(),
        }
    }

    /// Returns the content type if applicable.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        self.body_type.content_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body() {
        let body = RequestBody::json(r#"{"key": "value"}"#);
        assert_eq!(body.content_type(), Some("application/json"));
        assert!(!body.is_empty());
    }

    #[test]
    fn test_empty_body() {
        let body = RequestBody::none();
        assert!(body.is_empty());
        assert_eq!(body.content_type(), None);
    }

    #[test]
    fn test_form_body_emptiness_follows_entries() {
        assert!(RequestBody::form_data(Vec::new()).is_empty());
        assert!(!RequestBody::form_urlencoded(vec![KeyValue::new("a", "1")]).is_empty());
    }

    #[test]
    fn test_body_type_serde() {
        let json = serde_json::to_string(&BodyType::FormUrlencoded).expect("serialize");
        assert_eq!(json, "\"form-urlencoded\"");
    }
}
