//! Request specification type

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ClientCertificate, HttpMethod, KeyValue, RequestBody};
use crate::auth::AuthDescriptor;
use crate::generate_id;
use crate::suite::StepAssertions;

/// An HTTP request as built in the request editor.
///
/// Every string field may contain `{{variable}}` placeholders; they are
/// resolved into a new request right before sending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    #[serde(default)]
    pub name: String,
    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,
    /// Target URL without the query parameters in `params`
    #[serde(default)]
    pub url: String,
    /// Query parameters, in order
    #[serde(default)]
    pub params: Vec<KeyValue>,
    /// Headers, in order
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
    /// Authentication
    #[serde(default)]
    pub auth: AuthDescriptor,
    /// Checks exported with the request into a suite step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<StepAssertions>,
    /// Hooks run before sending, in the engine's schema
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_hooks: Vec<Value>,
    /// Hooks run after receiving, in the engine's schema
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_hooks: Vec<Value>,
    /// Client certificate for mutual TLS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<ClientCertificate>,
}

impl ApiRequest {
    /// Creates a new GET request with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            method: HttpMethod::default(),
            url: String::new(),
            params: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::none(),
            auth: AuthDescriptor::default(),
            assertions: None,
            pre_hooks: Vec::new(),
            post_hooks: Vec::new(),
            certificate: None,
        }
    }

    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn with_url(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::new(name)
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(KeyValue::new(key, value));
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(KeyValue::new(key, value));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets the authentication.
    #[must_use]
    pub fn auth(mut self, auth: AuthDescriptor) -> Self {
        self.auth = auth;
        self
    }

    /// Returns true if the URL contains variable placeholders.
    #[must_use]
    pub fn has_variables(&self) -> bool {
        self.url.contains("{{") && self.url.contains("}}")
    }
}
