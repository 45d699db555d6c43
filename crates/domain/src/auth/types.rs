//! Authentication descriptor types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Supported authentication schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthType {
    /// No authentication
    #[default]
    None,
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `Authorization: Basic <base64(username:password)>`
    Basic,
    /// API key sent as a header or query parameter
    ApiKey,
    /// OAuth 2.0 access token obtained elsewhere
    #[serde(rename = "oauth2")]
    OAuth2,
}

/// Location for API key authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiKeyLocation {
    /// Add to request headers
    #[default]
    Header,
    /// Add to query parameters
    Query,
}

/// Well-known keys of [`AuthDescriptor::config`].
pub mod keys {
    /// Bearer or OAuth2 token.
    pub const TOKEN: &str = "token";
    /// Basic auth user name.
    pub const USERNAME: &str = "username";
    /// Basic auth password.
    pub const PASSWORD: &str = "password";
    /// API key header or parameter name.
    pub const KEY: &str = "key";
    /// API key value.
    pub const VALUE: &str = "value";
    /// API key location, `header` or `query`.
    pub const ADD_TO: &str = "addTo";
}

/// Authentication settings for a request: a scheme plus free-form config values.
///
/// Config values may contain `{{variable}}` tokens; they are interpolated like
/// any other part of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuthDescriptor {
    /// The scheme.
    #[serde(rename = "type", default)]
    pub auth_type: AuthType,
    /// Scheme-specific settings.
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl AuthDescriptor {
    /// Returns true if authentication is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.auth_type != AuthType::None
    }

    /// Creates a bearer token descriptor.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::with_config(AuthType::Bearer, [(keys::TOKEN, token.into())])
    }

    /// Creates a basic auth descriptor.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_config(
            AuthType::Basic,
            [(keys::USERNAME, username.into()), (keys::PASSWORD, password.into())],
        )
    }

    /// Creates an API key descriptor.
    #[must_use]
    pub fn api_key(name: impl Into<String>, value: impl Into<String>, location: ApiKeyLocation) -> Self {
        let add_to = match location {
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Query => "query",
        };
        Self::with_config(
            AuthType::ApiKey,
            [
                (keys::KEY, name.into()),
                (keys::VALUE, value.into()),
                (keys::ADD_TO, add_to.to_string()),
            ],
        )
    }

    fn with_config<const N: usize>(auth_type: AuthType, entries: [(&str, String); N]) -> Self {
        Self {
            auth_type,
            config: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// Returns a config value, or an empty string when absent.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.config.get(key).map_or("", String::as_str)
    }

    /// Returns where an API key should be placed.
    #[must_use]
    pub fn api_key_location(&self) -> ApiKeyLocation {
        if self.get(keys::ADD_TO).eq_ignore_ascii_case("query") {
            ApiKeyLocation::Query
        } else {
            ApiKeyLocation::Header
        }
    }
}
