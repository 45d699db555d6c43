//! HTTP request body builder.
//!
//! Turns the domain [`RequestBody`] into what goes on the wire.

use flowdeck_domain::request::{BodyType, KeyValue, RequestBody, active_pairs};
use reqwest::multipart::Form;

/// Error type for body building operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BodyBuildError {
    /// A JSON body that does not parse.
    #[error("Invalid JSON: {message}")]
    InvalidJson {
        /// Parser message
        message: String,
    },

    /// Form fields that cannot be URL encoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Encoder message
        message: String,
    },
}

/// A body ready to attach to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltBody {
    /// No body.
    None,
    /// Text body with its default content type.
    Text {
        /// Body text
        content: String,
        /// Content-Type to send unless the request sets one
        content_type: &'static str,
    },
    /// Multipart text fields, in order.
    Multipart(Vec<(String, String)>),
}

impl BuiltBody {
    /// The Content-Type header value. Multipart bodies get theirs, with the
    /// boundary, from reqwest.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Text { content_type, .. } => Some(*content_type),
            Self::None | Self::Multipart(_) => None,
        }
    }

    /// Converts multipart fields into a reqwest form.
    #[must_use]
    pub fn to_form(fields: &[(String, String)]) -> Form {
        fields
            .iter()
            .fold(Form::new(), |form, (name, value)| form.text(name.clone(), value.clone()))
    }
}

/// Builds the wire body. Disabled and blank-keyed form entries are skipped.
///
/// # Errors
/// Returns an error for invalid JSON or unencodable form fields.
pub fn build_body(body: &RequestBody) -> Result<BuiltBody, BodyBuildError> {
    match body.body_type {
        BodyType::None => Ok(BuiltBody::None),

        BodyType::Json | BodyType::Xml | BodyType::Text | BodyType::Yaml => {
            if body.raw.is_empty() {
                return Ok(BuiltBody::None);
            }
            if body.body_type == BodyType::Json {
                serde_json::from_str::<serde_json::Value>(&body.raw)
                    .map_err(|e| BodyBuildError::InvalidJson { message: e.to_string() })?;
            }
            Ok(BuiltBody::Text {
                content: body.raw.clone(),
                content_type: body.body_type.content_type().unwrap_or("text/plain"),
            })
        }

        BodyType::FormUrlencoded => {
            let pairs = pairs(&body.form_urlencoded);
            let content = serde_urlencoded::to_string(&pairs)
                .map_err(|e| BodyBuildError::Serialization { message: e.to_string() })?;
            Ok(BuiltBody::Text {
                content,
                content_type: "application/x-www-form-urlencoded",
            })
        }

        BodyType::FormData => Ok(BuiltBody::Multipart(pairs(&body.form_data))),
    }
}

fn pairs(fields: &[KeyValue]) -> Vec<(String, String)> {
    active_pairs(fields)
        .map(|f| (f.key.clone(), f.value.clone()))
        .collect()
}
