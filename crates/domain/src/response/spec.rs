//! Response type
//!
//! Status helpers plus the response record shown in the response viewer and
//! kept in history.

use serde::{Deserialize, Serialize};

use crate::request::KeyValue;

/// Returns the canonical reason phrase for common status codes.
#[must_use]
pub const fn reason_phrase(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// HTTP response received for an [`ApiRequest`](crate::request::ApiRequest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Status text (e.g., "OK", "Not Found")
    #[serde(default)]
    pub status_text: String,
    /// Response headers in arrival order.
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    /// Response body, lossily decoded as UTF-8.
    #[serde(default)]
    pub body: String,
    /// Time from send to last body byte.
    #[serde(default)]
    pub duration_ms: u64,
    /// Body size in bytes before decoding.
    #[serde(default)]
    pub size_bytes: u64,
}

impl ApiResponse {
    /// Creates a response from raw parts.
    #[must_use]
    pub fn new(status: u16, headers: Vec<KeyValue>, body: &[u8], duration_ms: u64) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
            duration_ms,
            size_bytes: body.len() as u64,
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true if the status code indicates an error (4xx or 5xx).
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status >= 400 && self.status < 600
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.key.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Attempts to parse the body as JSON.
    #[must_use]
    pub fn body_as_json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Returns a human-readable size string (e.g., "1.2 KB").
    #[must_use]
    pub fn size_display(&self) -> String {
        format_bytes(self.size_bytes)
    }
}

/// Formats bytes into a human-readable string.
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    #[allow(clippy::cast_precision_loss)]
    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response() {
        let response = ApiResponse::new(
            404,
            vec![KeyValue::new("Content-Type", "application/json")],
            br#"{"error":"missing"}"#,
            12,
        );
        assert_eq!(response.status_text, "Not Found");
        assert_eq!(response.size_bytes, 19);
        assert!(response.is_error());
        assert_eq!(response.get_header("content-type"), Some("application/json"));
        assert_eq!(response.body_as_json().expect("json")["error"], "missing");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
    }
}
