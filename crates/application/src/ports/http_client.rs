//! HTTP Client port

use std::future::Future;
use std::pin::Pin;

use flowdeck_domain::request::ApiRequest;
use flowdeck_domain::response::ApiResponse;

/// Errors reported by an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpClientError {
    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The body could not be built.
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// The request did not complete in time.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("Could not resolve host {host}: {message}")]
    DnsError {
        /// Host that failed
        host: String,
        /// Resolver message
        message: String,
    },

    /// Nothing listens on the target port.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// Any other connection failure.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was reached.
    #[error("Too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit
        max: usize,
    },

    /// The client certificate could not be loaded.
    #[error("Client certificate error: {0}")]
    Certificate(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
pub trait HttpClient: Send + Sync {
    /// Sends a request whose variables are already resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails due to network issues,
    /// timeout, or other HTTP-related problems.
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, HttpClientError>> + Send + '_>>;
}
