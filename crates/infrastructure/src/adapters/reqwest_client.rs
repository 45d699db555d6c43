//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port. Requests arrive with their
//! variables already resolved; this layer applies params, auth, body and
//! client certificates.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use flowdeck_application::ports::{HttpClient, HttpClientError};
use flowdeck_domain::auth::{ApiKeyLocation, AuthType, keys};
use flowdeck_domain::request::{ApiRequest, ClientCertificate, HttpMethod, KeyValue, active_pairs};
use flowdeck_domain::response::ApiResponse;
use reqwest::{Client, Identity, Method};
use url::Url;

use crate::http::{BuiltBody, build_body};

const USER_AGENT: &str = concat!("Flowdeck/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// A request with params, auth and body applied, ready for reqwest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// URL including query parameters.
    pub url: Url,
    /// Headers in send order.
    pub headers: Vec<(String, String)>,
    /// Wire body.
    pub body: BuiltBody,
}

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
    timeout: Duration,
    follow_redirects: bool,
}

impl ReqwestHttpClient {
    /// Creates a client with the given per-request timeout and redirect policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration, follow_redirects: bool) -> Result<Self, HttpClientError> {
        let client = Self::builder(timeout, follow_redirects)
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;
        Ok(Self {
            client,
            timeout,
            follow_redirects,
        })
    }

    fn builder(timeout: Duration, follow_redirects: bool) -> reqwest::ClientBuilder {
        let policy = if follow_redirects {
            reqwest::redirect::Policy::limited(MAX_REDIRECTS)
        } else {
            reqwest::redirect::Policy::none()
        };
        Client::builder()
            .user_agent(USER_AGENT)
            .redirect(policy)
            .timeout(timeout)
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Applies params, auth and body to a resolved request.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable URL or an invalid body.
    pub fn prepare(request: &ApiRequest) -> Result<PreparedRequest, HttpClientError> {
        let raw_url = request.url.trim();
        let mut url =
            Url::parse(raw_url).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {raw_url}")))?;

        let params: Vec<&KeyValue> = active_pairs(&request.params).collect();
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for param in params {
                query.append_pair(&param.key, &param.value);
            }
        }

        let mut headers: Vec<(String, String)> = active_pairs(&request.headers)
            .map(|h| (h.key.trim().to_string(), h.value.clone()))
            .collect();
        let has_header = |headers: &[(String, String)], name: &str| {
            headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
        };

        let auth = &request.auth;
        match auth.auth_type {
            AuthType::None => {}
            AuthType::Bearer | AuthType::OAuth2 => {
                let token = auth.get(keys::TOKEN);
                if !token.is_empty() && !has_header(&headers, "authorization") {
                    headers.push(("Authorization".to_string(), format!("Bearer {token}")));
                }
            }
            AuthType::Basic => {
                if !has_header(&headers, "authorization") {
                    let credentials =
                        format!("{}:{}", auth.get(keys::USERNAME), auth.get(keys::PASSWORD));
                    headers.push((
                        "Authorization".to_string(),
                        format!("Basic {}", BASE64.encode(credentials)),
                    ));
                }
            }
            AuthType::ApiKey => {
                let (name, value) = (auth.get(keys::KEY), auth.get(keys::VALUE));
                if !name.is_empty() {
                    match auth.api_key_location() {
                        ApiKeyLocation::Header => headers.push((name.to_string(), value.to_string())),
                        ApiKeyLocation::Query => {
                            url.query_pairs_mut().append_pair(name, value);
                        }
                    }
                }
            }
        }

        let body = build_body(&request.body).map_err(|e| HttpClientError::InvalidBody(e.to_string()))?;
        if let Some(content_type) = body.content_type()
            && !has_header(&headers, "content-type")
        {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }

        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    /// Client for this request: the shared one, or a one-off client carrying
    /// the request's certificate.
    async fn client_for(&self, request: &ApiRequest, url: &Url) -> Result<Client, HttpClientError> {
        let Some(certificate) = request
            .certificate
            .as_ref()
            .filter(|c| c.is_configured() && c.applies_to(url.host_str().unwrap_or_default()))
        else {
            return Ok(self.client.clone());
        };

        let identity = load_identity(certificate).await?;
        tracing::debug!(host = url.host_str().unwrap_or_default(), "using client certificate");
        Self::builder(self.timeout, self.follow_redirects)
            .identity(identity)
            .build()
            .map_err(|e| HttpClientError::Certificate(e.to_string()))
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError { host: host(), message };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error.url().and_then(Url::port_or_known_default).unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        HttpClientError::Other(error.to_string())
    }
}

async fn load_identity(certificate: &ClientCertificate) -> Result<Identity, HttpClientError> {
    let (Some(cert_path), Some(key_path)) = (&certificate.cert_path, &certificate.key_path) else {
        return Err(HttpClientError::Certificate(
            "PKCS#12 bundles are not supported; configure cert_path and key_path".to_string(),
        ));
    };

    let read = |path: String| async move {
        tokio::fs::read(&path)
            .await
            .map_err(|e| HttpClientError::Certificate(format!("{path}: {e}")))
    };
    let mut pem = read(cert_path.clone()).await?;
    pem.push(b'\n');
    pem.extend(read(key_path.clone()).await?);

    Identity::from_pem(&pem).map_err(|e| HttpClientError::Certificate(e.to_string()))
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, HttpClientError>> + Send + '_>> {
        let request = request.clone();

        Box::pin(async move {
            let prepared = Self::prepare(&request)?;
            let client = self.client_for(&request, &prepared.url).await?;
            let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);

            let mut builder = client.request(Self::to_reqwest_method(prepared.method), prepared.url);
            for (name, value) in &prepared.headers {
                builder = builder.header(name, value);
            }
            builder = match prepared.body {
                BuiltBody::None => builder,
                BuiltBody::Text { content, .. } => builder.body(content),
                BuiltBody::Multipart(fields) => builder.multipart(BuiltBody::to_form(&fields)),
            };

            let start = Instant::now();
            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let headers: Vec<KeyValue> = response
                .headers()
                .iter()
                .map(|(k, v)| KeyValue::new(k.as_str(), v.to_str().unwrap_or("<binary>")))
                .collect();

            let body = response
                .bytes()
                .await
                .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?;
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            Ok(ApiResponse::new(status, headers, &body, duration_ms))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdeck_domain::auth::AuthDescriptor;
    use flowdeck_domain::request::RequestBody;
    use pretty_assertions::assert_eq;

    fn header<'a>(prepared: &'a PreparedRequest, name: &str) -> Option<&'a str> {
        prepared
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(ReqwestHttpClient::to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(ReqwestHttpClient::to_reqwest_method(HttpMethod::Patch), Method::PATCH);
        assert_eq!(ReqwestHttpClient::to_reqwest_method(HttpMethod::Options), Method::OPTIONS);
    }

    #[test]
    fn test_client_creation() {
        assert!(ReqwestHttpClient::new(Duration::from_secs(30), true).is_ok());
    }

    #[test]
    fn test_prepare_appends_enabled_params() {
        let mut request = ApiRequest::with_url("Search", HttpMethod::Get, "https://api.test/search?x=1")
            .param("q", "rust lang");
        request.params.push(KeyValue::disabled("debug", "true"));

        let prepared = ReqwestHttpClient::prepare(&request).expect("prepare");
        assert_eq!(prepared.url.as_str(), "https://api.test/search?x=1&q=rust+lang");
    }

    #[test]
    fn test_prepare_basic_auth() {
        let request = ApiRequest::with_url("Me", HttpMethod::Get, "https://api.test/me")
            .auth(AuthDescriptor::basic("user", "pass"));

        let prepared = ReqwestHttpClient::prepare(&request).expect("prepare");
        assert_eq!(header(&prepared, "authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn test_explicit_authorization_header_wins() {
        let request = ApiRequest::with_url("Me", HttpMethod::Get, "https://api.test/me")
            .header("Authorization", "Custom abc")
            .auth(AuthDescriptor::bearer("token"));

        let prepared = ReqwestHttpClient::prepare(&request).expect("prepare");
        assert_eq!(header(&prepared, "authorization"), Some("Custom abc"));
        assert_eq!(prepared.headers.len(), 1);
    }

    #[test]
    fn test_prepare_api_key_in_query() {
        let request = ApiRequest::with_url("Data", HttpMethod::Get, "https://api.test/data")
            .auth(AuthDescriptor::api_key("api_key", "s3cret", ApiKeyLocation::Query));

        let prepared = ReqwestHttpClient::prepare(&request).expect("prepare");
        assert_eq!(prepared.url.query(), Some("api_key=s3cret"));
        assert_eq!(header(&prepared, "api_key"), None);
    }

    #[test]
    fn test_prepare_sets_default_content_type() {
        let request = ApiRequest::with_url("Create", HttpMethod::Post, "https://api.test/items")
            .body(RequestBody::json(r#"{"name": "x"}"#));
        let prepared = ReqwestHttpClient::prepare(&request).expect("prepare");
        assert_eq!(header(&prepared, "content-type"), Some("application/json"));

        let overridden = ApiRequest::with_url("Create", HttpMethod::Post, "https://api.test/items")
            .header("Content-Type", "application/vnd.api+json")
            .body(RequestBody::json("{}"));
        let prepared = ReqwestHttpClient::prepare(&overridden).expect("prepare");
        assert_eq!(header(&prepared, "content-type"), Some("application/vnd.api+json"));
    }

    #[test]
    fn test_prepare_rejects_bad_input() {
        let unresolved = ApiRequest::with_url("X", HttpMethod::Get, "{{baseUrl}}/x");
        assert!(matches!(
            ReqwestHttpClient::prepare(&unresolved),
            Err(HttpClientError::InvalidUrl(_))
        ));

        let bad_json = ApiRequest::with_url("X", HttpMethod::Post, "https://api.test")
            .body(RequestBody::json("{invalid json}"));
        assert!(matches!(
            ReqwestHttpClient::prepare(&bad_json),
            Err(HttpClientError::InvalidBody(_))
        ));
    }

    #[tokio::test]
    async fn test_pkcs12_certificate_is_rejected() {
        let certificate = ClientCertificate::from_pkcs12("./client.p12", None);
        let result = load_identity(&certificate).await;
        assert!(matches!(result, Err(HttpClientError::Certificate(_))));
    }
}
