//! Send request use case.

use std::sync::Arc;
use std::time::Instant;

use flowdeck_domain::environment::ResolutionContext;
use flowdeck_domain::{ApiRequest, ApiResponse, HistoryEntry};
use tokio::sync::Mutex;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{Clock, HttpClient};
use crate::stores::HistoryStore;
use crate::variable_resolver::{VariableResolver, extract_request_variables, find_missing_variables};

/// Result of a sent request.
#[derive(Debug, Clone)]
pub struct SendRequestOutput {
    /// The request exactly as it went on the wire.
    pub resolved: ApiRequest,
    /// The response.
    pub response: ApiResponse,
    /// Variables that were referenced but left unresolved.
    pub missing_variables: Vec<String>,
    /// Id of the recorded history entry.
    pub history_entry_id: String,
}

/// Resolves variables, sends a request and records it in the history.
///
/// Missing variables never block sending; their `{{tokens}}` go out verbatim.
pub struct SendRequest<C: HttpClient> {
    client: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C: HttpClient> SendRequest<C> {
    /// Creates a new `SendRequest` use case.
    pub fn new(client: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    /// Sends `request` with variables from `context`.
    ///
    /// Both responses and transport failures are recorded in `history`;
    /// requests rejected before sending are not. The history lock is taken
    /// only once the exchange is over.
    ///
    /// # Errors
    /// Returns [`ApplicationError::InvalidRequest`] when the resolved URL is
    /// empty or not http(s), [`ApplicationError::Http`] when sending fails and
    /// a storage error if the history cannot be written.
    pub async fn execute(
        &self,
        request: &ApiRequest,
        context: &ResolutionContext,
        history: &Mutex<HistoryStore>,
    ) -> ApplicationResult<SendRequestOutput> {
        let names = extract_request_variables(request);
        let missing_variables = find_missing_variables(&names, context);
        if !missing_variables.is_empty() {
            tracing::warn!(missing = ?missing_variables, "sending with unresolved variables");
        }

        let resolved = VariableResolver::new(context.clone()).resolve_request(request);
        validate(&resolved)?;

        tracing::info!(method = %resolved.method, url = %resolved.url, "sending request");
        let started = Instant::now();
        let result = self.client.execute(&resolved).await;

        match result {
            Ok(response) => {
                tracing::info!(status = response.status, duration_ms = response.duration_ms, "response received");
                let entry = HistoryEntry::succeeded(resolved.clone(), response.clone(), self.clock.now());
                let history_entry_id = entry.id.clone();
                history.lock().await.record(entry).await?;
                Ok(SendRequestOutput {
                    resolved,
                    response,
                    missing_variables,
                    history_entry_id,
                })
            }
            Err(e) => {
                let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(error = %e, "request failed");
                let entry = HistoryEntry::failed(resolved, e.to_string(), elapsed, self.clock.now());
                history.lock().await.record(entry).await?;
                Err(e.into())
            }
        }
    }
}

fn validate(request: &ApiRequest) -> ApplicationResult<()> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApplicationError::InvalidRequest("URL is required".to_string()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApplicationError::InvalidRequest(format!(
            "URL must start with http:// or https://: {url}"
        )));
    }
    Ok(())
}
