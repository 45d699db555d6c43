//! Wire format of the stdio channel.
//!
//! One JSON document per line in both directions. The client sends
//! [`IpcRequest`]s; the host answers each with an [`IpcResponse`] carrying the
//! same id and pushes [`IpcEvent`]s as they happen.

use flowdeck_domain::ExecutionEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// A request from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcRequest {
    /// Correlation id echoed in the response.
    pub id: u64,
    /// Channel name, e.g. `execute-flow-test`.
    pub channel: String,
    /// Channel parameters.
    #[serde(default)]
    pub params: Value,
}

/// The answer to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Id of the request.
    pub id: u64,
    /// False when the request could not be dispatched.
    pub ok: bool,
    /// Channel result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Dispatch error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An unsolicited message from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcEvent {
    /// Event channel, e.g. `execution-log`.
    pub event: String,
    /// Event data.
    pub payload: Value,
}

impl From<&ExecutionEvent> for IpcEvent {
    fn from(event: &ExecutionEvent) -> Self {
        Self {
            event: event.channel().to_string(),
            payload: serde_json::to_value(event).unwrap_or(Value::Null),
        }
    }
}

/// Anything written to the output stream.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    /// A response
    Response(IpcResponse),
    /// An event
    Event(IpcEvent),
}

/// Builds a successful response.
pub fn ok_response<T: Serialize>(id: u64, result: &T) -> IpcResponse {
    IpcResponse {
        id,
        ok: true,
        result: Some(serde_json::to_value(result).unwrap_or(Value::Null)),
        error: None,
    }
}

/// Builds a failed response.
pub fn error_response(id: u64, message: impl Into<String>) -> IpcResponse {
    IpcResponse {
        id,
        ok: false,
        result: None,
        error: Some(message.into()),
    }
}

/// Writes outbound messages line by line until every sender is gone.
pub async fn write_outbound<W>(mut rx: mpsc::UnboundedReceiver<Outbound>, mut output: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        let mut line = match serde_json::to_vec(&message) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("failed to encode message: {e}");
                continue;
            }
        };
        line.push(b'\n');
        if let Err(e) = output.write_all(&line).await {
            tracing::error!("output closed: {e}");
            return;
        }
        if let Err(e) = output.flush().await {
            tracing::error!("output closed: {e}");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdeck_domain::ExecutionId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_params_default_to_null() {
        let request: IpcRequest =
            serde_json::from_str(r#"{"id": 7, "channel": "get-app-version"}"#).expect("decode");
        assert_eq!(request.id, 7);
        assert_eq!(request.params, Value::Null);
    }

    #[test]
    fn test_response_shapes() {
        let ok = serde_json::to_value(ok_response(1, &json!({"version": "1.0.0"}))).expect("encode");
        assert_eq!(ok, json!({"id": 1, "ok": true, "result": {"version": "1.0.0"}}));

        let err = serde_json::to_value(error_response(2, "unknown channel: nope")).expect("encode");
        assert_eq!(err, json!({"id": 2, "ok": false, "error": "unknown channel: nope"}));
    }

    #[test]
    fn test_execution_event_maps_to_channel() {
        let event = IpcEvent::from(&ExecutionEvent::Error {
            execution_id: ExecutionId::from("run-1"),
            message: "spawn failed".to_string(),
        });
        assert_eq!(event.event, "execution-error");
        assert_eq!(event.payload, json!({"execution_id": "run-1", "message": "spawn failed"}));
    }

    #[tokio::test]
    async fn test_write_outbound_emits_lines() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Outbound::Response(ok_response(1, &true))).expect("send");
        tx.send(Outbound::Event(IpcEvent {
            event: "execution-started".to_string(),
            payload: json!({}),
        }))
        .expect("send");
        drop(tx);

        let mut output = Vec::new();
        write_outbound(rx, &mut output).await;

        let text = String::from_utf8(output).expect("utf8");
        assert_eq!(
            text,
            "{\"id\":1,\"ok\":true,\"result\":true}\n{\"event\":\"execution-started\",\"payload\":{}}\n"
        );
    }
}
