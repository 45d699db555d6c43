//! Flowdeck host
//!
//! Serves the API client and the test engine launcher over a line-delimited
//! JSON channel. The desktop front end talks to this process through stdin and
//! stdout; logs go to stderr.

pub mod host;
pub mod ipc;

use std::sync::Arc;
use std::time::Duration;

use flowdeck_domain::AppSettings;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;

pub use host::{Host, HostError};
pub use ipc::{IpcEvent, IpcRequest, IpcResponse, Outbound};

use ipc::{error_response, write_outbound};

const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Reads requests from `input` until it closes, writing responses and events
/// to `output`. Running executions are killed on exit.
///
/// # Errors
///
/// Returns an error if the host cannot be opened or `input` fails.
pub async fn serve<R, W>(input: R, output: W, settings: AppSettings) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_outbound(outbound_rx, output));
    let host = Arc::new(Host::open(settings, outbound.clone()).await?);

    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<IpcRequest>(&line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("invalid request: {e}");
                let _ = outbound.send(Outbound::Response(error_response(
                    0,
                    format!("invalid request: {e}"),
                )));
                continue;
            }
        };

        let host = Arc::clone(&host);
        let outbound = outbound.clone();
        tokio::spawn(async move {
            let response = host.dispatch(request).await;
            let _ = outbound.send(Outbound::Response(response));
        });
    }

    tracing::info!("input closed, shutting down");
    host.shutdown().await;
    drop(host);
    drop(outbound);
    if tokio::time::timeout(FLUSH_TIMEOUT, writer).await.is_err() {
        tracing::warn!("pending output dropped");
    }
    Ok(())
}
