//! Spawns engine runs, relays their output and tracks them until exit.

use std::collections::HashMap;
use std::sync::Arc;

use flowdeck_application::ports::Clock;
use flowdeck_domain::{
    AppSettings, ExecutionEvent, ExecutionId, ExecutionOptions, LogEntry, LogStream,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{Mutex, mpsc, oneshot};

use super::command::{EngineCommand, resolve_working_dir};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Errors from running the engine.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The shell could not be started.
    #[error("Failed to start '{program}': {message}")]
    Spawn {
        /// Program name
        program: String,
        /// OS error text
        message: String,
    },

    /// The program ran but exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {stderr}")]
    Failed {
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Captured stderr
        stderr: String,
    },
}

/// Sink for execution events.
pub type EventSender = mpsc::UnboundedSender<ExecutionEvent>;

type Registry = Arc<Mutex<HashMap<ExecutionId, oneshot::Sender<()>>>>;

/// Owns every running engine process.
///
/// Each run is tracked by its [`ExecutionId`] until the process exits or is
/// stopped. Several runs may be active at once.
pub struct ExecutionCoordinator {
    settings: AppSettings,
    clock: Arc<dyn Clock>,
    executions: Registry,
}

impl ExecutionCoordinator {
    /// Creates a coordinator launching the engine configured in `settings`.
    #[must_use]
    pub fn new(settings: AppSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            executions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts a run and returns its id.
    ///
    /// `Started` is sent before the process is spawned. Output chunks follow
    /// as `Log` events in pipe order, then exactly one `Complete` or `Error`.
    pub async fn execute(&self, options: &ExecutionOptions, events: EventSender) -> ExecutionId {
        let execution_id = ExecutionId::generate();
        let command = EngineCommand::build(options, &self.settings);
        let working_dir = resolve_working_dir(options.collection_path.as_deref()).await;

        tracing::info!(
            execution_id = %execution_id,
            command = %command,
            working_dir = %working_dir.display(),
            "starting engine"
        );
        let _ = events.send(ExecutionEvent::Started {
            execution_id: execution_id.clone(),
            command: command.to_string(),
        });

        let mut child = match command.to_command(&working_dir).spawn() {
            Ok(child) => child,
            Err(e) => {
                let error = ExecutionError::Spawn {
                    program: command.shell_invocation().0.to_string(),
                    message: e.to_string(),
                };
                tracing::error!(execution_id = %execution_id, "{error}");
                let _ = events.send(ExecutionEvent::Error {
                    execution_id: execution_id.clone(),
                    message: error.to_string(),
                });
                return execution_id;
            }
        };

        let (kill_tx, kill_rx) = oneshot::channel();
        self.executions
            .lock()
            .await
            .insert(execution_id.clone(), kill_tx);

        let relays: Vec<_> = [
            child.stdout.take().map(|pipe| {
                spawn_relay(pipe, LogStream::Stdout, &execution_id, &events, &self.clock)
            }),
            child.stderr.take().map(|pipe| {
                spawn_relay(pipe, LogStream::Stderr, &execution_id, &events, &self.clock)
            }),
        ]
        .into_iter()
        .flatten()
        .collect();

        let executions = Arc::clone(&self.executions);
        let id = execution_id.clone();
        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                _ = kill_rx => {
                    tracing::info!(execution_id = %id, "killing engine");
                    if let Err(e) = child.start_kill() {
                        tracing::warn!(execution_id = %id, "kill failed: {e}");
                    }
                    child.wait().await
                }
            };

            for relay in relays {
                let _ = relay.await;
            }
            executions.lock().await.remove(&id);

            let event = match status {
                Ok(status) => {
                    tracing::info!(execution_id = %id, exit_code = ?status.code(), "engine exited");
                    ExecutionEvent::Complete {
                        execution_id: id,
                        exit_code: status.code(),
                        success: status.success(),
                    }
                }
                Err(e) => {
                    tracing::error!(execution_id = %id, "waiting on engine failed: {e}");
                    ExecutionEvent::Error {
                        execution_id: id,
                        message: e.to_string(),
                    }
                }
            };
            let _ = events.send(event);
        });

        execution_id
    }

    /// Sends the kill signal to a run. Returns false if the id is unknown.
    pub async fn stop(&self, execution_id: &ExecutionId) -> bool {
        let Some(kill) = self.executions.lock().await.remove(execution_id) else {
            return false;
        };
        tracing::info!(execution_id = %execution_id, "stop requested");
        let _ = kill.send(());
        true
    }

    /// Kills every tracked run.
    pub async fn shutdown(&self) {
        let drained: Vec<_> = self.executions.lock().await.drain().collect();
        if !drained.is_empty() {
            tracing::info!(count = drained.len(), "stopping running executions");
        }
        for (_, kill) in drained {
            let _ = kill.send(());
        }
    }

    /// Ids of the runs still tracked.
    pub async fn running(&self) -> Vec<ExecutionId> {
        let mut ids: Vec<_> = self.executions.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Runs the engine's version query and returns its trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits unsuccessfully.
    pub async fn version(&self) -> Result<String, ExecutionError> {
        let command = EngineCommand::version(&self.settings);
        let working_dir = resolve_working_dir(None).await;
        let output = command
            .to_command(&working_dir)
            .output()
            .await
            .map_err(|e| ExecutionError::Spawn {
                program: command.shell_invocation().0.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ExecutionError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn spawn_relay<R>(
    pipe: R,
    stream: LogStream,
    execution_id: &ExecutionId,
    events: &EventSender,
    clock: &Arc<dyn Clock>,
) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let execution_id = execution_id.clone();
    let events = events.clone();
    let clock = Arc::clone(clock);
    tokio::spawn(relay(pipe, stream, execution_id, events, clock))
}

/// Forwards every read chunk as one `Log` event.
async fn relay<R>(
    mut pipe: R,
    stream: LogStream,
    execution_id: ExecutionId,
    events: EventSender,
    clock: Arc<dyn Clock>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let message = String::from_utf8_lossy(&buf[..n]).into_owned();
                let entry = LogEntry::new(message, stream, clock.now());
                let _ = events.send(ExecutionEvent::Log {
                    execution_id: execution_id.clone(),
                    entry,
                });
            }
            Err(e) => {
                tracing::warn!(execution_id = %execution_id, ?stream, "read failed: {e}");
                break;
            }
        }
    }
}
