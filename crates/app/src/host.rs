//! Channel dispatch.
//!
//! [`Host`] owns the stores, the HTTP client and the execution coordinator,
//! and turns each [`IpcRequest`] into an [`IpcResponse`]. Failures of a
//! channel are reported in-band as `{ "success": false, "error": ... }`;
//! only unknown channels and malformed parameters fail the response itself.

use std::path::PathBuf;
use std::sync::Arc;

use flowdeck_application::ports::{
    Clock, ConversionError, FileSystem, FileSystemError, HttpClientError, KeyValueStore,
    SuiteConverter,
};
use flowdeck_application::{
    ApplicationError, AutoSaveScheduler, EditorSession, EnvironmentStore, HistoryStore,
    SaveTestSuite, SaveTestSuiteInput, SendRequest, WorkspaceStore,
};
use flowdeck_domain::{
    ApiRequest, AppSettings, EditorMode, Environment, ExecutionEvent, ExecutionId,
    ExecutionOptions, GlobalVariables, TestSuiteFormData, WizardState, Workspace,
};
use flowdeck_infrastructure::conversion::{
    analyze_wizard_compatibility, form_to_yaml, wizard_to_yaml, yaml_to_form, yaml_to_wizard,
};
use flowdeck_infrastructure::{
    ExecutionCoordinator, ExecutionError, FileKeyValueStore, ReqwestHttpClient, SystemClock,
    TokioFileSystem, YamlSuiteConverter, resolve_data_dir, validate_test_suite_yaml,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

use crate::ipc::{IpcEvent, IpcRequest, IpcResponse, Outbound, error_response, ok_response};

/// Errors raised while handling a channel.
#[derive(Debug, Error)]
pub enum HostError {
    /// No handler for the channel.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// Parameters did not match the channel.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The channel needs a native dialog.
    #[error("{0} is not supported by the headless host")]
    Unsupported(String),

    /// Referenced execution is not running.
    #[error("Execution not found: {0}")]
    ExecutionNotFound(ExecutionId),

    /// Application layer error.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// File error.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// Suite conversion error.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Engine error.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// HTTP client construction error.
    #[error(transparent)]
    Http(#[from] HttpClientError),

    /// Result encoding error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

type HostResult<T> = Result<T, HostError>;

#[derive(Deserialize)]
struct FilePathParams {
    file_path: PathBuf,
}

#[derive(Deserialize)]
struct WriteFileParams {
    file_path: PathBuf,
    content: String,
}

#[derive(Deserialize)]
struct StopParams {
    execution_id: ExecutionId,
}

#[derive(Deserialize)]
struct ConvertParams {
    from: EditorMode,
    to: EditorMode,
    data: Value,
}

#[derive(Deserialize)]
struct SaveSuiteParams {
    directory: PathBuf,
    file_name: String,
    content: String,
}

#[derive(Deserialize)]
struct ContentParams {
    content: String,
}

#[derive(Deserialize)]
struct SendParams {
    request: ApiRequest,
}

#[derive(Deserialize)]
struct EnvironmentParams {
    environment: Environment,
}

#[derive(Deserialize)]
struct ActiveEnvironmentParams {
    #[serde(default)]
    environment_id: Option<String>,
}

#[derive(Deserialize)]
struct EnvironmentIdParams {
    environment_id: String,
}

#[derive(Deserialize)]
struct GlobalsParams {
    globals: GlobalVariables,
}

#[derive(Deserialize)]
struct WorkspaceIdParams {
    workspace_id: String,
}

#[derive(Deserialize)]
struct WorkspaceParams {
    workspace: Workspace,
}

#[derive(Deserialize)]
struct EditorOpenParams {
    mode: EditorMode,
    content: String,
}

#[derive(Deserialize)]
struct EditorEditParams {
    mode: EditorMode,
    data: Value,
}

#[derive(Deserialize)]
struct EditorModeParams {
    mode: EditorMode,
}

#[derive(Deserialize)]
struct AutoSaveParams {
    mode: EditorMode,
    yaml_content: String,
    #[serde(default)]
    test_suite_name: String,
}

/// Everything the channels operate on.
pub struct Host {
    coordinator: ExecutionCoordinator,
    execution_events: mpsc::UnboundedSender<ExecutionEvent>,
    fs: TokioFileSystem,
    save_suite: SaveTestSuite<TokioFileSystem>,
    send_request: SendRequest<ReqwestHttpClient>,
    converter: Arc<dyn SuiteConverter>,
    autosave: Arc<AutoSaveScheduler>,
    editor: Mutex<EditorSession>,
    environments: Mutex<EnvironmentStore>,
    workspaces: Mutex<WorkspaceStore>,
    history: Mutex<HistoryStore>,
}

impl Host {
    /// Loads the persisted state and starts relaying execution events to `outbound`.
    ///
    /// Unreadable persisted state is logged and replaced by empty stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub async fn open(
        settings: AppSettings,
        outbound: mpsc::UnboundedSender<Outbound>,
    ) -> HostResult<Self> {
        let data_dir = resolve_data_dir(&settings);
        tracing::info!(data_dir = %data_dir.display(), "opening stores");

        let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(data_dir));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let converter: Arc<dyn SuiteConverter> = Arc::new(YamlSuiteConverter);

        let http = ReqwestHttpClient::new(settings.request_timeout(), settings.follow_redirects)?;

        let environments = EnvironmentStore::load(Arc::clone(&storage)).await;
        let workspaces = WorkspaceStore::load(Arc::clone(&storage), Arc::clone(&clock)).await;
        let history = HistoryStore::load(Arc::clone(&storage), settings.history_limit).await;
        let autosave = Arc::new(AutoSaveScheduler::new(
            Arc::clone(&storage),
            Arc::clone(&clock),
            settings.autosave_delay(),
            settings.autosave_max_age(),
        ));
        let editor = EditorSession::new(Arc::clone(&converter)).with_autosave(Arc::clone(&autosave));

        let (execution_events, mut events_rx) = mpsc::unbounded_channel::<ExecutionEvent>();
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                if outbound.send(Outbound::Event(IpcEvent::from(&event))).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            coordinator: ExecutionCoordinator::new(settings, Arc::clone(&clock)),
            execution_events,
            fs: TokioFileSystem::new(),
            save_suite: SaveTestSuite::new(TokioFileSystem::new(), Arc::clone(&converter)),
            send_request: SendRequest::new(Arc::new(http), clock),
            converter,
            autosave,
            editor: Mutex::new(editor),
            environments: Mutex::new(environments),
            workspaces: Mutex::new(workspaces),
            history: Mutex::new(history),
        })
    }

    /// Handles one request.
    pub async fn dispatch(&self, request: IpcRequest) -> IpcResponse {
        let IpcRequest { id, channel, params } = request;
        tracing::debug!(id, %channel, "dispatching");

        match self.handle(&channel, params).await {
            Ok(result) => ok_response(id, &result),
            Err(e @ (HostError::UnknownChannel(_) | HostError::InvalidParams(_))) => {
                tracing::warn!(id, %channel, "rejected request: {e}");
                error_response(id, e.to_string())
            }
            Err(e) => {
                tracing::warn!(id, %channel, "channel failed: {e}");
                ok_response(id, &json!({ "success": false, "error": e.to_string() }))
            }
        }
    }

    /// Kills every running execution.
    pub async fn shutdown(&self) {
        self.coordinator.shutdown().await;
    }

    async fn handle(&self, channel: &str, params: Value) -> HostResult<Value> {
        match channel {
            "execute-flow-test" => self.execute_flow_test(parse(params)?).await,
            "stop-execution" => self.stop_execution(parse(params)?).await,
            "get-version" => {
                let version = self.coordinator.version().await?;
                Ok(json!({ "success": true, "version": version }))
            }
            "get-app-version" => Ok(json!({ "version": env!("CARGO_PKG_VERSION") })),
            "select-directory" | "select-file" => Err(HostError::Unsupported(channel.to_string())),
            "read-file" => {
                let p: FilePathParams = parse(params)?;
                let content = self.fs.read_file_string(&p.file_path).await?;
                Ok(json!({ "success": true, "content": content }))
            }
            "write-file" => {
                let p: WriteFileParams = parse(params)?;
                self.fs.write_file(&p.file_path, p.content.as_bytes()).await?;
                Ok(json!({ "success": true }))
            }
            "save-test-suite" => {
                let p: SaveSuiteParams = parse(params)?;
                let input = SaveTestSuiteInput {
                    directory: p.directory,
                    file_name: p.file_name,
                    content: p.content,
                };
                let path = self.save_suite.execute(input).await?;
                Ok(json!({ "success": true, "file_path": path }))
            }
            "convert-suite" => convert_suite(parse(params)?),
            "validate-suite" => {
                let p: ContentParams = parse(params)?;
                let validation = validate_test_suite_yaml(&p.content);
                Ok(json!({
                    "success": true,
                    "valid": validation.valid,
                    "errors": validation.errors,
                    "warnings": validation.warnings,
                }))
            }
            "send-request" => self.send(parse(params)?).await,
            "list-environments" => {
                let store = self.environments.lock().await;
                Ok(json!({
                    "success": true,
                    "environments": store.environments(),
                    "active_environment_id": store.active().map(|e| e.id.clone()),
                    "globals": store.globals(),
                }))
            }
            "save-environment" => {
                let p: EnvironmentParams = parse(params)?;
                self.environments.lock().await.save(p.environment).await?;
                Ok(json!({ "success": true }))
            }
            "set-active-environment" => {
                let p: ActiveEnvironmentParams = parse(params)?;
                self.environments
                    .lock()
                    .await
                    .activate(p.environment_id.as_deref())
                    .await?;
                Ok(json!({ "success": true }))
            }
            "delete-environment" => {
                let p: EnvironmentIdParams = parse(params)?;
                self.environments.lock().await.delete(&p.environment_id).await?;
                Ok(json!({ "success": true }))
            }
            "save-global-variables" => {
                let p: GlobalsParams = parse(params)?;
                self.environments.lock().await.replace_globals(p.globals).await?;
                Ok(json!({ "success": true }))
            }
            "get-history" => {
                let store = self.history.lock().await;
                let entries: Vec<_> = store.entries().collect();
                Ok(json!({ "success": true, "entries": entries }))
            }
            "clear-history" => {
                self.history.lock().await.clear().await?;
                Ok(json!({ "success": true }))
            }
            "list-workspaces" => {
                let store = self.workspaces.lock().await;
                Ok(json!({
                    "success": true,
                    "workspaces": store.workspaces(),
                    "active_workspace_id": store.active().map(|w| w.id.clone()),
                }))
            }
            "save-workspace" => {
                let p: WorkspaceParams = parse(params)?;
                self.workspaces.lock().await.save(p.workspace).await?;
                Ok(json!({ "success": true }))
            }
            "delete-workspace" => {
                let p: WorkspaceIdParams = parse(params)?;
                self.workspaces.lock().await.delete(&p.workspace_id).await?;
                Ok(json!({ "success": true }))
            }
            "editor-open" => {
                let p: EditorOpenParams = parse(params)?;
                let session = EditorSession::open(Arc::clone(&self.converter), p.mode, &p.content)?
                    .with_autosave(Arc::clone(&self.autosave));
                let mut editor = self.editor.lock().await;
                *editor = session;
                Ok(editor_state(&editor))
            }
            "editor-edit" => {
                let p: EditorEditParams = parse(params)?;
                let mut editor = self.editor.lock().await;
                match p.mode {
                    EditorMode::Wizard => editor.edit_wizard(parse::<WizardState>(p.data)?),
                    EditorMode::Form => editor.edit_form(parse::<TestSuiteFormData>(p.data)?),
                    EditorMode::Yaml => editor.edit_yaml(parse::<String>(p.data)?),
                }
                Ok(editor_state(&editor))
            }
            "editor-switch-mode" => {
                let p: EditorModeParams = parse(params)?;
                let mut editor = self.editor.lock().await;
                editor.switch_mode(p.mode)?;
                Ok(editor_state(&editor))
            }
            "editor-state" => Ok(editor_state(&*self.editor.lock().await)),
            "editor-mark-saved" => {
                let mut editor = self.editor.lock().await;
                editor.mark_saved();
                Ok(editor_state(&editor))
            }
            "autosave-suite" => {
                let p: AutoSaveParams = parse(params)?;
                self.autosave.schedule(p.mode, p.yaml_content, p.test_suite_name);
                Ok(json!({ "success": true }))
            }
            "restore-autosave" => {
                let snapshot = self.autosave.restore().await?;
                Ok(json!({ "success": true, "snapshot": snapshot }))
            }
            "clear-autosave" => {
                self.autosave.clear().await?;
                Ok(json!({ "success": true }))
            }
            other => Err(HostError::UnknownChannel(other.to_string())),
        }
    }

    async fn execute_flow_test(&self, options: ExecutionOptions) -> HostResult<Value> {
        let execution_id = self
            .coordinator
            .execute(&options, self.execution_events.clone())
            .await;
        Ok(json!({ "success": true, "execution_id": execution_id }))
    }

    async fn stop_execution(&self, params: StopParams) -> HostResult<Value> {
        if self.coordinator.stop(&params.execution_id).await {
            Ok(json!({ "success": true }))
        } else {
            Err(HostError::ExecutionNotFound(params.execution_id))
        }
    }

    async fn send(&self, params: SendParams) -> HostResult<Value> {
        let context = self.environments.lock().await.resolution_context();
        let output = self
            .send_request
            .execute(&params.request, &context, &self.history)
            .await?;

        Ok(json!({
            "success": true,
            "response": output.response,
            "resolved": output.resolved,
            "missing_variables": output.missing_variables,
            "history_entry_id": output.history_entry_id,
        }))
    }
}

fn editor_state(session: &EditorSession) -> Value {
    json!({
        "success": true,
        "mode": session.mode(),
        "wizard": session.wizard(),
        "form": session.form(),
        "yaml": session.yaml(),
        "dirty": session.is_dirty(),
        "validation": session.validate(),
    })
}

fn convert_suite(params: ConvertParams) -> HostResult<Value> {
    let yaml = match params.from {
        EditorMode::Yaml => parse::<String>(params.data)?,
        EditorMode::Wizard => wizard_to_yaml(&parse(params.data)?)?,
        EditorMode::Form => form_to_yaml(&parse(params.data)?)?,
    };

    let (data, warnings) = match params.to {
        EditorMode::Yaml => (Value::String(yaml), Vec::new()),
        EditorMode::Wizard => (
            serde_json::to_value(yaml_to_wizard(&yaml)?)?,
            analyze_wizard_compatibility(&yaml),
        ),
        EditorMode::Form => (serde_json::to_value(yaml_to_form(&yaml)?)?, Vec::new()),
    };

    Ok(json!({ "success": true, "data": data, "warnings": warnings }))
}

fn parse<T: DeserializeOwned>(params: Value) -> HostResult<T> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|e| HostError::InvalidParams(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_treats_null_as_empty_object() {
        let options: ExecutionOptions = parse(Value::Null).expect("parse");
        assert_eq!(options, ExecutionOptions::default());

        let missing = parse::<FilePathParams>(Value::Null);
        assert!(matches!(missing, Err(HostError::InvalidParams(_))));
    }

    #[test]
    fn test_convert_yaml_to_wizard_reports_losses() {
        let yaml = "node_id: login\nsuite_name: Login\ndepends:\n  - node_id: setup\nsteps: []\n";
        let result = convert_suite(ConvertParams {
            from: EditorMode::Yaml,
            to: EditorMode::Wizard,
            data: Value::String(yaml.to_string()),
        })
        .expect("convert");

        assert_eq!(result["success"], true);
        assert_eq!(result["data"]["node_id"], "login");
        let warnings = result["warnings"].as_array().expect("warnings");
        assert!(warnings.iter().any(|w| w["path"] == "depends"));
    }

    #[test]
    fn test_convert_rejects_malformed_yaml() {
        let result = convert_suite(ConvertParams {
            from: EditorMode::Yaml,
            to: EditorMode::Form,
            data: Value::String("suite_name: [unclosed".to_string()),
        });
        assert!(matches!(result, Err(HostError::Conversion(_))));
    }
}
