//! Workspaces, folders, saved requests and open tabs

use std::sync::Arc;

use flowdeck_domain::{ApiRequest, Folder, Workspace};
use serde::{Deserialize, Serialize};

use crate::error::{ApplicationError, ApplicationResult};
use super::load_or_default;
use crate::ports::{Clock, KeyValueStore, keys, save_json};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedWorkspaces {
    #[serde(default)]
    workspaces: Vec<Workspace>,
    #[serde(default)]
    active_workspace_id: Option<String>,
    #[serde(default)]
    open_tabs: Vec<String>,
    #[serde(default)]
    active_tab_id: Option<String>,
}

/// Owns the saved workspaces and the editor tabs opened on their requests.
pub struct WorkspaceStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    state: PersistedWorkspaces,
}

impl WorkspaceStore {
    /// Loads the persisted workspaces.
    ///
    /// Missing or unreadable state yields an empty store.
    pub async fn load(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let mut state: PersistedWorkspaces = load_or_default(storage.as_ref(), keys::WORKSPACES).await;

        if let Some(id) = &state.active_workspace_id
            && !state.workspaces.iter().any(|w| w.id == *id)
        {
            state.active_workspace_id = None;
        }
        let known: Vec<String> = state
            .workspaces
            .iter()
            .flat_map(|w| w.requests.iter().map(|r| r.id.clone()))
            .collect();
        state.open_tabs.retain(|id| known.contains(id));
        if let Some(tab) = &state.active_tab_id
            && !state.open_tabs.contains(tab)
        {
            state.active_tab_id = state.open_tabs.first().cloned();
        }

        Self { storage, clock, state }
    }

    /// All workspaces.
    #[must_use]
    pub fn workspaces(&self) -> &[Workspace] {
        &self.state.workspaces
    }

    /// Looks up a workspace.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Workspace> {
        self.state.workspaces.iter().find(|w| w.id == id)
    }

    /// The active workspace, if any.
    #[must_use]
    pub fn active(&self) -> Option<&Workspace> {
        self.state.active_workspace_id.as_deref().and_then(|id| self.get(id))
    }

    /// Ids of requests open as tabs, in tab order.
    #[must_use]
    pub fn open_tabs(&self) -> &[String] {
        &self.state.open_tabs
    }

    /// The request shown in the active tab.
    #[must_use]
    pub fn active_tab(&self) -> Option<&ApiRequest> {
        let id = self.state.active_tab_id.as_deref()?;
        self.find_request(id)
    }

    /// Finds a request in any workspace.
    #[must_use]
    pub fn find_request(&self, id: &str) -> Option<&ApiRequest> {
        self.state.workspaces.iter().find_map(|w| w.request(id))
    }

    /// Creates a workspace. The first workspace becomes active.
    ///
    /// # Errors
    /// Returns an error if the name is blank or persisting fails.
    pub async fn create(&mut self, name: &str) -> ApplicationResult<Workspace> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApplicationError::InvalidRequest("workspace name must not be empty".to_string()));
        }
        let workspace = Workspace::new(name, self.clock.now());
        let previous = self.state.clone();
        if self.state.active_workspace_id.is_none() {
            self.state.active_workspace_id = Some(workspace.id.clone());
        }
        self.state.workspaces.push(workspace.clone());
        self.commit(previous).await?;
        Ok(workspace)
    }

    /// Inserts a workspace or replaces the one with the same id.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub async fn save(&mut self, mut workspace: Workspace) -> ApplicationResult<()> {
        workspace.updated_at = self.clock.now();
        let previous = self.state.clone();
        match self.state.workspaces.iter_mut().find(|w| w.id == workspace.id) {
            Some(existing) => *existing = workspace,
            None => self.state.workspaces.push(workspace),
        }
        self.prune_tabs();
        self.commit(previous).await
    }

    /// Deletes a workspace and closes tabs on its requests.
    ///
    /// # Errors
    /// Returns an error if the workspace does not exist or persisting fails.
    pub async fn delete(&mut self, id: &str) -> ApplicationResult<()> {
        let index = self
            .state
            .workspaces
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| not_found("workspace", id))?;
        let previous = self.state.clone();
        self.state.workspaces.remove(index);
        if self.state.active_workspace_id.as_deref() == Some(id) {
            self.state.active_workspace_id = None;
        }
        self.prune_tabs();
        self.commit(previous).await
    }

    /// Makes a workspace active.
    ///
    /// # Errors
    /// Returns an error if the workspace does not exist or persisting fails.
    pub async fn activate(&mut self, id: &str) -> ApplicationResult<()> {
        if self.get(id).is_none() {
            return Err(not_found("workspace", id));
        }
        let previous = self.state.clone();
        self.state.active_workspace_id = Some(id.to_string());
        self.commit(previous).await
    }

    /// Adds a folder to a workspace.
    ///
    /// # Errors
    /// Returns an error if the workspace does not exist or persisting fails.
    pub async fn add_folder(&mut self, workspace_id: &str, name: &str) -> ApplicationResult<Folder> {
        let now = self.clock.now();
        let previous = self.state.clone();
        let workspace = self.get_mut(workspace_id)?;
        let folder = Folder::new(name.trim());
        workspace.folders.push(folder.clone());
        workspace.updated_at = now;
        self.commit(previous).await?;
        Ok(folder)
    }

    /// Saves a request into a workspace, optionally filing it in a folder.
    /// An existing request with the same id is updated in place.
    ///
    /// # Errors
    /// Returns an error if the workspace or folder does not exist or
    /// persisting fails.
    pub async fn save_request(
        &mut self,
        workspace_id: &str,
        request: ApiRequest,
        folder_id: Option<&str>,
    ) -> ApplicationResult<()> {
        let now = self.clock.now();
        let previous = self.state.clone();
        let workspace = self.get_mut(workspace_id)?;
        if let Some(existing) = workspace.request_mut(&request.id) {
            *existing = request;
        } else if !workspace.add_request(request, folder_id) {
            return Err(not_found("folder", folder_id.unwrap_or_default()));
        }
        workspace.updated_at = now;
        self.commit(previous).await
    }

    /// Removes a request and closes its tab.
    ///
    /// # Errors
    /// Returns an error if the request does not exist or persisting fails.
    pub async fn remove_request(&mut self, workspace_id: &str, request_id: &str) -> ApplicationResult<ApiRequest> {
        let now = self.clock.now();
        let previous = self.state.clone();
        let workspace = self.get_mut(workspace_id)?;
        let removed = workspace
            .remove_request(request_id)
            .ok_or_else(|| not_found("request", request_id))?;
        workspace.updated_at = now;
        self.prune_tabs();
        self.commit(previous).await?;
        Ok(removed)
    }

    /// Opens a request in a tab and focuses it.
    ///
    /// # Errors
    /// Returns an error if the request does not exist or persisting fails.
    pub async fn open_tab(&mut self, request_id: &str) -> ApplicationResult<()> {
        if self.find_request(request_id).is_none() {
            return Err(not_found("request", request_id));
        }
        let previous = self.state.clone();
        if !self.state.open_tabs.iter().any(|t| t == request_id) {
            self.state.open_tabs.push(request_id.to_string());
        }
        self.state.active_tab_id = Some(request_id.to_string());
        self.commit(previous).await
    }

    /// Closes a tab. Focus moves to the neighbouring tab.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub async fn close_tab(&mut self, request_id: &str) -> ApplicationResult<()> {
        let Some(index) = self.state.open_tabs.iter().position(|t| t == request_id) else {
            return Ok(());
        };
        let previous = self.state.clone();
        self.state.open_tabs.remove(index);
        if self.state.active_tab_id.as_deref() == Some(request_id) {
            let next = index.min(self.state.open_tabs.len().saturating_sub(1));
            self.state.active_tab_id = self.state.open_tabs.get(next).cloned();
        }
        self.commit(previous).await
    }

    fn prune_tabs(&mut self) {
        let workspaces = &self.state.workspaces;
        self.state
            .open_tabs
            .retain(|id| workspaces.iter().any(|w| w.request(id).is_some()));
        if let Some(active) = &self.state.active_tab_id
            && !self.state.open_tabs.contains(active)
        {
            self.state.active_tab_id = self.state.open_tabs.last().cloned();
        }
    }

    fn get_mut(&mut self, id: &str) -> ApplicationResult<&mut Workspace> {
        self.state
            .workspaces
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| not_found("workspace", id))
    }

    async fn commit(&mut self, previous: PersistedWorkspaces) -> ApplicationResult<()> {
        if let Err(e) = save_json(self.storage.as_ref(), keys::WORKSPACES, &self.state).await {
            self.state = previous;
            return Err(e.into());
        }
        Ok(())
    }
}

fn not_found(kind: &str, id: &str) -> ApplicationError {
    ApplicationError::NotFound(format!("{kind} {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedClock, MemoryStore};
    use flowdeck_domain::HttpMethod;
    use pretty_assertions::assert_eq;

    async fn store() -> (WorkspaceStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::default());
        let store = WorkspaceStore::load(storage.clone(), Arc::new(FixedClock::at(2026, 1, 15)))
            .await;
        (store, storage)
    }

    #[tokio::test]
    async fn test_first_workspace_becomes_active() {
        let (mut store, _) = store().await;
        let first = store.create("Personal").await.expect("create");
        store.create("Team").await.expect("create");

        assert_eq!(store.active().map(|w| w.id.clone()), Some(first.id));
        assert_eq!(store.workspaces().len(), 2);
    }

    #[tokio::test]
    async fn test_save_request_into_folder_and_reload() {
        let (mut store, storage) = store().await;
        let workspace = store.create("Personal").await.expect("create");
        let folder = store.add_folder(&workspace.id, "Users").await.expect("folder");
        let request = ApiRequest::with_url("List users", HttpMethod::Get, "{{baseUrl}}/users");
        let request_id = request.id.clone();

        store
            .save_request(&workspace.id, request, Some(&folder.id))
            .await
            .expect("save request");
        store.open_tab(&request_id).await.expect("open tab");

        let reloaded = WorkspaceStore::load(storage, Arc::new(FixedClock::at(2026, 1, 16)))
            .await;
        let saved = reloaded.get(&workspace.id).expect("workspace");
        assert_eq!(saved.folders[0].request_ids, vec![request_id.clone()]);
        assert_eq!(reloaded.active_tab().map(|r| r.name.as_str()), Some("List users"));
    }

    #[tokio::test]
    async fn test_save_request_unknown_folder_fails() {
        let (mut store, _) = store().await;
        let workspace = store.create("Personal").await.expect("create");
        let result = store
            .save_request(&workspace.id, ApiRequest::new("Orphan"), Some("nope"))
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_removing_request_closes_its_tab() {
        let (mut store, _) = store().await;
        let workspace = store.create("Personal").await.expect("create");
        let a = ApiRequest::with_url("A", HttpMethod::Get, "https://a.test");
        let b = ApiRequest::with_url("B", HttpMethod::Get, "https://b.test");
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.save_request(&workspace.id, a, None).await.expect("save");
        store.save_request(&workspace.id, b, None).await.expect("save");
        store.open_tab(&a_id).await.expect("open");
        store.open_tab(&b_id).await.expect("open");

        store.remove_request(&workspace.id, &b_id).await.expect("remove");
        assert_eq!(store.open_tabs(), [a_id.clone()]);
        assert_eq!(store.active_tab().map(|r| r.id.clone()), Some(a_id));
    }

    #[tokio::test]
    async fn test_close_tab_focuses_neighbour() {
        let (mut store, _) = store().await;
        let workspace = store.create("Personal").await.expect("create");
        let mut ids = Vec::new();
        for name in ["A", "B", "C"] {
            let request = ApiRequest::with_url(name, HttpMethod::Get, "https://x.test");
            ids.push(request.id.clone());
            store.save_request(&workspace.id, request, None).await.expect("save");
            store.open_tab(ids.last().expect("id")).await.expect("open");
        }
        store.open_tab(&ids[1]).await.expect("focus");

        store.close_tab(&ids[1]).await.expect("close");
        assert_eq!(store.open_tabs().len(), 2);
        assert_eq!(store.active_tab().map(|r| r.name.as_str()), Some("C"));
    }

    #[tokio::test]
    async fn test_unreadable_state_starts_empty() {
        let storage = Arc::new(MemoryStore::default());
        storage.seed(keys::WORKSPACES, serde_json::json!({"workspaces": "oops"}));

        let store = WorkspaceStore::load(storage, Arc::new(FixedClock::at(2026, 1, 15))).await;
        assert!(store.workspaces().is_empty());
        assert!(store.active().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let (mut store, storage) = store().await;
        let workspace = store.create("Personal").await.expect("create");

        storage.fail_writes();
        assert!(matches!(store.create("Team").await, Err(ApplicationError::Storage(_))));
        assert!(store.delete(&workspace.id).await.is_err());
        assert!(store.add_folder(&workspace.id, "Users").await.is_err());
        assert!(store
            .save_request(&workspace.id, ApiRequest::new("Unsaved"), None)
            .await
            .is_err());

        assert_eq!(store.workspaces().len(), 1);
        let kept = store.get(&workspace.id).expect("workspace");
        assert!(kept.folders.is_empty());
        assert!(kept.requests.is_empty());
        assert_eq!(store.active().map(|w| w.id.clone()), Some(workspace.id));
    }
}
