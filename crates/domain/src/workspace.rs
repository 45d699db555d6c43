//! Workspaces: named containers of folders and requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generate_id;
use crate::request::ApiRequest;

/// A folder grouping requests of a workspace by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique identifier
    pub id: String,
    /// Folder name
    pub name: String,
    /// Requests in this folder, in display order
    #[serde(default)]
    pub request_ids: Vec<String>,
}

impl Folder {
    /// Creates a new empty folder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            request_ids: Vec::new(),
        }
    }
}

/// A named container of folders and requests, like a Postman collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique identifier
    pub id: String,
    /// Workspace name
    pub name: String,
    /// Folders
    #[serde(default)]
    pub folders: Vec<Folder>,
    /// Every request of the workspace, foldered or not
    #[serde(default)]
    pub requests: Vec<ApiRequest>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Creates an empty workspace.
    #[must_use]
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            folders: Vec::new(),
            requests: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Looks up a request.
    #[must_use]
    pub fn request(&self, id: &str) -> Option<&ApiRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Looks up a request for editing.
    pub fn request_mut(&mut self, id: &str) -> Option<&mut ApiRequest> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    /// Looks up a folder for editing.
    pub fn folder_mut(&mut self, id: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.id == id)
    }

    /// Adds a request, optionally inside a folder. Returns false when the
    /// folder does not exist; the request is then not added.
    pub fn add_request(&mut self, request: ApiRequest, folder_id: Option<&str>) -> bool {
        if let Some(folder_id) = folder_id {
            let Some(folder) = self.folders.iter_mut().find(|f| f.id == folder_id) else {
                return false;
            };
            folder.request_ids.push(request.id.clone());
        }
        self.requests.push(request);
        true
    }

    /// Removes a request and its folder references.
    pub fn remove_request(&mut self, id: &str) -> Option<ApiRequest> {
        let index = self.requests.iter().position(|r| r.id == id)?;
        for folder in &mut self.folders {
            folder.request_ids.retain(|rid| rid != id);
        }
        Some(self.requests.remove(index))
    }

    /// Removes a folder. Its requests stay in the workspace, unfoldered.
    pub fn remove_folder(&mut self, id: &str) -> Option<Folder> {
        let index = self.folders.iter().position(|f| f.id == id)?;
        Some(self.folders.remove(index))
    }

    /// Requests that are in no folder, in insertion order.
    pub fn loose_requests(&self) -> impl Iterator<Item = &ApiRequest> {
        self.requests.iter().filter(|r| {
            !self
                .folders
                .iter()
                .any(|f| f.request_ids.iter().any(|id| *id == r.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_requests() {
        let mut workspace = Workspace::new("Shop", Utc::now());
        let folder = Folder::new("Orders");
        let folder_id = folder.id.clone();
        workspace.folders.push(folder);

        let foldered = ApiRequest::new("List orders");
        let foldered_id = foldered.id.clone();
        assert!(workspace.add_request(foldered, Some(&folder_id)));
        assert!(workspace.add_request(ApiRequest::new("Health"), None));
        assert!(!workspace.add_request(ApiRequest::new("Lost"), Some("missing")));

        assert_eq!(workspace.requests.len(), 2);
        assert_eq!(workspace.loose_requests().count(), 1);

        workspace.remove_request(&foldered_id);
        assert!(workspace.folders[0].request_ids.is_empty());
        assert_eq!(workspace.requests.len(), 1);
    }

    #[test]
    fn test_remove_folder_keeps_requests() {
        let mut workspace = Workspace::new("Shop", Utc::now());
        let folder = Folder::new("Orders");
        let folder_id = folder.id.clone();
        workspace.folders.push(folder);
        workspace.add_request(ApiRequest::new("List"), Some(&folder_id));

        assert!(workspace.remove_folder(&folder_id).is_some());
        assert_eq!(workspace.loose_requests().count(), 1);
    }
}
