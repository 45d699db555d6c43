//! Environments, the active environment and global variables

use std::sync::Arc;

use flowdeck_domain::environment::{
    Environment, EnvironmentVariable, GlobalVariables, ResolutionContext,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApplicationError, ApplicationResult};
use super::load_or_default;
use crate::ports::{KeyValueStore, keys, save_json};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedEnvironments {
    #[serde(default)]
    environments: Vec<Environment>,
    #[serde(default)]
    active_environment_id: Option<String>,
}

/// Owns every environment and the global variables.
///
/// At most one environment is active. Every mutation is written through to
/// the key/value store before it returns.
pub struct EnvironmentStore {
    storage: Arc<dyn KeyValueStore>,
    environments: Vec<Environment>,
    active_id: Option<String>,
    globals: GlobalVariables,
}

impl EnvironmentStore {
    /// Loads the persisted state.
    ///
    /// Missing or unreadable keys yield an empty store.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let persisted: PersistedEnvironments = load_or_default(storage.as_ref(), keys::ENVIRONMENTS).await;
        let globals: GlobalVariables = load_or_default(storage.as_ref(), keys::GLOBAL_VARIABLES).await;

        // A dangling active id is dropped rather than trusted.
        let active_id = persisted
            .active_environment_id
            .filter(|id| persisted.environments.iter().any(|e| e.id == *id));

        Self {
            storage,
            environments: persisted.environments,
            active_id,
            globals,
        }
    }

    /// All environments in creation order.
    #[must_use]
    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Looks up an environment.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.id == id)
    }

    /// The active environment, if any.
    #[must_use]
    pub fn active(&self) -> Option<&Environment> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// The global variables.
    #[must_use]
    pub const fn globals(&self) -> &GlobalVariables {
        &self.globals
    }

    /// Variables visible to interpolation right now.
    #[must_use]
    pub fn resolution_context(&self) -> ResolutionContext {
        ResolutionContext::from_sources(self.active(), &self.globals)
    }

    /// Creates an empty environment.
    ///
    /// # Errors
    /// Returns an error if the name is blank or persisting fails.
    pub async fn create(&mut self, name: &str) -> ApplicationResult<Environment> {
        let name = non_blank(name)?;
        let environment = Environment::new(name);
        let previous = self.snapshot();
        self.environments.push(environment.clone());
        self.commit_environments(previous).await?;
        Ok(environment)
    }

    /// Inserts an environment or replaces the one with the same id.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub async fn save(&mut self, environment: Environment) -> ApplicationResult<()> {
        let previous = self.snapshot();
        match self.environments.iter_mut().find(|e| e.id == environment.id) {
            Some(existing) => *existing = environment,
            None => self.environments.push(environment),
        }
        self.commit_environments(previous).await
    }

    /// Renames an environment.
    ///
    /// # Errors
    /// Returns an error if the environment does not exist, the name is blank
    /// or persisting fails.
    pub async fn rename(&mut self, id: &str, name: &str) -> ApplicationResult<()> {
        let name = non_blank(name)?;
        let previous = self.snapshot();
        self.get_mut(id)?.name = name.to_string();
        self.commit_environments(previous).await
    }

    /// Deletes an environment, deactivating it first if needed.
    ///
    /// # Errors
    /// Returns an error if the environment does not exist or persisting fails.
    pub async fn delete(&mut self, id: &str) -> ApplicationResult<()> {
        let index = self
            .environments
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| not_found(id))?;
        let previous = self.snapshot();
        self.environments.remove(index);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
        self.commit_environments(previous).await
    }

    /// Makes an environment active, or deactivates all with `None`.
    ///
    /// # Errors
    /// Returns an error if the environment does not exist or persisting fails.
    pub async fn activate(&mut self, id: Option<&str>) -> ApplicationResult<()> {
        if let Some(id) = id
            && self.get(id).is_none()
        {
            return Err(not_found(id));
        }
        let previous = self.snapshot();
        self.active_id = id.map(str::to_string);
        self.commit_environments(previous).await
    }

    /// Adds or replaces a variable of an environment.
    ///
    /// # Errors
    /// Returns an error if the environment does not exist, the key is blank
    /// or persisting fails.
    pub async fn upsert_variable(
        &mut self,
        environment_id: &str,
        variable: EnvironmentVariable,
    ) -> ApplicationResult<()> {
        non_blank(&variable.key)?;
        let previous = self.snapshot();
        self.get_mut(environment_id)?.set_variable(variable);
        self.commit_environments(previous).await
    }

    /// Removes a variable of an environment. Returns whether it existed.
    ///
    /// # Errors
    /// Returns an error if the environment does not exist or persisting fails.
    pub async fn remove_variable(&mut self, environment_id: &str, key: &str) -> ApplicationResult<bool> {
        let previous = self.snapshot();
        let removed = self.get_mut(environment_id)?.remove_variable(key);
        if removed {
            self.commit_environments(previous).await?;
        }
        Ok(removed)
    }

    /// Adds or replaces a global variable.
    ///
    /// # Errors
    /// Returns an error if the key is blank or persisting fails.
    pub async fn upsert_global(&mut self, variable: EnvironmentVariable) -> ApplicationResult<()> {
        non_blank(&variable.key)?;
        let previous = self.globals.clone();
        self.globals.set_variable(variable);
        self.commit_globals(previous).await
    }

    /// Replaces all global variables.
    ///
    /// # Errors
    /// Returns an error if a key is blank or persisting fails.
    pub async fn replace_globals(&mut self, globals: GlobalVariables) -> ApplicationResult<()> {
        for variable in &globals.variables {
            non_blank(&variable.key)?;
        }
        let previous = std::mem::replace(&mut self.globals, globals);
        self.commit_globals(previous).await
    }

    /// Removes a global variable. Returns whether it existed.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub async fn remove_global(&mut self, key: &str) -> ApplicationResult<bool> {
        let previous = self.globals.clone();
        let removed = self.globals.remove_variable(key);
        if removed {
            self.commit_globals(previous).await?;
        }
        Ok(removed)
    }

    fn get_mut(&mut self, id: &str) -> ApplicationResult<&mut Environment> {
        self.environments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn snapshot(&self) -> (Vec<Environment>, Option<String>) {
        (self.environments.clone(), self.active_id.clone())
    }

    async fn commit_environments(&mut self, previous: (Vec<Environment>, Option<String>)) -> ApplicationResult<()> {
        let persisted = PersistedEnvironments {
            environments: self.environments.clone(),
            active_environment_id: self.active_id.clone(),
        };
        if let Err(e) = save_json(self.storage.as_ref(), keys::ENVIRONMENTS, &persisted).await {
            (self.environments, self.active_id) = previous;
            return Err(e.into());
        }
        Ok(())
    }

    async fn commit_globals(&mut self, previous: GlobalVariables) -> ApplicationResult<()> {
        if let Err(e) = save_json(self.storage.as_ref(), keys::GLOBAL_VARIABLES, &self.globals).await {
            self.globals = previous;
            return Err(e.into());
        }
        Ok(())
    }
}

fn non_blank(value: &str) -> ApplicationResult<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(flowdeck_domain::DomainError::InvalidIdentifier("name must not be empty".to_string()).into());
    }
    Ok(trimmed)
}

fn not_found(id: &str) -> ApplicationError {
    ApplicationError::NotFound(format!("environment {id}"))
}
