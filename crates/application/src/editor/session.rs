//! The suite being edited, in whichever view is showing

use std::sync::Arc;

use flowdeck_domain::AutoSaveSnapshot;
use flowdeck_domain::suite::{EditorMode, SuiteValidation, TestSuiteFormData, WizardState};

use super::AutoSaveScheduler;
use crate::ports::{ConversionError, SuiteConverter};

/// Editing state for one test suite.
///
/// Only the representation of the current mode is authoritative; the others
/// are refreshed when the mode changes. A failed conversion leaves every
/// field as it was.
pub struct EditorSession {
    converter: Arc<dyn SuiteConverter>,
    autosave: Option<Arc<AutoSaveScheduler>>,
    mode: EditorMode,
    wizard: WizardState,
    form: TestSuiteFormData,
    yaml: String,
    dirty: bool,
}

impl EditorSession {
    /// Creates an empty session in form mode.
    pub fn new(converter: Arc<dyn SuiteConverter>) -> Self {
        Self {
            converter,
            autosave: None,
            mode: EditorMode::default(),
            wizard: WizardState::default(),
            form: TestSuiteFormData::default(),
            yaml: String::new(),
            dirty: false,
        }
    }

    /// Enables background saves of every edit.
    #[must_use]
    pub fn with_autosave(mut self, autosave: Arc<AutoSaveScheduler>) -> Self {
        self.autosave = Some(autosave);
        self
    }

    /// Opens YAML text in the given mode.
    ///
    /// # Errors
    /// Returns an error if the text cannot be converted to `mode`.
    pub fn open(
        converter: Arc<dyn SuiteConverter>,
        mode: EditorMode,
        yaml: &str,
    ) -> Result<Self, ConversionError> {
        let mut session = Self::new(converter);
        session.load_yaml(mode, yaml)?;
        Ok(session)
    }

    /// Reopens an auto-saved snapshot.
    ///
    /// # Errors
    /// Returns an error if the saved text no longer converts.
    pub fn restore(
        converter: Arc<dyn SuiteConverter>,
        snapshot: &AutoSaveSnapshot,
    ) -> Result<Self, ConversionError> {
        let mut session = Self::open(converter, snapshot.mode, &snapshot.yaml_content)?;
        session.dirty = true;
        Ok(session)
    }

    /// The current mode.
    #[must_use]
    pub const fn mode(&self) -> EditorMode {
        self.mode
    }

    /// The wizard view.
    #[must_use]
    pub const fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    /// The form view.
    #[must_use]
    pub const fn form(&self) -> &TestSuiteFormData {
        &self.form
    }

    /// The YAML view.
    #[must_use]
    pub fn yaml(&self) -> &str {
        &self.yaml
    }

    /// Whether there are edits not yet written to a file.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces the wizard state.
    pub fn edit_wizard(&mut self, wizard: WizardState) {
        self.wizard = wizard;
        self.touch(EditorMode::Wizard);
    }

    /// Replaces the form state.
    pub fn edit_form(&mut self, form: TestSuiteFormData) {
        self.form = form;
        self.touch(EditorMode::Form);
    }

    /// Replaces the YAML text.
    pub fn edit_yaml(&mut self, yaml: impl Into<String>) {
        self.yaml = yaml.into();
        self.touch(EditorMode::Yaml);
    }

    /// Serializes the authoritative representation.
    ///
    /// # Errors
    /// Returns an error if the current state cannot be serialized.
    pub fn current_yaml(&self) -> Result<String, ConversionError> {
        match self.mode {
            EditorMode::Wizard => self.converter.wizard_to_yaml(&self.wizard),
            EditorMode::Form => self.converter.form_to_yaml(&self.form),
            EditorMode::Yaml => Ok(self.yaml.clone()),
        }
    }

    /// Validates the authoritative representation.
    #[must_use]
    pub fn validate(&self) -> SuiteValidation {
        match self.current_yaml() {
            Ok(yaml) => self.converter.validate(&yaml),
            Err(e) => SuiteValidation::failed(e.to_string()),
        }
    }

    /// Switches to another view, converting the current contents.
    ///
    /// # Errors
    /// Returns the conversion error; the session is left unchanged.
    pub fn switch_mode(&mut self, target: EditorMode) -> Result<(), ConversionError> {
        let from = self.mode;
        if target == from {
            return Ok(());
        }

        let result = match (from, target) {
            // Wizard and form share no text, convert directly.
            (EditorMode::Wizard, EditorMode::Form) => {
                self.form = TestSuiteFormData::from_wizard(&self.wizard);
                Ok(())
            }
            (EditorMode::Form, EditorMode::Wizard) => {
                self.wizard = self.form.to_wizard();
                Ok(())
            }
            _ => self.current_yaml().and_then(|yaml| self.load_yaml(target, &yaml)),
        };

        match result {
            Ok(()) => {
                tracing::debug!(%from, to = %target, "editor mode switched");
                self.mode = target;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%from, to = %target, error = %e, "editor mode switch failed");
                Err(e)
            }
        }
    }

    /// Marks the contents as written to a file.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    fn load_yaml(&mut self, mode: EditorMode, yaml: &str) -> Result<(), ConversionError> {
        match mode {
            EditorMode::Wizard => self.wizard = self.converter.yaml_to_wizard(yaml)?,
            EditorMode::Form => self.form = self.converter.yaml_to_form(yaml)?,
            EditorMode::Yaml => yaml.clone_into(&mut self.yaml),
        }
        self.mode = mode;
        Ok(())
    }

    fn suite_name(&self) -> String {
        match self.mode {
            EditorMode::Wizard => self.wizard.suite_name.clone(),
            EditorMode::Form => self.form.suite_name.clone(),
            EditorMode::Yaml => self
                .converter
                .yaml_to_form(&self.yaml)
                .map(|form| form.suite_name)
                .unwrap_or_default(),
        }
    }

    fn touch(&mut self, mode: EditorMode) {
        self.mode = mode;
        self.dirty = true;

        let Some(autosave) = &self.autosave else {
            return;
        };
        match self.current_yaml() {
            Ok(yaml) => autosave.schedule(self.mode, yaml, self.suite_name()),
            Err(e) => tracing::warn!(error = %e, "skipping auto-save"),
        }
    }
}
