//! Save test suite use case.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{FileSystem, SuiteConverter};

/// Longest file name most file systems accept.
pub const MAX_FILE_NAME_LEN: usize = 255;

const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
const DEFAULT_FILE_NAME: &str = "test-suite";

/// Input for saving a test suite.
#[derive(Debug, Clone)]
pub struct SaveTestSuiteInput {
    /// Directory to write into.
    pub directory: PathBuf,
    /// Requested file name, sanitized before use.
    pub file_name: String,
    /// Suite as YAML text.
    pub content: String,
}

/// Validates a suite and writes it as a YAML file.
pub struct SaveTestSuite<F: FileSystem> {
    fs: F,
    converter: Arc<dyn SuiteConverter>,
}

impl<F: FileSystem> SaveTestSuite<F> {
    /// Creates a new `SaveTestSuite` use case.
    pub fn new(fs: F, converter: Arc<dyn SuiteConverter>) -> Self {
        Self { fs, converter }
    }

    /// Writes the suite and returns the path written.
    ///
    /// # Errors
    /// Returns [`ApplicationError::InvalidSuite`] with every validation error
    /// when the content is not a valid suite, or a file system error.
    pub async fn execute(&self, input: SaveTestSuiteInput) -> ApplicationResult<PathBuf> {
        let validation = self.converter.validate(&input.content);
        if !validation.valid {
            return Err(ApplicationError::InvalidSuite(validation.errors));
        }
        for warning in &validation.warnings {
            tracing::warn!(%warning, "saving suite with warning");
        }

        let path = input.directory.join(sanitize_file_name(&input.file_name));
        self.write(&path, &input.content).await?;
        tracing::info!(path = %path.display(), "test suite saved");
        Ok(path)
    }

    async fn write(&self, path: &Path, content: &str) -> ApplicationResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            self.fs.create_dir_all(parent).await?;
        }
        self.fs.write_file(path, content.as_bytes()).await?;
        Ok(())
    }
}

/// Makes a user-supplied name safe to use as a single path component.
///
/// Strips `/\:*?"<>|`, collapses runs of dots, appends `.yaml` unless the
/// name already ends in `.yaml` or `.yml`, and truncates to 255 characters
/// while keeping the extension.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| !FORBIDDEN_CHARS.contains(c)).collect();

    let mut collapsed = String::with_capacity(stripped.len());
    for c in stripped.trim().chars() {
        if c == '.' && collapsed.ends_with('.') {
            continue;
        }
        collapsed.push(c);
    }

    let lower = collapsed.to_ascii_lowercase();
    let (stem, extension) = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let dot = collapsed.rfind('.').unwrap_or(collapsed.len());
        (collapsed[..dot].to_string(), collapsed[dot..].to_string())
    } else {
        (collapsed.trim_end_matches('.').to_string(), ".yaml".to_string())
    };

    let stem = stem.trim_start_matches('.').trim();
    let stem = if stem.is_empty() { DEFAULT_FILE_NAME } else { stem };
    let budget = MAX_FILE_NAME_LEN - extension.chars().count();
    let stem: String = stem.chars().take(budget).collect();

    format!("{stem}{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::ports::FileSystemError;
    use crate::testing::JsonSuiteConverter;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingFileSystem {
        files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    }

    impl FileSystem for &RecordingFileSystem {
        async fn read_file_string(&self, path: &Path) -> Result<String, FileSystemError> {
            let files = self.files.lock().expect("lock");
            let bytes = files
                .get(path)
                .ok_or_else(|| FileSystemError::NotFound(path.to_path_buf()))?;
            String::from_utf8(bytes.clone()).map_err(|_| FileSystemError::InvalidUtf8(path.to_path_buf()))
        }

        async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
            self.files
                .lock()
                .expect("lock")
                .insert(path.to_path_buf(), contents.to_vec());
            Ok(())
        }

        async fn create_dir_all(&self, _path: &Path) -> Result<(), FileSystemError> {
            Ok(())
        }

        async fn exists(&self, path: &Path) -> bool {
            self.files.lock().expect("lock").contains_key(path)
        }

        async fn is_dir(&self, _path: &Path) -> bool {
            false
        }

        async fn remove_file(&self, path: &Path) -> Result<(), FileSystemError> {
            self.files.lock().expect("lock").remove(path);
            Ok(())
        }
    }

    const VALID: &str = r#"{"node_id": "users-api", "suite_name": "Users API",
        "steps": [{"name": "List", "request": {"method": "GET", "url": "/users"}}]}"#;

    #[test]
    fn test_sanitize_strips_forbidden_characters() {
        assert_eq!(sanitize_file_name(r#"my:suite*?"<>|"#), "mysuite.yaml");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "etcpasswd.yaml");
        assert_eq!(sanitize_file_name("a..b.yml"), "a.b.yml");
    }

    #[test]
    fn test_sanitize_defaults() {
        assert_eq!(sanitize_file_name(""), "test-suite.yaml");
        assert_eq!(sanitize_file_name("///"), "test-suite.yaml");
        assert_eq!(sanitize_file_name("Users.YAML"), "Users.YAML");
    }

    #[test]
    fn test_sanitize_truncates_keeping_extension() {
        let name = sanitize_file_name(&"x".repeat(400));
        assert_eq!(name.chars().count(), MAX_FILE_NAME_LEN);
        assert!(name.ends_with(".yaml"));
    }

    #[tokio::test]
    async fn test_save_writes_sanitized_file() {
        let fs = RecordingFileSystem::default();
        let use_case = SaveTestSuite::new(&fs, Arc::new(JsonSuiteConverter));

        let path = use_case
            .execute(SaveTestSuiteInput {
                directory: PathBuf::from("/suites"),
                file_name: "users/api".into(),
                content: VALID.into(),
            })
            .await
            .expect("save");

        assert_eq!(path, PathBuf::from("/suites/usersapi.yaml"));
        assert_eq!((&fs).read_file_string(&path).await.expect("read"), VALID);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_suite() {
        let fs = RecordingFileSystem::default();
        let use_case = SaveTestSuite::new(&fs, Arc::new(JsonSuiteConverter));

        let result = use_case
            .execute(SaveTestSuiteInput {
                directory: PathBuf::from("/suites"),
                file_name: "bad".into(),
                content: r#"{"node_id": "Test", "suite_name": ""}"#.into(),
            })
            .await;

        let errors = match result {
            Err(ApplicationError::InvalidSuite(errors)) => errors,
            other => panic!("expected InvalidSuite, got {other:?}"),
        };
        assert!(errors.iter().any(|e| e.contains("suite_name")));
        assert!(errors.iter().any(|e| e.contains("node_id")));
        assert!(fs.files.lock().expect("lock").is_empty());
    }
}
