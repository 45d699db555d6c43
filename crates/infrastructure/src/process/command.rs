//! Command line of the external test engine

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use flowdeck_domain::{AppSettings, ExecutionOptions};
use tokio::process::Command;

/// A ready-to-spawn engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    program: String,
    args: Vec<String>,
}

impl EngineCommand {
    /// Builds `<program> [package] [suite] [--verbose] [--dry-run] [--priority <p>] [--tags <csv>]`.
    #[must_use]
    pub fn build(options: &ExecutionOptions, settings: &AppSettings) -> Self {
        let mut command = Self::base(settings);

        if let Some(suite) = non_blank(options.suite_file_path.as_deref()) {
            command.args.push(suite.to_string());
        }
        if options.verbose {
            command.args.push("--verbose".to_string());
        }
        if options.dry_run {
            command.args.push("--dry-run".to_string());
        }
        if let Some(priority) = non_blank(options.priority.as_deref()) {
            command.args.push("--priority".to_string());
            command.args.push(priority.to_string());
        }

        let tags: Vec<&str> = options
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            command.args.push("--tags".to_string());
            command.args.push(tags.join(","));
        }

        command
    }

    /// Builds the version query.
    #[must_use]
    pub fn version(settings: &AppSettings) -> Self {
        let mut command = Self::base(settings);
        command.args.extend(Self::version_args());
        command
    }

    /// Arguments of the version query.
    #[must_use]
    pub fn version_args() -> Vec<String> {
        vec!["--version".to_string()]
    }

    fn base(settings: &AppSettings) -> Self {
        let args = non_blank(Some(settings.engine_package.as_str()))
            .map(|p| vec![p.to_string()])
            .unwrap_or_default();
        Self {
            program: settings.engine_program.trim().to_string(),
            args,
        }
    }

    /// Program to spawn.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments after the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The command line as one shell string, each word quoted as needed.
    #[must_use]
    pub fn shell_line(&self) -> String {
        let quote = if cfg!(windows) { quote_cmd } else { quote_posix };
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|word| quote(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Shell program and arguments that run this command.
    ///
    /// POSIX shells `exec` the engine so that killing the child kills the
    /// engine itself. `cmd /C` resolves `npx.cmd` on Windows.
    #[must_use]
    pub fn shell_invocation(&self) -> (&'static str, Vec<String>) {
        if cfg!(windows) {
            ("cmd", vec!["/C".to_string(), self.shell_line()])
        } else {
            ("sh", vec!["-c".to_string(), format!("exec {}", self.shell_line())])
        }
    }

    /// Converts to a tokio command run through the platform shell, with
    /// piped output, in `working_dir`.
    #[must_use]
    pub fn to_command(&self, working_dir: &Path) -> Command {
        let (shell, shell_args) = self.shell_invocation();
        let mut command = Command::new(shell);
        command
            .args(shell_args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn quote_posix(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

fn quote_cmd(word: &str) -> String {
    let plain = !word.is_empty()
        && !word
            .chars()
            .any(|c| c.is_whitespace() || "\"&|<>^()%!".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("\"{}\"", word.replace('"', "\"\""))
    }
}

/// Directory the engine runs in.
///
/// The collection path itself when it is a directory, its parent when it is
/// a file, and the current directory otherwise.
pub async fn resolve_working_dir(collection_path: Option<&str>) -> PathBuf {
    let fallback = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let Some(path) = non_blank(collection_path).map(PathBuf::from) else {
        return fallback();
    };

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => path,
        Ok(_) => match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => fallback(),
        },
        Err(_) => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(command: &EngineCommand) -> Vec<&str> {
        command.args().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_build_minimal_command() {
        let command = EngineCommand::build(&ExecutionOptions::default(), &AppSettings::default());
        assert_eq!(command.program(), "npx");
        assert_eq!(args(&command), vec!["flow-test-engine"]);
    }

    #[test]
    fn test_build_full_command() {
        let options = ExecutionOptions {
            suite_file_path: Some("tests/login.yaml".to_string()),
            collection_path: Some("/tmp".to_string()),
            verbose: true,
            dry_run: true,
            priority: Some("high".to_string()),
            tags: vec!["smoke".to_string(), " ".to_string(), "auth".to_string()],
        };

        let command = EngineCommand::build(&options, &AppSettings::default());
        assert_eq!(
            command.to_string(),
            "npx flow-test-engine tests/login.yaml --verbose --dry-run --priority high --tags smoke,auth"
        );
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let options = ExecutionOptions {
            suite_file_path: Some("  ".to_string()),
            priority: Some(String::new()),
            ..ExecutionOptions::default()
        };
        let settings = AppSettings {
            engine_program: "flow-test-engine".to_string(),
            engine_package: String::new(),
            ..AppSettings::default()
        };

        let command = EngineCommand::build(&options, &settings);
        assert_eq!(command.to_string(), "flow-test-engine");
    }

    #[test]
    fn test_version_command() {
        let command = EngineCommand::version(&AppSettings::default());
        assert_eq!(args(&command), vec!["flow-test-engine", "--version"]);
    }

    #[test]
    fn test_posix_quoting() {
        assert_eq!(quote_posix("tests/login.yaml"), "tests/login.yaml");
        assert_eq!(quote_posix("my suites/a.yaml"), "'my suites/a.yaml'");
        assert_eq!(quote_posix("it's"), r"'it'\''s'");
        assert_eq!(quote_posix(""), "''");
        assert_eq!(quote_posix("$(rm -rf /)"), "'$(rm -rf /)'");
    }

    #[test]
    fn test_cmd_quoting() {
        assert_eq!(quote_cmd("--tags"), "--tags");
        assert_eq!(quote_cmd(r"C:\My Suites\a.yaml"), r#""C:\My Suites\a.yaml""#);
        assert_eq!(quote_cmd("a&b"), r#""a&b""#);
        assert_eq!(quote_cmd(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn test_runs_through_platform_shell() {
        let options = ExecutionOptions {
            suite_file_path: Some("my suites/login.yaml".to_string()),
            tags: vec!["smoke".to_string()],
            ..ExecutionOptions::default()
        };
        let command = EngineCommand::build(&options, &AppSettings::default());
        let (shell, args) = command.shell_invocation();

        if cfg!(windows) {
            assert_eq!(shell, "cmd");
            assert_eq!(
                args,
                vec!["/C", r#"npx flow-test-engine "my suites/login.yaml" --tags smoke"#]
            );
        } else {
            assert_eq!(shell, "sh");
            assert_eq!(
                args,
                vec!["-c", "exec npx flow-test-engine 'my suites/login.yaml' --tags smoke"]
            );
        }
    }

    #[tokio::test]
    async fn test_working_dir_resolution() {
        let dir = tempfile::tempdir().expect("tempdir");
        let suite = dir.path().join("suite.yaml");
        std::fs::write(&suite, "suite_name: x\n").expect("write");

        let from_dir = resolve_working_dir(dir.path().to_str()).await;
        assert_eq!(from_dir, dir.path());

        let from_file = resolve_working_dir(suite.to_str()).await;
        assert_eq!(from_file, dir.path());

        let cwd = std::env::current_dir().expect("cwd");
        assert_eq!(resolve_working_dir(Some("/definitely/missing/path")).await, cwd);
        assert_eq!(resolve_working_dir(None).await, cwd);
    }
}
