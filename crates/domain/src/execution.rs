//! Test engine executions and the events they produce

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generate_id;

/// Identifier of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(String);

impl ExecutionId {
    /// Generates a fresh id.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_id())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ExecutionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ExecutionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to run and how.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionOptions {
    /// Suite file passed to the engine; the engine discovers suites when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_file_path: Option<String>,
    /// Directory (or file inside it) the engine runs in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_path: Option<String>,
    /// `--verbose`
    #[serde(default)]
    pub verbose: bool,
    /// `--dry-run`
    #[serde(default)]
    pub dry_run: bool,
    /// `--priority <p>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// `--tags <csv>`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Which pipe a log chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

/// Severity shown next to a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Plain output
    Info,
    /// A passing check
    Success,
    /// A warning
    Warning,
    /// A failure
    Error,
}

impl LogLevel {
    /// Guesses the level of an output chunk from its text.
    ///
    /// Failure markers win over success markers; unmarked stderr output is
    /// an error and unmarked stdout output is info.
    #[must_use]
    pub fn classify(message: &str, stream: LogStream) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("error")
            || lower.contains("failed")
            || message.contains('✗')
            || message.contains('❌')
        {
            Self::Error
        } else if lower.contains("warn") || message.contains('⚠') {
            Self::Warning
        } else if lower.contains("passed")
            || lower.contains("success")
            || message.contains('✓')
            || message.contains('✅')
        {
            Self::Success
        } else {
            match stream {
                LogStream::Stdout => Self::Info,
                LogStream::Stderr => Self::Error,
            }
        }
    }
}

/// One relayed output chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the chunk was read.
    pub timestamp: DateTime<Utc>,
    /// Classified severity.
    pub level: LogLevel,
    /// Source pipe.
    pub stream: LogStream,
    /// Chunk text, exactly as read (may end mid-line).
    pub message: String,
}

impl LogEntry {
    /// Creates an entry, classifying the message.
    #[must_use]
    pub fn new(message: impl Into<String>, stream: LogStream, timestamp: DateTime<Utc>) -> Self {
        let message = message.into();
        Self {
            timestamp,
            level: LogLevel::classify(&message, stream),
            stream,
            message,
        }
    }
}

/// Event pushed while an execution runs.
///
/// Every execution produces `Started`, any number of `Log`, then exactly one
/// of `Complete` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutionEvent {
    /// The process was spawned.
    Started {
        /// Execution id
        execution_id: ExecutionId,
        /// Command line, for display
        command: String,
    },
    /// A chunk of output.
    Log {
        /// Execution id
        execution_id: ExecutionId,
        /// The chunk
        entry: LogEntry,
    },
    /// The process exited.
    Complete {
        /// Execution id
        execution_id: ExecutionId,
        /// Exit code; `None` when killed by a signal
        exit_code: Option<i32>,
        /// True for exit code 0
        success: bool,
    },
    /// The process could not be spawned or waited on.
    Error {
        /// Execution id
        execution_id: ExecutionId,
        /// Error text
        message: String,
    },
}

impl ExecutionEvent {
    /// Channel name the event is pushed on.
    #[must_use]
    pub const fn channel(&self) -> &'static str {
        match self {
            Self::Started { .. } => "execution-started",
            Self::Log { .. } => "execution-log",
            Self::Complete { .. } => "execution-complete",
            Self::Error { .. } => "execution-error",
        }
    }

    /// The execution the event belongs to.
    #[must_use]
    pub const fn execution_id(&self) -> &ExecutionId {
        match self {
            Self::Started { execution_id, .. }
            | Self::Log { execution_id, .. }
            | Self::Complete { execution_id, .. }
            | Self::Error { execution_id, .. } => execution_id,
        }
    }

    /// Returns true for `Complete` and `Error`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}
