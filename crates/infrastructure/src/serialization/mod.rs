//! Serialization for everything Flowdeck writes to disk.
//!
//! - JSON: 2-space indentation with a trailing newline, field order as
//!   declared so files diff cleanly
//! - YAML: test suites, with syntax errors reported by line and column

mod json;
mod yaml;

pub use json::*;
pub use yaml::*;
