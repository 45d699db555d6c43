//! Variable resolution module
//!
//! Provides parsing, resolution and completion of `{{variable}}` syntax.
//!
//! # Usage
//!
//! ```
//! use flowdeck_application::variable_resolver::VariableResolver;
//! use flowdeck_domain::environment::{Environment, GlobalVariables, ResolutionContext};
//!
//! let mut env = Environment::new("development");
//! env.add_variable("host", "localhost");
//!
//! let ctx = ResolutionContext::from_sources(Some(&env), &GlobalVariables::new());
//! let resolver = VariableResolver::new(ctx);
//!
//! let result = resolver.resolve("http://{{host}}/api");
//! assert_eq!(result.resolved, "http://localhost/api");
//! ```

pub mod autocomplete;
pub mod engine;
pub mod parser;

pub use autocomplete::{VariableSuggestion, suggest_variables};
pub use engine::{
    ResolutionResult, VariableResolver, extract_request_variables, find_missing_variables,
    replace_variables,
};
pub use parser::{
    VariableReference, extract_variable_names, has_variables, is_valid_variable_name,
    parse_variables,
};
