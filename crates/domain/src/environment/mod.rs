//! Environment and variable domain types

mod globals;
mod resolution;
mod variable;

pub use globals::GlobalVariables;
pub use resolution::ResolutionContext;
pub use variable::{
    Environment, EnvironmentVariable, ResolvedVariable, VariableScope, lookup_enabled,
};
