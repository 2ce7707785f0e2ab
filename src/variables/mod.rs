//! Variable resolution and generation.
//!
//! Placeholders are written `:name` inside a request's method, URL, body and
//! headers. This module finds them, merges the visible variables into a
//! [`VariableScope`], regenerates stale values and substitutes them in a
//! single right-to-left pass.

pub mod generation;
pub mod jsonpath;
pub mod placeholder;
pub mod scope;
pub mod substitution;

pub use generation::{
    extract_value, generate, GenerationChain, GenerationError, GeneratorBackend, ScriptRunner,
};
pub use jsonpath::JsonPathError;
pub use placeholder::{find_placeholder_names, is_valid_name, PLACEHOLDER_REGEX};
pub use scope::VariableScope;
pub use substitution::replace_variables;
