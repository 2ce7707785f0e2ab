//! Environment model.
//!
//! An environment is a named scope for variable values and the default
//! execution context of a request. The `global` environment is reserved:
//! its variables are merged underneath every other environment.

use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Name of the reserved environment merged into every resolution.
pub const GLOBAL_ENVIRONMENT: &str = "global";

/// A named variable scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    /// Environment name (e.g. "local", "staging").
    pub name: String,
}

impl Environment {
    /// Creates a new environment with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the reserved global environment.
    pub fn global() -> Self {
        Self::new(GLOBAL_ENVIRONMENT)
    }

    /// Checks whether this is the reserved global environment.
    pub fn is_global(&self) -> bool {
        self.name == GLOBAL_ENVIRONMENT
    }

    /// Validates the environment before it is saved.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidName` if the name is empty or
    /// contains whitespace.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidName(self.name.clone()));
        }
        Ok(())
    }
}
