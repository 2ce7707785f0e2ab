//! Validation errors raised before any persistence write.

use thiserror::Error;

/// A resource failed validation and was not saved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The method is not one of the supported HTTP verbs.
    #[error("The provided method is invalid: {0}")]
    InvalidMethod(String),

    /// The URL is empty or otherwise unusable.
    #[error("The provided URL is invalid: {0}")]
    InvalidUrl(String),

    /// The variable type is not one of const, script or request.
    #[error("The provided type is invalid: {0}")]
    InvalidType(String),

    /// The name does not match the placeholder grammar or is empty.
    #[error("The provided name is invalid: {0:?}")]
    InvalidName(String),

    /// The generator is missing a required field.
    #[error("The variable generator is invalid: {0}")]
    InvalidGenerator(String),
}
