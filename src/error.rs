//! Top-level error type.

use crate::config::ConfigError;
use crate::executor::RequestError;
use crate::models::ValidationError;
use crate::store::StoreError;
use crate::variables::GenerationError;
use thiserror::Error;

/// Any failure surfaced by the library.
#[derive(Debug, Error)]
pub enum Error {
    /// A resource failed validation before being written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A store lookup or write failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A variable could not be generated.
    #[error("variable generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The resolved request could not be built or sent.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Checks whether this is a store lookup miss.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(e) => e.is_not_found(),
            Error::Generation(GenerationError::NotFound(_)) => true,
            _ => false,
        }
    }
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
