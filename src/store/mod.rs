//! Persistence accessor for requests, environments and variables.
//!
//! The [`Store`] trait is the CRUD contract the rest of the crate is written
//! against. Two implementations are provided:
//!
//! - [`MemoryStore`]: process-local tables, used for tests and scratch work
//! - [`FileStore`]: the same tables persisted as a single JSON document
//!
//! Both enforce the referential constraints of the data model: a request or
//! variable must reference an existing environment, names are unique within
//! their kind, and an environment cannot be deleted while referenced. Batch
//! saves are all-or-nothing.

pub mod file;
pub mod memory;
mod tables;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::{Environment, Request, Variable};
use std::fmt;
use thiserror::Error;

/// The three entity kinds held by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Request templates
    Request,
    /// Environments
    Environment,
    /// Variables
    Variable,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Request => "request",
            EntityKind::Environment => "environment",
            EntityKind::Variable => "variable",
        })
    }
}

/// Errors returned by a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lookup by name missed.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Kind of entity looked up
        kind: EntityKind,
        /// Name (or `name` in `environment` for variables) that missed
        name: String,
    },

    /// A save would duplicate a primary key.
    #[error("{kind} already exists: {name}")]
    NameConflict {
        /// Kind of entity saved
        kind: EntityKind,
        /// Conflicting name
        name: String,
    },

    /// A save references an environment that does not exist.
    #[error("environment not found: {0}")]
    ForeignKeyMissing(String),

    /// A delete is blocked by a live reference.
    #[error("environment is used by other resources: {0}")]
    InUse(String),

    /// The reserved global environment cannot be deleted.
    #[error("environment is reserved: {0}")]
    Reserved(String),

    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Checks whether this is a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// CRUD accessor over the three entity collections.
///
/// Lookups that miss return [`StoreError::NotFound`]. Saves insert new
/// entities; updates replace existing ones by primary key.
pub trait Store {
    /// Returns all requests.
    fn requests(&self) -> Result<Vec<Request>, StoreError>;
    /// Returns the request with the given name.
    fn request(&self, name: &str) -> Result<Request, StoreError>;
    /// Returns the requests whose default environment is `environment`.
    fn requests_by_environment(&self, environment: &str) -> Result<Vec<Request>, StoreError>;
    /// Inserts requests; either all are saved or none are.
    fn save_requests(&mut self, requests: &[Request]) -> Result<(), StoreError>;
    /// Replaces the request with the same name.
    fn update_request(&mut self, request: &Request) -> Result<(), StoreError>;
    /// Deletes the request with the given name.
    fn delete_request(&mut self, name: &str) -> Result<(), StoreError>;

    /// Returns all environments, including `global`.
    fn environments(&self) -> Result<Vec<Environment>, StoreError>;
    /// Returns the environment with the given name.
    fn environment(&self, name: &str) -> Result<Environment, StoreError>;
    /// Inserts environments; either all are saved or none are.
    fn save_environments(&mut self, environments: &[Environment]) -> Result<(), StoreError>;
    /// Deletes an unreferenced environment.
    fn delete_environment(&mut self, name: &str) -> Result<(), StoreError>;

    /// Returns all variables.
    fn variables(&self) -> Result<Vec<Variable>, StoreError>;
    /// Returns every variable with the given name, across environments.
    fn variables_by_name(&self, name: &str) -> Result<Vec<Variable>, StoreError>;
    /// Returns the variables scoped to `environment`.
    fn variables_by_environment(&self, environment: &str) -> Result<Vec<Variable>, StoreError>;
    /// Returns the variable identified by (`name`, `environment`).
    fn variable(&self, name: &str, environment: &str) -> Result<Variable, StoreError>;
    /// Inserts variables; either all are saved or none are.
    fn save_variables(&mut self, variables: &[Variable]) -> Result<(), StoreError>;
    /// Replaces the variable with the same (name, environment).
    fn update_variable(&mut self, variable: &Variable) -> Result<(), StoreError>;
    /// Deletes the variable identified by (`name`, `environment`).
    fn delete_variable(&mut self, name: &str, environment: &str) -> Result<(), StoreError>;
}
