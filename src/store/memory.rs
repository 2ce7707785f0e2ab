//! In-memory store.

use super::tables::Tables;
use super::{Store, StoreError};
use crate::models::{Environment, Request, Variable};

/// A [`Store`] that keeps its tables in process memory.
///
/// Starts with only the `global` environment.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Tables,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn requests(&self) -> Result<Vec<Request>, StoreError> {
        Ok(self.tables.requests.clone())
    }

    fn request(&self, name: &str) -> Result<Request, StoreError> {
        self.tables.request(name)
    }

    fn requests_by_environment(&self, environment: &str) -> Result<Vec<Request>, StoreError> {
        Ok(self.tables.requests_by_environment(environment))
    }

    fn save_requests(&mut self, requests: &[Request]) -> Result<(), StoreError> {
        self.tables.insert_requests(requests)
    }

    fn update_request(&mut self, request: &Request) -> Result<(), StoreError> {
        self.tables.update_request(request)
    }

    fn delete_request(&mut self, name: &str) -> Result<(), StoreError> {
        self.tables.delete_request(name)
    }

    fn environments(&self) -> Result<Vec<Environment>, StoreError> {
        Ok(self.tables.environments.clone())
    }

    fn environment(&self, name: &str) -> Result<Environment, StoreError> {
        self.tables.environment(name)
    }

    fn save_environments(&mut self, environments: &[Environment]) -> Result<(), StoreError> {
        self.tables.insert_environments(environments)
    }

    fn delete_environment(&mut self, name: &str) -> Result<(), StoreError> {
        self.tables.delete_environment(name)
    }

    fn variables(&self) -> Result<Vec<Variable>, StoreError> {
        Ok(self.tables.variables.clone())
    }

    fn variables_by_name(&self, name: &str) -> Result<Vec<Variable>, StoreError> {
        Ok(self.tables.variables_by_name(name))
    }

    fn variables_by_environment(&self, environment: &str) -> Result<Vec<Variable>, StoreError> {
        Ok(self.tables.variables_by_environment(environment))
    }

    fn variable(&self, name: &str, environment: &str) -> Result<Variable, StoreError> {
        self.tables.variable(name, environment)
    }

    fn save_variables(&mut self, variables: &[Variable]) -> Result<(), StoreError> {
        self.tables.insert_variables(variables)
    }

    fn update_variable(&mut self, variable: &Variable) -> Result<(), StoreError> {
        self.tables.update_variable(variable)
    }

    fn delete_variable(&mut self, name: &str, environment: &str) -> Result<(), StoreError> {
        self.tables.delete_variable(name, environment)
    }
}
