//! Entity tables shared by the store implementations.
//!
//! Every mutating method checks all constraints before touching any row, so a
//! failed call leaves the tables unchanged.

use super::{EntityKind, StoreError};
use crate::models::{Environment, Request, Variable, GLOBAL_ENVIRONMENT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    pub(crate) environments: Vec<Environment>,
    #[serde(default)]
    pub(crate) requests: Vec<Request>,
    #[serde(default)]
    pub(crate) variables: Vec<Variable>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            environments: vec![Environment::global()],
            requests: Vec::new(),
            variables: Vec::new(),
        }
    }
}

fn not_found(kind: EntityKind, name: impl Into<String>) -> StoreError {
    StoreError::NotFound {
        kind,
        name: name.into(),
    }
}

fn conflict(kind: EntityKind, name: impl Into<String>) -> StoreError {
    StoreError::NameConflict {
        kind,
        name: name.into(),
    }
}

fn variable_id(name: &str, environment: &str) -> String {
    format!("{} in {}", name, environment)
}

impl Tables {
    /// Re-adds the global environment if a loaded document lacks it.
    pub(crate) fn ensure_global(&mut self) {
        if !self.has_environment(GLOBAL_ENVIRONMENT) {
            self.environments.insert(0, Environment::global());
        }
    }

    fn has_environment(&self, name: &str) -> bool {
        self.environments.iter().any(|e| e.name == name)
    }

    fn require_environment(&self, name: &str) -> Result<(), StoreError> {
        if self.has_environment(name) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyMissing(name.to_string()))
        }
    }

    pub(crate) fn request(&self, name: &str) -> Result<Request, StoreError> {
        self.requests
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| not_found(EntityKind::Request, name))
    }

    pub(crate) fn requests_by_environment(&self, environment: &str) -> Vec<Request> {
        self.requests
            .iter()
            .filter(|r| r.environment == environment)
            .cloned()
            .collect()
    }

    pub(crate) fn insert_requests(&mut self, batch: &[Request]) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for request in batch {
            self.require_environment(&request.environment)?;
            let exists = self.requests.iter().any(|r| r.name == request.name);
            if exists || !seen.insert(request.name.as_str()) {
                return Err(conflict(EntityKind::Request, &request.name));
            }
        }
        self.requests.extend_from_slice(batch);
        Ok(())
    }

    pub(crate) fn update_request(&mut self, request: &Request) -> Result<(), StoreError> {
        self.require_environment(&request.environment)?;
        let slot = self
            .requests
            .iter_mut()
            .find(|r| r.name == request.name)
            .ok_or_else(|| not_found(EntityKind::Request, &request.name))?;
        *slot = request.clone();
        Ok(())
    }

    pub(crate) fn delete_request(&mut self, name: &str) -> Result<(), StoreError> {
        let index = self
            .requests
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| not_found(EntityKind::Request, name))?;
        self.requests.remove(index);
        Ok(())
    }

    pub(crate) fn environment(&self, name: &str) -> Result<Environment, StoreError> {
        self.environments
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or_else(|| not_found(EntityKind::Environment, name))
    }

    pub(crate) fn insert_environments(&mut self, batch: &[Environment]) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for environment in batch {
            if self.has_environment(&environment.name) || !seen.insert(environment.name.as_str()) {
                return Err(conflict(EntityKind::Environment, &environment.name));
            }
        }
        self.environments.extend_from_slice(batch);
        Ok(())
    }

    pub(crate) fn delete_environment(&mut self, name: &str) -> Result<(), StoreError> {
        if name == GLOBAL_ENVIRONMENT {
            return Err(StoreError::Reserved(name.to_string()));
        }
        let index = self
            .environments
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| not_found(EntityKind::Environment, name))?;
        let referenced = self.requests.iter().any(|r| r.environment == name)
            || self.variables.iter().any(|v| v.environment == name);
        if referenced {
            return Err(StoreError::InUse(name.to_string()));
        }
        self.environments.remove(index);
        Ok(())
    }

    pub(crate) fn variables_by_name(&self, name: &str) -> Vec<Variable> {
        self.variables
            .iter()
            .filter(|v| v.name == name)
            .cloned()
            .collect()
    }

    pub(crate) fn variables_by_environment(&self, environment: &str) -> Vec<Variable> {
        self.variables
            .iter()
            .filter(|v| v.environment == environment)
            .cloned()
            .collect()
    }

    pub(crate) fn variable(&self, name: &str, environment: &str) -> Result<Variable, StoreError> {
        self.variables
            .iter()
            .find(|v| v.name == name && v.environment == environment)
            .cloned()
            .ok_or_else(|| not_found(EntityKind::Variable, variable_id(name, environment)))
    }

    pub(crate) fn insert_variables(&mut self, batch: &[Variable]) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for variable in batch {
            self.require_environment(&variable.environment)?;
            let key = (variable.name.as_str(), variable.environment.as_str());
            let exists = self
                .variables
                .iter()
                .any(|v| v.name == variable.name && v.environment == variable.environment);
            if exists || !seen.insert(key) {
                return Err(conflict(
                    EntityKind::Variable,
                    variable_id(&variable.name, &variable.environment),
                ));
            }
        }
        self.variables.extend_from_slice(batch);
        Ok(())
    }

    pub(crate) fn update_variable(&mut self, variable: &Variable) -> Result<(), StoreError> {
        let slot = self
            .variables
            .iter_mut()
            .find(|v| v.name == variable.name && v.environment == variable.environment)
            .ok_or_else(|| {
                not_found(
                    EntityKind::Variable,
                    variable_id(&variable.name, &variable.environment),
                )
            })?;
        *slot = variable.clone();
        Ok(())
    }

    pub(crate) fn delete_variable(&mut self, name: &str, environment: &str) -> Result<(), StoreError> {
        let index = self
            .variables
            .iter()
            .position(|v| v.name == name && v.environment == environment)
            .ok_or_else(|| not_found(EntityKind::Variable, variable_id(name, environment)))?;
        self.variables.remove(index);
        Ok(())
    }
}
