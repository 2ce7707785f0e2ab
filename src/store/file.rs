//! JSON file-backed store.
//!
//! All three tables live in one pretty-printed JSON document. The document is
//! loaded once when the store is opened; every write applies the change to a
//! copy of the tables, writes the copy to a sibling temporary file and renames
//! it over the original. Only after the rename succeeds does the in-memory copy
//! change, so a failed write leaves both the file and the store untouched.

use super::tables::Tables;
use super::{Store, StoreError};
use crate::models::{Environment, Request, Variable};
use std::fs;
use std::path::{Path, PathBuf};

/// A [`Store`] persisted as a JSON document on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tables: Tables,
}

impl FileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file exists but cannot be read, and
    /// `StoreError::Serialization` if it is not a valid store document.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut tables = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                log::warn!("Store file {} is empty, starting fresh", path.display());
                Tables::default()
            } else {
                serde_json::from_str::<Tables>(&raw)?
            }
        } else {
            Tables::default()
        };
        tables.ensure_global();
        log::debug!("Opened store at {}", path.display());
        Ok(Self { path, tables })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit<F>(&mut self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Tables) -> Result<(), StoreError>,
    {
        let mut next = self.tables.clone();
        change(&mut next)?;
        self.write(&next)?;
        self.tables = next;
        Ok(())
    }

    fn write(&self, tables: &Tables) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(tables)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
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
        self.commit(|t| t.insert_requests(requests))
    }

    fn update_request(&mut self, request: &Request) -> Result<(), StoreError> {
        self.commit(|t| t.update_request(request))
    }

    fn delete_request(&mut self, name: &str) -> Result<(), StoreError> {
        self.commit(|t| t.delete_request(name))
    }

    fn environments(&self) -> Result<Vec<Environment>, StoreError> {
        Ok(self.tables.environments.clone())
    }

    fn environment(&self, name: &str) -> Result<Environment, StoreError> {
        self.tables.environment(name)
    }

    fn save_environments(&mut self, environments: &[Environment]) -> Result<(), StoreError> {
        self.commit(|t| t.insert_environments(environments))
    }

    fn delete_environment(&mut self, name: &str) -> Result<(), StoreError> {
        self.commit(|t| t.delete_environment(name))
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
        self.commit(|t| t.insert_variables(variables))
    }

    fn update_variable(&mut self, variable: &Variable) -> Result<(), StoreError> {
        self.commit(|t| t.update_variable(variable))
    }

    fn delete_variable(&mut self, name: &str, environment: &str) -> Result<(), StoreError> {
        self.commit(|t| t.delete_variable(name, environment))
    }
}
