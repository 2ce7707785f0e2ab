//! Merged variable scope for one run.
//!
//! Layers are applied in increasing priority: variables of the `global`
//! environment, then variables of the selected environment, then transient
//! per-run overrides. A later layer wins on name collision.

use super::placeholder::find_placeholder_names;
use super::substitution::replace_variables;
use crate::models::{Request, Variable, GLOBAL_ENVIRONMENT};
use crate::store::{Store, StoreError};
use std::collections::HashMap;

/// The variables visible while resolving a request in one environment.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    environment: String,
    variables: HashMap<String, Variable>,
    overrides: HashMap<String, String>,
}

impl VariableScope {
    /// Creates an empty scope for `environment`.
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            variables: HashMap::new(),
            overrides: HashMap::new(),
        }
    }

    /// Loads the global and environment layers from a store.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the store lookups.
    pub fn load<S: Store + ?Sized>(store: &S, environment: &str) -> Result<Self, StoreError> {
        let mut scope = Self::new(environment);
        for variable in store.variables_by_environment(GLOBAL_ENVIRONMENT)? {
            scope.insert(variable);
        }
        if environment != GLOBAL_ENVIRONMENT {
            for variable in store.variables_by_environment(environment)? {
                scope.insert(variable);
            }
        }
        Ok(scope)
    }

    /// Adds overrides on top of the stored layers and returns the scope.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in overrides {
            self.set_override(name, value);
        }
        self
    }

    /// Returns the environment this scope resolves in.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Inserts a stored variable, replacing any variable of the same name.
    ///
    /// Insert global variables before environment variables so the
    /// environment layer wins.
    pub fn insert(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Sets a transient override that wins over every stored layer.
    pub fn set_override(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(name.into(), value.into());
    }

    /// Checks whether `name` is shadowed by an override.
    pub fn is_overridden(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    /// Returns the stored variable that wins for `name`, ignoring overrides.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Returns the effective value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.overrides
            .get(name)
            .or_else(|| self.variables.get(name).map(|v| &v.value))
            .map(String::as_str)
    }

    /// Returns the effective value of every visible variable.
    pub fn values(&self) -> HashMap<String, String> {
        let mut values: HashMap<String, String> = self
            .variables
            .values()
            .map(|v| (v.name.clone(), v.value.clone()))
            .collect();
        values.extend(self.overrides.clone());
        values
    }

    /// Returns the names of the visible variables referenced by `request`.
    ///
    /// Method, URL, body and every header key and value are searched. Names
    /// are returned once each, in first-occurrence order; placeholders with
    /// no visible variable are skipped.
    ///
    /// Names are read greedily, so `:host-name` is only `host-name` here even
    /// though substitution of `host` still matches its prefix; a generated
    /// `host` written that way is substituted with its current value.
    pub fn variables_in_request(&self, request: &Request) -> Vec<String> {
        find_placeholder_names(&request.search_text())
            .into_iter()
            .filter(|name| self.get(name).is_some())
            .collect()
    }

    /// Substitutes the effective values into `input`.
    pub fn replace_variables(&self, input: &str) -> String {
        if !input.contains(':') {
            return input.to_string();
        }
        replace_variables(input, &self.values())
    }
}
