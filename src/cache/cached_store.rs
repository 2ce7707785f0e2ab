//! Read-through, write-invalidate wrapper around a store.

use super::{Cache, CacheKey, Cacheable, MemoryCache};
use crate::models::{Environment, Request, Variable};
use crate::store::{Store, StoreError};

/// A [`Store`] that memoizes reads of an inner store.
///
/// Every write invalidates the affected keys before delegating, so a read
/// that follows a successful write always reaches the inner store.
#[derive(Debug)]
pub struct CachedStore<S, C = MemoryCache> {
    inner: S,
    cache: C,
}

impl<S: Store> CachedStore<S, MemoryCache> {
    /// Wraps `inner` with an empty [`MemoryCache`].
    pub fn new(inner: S) -> Self {
        Self::with_cache(inner, MemoryCache::new())
    }
}

impl<S: Store, C: Cache> CachedStore<S, C> {
    /// Wraps `inner` with the given cache.
    pub fn with_cache(inner: S, cache: C) -> Self {
        Self { inner, cache }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Looks `key` up in the cache, falling back to `load` on a miss.
    ///
    /// Failed loads are not cached.
    fn read<T, F>(&self, key: CacheKey, load: F) -> Result<T, StoreError>
    where
        T: Cacheable + Clone,
        F: FnOnce(&S) -> Result<T, StoreError>,
    {
        let key = key.to_string();
        if let Some(entry) = self.cache.get(&key) {
            match T::from_entry(entry) {
                Some(value) => {
                    log::debug!("Cache hit on [{}]", key);
                    return Ok(value);
                }
                None => log::error!("Cache entry under [{}] has the wrong shape", key),
            }
        } else {
            log::debug!("Cache miss on [{}]", key);
        }
        let value = load(&self.inner)?;
        self.cache.set(key, value.clone().into_entry());
        Ok(value)
    }

    fn invalidate(&self, keys: impl IntoIterator<Item = CacheKey>) {
        for key in keys {
            self.cache.invalidate(&key.to_string());
        }
    }

    fn request_keys(request: &Request) -> [CacheKey; 3] {
        [
            CacheKey::AllRequests,
            CacheKey::RequestByName(request.name.clone()),
            CacheKey::RequestsByEnvironment(request.environment.clone()),
        ]
    }

    fn environment_keys(name: &str) -> [CacheKey; 2] {
        [
            CacheKey::AllEnvironments,
            CacheKey::EnvironmentByName(name.to_string()),
        ]
    }

    fn variable_keys(name: &str, environment: &str) -> [CacheKey; 4] {
        [
            CacheKey::AllVariables,
            CacheKey::VariablesByEnvironment(environment.to_string()),
            CacheKey::VariablesByName(name.to_string()),
            CacheKey::VariableByNameAndEnvironment(name.to_string(), environment.to_string()),
        ]
    }

    /// Returns the sorted names of the variables scoped to `environment`.
    pub fn variable_names(&self, environment: &str) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .variables_by_environment(environment)?
            .into_iter()
            .map(|v| v.name)
            .collect();
        names.sort();
        Ok(names)
    }
}

impl<S: Store, C: Cache> Store for CachedStore<S, C> {
    fn requests(&self) -> Result<Vec<Request>, StoreError> {
        self.read(CacheKey::AllRequests, |s| s.requests())
    }

    fn request(&self, name: &str) -> Result<Request, StoreError> {
        self.read(CacheKey::RequestByName(name.to_string()), |s| s.request(name))
    }

    fn requests_by_environment(&self, environment: &str) -> Result<Vec<Request>, StoreError> {
        self.read(
            CacheKey::RequestsByEnvironment(environment.to_string()),
            |s| s.requests_by_environment(environment),
        )
    }

    fn save_requests(&mut self, requests: &[Request]) -> Result<(), StoreError> {
        for request in requests {
            self.invalidate(Self::request_keys(request));
        }
        self.inner.save_requests(requests)
    }

    fn update_request(&mut self, request: &Request) -> Result<(), StoreError> {
        if let Ok(previous) = self.inner.request(&request.name) {
            self.invalidate(Self::request_keys(&previous));
        }
        self.invalidate(Self::request_keys(request));
        self.inner.update_request(request)
    }

    fn delete_request(&mut self, name: &str) -> Result<(), StoreError> {
        let previous = self.inner.request(name)?;
        self.invalidate(Self::request_keys(&previous));
        self.inner.delete_request(name)
    }

    fn environments(&self) -> Result<Vec<Environment>, StoreError> {
        self.read(CacheKey::AllEnvironments, |s| s.environments())
    }

    fn environment(&self, name: &str) -> Result<Environment, StoreError> {
        self.read(CacheKey::EnvironmentByName(name.to_string()), |s| {
            s.environment(name)
        })
    }

    fn save_environments(&mut self, environments: &[Environment]) -> Result<(), StoreError> {
        for environment in environments {
            self.invalidate(Self::environment_keys(&environment.name));
        }
        self.inner.save_environments(environments)
    }

    fn delete_environment(&mut self, name: &str) -> Result<(), StoreError> {
        self.invalidate(Self::environment_keys(name));
        self.inner.delete_environment(name)
    }

    fn variables(&self) -> Result<Vec<Variable>, StoreError> {
        self.read(CacheKey::AllVariables, |s| s.variables())
    }

    fn variables_by_name(&self, name: &str) -> Result<Vec<Variable>, StoreError> {
        self.read(CacheKey::VariablesByName(name.to_string()), |s| {
            s.variables_by_name(name)
        })
    }

    fn variables_by_environment(&self, environment: &str) -> Result<Vec<Variable>, StoreError> {
        self.read(
            CacheKey::VariablesByEnvironment(environment.to_string()),
            |s| s.variables_by_environment(environment),
        )
    }

    fn variable(&self, name: &str, environment: &str) -> Result<Variable, StoreError> {
        self.read(
            CacheKey::VariableByNameAndEnvironment(name.to_string(), environment.to_string()),
            |s| s.variable(name, environment),
        )
    }

    fn save_variables(&mut self, variables: &[Variable]) -> Result<(), StoreError> {
        for variable in variables {
            self.invalidate(Self::variable_keys(&variable.name, &variable.environment));
        }
        self.inner.save_variables(variables)
    }

    fn update_variable(&mut self, variable: &Variable) -> Result<(), StoreError> {
        self.invalidate(Self::variable_keys(&variable.name, &variable.environment));
        self.inner.update_variable(variable)
    }

    fn delete_variable(&mut self, name: &str, environment: &str) -> Result<(), StoreError> {
        self.invalidate(Self::variable_keys(name, environment));
        self.inner.delete_variable(name, environment)
    }
}
