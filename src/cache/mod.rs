//! Look-aside cache over a [`Store`](crate::store::Store).
//!
//! Reads are memoized under deterministic keys built from the logical query
//! name and its arguments (e.g. `GetVariablesByEnvironment:local`). Writes
//! invalidate exactly the keys whose result could have changed. There is no
//! TTL and no capacity bound: the cache stays valid only because every write
//! goes through the same [`CachedStore`].
//!
//! The cache itself is injected through the [`Cache`] trait so tests can swap
//! in a no-op or a spying implementation.

pub mod cached_store;

pub use cached_store::CachedStore;

use crate::models::{Environment, Request, Variable};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// Logical query whose result is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// All requests
    AllRequests,
    /// One request by name
    RequestByName(String),
    /// Requests by default environment
    RequestsByEnvironment(String),
    /// All environments
    AllEnvironments,
    /// One environment by name
    EnvironmentByName(String),
    /// All variables
    AllVariables,
    /// Variables by name, across environments
    VariablesByName(String),
    /// Variables by environment
    VariablesByEnvironment(String),
    /// One variable by (name, environment)
    VariableByNameAndEnvironment(String, String),
}

impl fmt::Display for CacheKey {
    /// Renders the cache key string.
    ///
    /// Variable names cannot contain `:`, so the first separator after the
    /// query name in `GetVariableByNameAndEnvironment:<name>:<env>` is
    /// unambiguous.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::AllRequests => write!(f, "GetAllRequests"),
            CacheKey::RequestByName(name) => write!(f, "GetRequestByName:{}", name),
            CacheKey::RequestsByEnvironment(env) => {
                write!(f, "GetRequestsByEnvironment:{}", env)
            }
            CacheKey::AllEnvironments => write!(f, "GetAllEnvironments"),
            CacheKey::EnvironmentByName(name) => write!(f, "GetEnvironmentByName:{}", name),
            CacheKey::AllVariables => write!(f, "GetAllVariables"),
            CacheKey::VariablesByName(name) => write!(f, "GetVariablesByName:{}", name),
            CacheKey::VariablesByEnvironment(env) => {
                write!(f, "GetVariablesByEnvironment:{}", env)
            }
            CacheKey::VariableByNameAndEnvironment(name, env) => {
                write!(f, "GetVariableByNameAndEnvironment:{}:{}", name, env)
            }
        }
    }
}

/// A cached query result.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    /// A list of requests
    Requests(Vec<Request>),
    /// A single request
    Request(Request),
    /// A list of environments
    Environments(Vec<Environment>),
    /// A single environment
    Environment(Environment),
    /// A list of variables
    Variables(Vec<Variable>),
    /// A single variable
    Variable(Variable),
}

/// Conversion between a query result type and its [`CacheEntry`] variant.
pub trait Cacheable: Sized {
    /// Wraps the value in its entry variant.
    fn into_entry(self) -> CacheEntry;
    /// Unwraps an entry, or `None` if it holds a different shape.
    fn from_entry(entry: CacheEntry) -> Option<Self>;
}

macro_rules! cacheable {
    ($ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            fn into_entry(self) -> CacheEntry {
                CacheEntry::$variant(self)
            }

            fn from_entry(entry: CacheEntry) -> Option<Self> {
                match entry {
                    CacheEntry::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

cacheable!(Vec<Request>, Requests);
cacheable!(Request, Request);
cacheable!(Vec<Environment>, Environments);
cacheable!(Environment, Environment);
cacheable!(Vec<Variable>, Variables);
cacheable!(Variable, Variable);

/// Key-value cache with explicit invalidation.
///
/// Methods take `&self`; implementations use interior mutability. The core is
/// single-threaded, so [`MemoryCache`] uses a `RefCell`.
pub trait Cache {
    /// Returns the entry stored under `key`.
    fn get(&self, key: &str) -> Option<CacheEntry>;
    /// Stores `entry` under `key`, replacing any previous entry.
    fn set(&self, key: String, entry: CacheEntry);
    /// Removes the entry stored under `key`, if any.
    fn invalidate(&self, key: &str);
}

/// Process-local, unbounded cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Checks whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: String, entry: CacheEntry) {
        self.entries.borrow_mut().insert(key, entry);
    }

    fn invalidate(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// A cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl Cache for NoopCache {
    fn get(&self, _key: &str) -> Option<CacheEntry> {
        None
    }

    fn set(&self, _key: String, _entry: CacheEntry) {}

    fn invalidate(&self, _key: &str) {}
}
