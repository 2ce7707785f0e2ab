//! Poster: reusable HTTP requests with environment-scoped variables
//!
//! Requests are stored templates whose method, URL, body and headers may
//! contain `:name` placeholders. Variables fill those placeholders and are
//! scoped to environments; the reserved `global` environment is always merged
//! underneath the selected one. A variable's value is either constant, the
//! output of a shell command, or extracted from the response of another
//! stored request.
//!
//! # Architecture
//!
//! - **models**: Requests, environments, variables, responses and validation
//! - **store**: The persistence accessor trait with memory and JSON-file backends
//! - **cache**: Look-aside cache that memoizes store reads and invalidates on writes
//! - **variables**: Placeholder discovery, scope merging, substitution and generation
//! - **executor**: The [`Poster`] context that prepares, resolves and sends requests
//! - **config**: Settings loaded from a JSON document
//!
//! # Running a request
//!
//! 1. Header and body overrides are merged into the stored request
//! 2. Every referenced variable is regenerated if stale and persisted
//! 3. Placeholders are substituted in one right-to-left pass
//! 4. The URL is normalized (a missing scheme defaults to `http`)
//! 5. The request is sent once; failures are not retried
//!
//! # Example
//!
//! ```no_run
//! use poster::config::PosterConfig;
//! use poster::executor::{Poster, RunOptions};
//! use poster::models::{Environment, HttpMethod, Request, Variable};
//! use poster::store::MemoryStore;
//!
//! # fn example() -> Result<(), poster::Error> {
//! let mut poster = Poster::new(MemoryStore::new(), PosterConfig::default())?;
//! poster.create_environment(Environment::new("local"))?;
//! poster.create_variable(Variable::constant("host", "localhost:8080", "local"))?;
//! poster.create_request(Request::new("health", HttpMethod::GET, ":host/health", "local"))?;
//!
//! let output = poster.run("health", &RunOptions::new())?;
//! assert_eq!(output.request.url.as_str(), "http://localhost:8080/health");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod store;
pub mod variables;

pub use error::Error;
pub use executor::{Poster, RunOptions, RunOutput};
