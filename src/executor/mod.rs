//! Request execution.
//!
//! A run has two phases and no retry:
//!
//! 1. **Prepare**: header and body overrides are merged into the stored
//!    request.
//! 2. **Resolve & send**: every variable referenced by the prepared request
//!    is generated if stale, placeholders are substituted into the URL, body
//!    and headers, the URL is normalized and the request is sent.
//!
//! The executor never prints; callers decide how to render a [`RunOutput`].

pub mod client;
pub mod engine;
pub mod error;
pub mod normalize;

pub use client::HttpClient;
pub use engine::Poster;
pub use error::RequestError;
pub use normalize::normalize_url;

use crate::models::{Header, HttpMethod, HttpResponse};
use crate::variables::GenerationError;
use std::collections::HashMap;
use url::Url;

/// Per-run overrides supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Environment to run in instead of the request's default.
    pub environment: Option<String>,
    /// Headers that replace same-key headers or are appended.
    pub headers: Vec<Header>,
    /// Body that replaces the stored body.
    pub body: Option<String>,
    /// Variable values that win over every stored scope.
    pub variables: HashMap<String, String>,
}

impl RunOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment and returns the options.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Adds a header override and returns the options.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    /// Sets the body override and returns the options.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a variable override and returns the options.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

/// A request after substitution, as it was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Normalized absolute URL
    pub url: Url,
    /// Substituted headers in order
    pub headers: Vec<Header>,
    /// Substituted body
    pub body: String,
}

/// The result of a successful run.
#[derive(Debug)]
pub struct RunOutput {
    /// Name of the stored request that was run
    pub name: String,
    /// Environment the run resolved in
    pub environment: String,
    /// What was sent
    pub request: ResolvedRequest,
    /// What came back
    pub response: HttpResponse,
    /// Tolerated generation failures; the affected variables kept their
    /// previous values
    pub warnings: Vec<GenerationError>,
}
