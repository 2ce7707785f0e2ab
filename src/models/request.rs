//! HTTP request template models.
//!
//! This module defines the reusable request template persisted by the store,
//! including the request method, headers, body and default environment.
//! Any textual field may contain `:name` placeholders that are resolved at
//! run time.

use super::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP request method.
///
/// Methods are case-normalized to upper-case when parsed, including when a
/// stored document is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    GET,
    /// HTTP HEAD method - retrieve headers only
    HEAD,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP CONNECT method - establish a tunnel to the server
    CONNECT,
    /// HTTP OPTIONS method - describe communication options
    OPTIONS,
    /// HTTP TRACE method - perform a message loop-back test
    TRACE,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::CONNECT => "CONNECT",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::TRACE => "TRACE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ValidationError;

    /// Parses a method name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "HEAD" => Ok(HttpMethod::HEAD),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            "CONNECT" => Ok(HttpMethod::CONNECT),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "TRACE" => Ok(HttpMethod::TRACE),
            _ => Err(ValidationError::InvalidMethod(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single request header, owned by exactly one [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name.
    pub key: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Creates a new header.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parses a `key:value` header, trimming spaces and tabs around both parts.
    ///
    /// # Returns
    ///
    /// `None` if there is no colon, the key is empty, or either part
    /// contains a newline.
    pub fn parse(raw: &str) -> Option<Self> {
        let (key, value) = raw.split_once(':')?;
        let key = key.trim_matches([' ', '\t']);
        let value = value.trim_matches([' ', '\t']);
        if key.is_empty() || raw.contains(['\n', '\r']) {
            return None;
        }
        Some(Self::new(key, value))
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

/// A named, reusable HTTP request template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Unique name of the request; its primary identifier.
    pub name: String,

    /// HTTP method (GET, POST, PUT, DELETE, etc.).
    pub method: HttpMethod,

    /// Target URL. A missing scheme defaults to `http` at run time.
    pub url: String,

    /// Raw request body; empty when the request has none.
    #[serde(default)]
    pub body: String,

    /// Ordered request headers.
    #[serde(default)]
    pub headers: Vec<Header>,

    /// Name of the environment the request runs in when none is given.
    pub environment: String,
}

impl Request {
    /// Creates a new request with no body and no headers.
    ///
    /// # Arguments
    ///
    /// * `name` - Unique request name
    /// * `method` - HTTP method
    /// * `url` - Target URL, possibly containing placeholders
    /// * `environment` - Default environment name
    pub fn new(
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            body: String::new(),
            headers: Vec::new(),
            environment: environment.into(),
        }
    }

    /// Adds a header and returns the request.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    /// Sets the body and returns the request.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Validates the request before it is saved.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for an empty or whitespace-containing name and
    /// `InvalidUrl` for an empty URL.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidName(self.name.clone()));
        }
        if self.url.trim().is_empty() {
            return Err(ValidationError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }

    /// Merges header overrides into the request.
    ///
    /// An override replaces the value of an existing header with the same
    /// key (compared case-insensitively), otherwise it is appended.
    pub fn update_headers(&mut self, overrides: &[Header]) {
        for header in overrides {
            match self
                .headers
                .iter_mut()
                .find(|h| h.key.eq_ignore_ascii_case(&header.key))
            {
                Some(existing) => existing.value = header.value.clone(),
                None => self.headers.push(header.clone()),
            }
        }
    }

    /// Replaces the body wholesale.
    pub fn update_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Builds the text scanned for placeholders.
    ///
    /// Method, URL, body, then each header's key and value, newline-separated.
    pub fn search_text(&self) -> String {
        let mut text = format!("{}\n{}\n{}", self.method, self.url, self.body);
        for header in &self.headers {
            text.push('\n');
            text.push_str(&header.key);
            text.push('\n');
            text.push_str(&header.value);
        }
        text
    }
}
