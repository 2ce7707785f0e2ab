//! Response of a sent request.
//!
//! The client reads the whole body before returning, so a response can be
//! printed and fed to JSONPath extraction without touching the network again.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What came back from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse {
    /// Numeric status, e.g. 200
    pub status_code: u16,

    /// Canonical reason phrase, e.g. "OK"; empty when unknown
    pub status_text: String,

    /// Protocol version, e.g. "HTTP/1.1"
    pub version: String,

    /// Headers in wire order. A repeated header appears once per value.
    pub headers: Vec<(String, String)>,

    /// Raw body
    pub body: Vec<u8>,

    /// Wall time from send until the body was read
    pub duration: Duration,
}

impl HttpResponse {
    /// Builds an empty HTTP/1.1 response with the given status.
    pub fn new(status_code: u16, status_text: String) -> Self {
        Self {
            status_code,
            status_text,
            version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status_code)
    }

    /// First value of header `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v.as_str()))
    }

    /// Value of `Content-Type`, if sent.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Decodes the body as UTF-8.
    ///
    /// # Errors
    ///
    /// Fails if the body is not valid UTF-8.
    pub fn body_as_string(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// `VERSION CODE REASON`, as printed after a run.
    pub fn status_line(&self) -> String {
        format!("{} {} {}", self.version, self.status_code, self.status_text)
            .trim_end()
            .to_string()
    }

    /// Appends a header value.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }
}
