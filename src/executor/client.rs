//! Blocking HTTP client built on reqwest.
//!
//! One request at a time, no retries. The complete body is read before
//! returning so the response can be inspected repeatedly.

use super::error::RequestError;
use crate::config::PosterConfig;
use crate::models::{Header, HttpMethod, HttpResponse};
use std::time::Instant;
use url::Url;

/// Sends resolved requests.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Builds a client from the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns `RequestFailed` if the underlying client cannot be built.
    pub fn new(config: &PosterConfig) -> Result<Self, RequestError> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let inner = builder
            .build()
            .map_err(|e| RequestError::RequestFailed(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Sends a request and reads the complete response.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `url` - Absolute target URL
    /// * `headers` - Headers in order; repeated keys are all sent
    /// * `body` - Request body; empty sends no body
    pub fn send(
        &self,
        method: HttpMethod,
        url: &Url,
        headers: &[Header],
        body: &str,
    ) -> Result<HttpResponse, RequestError> {
        let start_time = Instant::now();

        let mut builder = self.inner.request(to_reqwest_method(method), url.clone());
        for header in headers {
            builder = builder.header(header.key.as_str(), header.value.as_str());
        }
        if !body.is_empty() {
            builder = builder.body(body.to_string());
        }

        let request = builder.build()?;
        let response = self.inner.execute(request)?;

        let status = response.status();
        let mut http_response = HttpResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown").to_string(),
        );
        http_response.version = format!("{:?}", response.version());

        for (name, value) in response.headers() {
            match value.to_str() {
                Ok(value) => http_response.add_header(name.as_str(), value),
                Err(_) => log::debug!("Skipping non-text response header {}", name),
            }
        }

        let body = response
            .bytes()
            .map_err(|e| RequestError::NetworkError(e.to_string()))?;
        http_response.set_body(body.to_vec());
        http_response.duration = start_time.elapsed();

        Ok(http_response)
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::CONNECT => reqwest::Method::CONNECT,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
        HttpMethod::TRACE => reqwest::Method::TRACE,
    }
}
