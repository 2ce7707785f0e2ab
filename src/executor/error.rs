//! HTTP request execution error types.

use thiserror::Error;

/// Errors that can occur while building or sending a resolved request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The URL is malformed after substitution.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be built or the connection could not be made.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The request timed out before completion.
    #[error("Request timed out")]
    Timeout,

    /// Transport failure after the connection was made, such as a reset
    /// while reading the response.
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Maps reqwest's error kinds to our variants.
impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Timeout
        } else if err.is_builder() {
            RequestError::RequestFailed(err.to_string())
        } else if err.is_connect() {
            RequestError::RequestFailed(format!("Connection failed: {}", err))
        } else {
            RequestError::NetworkError(err.to_string())
        }
    }
}

impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        RequestError::InvalidUrl(err.to_string())
    }
}
