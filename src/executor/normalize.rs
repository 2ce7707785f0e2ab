//! URL normalization after substitution.

use super::error::RequestError;
use url::Url;

/// Turns a substituted URL into an absolute [`Url`].
///
/// - `scheme://host/...` is used as-is
/// - `//host/...` gets `default_scheme:` prepended
/// - anything else gets `default_scheme://` prepended
///
/// # Errors
///
/// Returns `InvalidUrl` if the result does not parse or has no host.
///
/// # Examples
///
/// ```
/// use poster::executor::normalize_url;
///
/// let url = normalize_url("localhost:8080/health", "http").unwrap();
/// assert_eq!(url.as_str(), "http://localhost:8080/health");
/// ```
pub fn normalize_url(raw: &str, default_scheme: &str) -> Result<Url, RequestError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else if raw.starts_with("//") {
        format!("{}:{}", default_scheme, raw)
    } else {
        format!("{}://{}", default_scheme, raw)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| RequestError::InvalidUrl(format!("{}: {}", candidate, e)))?;
    if !url.has_host() {
        return Err(RequestError::InvalidUrl(candidate));
    }
    Ok(url)
}
