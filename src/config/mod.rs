//! Configuration loading and validation.
//!
//! Settings live under the `"poster"` key of a JSON document and are merged
//! over defaults. The loaded [`PosterConfig`] is owned by the
//! [`Poster`](crate::executor::Poster) context; there is no global instance.

pub mod schema;

pub use schema::PosterConfig;

use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Key under which settings are read.
pub const SETTINGS_KEY: &str = "poster";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The merged settings failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The settings file exists but could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not a JSON document.
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loads configuration from a settings JSON value.
///
/// Reads the `"poster"` settings, merges them with defaults and validates the
/// result. Settings that cannot be deserialized are ignored with a warning.
///
/// # Arguments
///
/// * `settings_json` - Optional JSON value with user settings under `"poster"`
///
/// # Returns
///
/// `Ok(PosterConfig)` with the loaded configuration, or `Err` if validation fails.
///
/// # Example
///
/// ```
/// use poster::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "poster": {
///         "defaultScheme": "https",
///         "timeoutSecs": 10
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.default_scheme, "https");
/// assert_eq!(config.shell, "bash");
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<PosterConfig, ConfigError> {
    let mut config = PosterConfig::default();

    if let Some(user_settings) = settings_json.as_ref().and_then(|s| s.get(SETTINGS_KEY)) {
        match serde_json::from_value::<PosterConfig>(user_settings.clone()) {
            Ok(user_config) => config = user_config,
            Err(e) => {
                log::warn!(
                    "Failed to parse {} settings: {}. Using defaults.",
                    SETTINGS_KEY,
                    e
                );
            }
        }
    }

    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Loads configuration from a JSON settings file.
///
/// A missing file yields the defaults.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, `Parse` if it is not JSON, and
/// `Invalid` if the merged settings fail validation.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<PosterConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        log::debug!("No configuration at {}, using defaults", path.display());
        return load_config(None);
    }

    let raw = fs::read_to_string(path)?;
    let settings: Value = serde_json::from_str(&raw)?;
    load_config(Some(settings))
}
