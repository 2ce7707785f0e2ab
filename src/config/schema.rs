//! Configuration schema.
//!
//! Every field has a default, so an empty settings object is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// User-configurable settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterConfig {
    /// Path of the JSON store document.
    ///
    /// Defaults to `$HOME/.config/poster/store.json`.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Shell used to run script generators. Defaults to `bash`.
    ///
    /// Must not be empty.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Arguments passed to the shell before the command. Defaults to `["-c"]`.
    #[serde(default = "default_shell_args")]
    pub shell_args: Vec<String>,

    /// Scheme added to URLs that have none. Defaults to `http`.
    ///
    /// Must be `http` or `https`.
    #[serde(default = "default_scheme")]
    pub default_scheme: String,

    /// HTTP timeout in seconds. Unset means the client default.
    ///
    /// Must be greater than 0 when set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            shell: default_shell(),
            shell_args: default_shell_args(),
            default_scheme: default_scheme(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl PosterConfig {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive message.
    pub fn validate(&self) -> Result<(), String> {
        if self.shell.trim().is_empty() {
            return Err("shell must not be empty".to_string());
        }

        if self.default_scheme != "http" && self.default_scheme != "https" {
            return Err(format!(
                "defaultScheme must be http or https, got {:?}",
                self.default_scheme
            ));
        }

        if self.timeout_secs == Some(0) {
            return Err("timeoutSecs must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Returns the HTTP timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_store_path() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_else(|| ".".into());
    PathBuf::from(home)
        .join(".config")
        .join("poster")
        .join("store.json")
}

fn default_shell() -> String {
    "bash".to_string()
}

fn default_shell_args() -> Vec<String> {
    vec!["-c".to_string()]
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_user_agent() -> String {
    format!("poster/{}", env!("CARGO_PKG_VERSION"))
}
