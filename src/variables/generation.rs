//! Variable generation.
//!
//! Brings a variable's value up to date before it is substituted. Const
//! variables are never touched. Script and request variables are regenerated
//! only once their staleness timeout has elapsed.
//!
//! Request variables run another stored request, which may itself reference
//! request variables. A [`GenerationChain`] carries the (name, environment)
//! keys currently being generated down the call chain, and re-entering one of
//! them fails with [`GenerationError::CycleDetected`].

use super::jsonpath::{self, JsonPathError};
use crate::models::{Generator, HttpResponse, Variable};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::process::Command;
use thiserror::Error;

/// Errors raised while generating a variable's value.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Generation re-entered a variable already being generated.
    #[error("dependency cycle: variable {name} in {environment} depends on itself")]
    CycleDetected {
        /// Variable name
        name: String,
        /// Variable environment
        environment: String,
    },

    /// The JSONPath selected something other than a string.
    #[error("the JSONPath {path} points to a non-string value: {found}")]
    TypeMismatch {
        /// JSONPath expression
        path: String,
        /// Kind of JSON value found
        found: String,
    },

    /// The response body could not be parsed as JSON.
    #[error("response body is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The JSONPath did not select anything.
    #[error("JSONPath {path} did not match: {source}")]
    PathMiss {
        /// JSONPath expression
        path: String,
        /// Cause
        #[source]
        source: JsonPathError,
    },

    /// The script could not be started or exited unsuccessfully.
    #[error("command `{command}` failed: {reason}")]
    CommandFailed {
        /// Command line
        command: String,
        /// Exit status or spawn error, with stderr when available
        reason: String,
    },

    /// The referenced request or environment does not exist.
    #[error("{0}")]
    NotFound(#[source] StoreError),

    /// Any other store failure.
    #[error("{0}")]
    Store(#[source] StoreError),

    /// The sub-request could not be sent.
    #[error("request {request} failed: {source}")]
    Request {
        /// Name of the sub-request
        request: String,
        /// Cause
        #[source]
        source: Box<crate::error::Error>,
    },
}

impl GenerationError {
    /// Checks whether the run may continue with the variable's previous value.
    ///
    /// Only a malformed JSON body is tolerated; every other failure aborts the
    /// run.
    pub fn is_tolerated(&self) -> bool {
        matches!(self, GenerationError::MalformedJson(_))
    }
}

impl From<StoreError> for GenerationError {
    fn from(error: StoreError) -> Self {
        if error.is_not_found() {
            GenerationError::NotFound(error)
        } else {
            GenerationError::Store(error)
        }
    }
}

/// State shared by one run and every sub-request it triggers.
///
/// Tracks the (variable name, environment) keys being generated, the
/// per-invocation variable overrides, and tolerated failures from any depth.
#[derive(Debug, Default)]
pub struct GenerationChain {
    in_flight: Vec<(String, String)>,
    overrides: HashMap<String, String>,
    warnings: Vec<GenerationError>,
}

impl GenerationChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain whose runs all see `overrides`.
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        Self {
            overrides,
            ..Self::default()
        }
    }

    /// Variable values that win over every stored scope in this invocation.
    pub fn overrides(&self) -> &HashMap<String, String> {
        &self.overrides
    }

    /// Records a failure that did not abort the run.
    pub fn warn(&mut self, error: GenerationError) {
        self.warnings.push(error);
    }

    /// Returns and clears the recorded failures.
    pub fn take_warnings(&mut self) -> Vec<GenerationError> {
        std::mem::take(&mut self.warnings)
    }

    /// Marks a variable as being generated.
    ///
    /// # Errors
    ///
    /// Returns `CycleDetected` if the variable is already in flight.
    pub fn enter(&mut self, name: &str, environment: &str) -> Result<(), GenerationError> {
        if self.contains(name, environment) {
            return Err(GenerationError::CycleDetected {
                name: name.to_string(),
                environment: environment.to_string(),
            });
        }
        self.in_flight
            .push((name.to_string(), environment.to_string()));
        Ok(())
    }

    /// Removes a variable previously marked with [`enter`](Self::enter).
    pub fn exit(&mut self, name: &str, environment: &str) {
        if let Some(index) = self
            .in_flight
            .iter()
            .rposition(|(n, e)| n == name && e == environment)
        {
            self.in_flight.remove(index);
        }
    }

    /// Checks whether a variable is currently being generated.
    pub fn contains(&self, name: &str, environment: &str) -> bool {
        self.in_flight
            .iter()
            .any(|(n, e)| n == name && e == environment)
    }

    /// Returns the number of variables in flight.
    pub fn depth(&self) -> usize {
        self.in_flight.len()
    }
}

/// The side effects generation needs: running scripts and sub-requests.
pub trait GeneratorBackend {
    /// Runs a shell command and returns its standard output.
    fn run_script(&self, command: &str) -> Result<String, GenerationError>;

    /// Runs the stored request `request` in `environment`.
    ///
    /// Implementations must pass `chain` on to the generation of the
    /// sub-request's own variables.
    fn run_request(
        &mut self,
        request: &str,
        environment: &str,
        chain: &mut GenerationChain,
    ) -> Result<HttpResponse, GenerationError>;
}

/// Runs script generators through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRunner {
    shell: String,
    args: Vec<String>,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new("bash", vec!["-c".to_string()])
    }
}

impl ScriptRunner {
    /// Creates a runner invoking `shell args... command`.
    pub fn new(shell: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            shell: shell.into(),
            args,
        }
    }

    /// Runs `command` and returns its stdout without trailing newlines.
    ///
    /// # Errors
    ///
    /// Returns `CommandFailed` if the shell cannot be started or the command
    /// exits with a non-zero status.
    pub fn run(&self, command: &str) -> Result<String, GenerationError> {
        let output = Command::new(&self.shell)
            .args(&self.args)
            .arg(command)
            .output()
            .map_err(|e| GenerationError::CommandFailed {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenerationError::CommandFailed {
                command: command.to_string(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end_matches('\n')
            .to_string())
    }
}

/// Regenerates `variable` if it is stale at `now`.
///
/// On success the new value is assigned and `last_generated` is stamped.
/// On failure the variable is left unchanged.
///
/// # Returns
///
/// `Ok(true)` if a new value was generated, `Ok(false)` if the variable is
/// const or still fresh.
///
/// # Errors
///
/// Returns the script, sub-request or extraction failure, or
/// `CycleDetected` if a request variable is re-entered through `chain`.
pub fn generate<B>(
    variable: &mut Variable,
    backend: &mut B,
    chain: &mut GenerationChain,
    now: DateTime<Utc>,
) -> Result<bool, GenerationError>
where
    B: GeneratorBackend + ?Sized,
{
    if !variable.is_stale(now) {
        return Ok(false);
    }

    let value = match &variable.generator {
        Generator::Const => return Ok(false),
        Generator::Script { command } => {
            log::info!("Variable {} is stale, generating new value..", variable.name);
            backend.run_script(command)?
        }
        Generator::Request {
            request,
            environment,
            json_path,
        } => {
            log::info!("Variable {} is stale, generating new value..", variable.name);
            chain.enter(&variable.name, &variable.environment)?;
            let response = backend.run_request(request, environment, chain);
            chain.exit(&variable.name, &variable.environment);
            extract_value(&response?.body, json_path)?
        }
    };

    variable.value = value;
    variable.last_generated = Some(now);
    log::debug!("Variable {} updated to: {}", variable.name, variable.value);
    Ok(true)
}

/// Extracts a request variable's value from a response body.
///
/// An empty `json_path` yields the raw body without trailing newlines.
/// Otherwise the body is parsed as JSON and the path must select a string.
///
/// # Errors
///
/// Returns `MalformedJson`, `PathMiss` or `TypeMismatch`.
pub fn extract_value(body: &[u8], json_path: &str) -> Result<String, GenerationError> {
    if json_path.trim().is_empty() {
        return Ok(String::from_utf8_lossy(body)
            .trim_end_matches('\n')
            .to_string());
    }

    let json: JsonValue = serde_json::from_slice(body).map_err(GenerationError::MalformedJson)?;
    let selected = jsonpath::evaluate(&json, json_path).map_err(|source| GenerationError::PathMiss {
        path: json_path.to_string(),
        source,
    })?;

    match selected {
        JsonValue::String(s) => Ok(s.clone()),
        other => Err(GenerationError::TypeMismatch {
            path: json_path.to_string(),
            found: json_kind(other).to_string(),
        }),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
