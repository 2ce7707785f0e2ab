//! Variable model.
//!
//! A variable is identified by the pair (name, environment). Its value is
//! either constant or produced by a [`Generator`]: a shell command, or the
//! response of another stored request.

use super::ValidationError;
use crate::variables::placeholder::is_valid_name;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a variable, without its generator payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Value is stored verbatim and never regenerated
    Const,
    /// Value is the standard output of a shell command
    Script,
    /// Value is extracted from the response of another request
    Request,
}

impl VariableType {
    /// Returns the lower-case name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Const => "const",
            VariableType::Script => "script",
            VariableType::Request => "request",
        }
    }
}

impl FromStr for VariableType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "const" => Ok(VariableType::Const),
            "script" => Ok(VariableType::Script),
            "request" => Ok(VariableType::Request),
            _ => Err(ValidationError::InvalidType(s.to_string())),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy that produces a variable's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Generator {
    /// No generation; the stored value is used as-is.
    Const,

    /// Run `command` through the configured shell and capture stdout.
    Script {
        /// Shell command line
        command: String,
    },

    /// Run another request and read its response.
    Request {
        /// Name of the request to run
        request: String,
        /// Environment to run it in
        environment: String,
        /// JSONPath into the response body; empty means the raw body
        #[serde(default)]
        json_path: String,
    },
}

impl Generator {
    /// Returns the variable type this generator corresponds to.
    pub fn kind(&self) -> VariableType {
        match self {
            Generator::Const => VariableType::Const,
            Generator::Script { .. } => VariableType::Script,
            Generator::Request { .. } => VariableType::Request,
        }
    }
}

/// A named value scoped to one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name, referenced in text as `:name`.
    pub name: String,

    /// Current value.
    #[serde(default)]
    pub value: String,

    /// Name of the environment this variable belongs to.
    pub environment: String,

    /// How the value is produced.
    pub generator: Generator,

    /// Minimum number of minutes between regenerations.
    #[serde(default)]
    pub timeout_minutes: i64,

    /// When the value was last generated, if ever.
    #[serde(default)]
    pub last_generated: Option<DateTime<Utc>>,
}

impl Variable {
    /// Creates a constant variable.
    pub fn constant(
        name: impl Into<String>,
        value: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            environment: environment.into(),
            generator: Generator::Const,
            timeout_minutes: 0,
            last_generated: None,
        }
    }

    /// Creates a script variable with an empty value.
    pub fn script(
        name: impl Into<String>,
        command: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            environment: environment.into(),
            generator: Generator::Script {
                command: command.into(),
            },
            timeout_minutes: 0,
            last_generated: None,
        }
    }

    /// Creates a request variable with an empty value.
    ///
    /// # Arguments
    ///
    /// * `name` - Variable name
    /// * `request` - Name of the request whose response provides the value
    /// * `request_environment` - Environment the request runs in
    /// * `json_path` - JSONPath into the response; empty for the raw body
    /// * `environment` - Environment the variable belongs to
    pub fn from_request(
        name: impl Into<String>,
        request: impl Into<String>,
        request_environment: impl Into<String>,
        json_path: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            environment: environment.into(),
            generator: Generator::Request {
                request: request.into(),
                environment: request_environment.into(),
                json_path: json_path.into(),
            },
            timeout_minutes: 0,
            last_generated: None,
        }
    }

    /// Sets the staleness timeout and returns the variable.
    pub fn with_timeout(mut self, minutes: i64) -> Self {
        self.timeout_minutes = minutes;
        self
    }

    /// Returns the variable's type.
    pub fn kind(&self) -> VariableType {
        self.generator.kind()
    }

    /// Checks whether the value must be regenerated at `now`.
    ///
    /// Const variables are never stale. Others are stale when they were never
    /// generated or when at least `timeout_minutes` have passed since the last
    /// generation. A timeout too large to represent never expires.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        if self.kind() == VariableType::Const {
            return false;
        }
        match (self.last_generated, Duration::try_minutes(self.timeout_minutes)) {
            (None, _) => true,
            (Some(last), Some(timeout)) => now - last >= timeout,
            (Some(_), None) => false,
        }
    }

    /// Validates the variable before it is saved.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if `:name` does not match the placeholder grammar,
    /// and `InvalidGenerator` if the generator is missing a required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_name(&self.name) {
            return Err(ValidationError::InvalidName(self.name.clone()));
        }
        if self.timeout_minutes < 0 {
            return Err(ValidationError::InvalidGenerator(format!(
                "negative timeout for {}",
                self.name
            )));
        }
        if Duration::try_minutes(self.timeout_minutes).is_none() {
            return Err(ValidationError::InvalidGenerator(format!(
                "timeout out of range for {}",
                self.name
            )));
        }
        match &self.generator {
            Generator::Const => Ok(()),
            Generator::Script { command } if command.trim().is_empty() => Err(
                ValidationError::InvalidGenerator("script command is empty".to_string()),
            ),
            Generator::Script { .. } => Ok(()),
            Generator::Request {
                request,
                environment,
                ..
            } => {
                if request.is_empty() {
                    Err(ValidationError::InvalidGenerator(
                        "request name is empty".to_string(),
                    ))
                } else if environment.is_empty() {
                    Err(ValidationError::InvalidGenerator(
                        "request environment is empty".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}
