//! Starter templates for each resource kind.
//!
//! The CLI prints these as JSON so users can copy, edit and create resources
//! from them.

use super::{Environment, HttpMethod, Request, Variable};

/// Environment used by every template.
const TEMPLATE_ENVIRONMENT: &str = "local";

/// Returns a request template.
pub fn request_template() -> Request {
    Request::new(
        "request-template",
        HttpMethod::GET,
        "http://localhost",
        TEMPLATE_ENVIRONMENT,
    )
    .with_header("Content-Type", "application/json")
}

/// Returns an environment template.
pub fn environment_template() -> Environment {
    Environment::new("environment-template")
}

/// Returns a const variable template.
pub fn const_variable_template() -> Variable {
    Variable::constant("const-variable-template", "value", TEMPLATE_ENVIRONMENT)
}

/// Returns a script variable template.
pub fn script_variable_template() -> Variable {
    Variable::script(
        "script-variable-template",
        "date +'%D %T'",
        TEMPLATE_ENVIRONMENT,
    )
}

/// Returns a request variable template.
pub fn request_variable_template() -> Variable {
    Variable::from_request(
        "request-variable-template",
        "request-name",
        "environment-name",
        "$",
        TEMPLATE_ENVIRONMENT,
    )
}
