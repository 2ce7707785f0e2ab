//! Data models for requests, environments, variables and responses.
//!
//! These are the entities persisted by a [`Store`](crate::store::Store) and
//! consumed by the variable engine and the executor. Validation happens here,
//! before anything reaches the persistence layer.

pub mod environment;
pub mod error;
pub mod request;
pub mod response;
pub mod template;
pub mod variable;

pub use environment::{Environment, GLOBAL_ENVIRONMENT};
pub use error::ValidationError;
pub use request::{Header, HttpMethod, Request};
pub use response::HttpResponse;
pub use variable::{Generator, Variable, VariableType};
