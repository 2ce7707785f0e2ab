//! Minimal JSONPath evaluation for request-variable extraction.
//!
//! Supports the subset used to pull a single value out of a response body:
//! the root (`$`), dotted fields (`$.user.name`), quoted bracket fields
//! (`$['content-type']`) and array indices (`$.items[0].id`).

use serde_json::Value as JsonValue;
use thiserror::Error;

/// A JSONPath that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonPathError {
    /// The expression itself is malformed
    #[error("invalid JSONPath: {0}")]
    Syntax(String),
    /// The expression is well-formed but selects nothing
    #[error("{0}")]
    Missing(String),
}

/// Represents a segment in a JSONPath expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    /// Object field access (e.g., "user", "name")
    Field(String),

    /// Array index access (e.g., [0], [5])
    ArrayIndex(usize),
}

/// Evaluates a JSONPath expression against a JSON value.
///
/// # Arguments
///
/// * `json` - The JSON value to query
/// * `path` - JSONPath expression, with or without the leading `$`
///
/// # Returns
///
/// A reference to the selected value, or an error if the path is malformed
/// or selects nothing.
pub fn evaluate<'a>(json: &'a JsonValue, path: &str) -> Result<&'a JsonValue, JsonPathError> {
    let path = path.trim();
    let path = path.strip_prefix('$').unwrap_or(path);

    let mut current = json;
    for segment in parse_segments(path)? {
        current = match segment {
            PathSegment::Field(name) => current
                .get(&name)
                .ok_or_else(|| JsonPathError::Missing(format!("field '{}' not found", name)))?,
            PathSegment::ArrayIndex(index) => current.get(index).ok_or_else(|| {
                JsonPathError::Missing(format!("array index {} out of bounds", index))
            })?,
        };
    }

    Ok(current)
}

/// Parses a JSONPath (without the leading `$`) into segments.
///
/// - "user.name" -> [Field("user"), Field("name")]
/// - "items[0].id" -> [Field("items"), ArrayIndex(0), Field("id")]
/// - "['a.b']" -> [Field("a.b")]
fn parse_segments(path: &str) -> Result<Vec<PathSegment>, JsonPathError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Field(std::mem::take(&mut current)));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Field(std::mem::take(&mut current)));
                }

                let mut inner = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(next);
                }
                if !closed {
                    return Err(JsonPathError::Syntax(format!("unclosed '[' in {}", path)));
                }

                let inner = inner.trim();
                let quoted = inner
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')));
                match quoted {
                    Some(field) => segments.push(PathSegment::Field(field.to_string())),
                    None => {
                        let index = inner.parse::<usize>().map_err(|_| {
                            JsonPathError::Syntax(format!("invalid array index '{}'", inner))
                        })?;
                        segments.push(PathSegment::ArrayIndex(index));
                    }
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(PathSegment::Field(current));
    }

    Ok(segments)
}
