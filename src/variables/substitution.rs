//! Single-pass placeholder substitution.
//!
//! Occurrences of every known variable are located in the original input,
//! then replaced from the highest offset down so lower offsets stay valid
//! while the string changes length. Inserted values are never re-scanned:
//! a value such as `localhost::port` is kept literally.

use regex::Regex;
use std::collections::HashMap;

/// A located placeholder occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Occurrence<'a> {
    start: usize,
    end: usize,
    value: &'a str,
}

/// Replaces every `:name` placeholder in `input` whose name is in `values`.
///
/// Unknown placeholders are left verbatim. Input without a colon is returned
/// unchanged without scanning.
///
/// When two names match at the same offset (`:host` and `:host-name` in
/// `:host-name`), the longer match wins.
///
/// # Arguments
///
/// * `input` - Text containing zero or more placeholders
/// * `values` - Current value of each visible variable
///
/// # Examples
///
/// ```
/// use poster::variables::replace_variables;
/// use std::collections::HashMap;
///
/// let mut values = HashMap::new();
/// values.insert("host".to_string(), "localhost".to_string());
/// values.insert("port".to_string(), "8080".to_string());
///
/// assert_eq!(
///     replace_variables("https://:host::port", &values),
///     "https://localhost:8080"
/// );
/// ```
pub fn replace_variables(input: &str, values: &HashMap<String, String>) -> String {
    if !input.contains(':') {
        return input.to_string();
    }

    let mut occurrences = Vec::new();
    for (name, value) in values {
        let pattern = match Regex::new(&format!(r":{}\b", regex::escape(name))) {
            Ok(re) => re,
            Err(e) => {
                log::warn!("Skipping variable {:?}: {}", name, e);
                continue;
            }
        };
        occurrences.extend(pattern.find_iter(input).map(|m| Occurrence {
            start: m.start(),
            end: m.end(),
            value: value.as_str(),
        }));
    }

    if occurrences.is_empty() {
        return input.to_string();
    }

    occurrences.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    let mut output = input.to_string();
    let mut boundary = input.len();
    for occurrence in occurrences {
        if occurrence.end > boundary {
            continue;
        }
        output.replace_range(occurrence.start..occurrence.end, occurrence.value);
        boundary = occurrence.start;
    }

    output
}
