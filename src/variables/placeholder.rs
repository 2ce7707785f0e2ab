//! Placeholder grammar.
//!
//! A placeholder is a colon followed by one or more word characters or
//! hyphens, ending on a word boundary: `:host`, `:api-key`, `:user_id`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Cached regex matching a `:name` placeholder; group 1 is the name.
pub static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([\w-]+)\b").expect("Failed to compile placeholder regex"));

/// Checks whether `name` is a valid variable name.
///
/// A name is valid when `:name` is matched by [`PLACEHOLDER_REGEX`] in full.
/// `api-key` is valid. `api-` is not, because the match stops before the
/// trailing hyphen.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let candidate = format!(":{}", name);
    PLACEHOLDER_REGEX
        .find(&candidate)
        .map(|m| m.start() == 0 && m.end() == candidate.len())
        .unwrap_or(false)
}

/// Returns the names of all placeholders in `text`, in first-occurrence order.
///
/// Each name appears once even if it is referenced several times.
pub fn find_placeholder_names(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}
