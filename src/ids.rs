//! Identifier normalization and request correlation ids.
//!
//! Every client-supplied name that reaches the dispatch layer (action names,
//! user identifiers) is first normalized through [`to_id`] into the canonical
//! lowercase alphanumeric form. Normalization is total: any JSON value maps to
//! a (possibly empty) identifier string, so downstream code never needs to
//! handle a malformed name.

use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Strongly typed request identifier backed by ULID.
///
/// Correlates the log lines emitted while one request moves through body
/// extraction, dispatch and response serialization.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive the canonical identifier for an arbitrary JSON value.
///
/// An object is first replaced by its truthy `id` field, or failing that its
/// truthy `userid` field. A value that is then neither a string nor a number
/// yields the empty string. Everything else is stringified, lowercased, and
/// stripped of every character outside `[a-z0-9]`.
///
/// The result is idempotent: `to_id` of an already-normalized identifier
/// returns it unchanged.
pub fn to_id(value: &Value) -> String {
    let mut value = value;
    if let Some(id) = value.get("id").filter(|v| is_truthy(v)) {
        value = id;
    } else if let Some(userid) = value.get("userid").filter(|v| is_truthy(v)) {
        value = userid;
    }
    match value {
        Value::String(s) => collapse(s),
        Value::Number(n) => collapse(&n.to_string()),
        _ => String::new(),
    }
}

/// [`to_id`] for a plain string, skipping the JSON wrapping.
pub fn to_id_str(text: &str) -> String {
    collapse(text)
}

fn collapse(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

// JavaScript-style truthiness: null, false, 0 and "" are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
