//! Generic map and type utilities for dynamically-typed configuration trees.
//!
//! Frontmatter and import fragments parse into `serde_json::Value` maps
//! (key order preserved via the `preserve_order` feature). These helpers are
//! the single sanctioned access layer over those trees: a missing key or a
//! type mismatch resolves to the caller-supplied fallback and is logged,
//! never raised.

use serde_json::{Map, Value};
use tracing::debug;

/// Parse a numeric value to `i64`.
///
/// Signed integers pass through. Unsigned values above `i64::MAX` fail
/// rather than wrap. Floating-point values truncate toward zero and always
/// succeed; a dropped fractional part is logged.
pub fn parse_int_value(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(n) => n,
        _ => return None,
    };
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    if let Some(u) = number.as_u64() {
        // Only reachable when the value does not fit in i64.
        debug!("u64 value {u} exceeds max i64 value, conversion fails");
        return None;
    }
    let f = number.as_f64()?;
    let truncated = f.trunc() as i64;
    if f != f.trunc() {
        debug!("float value {f} truncated to integer {truncated}");
    }
    Some(truncated)
}

/// Whether a value represents an empty or absent state.
///
/// Absent and null are empty. A string is empty when blank after trimming.
/// Numbers are empty when exactly zero, booleans when false, collections
/// when they hold no elements.
pub fn is_empty_or_nil(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i == 0
            } else if let Some(u) = n.as_u64() {
                u == 0
            } else {
                n.as_f64().map(|f| f == 0.0).unwrap_or(false)
            }
        }
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

/// Build a new map holding every entry of `source` whose key is not in
/// `exclude_keys`. The source map is left unmodified.
pub fn filter_map_keys(source: &Map<String, Value>, exclude_keys: &[&str]) -> Map<String, Value> {
    source
        .iter()
        .filter(|(key, _)| !exclude_keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extract a string field, falling back when the source is absent, the key
/// is missing, or the stored value is not a string.
pub fn get_map_field_as_string(
    source: Option<&Map<String, Value>>,
    key: &str,
    fallback: &str,
) -> String {
    let Some(map) = source else {
        return fallback.to_string();
    };
    let Some(value) = map.get(key) else {
        return fallback.to_string();
    };
    match value {
        Value::String(s) => s.clone(),
        other => {
            debug!(
                "type mismatch for key '{key}': expected string, found {}",
                value_type_name(other)
            );
            fallback.to_string()
        }
    }
}

/// Extract a nested map field. Returns `None` when the field cannot be
/// read as a map.
pub fn get_map_field_as_map<'a>(
    source: Option<&'a Map<String, Value>>,
    key: &str,
) -> Option<&'a Map<String, Value>> {
    let value = source?.get(key)?;
    match value {
        Value::Object(inner) => Some(inner),
        other => {
            debug!(
                "type mismatch for key '{key}': expected object, found {}",
                value_type_name(other)
            );
            None
        }
    }
}

/// Extract a boolean field with fallback semantics matching
/// [`get_map_field_as_string`].
pub fn get_map_field_as_bool(
    source: Option<&Map<String, Value>>,
    key: &str,
    fallback: bool,
) -> bool {
    let Some(map) = source else {
        return fallback;
    };
    let Some(value) = map.get(key) else {
        return fallback;
    };
    match value {
        Value::Bool(b) => *b,
        other => {
            debug!(
                "type mismatch for key '{key}': expected bool, found {}",
                value_type_name(other)
            );
            fallback
        }
    }
}

/// Extract an integer field, accepting any numeric representation that
/// [`parse_int_value`] can coerce.
pub fn get_map_field_as_int(
    source: Option<&Map<String, Value>>,
    key: &str,
    fallback: i64,
) -> i64 {
    let Some(map) = source else {
        return fallback;
    };
    let Some(value) = map.get(key) else {
        return fallback;
    };
    match parse_int_value(value) {
        Some(i) => i,
        None => {
            debug!(
                "failed to convert key '{key}' to int: got {}",
                value_type_name(value)
            );
            fallback
        }
    }
}
