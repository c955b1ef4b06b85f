//! Coercion helpers for loosely-typed backend JSON.
//!
//! Lookups take a list of JSON pointers (`"/customer/name"`) tried in order;
//! the first one holding a usable value wins.

use serde_json::Value;

/// First pointer whose value is present and not `null`.
pub fn first_present<'a>(v: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .filter_map(|p| v.pointer(p))
        .find(|x| !x.is_null())
}

/// First pointer holding a non-blank string or a number (stringified).
pub fn text_at(v: &Value, pointers: &[&str]) -> Option<String> {
    for pointer in pointers {
        match v.pointer(pointer) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// Numeric cast in the spirit of a dynamic-language `Number(x)`:
/// numbers pass through, numeric strings parse, booleans are 1/0, and
/// everything else (including non-finite results) becomes 0.
pub fn to_number(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Coerced number at the first present pointer, `None` if no pointer is present.
pub fn number_at(v: &Value, pointers: &[&str]) -> Option<f64> {
    first_present(v, pointers).map(to_number)
}

/// Clamp to a finite, non-negative amount.
pub fn non_negative(n: f64) -> f64 {
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}
