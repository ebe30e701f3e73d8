//! Lenient conversions from loosely typed operator settings.
//!
//! Every helper returns `None` for input it cannot make sense of, leaving the
//! caller to fall back to its default.

use serde_json::Value;

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Non-negative integer; negative numbers and garbage yield `None`.
pub fn to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

pub fn clamp_u64(value: &Value, min: u64, max: u64) -> Option<u64> {
    to_u64(value).map(|v| v.clamp(min, max))
}

/// Accepts a JSON array of strings or a single string split on newlines and commas.
pub fn to_string_list(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Value::String(s) => s.split(['\n', ',']).map(str::to_string).collect(),
        _ => return None,
    };

    Some(
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

/// Case-insensitive match against an allow-list.
pub fn to_choice(value: &Value, allowed: &[&'static str]) -> Option<&'static str> {
    let raw = value.as_str()?.trim().to_lowercase();
    allowed.iter().copied().find(|a| *a == raw)
}
