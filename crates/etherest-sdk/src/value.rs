//! Rendering helpers for loosely typed parameter values

use serde_json::Value;

/// Render a value the way it appears inside an encoded path segment.
///
/// Strings are inserted raw, arrays become their elements joined with `,`,
/// objects fall back to compact JSON. No escaping is applied.
pub fn plain_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(plain_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Whether a value counts as "set": `null`, `false`, `0` and `""` do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
