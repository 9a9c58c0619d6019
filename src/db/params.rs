//! Parsing of the comma-separated positional parameter list given on the command line.

use crate::models::Value;

/// Split `raw` into typed positional parameters.
///
/// Each item is trimmed, then read as `NULL`, an integer, a real, a
/// single-quoted string (quotes removed, never reinterpreted), or plain text.
pub fn parse_params(raw: Option<&str>) -> Vec<Value> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw.split(',').map(parse_value).collect(),
        _ => Vec::new(),
    }
}

fn parse_value(item: &str) -> Value {
    let item = item.trim();

    if item.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Some(quoted) = item
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return Value::Text(quoted.to_string());
    }
    if let Ok(i) = item.parse::<i64>() {
        return Value::Integer(i);
    }
    // f64 parsing also accepts words like "inf" and "NaN"; those stay text
    if item.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(r) = item.parse::<f64>() {
            return Value::Real(r);
        }
    }
    Value::Text(item.to_string())
}
