//! Lenient value parsing shared by the `GeoJSON` and CSV paths.
//!
//! Raw crash properties arrive as JSON numbers, numeric strings, strings with
//! trailing junk, or nothing at all. These helpers never fail: callers get
//! `None` and decide on the fallback.

use serde_json::Value;

/// Returns `true` for values that count as "absent" when walking an alias
/// list: `null` and blank strings.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parses a non-negative integer count.
///
/// Numbers are truncated toward zero; strings use their leading integer
/// digits (`"3 injured"` → 3, `"2.9"` → 2). Negative values clamp to 0.
#[must_use]
pub fn parse_count(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => leading_integer(s)?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(n.trunc().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Parses a non-negative float amount.
///
/// Strings use their longest leading float prefix (`"1200.5 USD"` →
/// 1200.5). Negative values clamp to 0.
#[must_use]
pub fn parse_amount(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => leading_float(s)?,
        _ => return None,
    };
    n.is_finite().then_some(n.max(0.0))
}

/// Parses a coordinate that may be a JSON number or a numeric string.
#[must_use]
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Renders a free-text value as a string. Numbers are stringified; blanks
/// and non-scalars yield `None`.
#[must_use]
pub fn parse_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Validates a coordinate pair. Returns `None` if either value is
/// non-finite or exactly zero.
#[must_use]
pub fn valid_lat_lng(latitude: f64, longitude: f64) -> Option<(f64, f64)> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    Some((latitude, longitude))
}

/// Parses the leading `[+-]digits` of a string, ignoring leading whitespace.
fn leading_integer(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse::<f64>().ok().map(|n| sign * n)
}

/// Parses the longest leading prefix of a string that is a valid float.
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .bytes()
        .position(|b| !matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'))
        .unwrap_or(s.len());
    let candidate = &s[..end];
    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
}
