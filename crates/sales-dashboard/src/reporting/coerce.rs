//! Normalization of loosely-typed gateway values into numbers.
//!
//! The RPC gateway hands back numbers, numeric strings, and nulls for the
//! same column depending on how a row was written. Everything funnels through
//! [`to_number`] so JSON dumps and CSV exports agree on the result.

use serde::de::{self, Deserializer, Visitor};
use serde_json::Value;
use std::fmt;

/// Converts `value` to a finite `f64`, returning `fallback` for nulls,
/// blanks, non-numeric strings, and non-finite numbers.
pub fn to_number(value: &Value, fallback: f64) -> f64 {
    match value {
        Value::Number(number) => number
            .as_f64()
            .filter(|parsed| parsed.is_finite())
            .unwrap_or(fallback),
        Value::String(raw) => parse_numeric(raw).unwrap_or(fallback),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => fallback,
    }
}

/// Converts `value` to a non-negative count. Fractions truncate toward zero
/// and negatives clamp to zero.
pub fn to_count(value: &Value, fallback: u32) -> u32 {
    let parsed = to_number(value, f64::NAN);
    if parsed.is_nan() {
        fallback
    } else {
        clamp_count(parsed)
    }
}

fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

fn clamp_count(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= u32::MAX as f64 {
        u32::MAX
    } else {
        value.trunc() as u32
    }
}

/// Lenient `Option<u32>` field: blanks and garbage become `None`.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = deserializer.deserialize_any(LenientNumberVisitor)?;
    Ok(parsed.map(clamp_count))
}

/// Lenient `Option<f64>` field: blanks and garbage become `None`.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientNumberVisitor)
}

/// Optional text column where an empty string means absent.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

/// Lenient boolean column: accepts booleans, `"true"`/`"false"`, `"1"`/`"0"`
/// and treats null or blank as `true` so producers default to active.
pub fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = serde::Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(raw) => !matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "false" | "0" | "no" | "n"
        ),
        _ => true,
    })
}

struct LenientNumberVisitor;

impl<'de> Visitor<'de> for LenientNumberVisitor {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, numeric string, or null")
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value as f64))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Some(value).filter(|parsed| parsed.is_finite()))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(parse_numeric(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LenientNumberVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_pass_through() {
        assert_eq!(to_number(&json!(12.5), 0.0), 12.5);
        assert_eq!(to_number(&json!(" 42 "), 0.0), 42.0);
        assert_eq!(to_number(&json!("-3.25"), 0.0), -3.25);
    }

    #[test]
    fn nulls_blanks_and_garbage_use_fallback() {
        assert_eq!(to_number(&Value::Null, 7.0), 7.0);
        assert_eq!(to_number(&json!(""), 7.0), 7.0);
        assert_eq!(to_number(&json!("n/a"), 7.0), 7.0);
        assert_eq!(to_number(&json!("NaN"), 7.0), 7.0);
        assert_eq!(to_number(&json!(true), 7.0), 7.0);
        assert_eq!(to_number(&json!([1]), 7.0), 7.0);
    }

    #[test]
    fn counts_truncate_and_clamp() {
        assert_eq!(to_count(&json!(2.9), 0), 2);
        assert_eq!(to_count(&json!("-4"), 0), 0);
        assert_eq!(to_count(&json!("abc"), 3), 3);
        assert_eq!(to_count(&Value::Null, 0), 0);
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_count")]
        lines: Option<u32>,
        #[serde(default, deserialize_with = "lenient_amount")]
        premium: Option<f64>,
        #[serde(default, deserialize_with = "blank_as_none")]
        zip: Option<String>,
        #[serde(default = "default_active", deserialize_with = "lenient_flag")]
        active: bool,
    }

    fn default_active() -> bool {
        true
    }

    #[test]
    fn lenient_fields_accept_strings_and_nulls() {
        let row: Row = serde_json::from_value(json!({
            "lines": "2",
            "premium": null,
            "zip": "  ",
            "active": "false"
        }))
        .expect("row decodes");
        assert_eq!(row.lines, Some(2));
        assert_eq!(row.premium, None);
        assert_eq!(row.zip, None);
        assert!(!row.active);

        let row: Row = serde_json::from_value(json!({ "premium": "1250.75", "zip": "50309" }))
            .expect("row decodes");
        assert_eq!(row.lines, None);
        assert_eq!(row.premium, Some(1250.75));
        assert_eq!(row.zip.as_deref(), Some("50309"));
        assert!(row.active);
    }
}
