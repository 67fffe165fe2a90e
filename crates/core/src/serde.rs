//! Serde helper functions for CMS settings deserialization.
//!
//! Module settings are stored the way the admin form posted them: checkboxes
//! come back as `1`, `"1"`, `"on"`, `""` or `null`, text fields may hold
//! numbers, and cleared text fields are empty strings rather than missing.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum FormValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Deserialize a checkbox value. Missing, `null`, `0`, `""`, `"0"`, `"false"`
/// and `"off"` are unchecked; everything else is checked.
pub fn deserialize_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<FormValue> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => false,
        Some(FormValue::Bool(b)) => b,
        Some(FormValue::Int(n)) => n != 0,
        Some(FormValue::Float(n)) => n != 0.0,
        Some(FormValue::Text(s)) => parse_checkbox(&s),
    })
}

/// Interpret a textual checkbox value.
pub fn parse_checkbox(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "off" | "no"
    )
}

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserialize a text field that may have been stored as a number.
/// Empty strings become None.
pub fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<FormValue> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(FormValue::Bool(b)) => Some(b.to_string()),
        Some(FormValue::Int(n)) => Some(n.to_string()),
        Some(FormValue::Float(n)) => Some(n.to_string()),
        Some(FormValue::Text(s)) => Some(s).filter(|s| !s.trim().is_empty()),
    })
}
