//! Typed parameter values produced by validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parameter value that has passed schema validation.
///
/// Enum values are carried as [`ParamValue::String`]; the schema guarantees
/// they belong to the declared set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag.
    Boolean(bool),
    /// Numeric value.
    Number(f64),
    /// String or enum literal.
    String(String),
    /// Homogeneous list of validated items.
    Array(Vec<ParamValue>),
}

impl ParamValue {
    /// Returns the string payload for string and enum values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric payload.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the array items.
    #[must_use]
    pub fn as_array(&self) -> Option<&[ParamValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns string items of an array value, skipping non-string items.
    #[must_use]
    pub fn string_items(&self) -> Vec<&str> {
        self.as_array()
            .map(|items| items.iter().filter_map(ParamValue::as_str).collect())
            .unwrap_or_default()
    }

    /// Converts the value back into JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(value) => Value::Bool(*value),
            Self::Number(value) => number_to_json(*value),
            Self::String(value) => Value::String(value.clone()),
            Self::Array(items) => Value::Array(items.iter().map(ParamValue::to_json).collect()),
        }
    }
}

/// Integral values within the exactly representable range become JSON
/// integers; everything else stays a float.
#[allow(clippy::cast_possible_truncation)]
fn number_to_json(value: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

/// Renders the value as instruction text: strings verbatim, integral numbers
/// without a fractional part, booleans as `true`/`false`, arrays comma-joined.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Names the JSON type of a raw value for error messages.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_instruction_text_rules() {
        assert_eq!(ParamValue::Number(3.0).to_string(), "3");
        assert_eq!(ParamValue::Number(0.5).to_string(), "0.5");
        assert_eq!(ParamValue::Boolean(false).to_string(), "false");
        assert_eq!(
            ParamValue::Array(vec!["a".into(), "b".into()]).to_string(),
            "a, b"
        );
    }

    #[test]
    fn json_keeps_integers_integral() {
        assert_eq!(ParamValue::Number(3.0).to_json().to_string(), "3");
        assert_eq!(ParamValue::Number(-2.0).to_json().to_string(), "-2");
        assert_eq!(ParamValue::Number(0.5).to_json().to_string(), "0.5");
        assert_eq!(ParamValue::Number(1e300).to_json().to_string(), "1e300");
    }

    #[test]
    fn string_items_filters_scalars() {
        let value = ParamValue::Array(vec!["Concise".into(), ParamValue::Number(1.0)]);
        assert_eq!(value.string_items(), ["Concise"]);
        assert!(ParamValue::Boolean(true).string_items().is_empty());
    }
}
