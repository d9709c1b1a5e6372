//! Declarative parameter schemas.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::value::{ParamValue, json_type_name};

/// Declared type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Free-form text.
    String,
    /// Floating point or integer number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// One string out of a declared set.
    Enum,
    /// List of items, optionally typed by an [`ItemSchema`].
    Array,
}

impl ParameterKind {
    /// Lowercase name used in messages and the definition format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional constraints shared by parameters and array items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// Allowed literals for enum parameters, in declaration order.
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    /// Inclusive numeric lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive numeric upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Minimum string length (characters) or array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum string length (characters) or array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression a string value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Schema applied to each array item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ItemSchema>>,
}

/// Schema for the items of an array parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSchema {
    /// Item type.
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    /// Item constraints.
    #[serde(flatten)]
    pub constraints: Constraints,
}

impl ItemSchema {
    /// Creates an unconstrained item schema.
    #[must_use]
    pub fn new(kind: ParameterKind) -> Self {
        Self {
            kind,
            constraints: Constraints::default(),
        }
    }

    /// Restricts enum items to the supplied literals.
    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.allowed = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Describes a single decorator parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSchema {
    name: String,
    #[serde(rename = "type")]
    kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(default)]
    required: bool,
    #[serde(flatten)]
    constraints: Constraints,
}

impl ParameterSchema {
    /// Creates an optional, unconstrained parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            default: None,
            required: false,
            constraints: Constraints::default(),
        }
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares the allowed enum literals.
    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.allowed = values.into_iter().map(Into::into).collect();
        self
    }

    /// Declares inclusive numeric bounds.
    #[must_use]
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.constraints.min = min;
        self.constraints.max = max;
        self
    }

    /// Declares inclusive length bounds for strings or arrays.
    #[must_use]
    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.constraints.min_length = min;
        self.constraints.max_length = max;
        self
    }

    /// Declares a regular expression for string values.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    /// Declares the schema for array items.
    #[must_use]
    pub fn with_items(mut self, items: ItemSchema) -> Self {
        self.constraints.items = Some(Box::new(items));
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind.
    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Raw default value, if declared.
    #[must_use]
    pub fn default_raw(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the parameter must be supplied (or defaulted).
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Declared constraints.
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Allowed enum literals, empty for non-enum parameters.
    #[must_use]
    pub fn allowed_values(&self) -> &[String] {
        &self.constraints.allowed
    }

    /// Validates `value` against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] describing why the value does not
    /// satisfy the declared type or constraints.
    pub fn validate(&self, decorator: &str, value: &Value) -> ValidationResult<ParamValue> {
        check(self.kind, &self.constraints, value)
            .map_err(|violation| violation.into_error(decorator, &self.name))
    }

    /// Returns the validated default value, if one is declared.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the declared default violates the
    /// schema.
    pub fn default_value(&self, decorator: &str) -> ValidationResult<Option<ParamValue>> {
        self.default
            .as_ref()
            .map(|value| self.validate(decorator, value))
            .transpose()
    }

    /// Checks that the schema is internally consistent: enum parameters list
    /// at least one value, bounds are ordered, patterns compile, and the
    /// default satisfies the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSchema`] for structural defects or the
    /// default's own validation error.
    pub fn check_consistency(&self, decorator: &str) -> ValidationResult<()> {
        if let Err(reason) = check_constraints(self.kind, &self.constraints) {
            return Err(ValidationError::InvalidSchema {
                decorator: decorator.to_owned(),
                parameter: self.name.clone(),
                reason,
            });
        }
        self.default_value(decorator).map(|_| ())
    }
}

/// Compiled `pattern` constraints, keyed by source text.
static PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(|| RwLock::new(HashMap::new()));

fn compiled(pattern: &str) -> Result<Regex, String> {
    if let Some(regex) = PATTERNS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(pattern)
    {
        return Ok(regex.clone());
    }
    let regex =
        Regex::new(pattern).map_err(|err| format!("pattern `{pattern}` does not compile: {err}"))?;
    PATTERNS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(pattern.to_owned(), regex.clone());
    Ok(regex)
}

fn check_constraints(kind: ParameterKind, constraints: &Constraints) -> Result<(), String> {
    if kind == ParameterKind::Enum && constraints.allowed.is_empty() {
        return Err("enum parameter must declare at least one value".into());
    }
    if let (Some(min), Some(max)) = (constraints.min, constraints.max) {
        if min > max {
            return Err(format!("min {min} exceeds max {max}"));
        }
    }
    if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
        if min > max {
            return Err(format!("minLength {min} exceeds maxLength {max}"));
        }
    }
    if let Some(pattern) = &constraints.pattern {
        compiled(pattern)?;
    }
    if let Some(items) = &constraints.items {
        if kind != ParameterKind::Array {
            return Err("only array parameters may declare items".into());
        }
        check_constraints(items.kind, &items.constraints)?;
    }
    Ok(())
}

/// Constraint failure before it is attributed to a decorator and parameter.
#[derive(Debug)]
enum Violation {
    Type {
        expected: ParameterKind,
        actual: &'static str,
    },
    Enum {
        value: String,
        allowed: Vec<String>,
    },
    Range {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    StringLength {
        len: usize,
        min: Option<usize>,
        max: Option<usize>,
    },
    ArrayLength {
        len: usize,
        min: Option<usize>,
        max: Option<usize>,
    },
    Pattern {
        value: String,
        pattern: String,
    },
    BadSchema(String),
    Item {
        index: usize,
        reason: Box<Violation>,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { expected, actual } => write!(f, "expected {expected}, got {actual}"),
            Self::Enum { value, allowed } => {
                write!(f, "`{value}` is not one of {}", allowed.join(", "))
            }
            Self::Range { value, .. } => write!(f, "{value} is out of range"),
            Self::StringLength { len, .. } => write!(f, "length {len} is out of range"),
            Self::ArrayLength { len, .. } => write!(f, "{len} items is out of range"),
            Self::Pattern { value, pattern } => write!(f, "`{value}` does not match `{pattern}`"),
            Self::BadSchema(reason) => f.write_str(reason),
            Self::Item { index, reason } => write!(f, "item {index}: {reason}"),
        }
    }
}

impl Violation {
    fn into_error(self, decorator: &str, parameter: &str) -> ValidationError {
        let decorator = decorator.to_owned();
        let parameter = parameter.to_owned();
        match self {
            Self::Type { expected, actual } => ValidationError::TypeMismatch {
                decorator,
                parameter,
                expected: expected.to_string(),
                actual: actual.to_owned(),
            },
            Self::Enum { value, allowed } => ValidationError::InvalidEnumValue {
                decorator,
                parameter,
                value,
                allowed,
            },
            Self::Range { value, min, max } => ValidationError::OutOfRange {
                decorator,
                parameter,
                value,
                min,
                max,
            },
            Self::StringLength { len, min, max } => ValidationError::InvalidStringLength {
                decorator,
                parameter,
                len,
                min,
                max,
            },
            Self::ArrayLength { len, min, max } => ValidationError::InvalidArrayLength {
                decorator,
                parameter,
                len,
                min,
                max,
            },
            Self::Pattern { value, pattern } => ValidationError::PatternMismatch {
                decorator,
                parameter,
                value,
                pattern,
            },
            Self::BadSchema(reason) => ValidationError::InvalidSchema {
                decorator,
                parameter,
                reason,
            },
            Self::Item { index, reason } => ValidationError::InvalidArrayItem {
                decorator,
                parameter,
                index,
                reason: reason.to_string(),
            },
        }
    }
}

fn outside<T: PartialOrd + Copy>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max)
}

fn check(kind: ParameterKind, constraints: &Constraints, value: &Value) -> Result<ParamValue, Violation> {
    let mismatch = || Violation::Type {
        expected: kind,
        actual: json_type_name(value),
    };

    match kind {
        ParameterKind::Boolean => value.as_bool().map(ParamValue::Boolean).ok_or_else(mismatch),
        ParameterKind::Number => {
            let number = value.as_f64().ok_or_else(mismatch)?;
            if outside(number, constraints.min, constraints.max) {
                return Err(Violation::Range {
                    value: number,
                    min: constraints.min,
                    max: constraints.max,
                });
            }
            Ok(ParamValue::Number(number))
        }
        ParameterKind::Enum => {
            let literal = value.as_str().ok_or_else(mismatch)?;
            if constraints.allowed.iter().any(|allowed| allowed == literal) {
                Ok(ParamValue::String(literal.to_owned()))
            } else {
                Err(Violation::Enum {
                    value: literal.to_owned(),
                    allowed: constraints.allowed.clone(),
                })
            }
        }
        ParameterKind::String => {
            let text = value.as_str().ok_or_else(mismatch)?;
            let len = text.chars().count();
            if outside(len, constraints.min_length, constraints.max_length) {
                return Err(Violation::StringLength {
                    len,
                    min: constraints.min_length,
                    max: constraints.max_length,
                });
            }
            if let Some(pattern) = &constraints.pattern {
                let regex = compiled(pattern).map_err(Violation::BadSchema)?;
                if !regex.is_match(text) {
                    return Err(Violation::Pattern {
                        value: text.to_owned(),
                        pattern: pattern.clone(),
                    });
                }
            }
            Ok(ParamValue::String(text.to_owned()))
        }
        ParameterKind::Array => {
            let items = value.as_array().ok_or_else(mismatch)?;
            if outside(items.len(), constraints.min_length, constraints.max_length) {
                return Err(Violation::ArrayLength {
                    len: items.len(),
                    min: constraints.min_length,
                    max: constraints.max_length,
                });
            }
            items
                .iter()
                .enumerate()
                .map(|(index, item)| match &constraints.items {
                    Some(schema) => check(schema.kind, &schema.constraints, item).map_err(|reason| {
                        Violation::Item {
                            index,
                            reason: Box::new(reason),
                        }
                    }),
                    None => untyped_item(item).ok_or(Violation::Item {
                        index,
                        reason: Box::new(Violation::Type {
                            expected: ParameterKind::String,
                            actual: json_type_name(item),
                        }),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::Array)
        }
    }
}

/// Converts an array item when no item schema is declared; nested objects
/// and nulls have no instruction-text form and are rejected.
fn untyped_item(item: &Value) -> Option<ParamValue> {
    match item {
        Value::Bool(flag) => Some(ParamValue::Boolean(*flag)),
        Value::Number(number) => number.as_f64().map(ParamValue::Number),
        Value::String(text) => Some(ParamValue::String(text.clone())),
        Value::Array(nested) => nested
            .iter()
            .map(untyped_item)
            .collect::<Option<Vec<_>>>()
            .map(ParamValue::Array),
        Value::Null | Value::Object(_) => None,
    }
}
