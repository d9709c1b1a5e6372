//! Validation error taxonomy.

use std::fmt;

use thiserror::Error;

/// Result alias for single-parameter validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn format_bounds(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("[{min}, {max}]"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => "any".to_owned(),
    }
}

fn format_len_bounds(min: Option<usize>, max: Option<usize>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("[{min}, {max}]"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => "any".to_owned(),
    }
}

/// A single parameter validation failure.
///
/// Every variant names the decorator and parameter so the message can be
/// shown to the caller as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required parameter was absent and has no default.
    #[error("{decorator}: missing required parameter `{parameter}`")]
    MissingRequiredParameter {
        /// Decorator being bound.
        decorator: String,
        /// Missing parameter.
        parameter: String,
    },

    /// The value's type does not match the declared kind.
    #[error("{decorator}: parameter `{parameter}` expects {expected}, got {actual}")]
    TypeMismatch {
        /// Decorator being bound.
        decorator: String,
        /// Offending parameter.
        parameter: String,
        /// Declared type.
        expected: String,
        /// Type that was supplied.
        actual: String,
    },

    /// An enum value outside the allowed set.
    #[error("{decorator}: parameter `{parameter}` does not accept `{value}` (allowed: {})", allowed.join(", "))]
    InvalidEnumValue {
        /// Decorator being bound.
        decorator: String,
        /// Offending parameter.
        parameter: String,
        /// Supplied value.
        value: String,
        /// Declared values in order.
        allowed: Vec<String>,
    },

    /// A number outside its declared bounds.
    #[error("{decorator}: parameter `{parameter}` value {value} is outside {}", format_bounds(*min, *max))]
    OutOfRange {
        /// Decorator being bound.
        decorator: String,
        /// Offending parameter.
        parameter: String,
        /// Supplied value.
        value: f64,
        /// Inclusive lower bound.
        min: Option<f64>,
        /// Inclusive upper bound.
        max: Option<f64>,
    },

    /// An array with too few or too many items.
    #[error("{decorator}: parameter `{parameter}` has {len} items, expected {}", format_len_bounds(*min, *max))]
    InvalidArrayLength {
        /// Decorator being bound.
        decorator: String,
        /// Offending parameter.
        parameter: String,
        /// Supplied length.
        len: usize,
        /// Inclusive lower bound.
        min: Option<usize>,
        /// Inclusive upper bound.
        max: Option<usize>,
    },

    /// An array item that fails the item schema.
    #[error("{decorator}: parameter `{parameter}` item {index} is invalid: {reason}")]
    InvalidArrayItem {
        /// Decorator being bound.
        decorator: String,
        /// Offending parameter.
        parameter: String,
        /// Zero-based item position.
        index: usize,
        /// Description of the item failure.
        reason: String,
    },

    /// A string with too few or too many characters.
    #[error("{decorator}: parameter `{parameter}` has length {len}, expected {}", format_len_bounds(*min, *max))]
    InvalidStringLength {
        /// Decorator being bound.
        decorator: String,
        /// Offending parameter.
        parameter: String,
        /// Supplied length in characters.
        len: usize,
        /// Inclusive lower bound.
        min: Option<usize>,
        /// Inclusive upper bound.
        max: Option<usize>,
    },

    /// A string not matching the declared pattern.
    #[error("{decorator}: parameter `{parameter}` value `{value}` does not match `{pattern}`")]
    PatternMismatch {
        /// Decorator being bound.
        decorator: String,
        /// Offending parameter.
        parameter: String,
        /// Supplied value.
        value: String,
        /// Declared regular expression.
        pattern: String,
    },

    /// A parameter name the decorator does not declare.
    #[error("{decorator}: unknown parameter `{parameter}`")]
    UnknownParameter {
        /// Decorator being bound.
        decorator: String,
        /// Undeclared parameter.
        parameter: String,
    },

    /// The schema itself is malformed.
    #[error("{decorator}: invalid schema for parameter `{parameter}`: {reason}")]
    InvalidSchema {
        /// Decorator declaring the schema.
        decorator: String,
        /// Parameter whose schema is malformed.
        parameter: String,
        /// Description of the defect.
        reason: String,
    },
}

impl ValidationError {
    /// Returns the parameter the error refers to.
    #[must_use]
    pub fn parameter(&self) -> &str {
        match self {
            Self::MissingRequiredParameter { parameter, .. }
            | Self::TypeMismatch { parameter, .. }
            | Self::InvalidEnumValue { parameter, .. }
            | Self::OutOfRange { parameter, .. }
            | Self::InvalidArrayLength { parameter, .. }
            | Self::InvalidArrayItem { parameter, .. }
            | Self::InvalidStringLength { parameter, .. }
            | Self::PatternMismatch { parameter, .. }
            | Self::UnknownParameter { parameter, .. }
            | Self::InvalidSchema { parameter, .. } => parameter,
        }
    }
}

/// Every validation failure collected for one decorator invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors {
    decorator: String,
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Wraps the collected errors. Returns `None` when there are none.
    #[must_use]
    pub fn from_errors(decorator: impl Into<String>, errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self {
                decorator: decorator.into(),
                errors,
            })
        }
    }

    /// Decorator whose parameters failed.
    #[must_use]
    pub fn decorator(&self) -> &str {
        &self.decorator
    }

    /// Individual failures, schema-declaration order first.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; the collection is never constructed empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the failures.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Consumes the collection, returning the failures.
    #[must_use]
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "decorator `{}` has {} invalid parameter(s)",
            self.decorator,
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
