//! Whole-invocation validation.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ValidationError, ValidationErrors};
use crate::schema::ParameterSchema;
use crate::value::ParamValue;

/// Validated parameter values keyed by parameter name.
pub type ValidatedParameters = BTreeMap<String, ParamValue>;

/// Validates a raw parameter map against a decorator's full schema list.
///
/// Validation never stops at the first problem: every parameter is checked
/// and all failures are returned together. Explicit `null` is treated as
/// absence.
#[derive(Debug, Clone, Copy)]
pub struct ValidationPipeline<'a> {
    decorator: &'a str,
    schemas: &'a [ParameterSchema],
}

impl<'a> ValidationPipeline<'a> {
    /// Creates a pipeline for the named decorator.
    #[must_use]
    pub fn new(decorator: &'a str, schemas: &'a [ParameterSchema]) -> Self {
        Self { decorator, schemas }
    }

    /// Validates supplied values and resolves defaults for absent ones.
    ///
    /// The result contains every supplied parameter plus every absent
    /// parameter that declares a default. Absent optional parameters without
    /// a default are left out.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every failing parameter in schema
    /// declaration order, followed by unknown parameter names.
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<ValidatedParameters, ValidationErrors> {
        let mut values = ValidatedParameters::new();
        let mut errors = Vec::new();

        for schema in self.schemas {
            let supplied = raw.get(schema.name()).filter(|value| !value.is_null());
            let outcome = match supplied {
                Some(value) => schema.validate(self.decorator, value).map(Some),
                None => match schema.default_value(self.decorator) {
                    Ok(None) if schema.is_required() => {
                        Err(ValidationError::MissingRequiredParameter {
                            decorator: self.decorator.to_owned(),
                            parameter: schema.name().to_owned(),
                        })
                    }
                    other => other,
                },
            };

            match outcome {
                Ok(Some(value)) => {
                    values.insert(schema.name().to_owned(), value);
                }
                Ok(None) => {}
                Err(error) => errors.push(error),
            }
        }

        for name in raw.keys() {
            if !self.schemas.iter().any(|schema| schema.name() == name) {
                errors.push(ValidationError::UnknownParameter {
                    decorator: self.decorator.to_owned(),
                    parameter: name.clone(),
                });
            }
        }

        match ValidationErrors::from_errors(self.decorator, errors) {
            Some(errors) => {
                debug!(decorator = self.decorator, failures = errors.len(), "parameter validation failed");
                Err(errors)
            }
            None => Ok(values),
        }
    }
}
