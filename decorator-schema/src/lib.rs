//! Parameter schemas and validation for prompt decorators.
//!
//! A [`ParameterSchema`] describes one decorator parameter. Raw JSON values are
//! checked against it to produce a typed [`ParamValue`]; the
//! [`ValidationPipeline`] runs every schema of a decorator over a raw
//! parameter map and reports all problems at once.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod pipeline;
mod schema;
mod value;

pub use error::{ValidationError, ValidationErrors, ValidationResult};
pub use pipeline::{ValidatedParameters, ValidationPipeline};
pub use schema::{Constraints, ItemSchema, ParameterKind, ParameterSchema};
pub use value::{ParamValue, json_type_name};
