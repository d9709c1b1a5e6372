//! Composition and top-level error types.

use decorator_primitives::Version;
use decorator_registry::RegistryError;
use decorator_schema::ValidationErrors;
use thiserror::Error;

use crate::syntax::SyntaxError;

/// Result alias for composition.
pub type CompositionResult<T> = Result<T, CompositionError>;

/// Result alias for the parse-bind-compose entry point.
pub type DecoratorResult<T> = Result<T, DecoratorError>;

/// Reasons a composition request is rejected. No text is produced when any
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositionError {
    /// Two decorators in the request declare a conflict (in either direction).
    #[error("decorators `{first}` and `{second}` conflict")]
    ConflictingDecorators {
        /// Decorator applied first.
        first: String,
        /// Decorator applied second.
        second: String,
    },

    /// A decorator requires companions that are absent.
    #[error("decorator `{decorator}` requires {}", missing.join(", "))]
    MissingRequiredDecorator {
        /// Decorator declaring the requirement.
        decorator: String,
        /// Absent names, sorted.
        missing: Vec<String>,
    },

    /// `Version` appeared somewhere other than first.
    #[error("the Version decorator must come first, found at position {position}")]
    MisplacedVersionDecorator {
        /// Zero-based position in the request.
        position: usize,
    },

    /// More than one decorator wants to replace the whole prompt.
    #[error("decorators `{first}` and `{second}` both replace the prompt")]
    ConflictingReplace {
        /// First replacing decorator.
        first: String,
        /// Second replacing decorator.
        second: String,
    },

    /// The `Version` decorator named a value that is not a semantic version.
    #[error("invalid standard version `{value}`")]
    InvalidStandardVersion {
        /// Supplied value.
        value: String,
    },

    /// A decorator does not support the request's standard version.
    #[error("decorator `{decorator}` does not support standard version {standard}")]
    UnsupportedStandardVersion {
        /// Offending decorator.
        decorator: String,
        /// Standard version in effect.
        standard: Version,
    },

    /// A decorator does not list the configured target model.
    #[error("decorator `{decorator}` does not support model `{model}`")]
    UnsupportedModel {
        /// Offending decorator.
        decorator: String,
        /// Configured target model.
        model: String,
    },

    /// A meta-decorator referenced itself or another meta-decorator.
    #[error("`{meta}` cannot reference meta-decorator `{reference}`")]
    InvalidMetaReference {
        /// Referencing meta-decorator.
        meta: String,
        /// Referenced name.
        reference: String,
    },

    /// A name referenced by a meta-decorator could not be resolved.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A decorator introduced by a meta-decorator could not be bound with
    /// its defaults.
    #[error(transparent)]
    Binding(#[from] ValidationErrors),
}

/// Any failure from parsing, resolving, binding, or composing a prompt.
#[derive(Debug, Error)]
pub enum DecoratorError {
    /// Invocation text was malformed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// A decorator or version could not be resolved.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Parameters failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    /// The request as a whole was rejected.
    #[error(transparent)]
    Composition(#[from] CompositionError),
}
