//! Registry error taxonomy.

use decorator_primitives::Version;
use thiserror::Error;

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

fn join_versions(versions: &[Version]) -> String {
    versions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors produced by definition loading and registry queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No definition is registered under the name.
    #[error("decorator `{name}` is not registered")]
    UnknownDecorator {
        /// Requested name.
        name: String,
    },

    /// The same name and version was registered twice.
    #[error("decorator `{name}` version {version} is already registered")]
    DuplicateDefinition {
        /// Decorator name.
        name: String,
        /// Colliding version.
        version: Version,
    },

    /// No registered version satisfies the requested one.
    #[error("decorator `{name}` has no version compatible with {requested} (available: {})", join_versions(available))]
    IncompatibleVersion {
        /// Decorator name.
        name: String,
        /// Requested version.
        requested: Version,
        /// Registered versions, ascending.
        available: Vec<Version>,
    },

    /// Definition data violates a definition invariant.
    #[error("invalid definition for `{name}`: {reason}")]
    InvalidDefinition {
        /// Decorator name as written in the record.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl RegistryError {
    /// Convenience helper to construct invalid-definition errors.
    #[must_use]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
