//! Shared error definitions for decorator primitives.

use thiserror::Error;

/// Result alias used throughout the decorator workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing primitive decorator types.
#[derive(Debug, Error)]
pub enum Error {
    /// A version string was not valid `major.minor.patch`.
    #[error("invalid version `{input}`: {source}")]
    InvalidVersion {
        /// The offending version string.
        input: String,
        /// Source parsing error from the semver library.
        #[source]
        source: semver::Error,
    },

    /// Decorator name failed validation.
    #[error("invalid decorator name `{name}`: {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Standard version bounds were inverted.
    #[error("invalid standard range: minimum {min} exceeds maximum {max}")]
    InvalidRange {
        /// Lower bound.
        min: String,
        /// Upper bound.
        max: String,
    },
}
