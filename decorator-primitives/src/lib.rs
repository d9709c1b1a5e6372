//! Core shared types for prompt decorators.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod name;
mod version;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Validated decorator identifier.
pub use name::DecoratorName;
/// Semantic versions and the decorator compatibility rule.
pub use version::{StandardRange, Version, is_compatible, parse_version};
