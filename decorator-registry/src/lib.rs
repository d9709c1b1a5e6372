//! Decorator definitions, bound instances, and the versioned registry.
//!
//! Definitions are immutable once constructed. A [`DecoratorInstance`]
//! borrows its definition and carries validated parameter values; the
//! [`Registry`] owns every definition and resolves names and version
//! constraints to them.

#![warn(missing_docs, clippy::pedantic)]

mod definition;
mod error;
mod instance;
mod registry;
mod template;

pub use definition::{
    Compatibility, CompatibilityRecord, DecoratorDefinition, DefinitionBuilder, DefinitionRecord,
};
pub use error::{RegistryError, RegistryResult};
pub use instance::DecoratorInstance;
pub use registry::Registry;
pub use template::{CompositionBehavior, ParameterMapping, Placement, TransformationTemplate};
