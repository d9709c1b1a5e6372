//! Composable, validated prompt decorators.
//!
//! This facade bundles the workspace crates behind feature flags. The
//! primitives, parameter schema, and registry are always available; the
//! engine, bundled catalog, configuration, and logging setup can be switched
//! off individually.
//!
//! ```no_run
//! use prompt_decorators::catalog::builtin_registry;
//! use prompt_decorators::engine::CompositionEngine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = builtin_registry()?;
//! let engine = CompositionEngine::new(&registry);
//! let prompt = engine.apply("+++Reasoning(depth=basic)\nExplain photosynthesis.")?;
//! println!("{prompt}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Names, versions, and the version-compatibility rule.
pub use decorator_primitives as primitives;

/// Parameter schemas and validation.
pub use decorator_schema as schema;

/// Definitions, instances, and the registry.
pub use decorator_registry as registry;

/// Composition engine and invocation syntax (enabled by `engine` feature).
#[cfg(feature = "engine")]
pub use decorator_engine as engine;

/// Bundled decorator definitions (enabled by `catalog` feature).
#[cfg(feature = "catalog")]
pub use decorator_catalog as catalog;

/// Engine configuration (enabled by `config` feature).
#[cfg(feature = "config")]
pub use decorator_config as config;

/// Logging setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use decorator_telemetry as telemetry;

pub use decorator_registry::{DecoratorDefinition, DecoratorInstance, Registry};
