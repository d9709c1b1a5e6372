//! Bundled decorator definitions.
//!
//! Each decorator is a JSON record under `definitions/`, compiled into the
//! crate. Adding a decorator means adding a record, not code.

#![warn(missing_docs, clippy::pedantic)]

use decorator_registry::{DecoratorDefinition, Registry, RegistryResult};
use tracing::debug;

/// Raw definition records in registration order.
pub const DEFINITION_SOURCES: &[&str] = &[
    include_str!("../definitions/version.json"),
    include_str!("../definitions/chain.json"),
    include_str!("../definitions/priority.json"),
    include_str!("../definitions/conditional.json"),
    include_str!("../definitions/reasoning.json"),
    include_str!("../definitions/step_by_step.json"),
    include_str!("../definitions/academic.json"),
    include_str!("../definitions/eli5.json"),
    include_str!("../definitions/concise.json"),
    include_str!("../definitions/detailed.json"),
    include_str!("../definitions/bullet.json"),
    include_str!("../definitions/outline.json"),
    include_str!("../definitions/output_format.json"),
    include_str!("../definitions/tone.json"),
    include_str!("../definitions/audience.json"),
    include_str!("../definitions/summary.json"),
];

/// Parses every bundled record.
///
/// # Errors
///
/// Returns [`decorator_registry::RegistryError::InvalidDefinition`] if a
/// bundled record is malformed.
pub fn builtin_definitions() -> RegistryResult<Vec<DecoratorDefinition>> {
    DEFINITION_SOURCES
        .iter()
        .map(|source| DecoratorDefinition::from_json(source))
        .collect()
}

/// Builds a registry holding every bundled decorator.
///
/// # Errors
///
/// Propagates parse failures from [`builtin_definitions`] and duplicate
/// registrations.
pub fn builtin_registry() -> RegistryResult<Registry> {
    let mut registry = Registry::new();
    registry.register_all(builtin_definitions()?)?;
    debug!(decorators = registry.len(), "loaded bundled catalog");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decorator_registry::{CompositionBehavior, DecoratorInstance, Placement};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};

    fn bind<'r>(registry: &'r Registry, name: &str, parameters: Value) -> DecoratorInstance<'r> {
        let raw: Map<String, Value> = serde_json::from_value(parameters).unwrap();
        DecoratorInstance::bind(registry.lookup(name, None).unwrap(), &raw).unwrap()
    }

    #[test]
    fn every_record_loads() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.len(), DEFINITION_SOURCES.len());
        for name in [
            "Version",
            "Chain",
            "Priority",
            "Conditional",
            "Reasoning",
            "StepByStep",
            "Academic",
            "ELI5",
            "Concise",
            "Detailed",
            "Bullet",
            "Outline",
            "OutputFormat",
            "Tone",
            "Audience",
            "Summary",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn declared_conflicts_are_mutual() {
        let registry = builtin_registry().unwrap();
        for (left, right) in [("Academic", "ELI5"), ("Bullet", "Outline"), ("Concise", "Detailed")] {
            let left_def = registry.latest(left).unwrap();
            let right_def = registry.latest(right).unwrap();
            assert!(left_def.compatibility().conflicts_with(right));
            assert!(right_def.compatibility().conflicts_with(left));
        }
    }

    #[test]
    fn reasoning_renders_depth_fragment() {
        let registry = builtin_registry().unwrap();
        let reasoning = registry.latest("Reasoning").unwrap();
        assert_eq!(reasoning.placement(), Placement::Prepend);
        assert_eq!(reasoning.composition_behavior(), CompositionBehavior::Accumulate);

        let instance = bind(&registry, "Reasoning", json!({"depth": "basic"}));
        assert_eq!(
            instance.render(),
            "Please provide detailed reasoning in your response, showing how you reach each conclusion.\n\n\
             Focus on the most important logical steps."
        );
    }

    #[test]
    fn placeholders_fill_in_place() {
        let registry = builtin_registry().unwrap();
        let tone = bind(&registry, "Tone", json!({"style": "technical"}));
        assert_eq!(tone.render(), "Adopt a technical tone throughout the response.");

        let audience = bind(&registry, "Audience", json!({}));
        assert_eq!(audience.render(), "Tailor the response for readers at the intermediate level.");
    }

    #[test]
    fn meta_decorators_render_nothing() {
        let registry = builtin_registry().unwrap();
        let chain = bind(&registry, "Chain", json!({"decorators": ["Concise"]}));
        assert_eq!(chain.render(), "");
        assert_eq!(chain.get("stopOnFailure").and_then(|value| value.as_bool()), Some(true));

        let version = DecoratorInstance::bind(
            registry.latest("Version").unwrap(),
            &serde_json::from_value(json!({"standard": "latest"})).unwrap(),
        );
        assert!(version.is_err());
    }

    #[test]
    fn required_parameters_are_enforced() {
        let registry = builtin_registry().unwrap();
        let err = DecoratorInstance::with_defaults(registry.latest("OutputFormat").unwrap())
            .expect_err("format is required");
        assert!(matches!(
            err.errors()[0],
            decorator_schema::ValidationError::MissingRequiredParameter { .. }
        ));
    }
}
