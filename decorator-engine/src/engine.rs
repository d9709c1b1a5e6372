//! The composition engine.

use std::collections::BTreeSet;

use decorator_config::EngineConfig;
use decorator_primitives::{Version, parse_version};
use decorator_registry::{CompositionBehavior, DecoratorDefinition, DecoratorInstance, Placement, Registry};
use decorator_schema::ParamValue;
use tracing::{debug, warn};

use crate::error::{CompositionError, CompositionResult, DecoratorResult};
use crate::meta::{self, PlannedStep};
use crate::syntax::{self, Invocation};

const SECTION_SEPARATOR: &str = "\n\n";

/// Composes decorator instances and a base prompt into a single prompt.
///
/// Composition is pure: the same instances, prompt, registry, and
/// configuration always produce the same output. Every compatibility check
/// runs before any text is rendered.
#[derive(Debug, Clone)]
pub struct CompositionEngine<'r> {
    registry: &'r Registry,
    config: EngineConfig,
}

impl<'r> CompositionEngine<'r> {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    #[must_use]
    pub fn with_config(registry: &'r Registry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Registry used to resolve names.
    #[must_use]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates a request and resolves it into an ordered plan without
    /// rendering.
    ///
    /// # Errors
    ///
    /// Returns the first [`CompositionError`] found. Checks run in this
    /// order: `Version` position, meta-decorator expansion, conflicts,
    /// requirements, standard version, target model, replacing placements.
    pub fn plan(&self, instances: &[DecoratorInstance<'r>]) -> CompositionResult<CompositionPlan<'r>> {
        let standard = self.standard_version(instances)?;
        let steps = meta::expand(self.registry, instances)?;

        check_conflicts(&steps)?;
        let definitions = involved(instances, &steps);
        check_requirements(instances, &steps, &definitions)?;
        check_standard(&definitions, &standard)?;
        self.check_models(&definitions)?;
        check_replacements(&steps)?;

        debug!(requested = instances.len(), steps = steps.len(), %standard, "planned composition");
        Ok(CompositionPlan { standard, steps })
    }

    /// Composes `instances` around `base_prompt`.
    ///
    /// # Errors
    ///
    /// See [`CompositionEngine::plan`]. Nothing is rendered on error.
    pub fn compose(&self, instances: &[DecoratorInstance<'r>], base_prompt: &str) -> CompositionResult<String> {
        let plan = self.plan(instances)?;
        Ok(plan.render(base_prompt))
    }

    /// Resolves and binds a parsed invocation.
    ///
    /// # Errors
    ///
    /// Returns registry errors for unknown names or unsatisfiable versions
    /// and validation errors for bad parameters.
    pub fn bind(&self, invocation: &Invocation) -> DecoratorResult<DecoratorInstance<'r>> {
        let definition = self
            .registry
            .lookup(&invocation.name, invocation.version.as_ref())?;
        Ok(DecoratorInstance::bind(definition, &invocation.parameters)?)
    }

    /// Parses leading `+++` invocations from `text`, binds them, and
    /// composes them around the remaining prompt.
    ///
    /// # Errors
    ///
    /// Returns the first syntax, registry, validation, or composition error.
    pub fn apply(&self, text: &str) -> DecoratorResult<String> {
        let parsed = syntax::parse(text)?;
        let instances = parsed
            .invocations
            .iter()
            .map(|invocation| self.bind(invocation))
            .collect::<DecoratorResult<Vec<_>>>()?;
        Ok(self.compose(&instances, &parsed.prompt)?)
    }

    fn standard_version(&self, instances: &[DecoratorInstance<'r>]) -> CompositionResult<Version> {
        let mut standard = None;
        for (position, instance) in instances.iter().enumerate() {
            if instance.name() != meta::VERSION {
                continue;
            }
            if position != 0 {
                return Err(CompositionError::MisplacedVersionDecorator { position });
            }
            standard = instance
                .get("standard")
                .and_then(ParamValue::as_str)
                .map(|value| {
                    parse_version(value).map_err(|_| CompositionError::InvalidStandardVersion {
                        value: value.to_owned(),
                    })
                })
                .transpose()?;
        }
        Ok(standard.unwrap_or_else(|| self.config.standard_version.clone()))
    }

    fn check_models(&self, definitions: &[&DecoratorDefinition]) -> CompositionResult<()> {
        let Some(model) = self.config.target_model.as_deref() else {
            return Ok(());
        };
        for definition in definitions {
            if definition.compatibility().supports_model(model) {
                continue;
            }
            if self.config.strict_models {
                return Err(CompositionError::UnsupportedModel {
                    decorator: definition.name().to_string(),
                    model: model.to_owned(),
                });
            }
            warn!(decorator = %definition.name(), model, "decorator does not list target model");
        }
        Ok(())
    }
}

/// A validated, ordered composition request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan<'r> {
    standard: Version,
    steps: Vec<PlannedStep<'r>>,
}

impl<'r> CompositionPlan<'r> {
    /// Standard version the request was checked against.
    #[must_use]
    pub fn standard(&self) -> &Version {
        &self.standard
    }

    /// Decorators to render, in application order.
    #[must_use]
    pub fn steps(&self) -> &[PlannedStep<'r>] {
        &self.steps
    }

    /// Renders the plan around `base_prompt`.
    ///
    /// A replacing decorator's text becomes the whole output. Otherwise the
    /// output is the prepend bucket, the base prompt, and the append bucket,
    /// skipping empty sections and joined by a blank line.
    #[must_use]
    pub fn render(&self, base_prompt: &str) -> String {
        let mut prepend = Bucket::default();
        let mut append = Bucket::default();
        let mut replacement = None;

        for step in &self.steps {
            let text = step.render();
            if text.trim().is_empty() {
                continue;
            }
            match step.placement() {
                Placement::Prepend => prepend.apply(step.behavior(), text),
                Placement::Append => append.apply(step.behavior(), text),
                Placement::Override | Placement::Replace => replacement = Some(text),
            }
        }

        if let Some(text) = replacement {
            return text;
        }

        let base = (!base_prompt.trim().is_empty()).then(|| base_prompt.to_owned());
        prepend
            .fragments
            .into_iter()
            .chain(base)
            .chain(append.fragments)
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }
}

#[derive(Default)]
struct Bucket {
    fragments: Vec<String>,
    override_slot: Option<usize>,
}

impl Bucket {
    fn apply(&mut self, behavior: CompositionBehavior, text: String) {
        match behavior {
            CompositionBehavior::Accumulate => self.fragments.push(text),
            CompositionBehavior::Override => match self.override_slot {
                Some(slot) => self.fragments[slot] = text,
                None => {
                    self.override_slot = Some(self.fragments.len());
                    self.fragments.push(text);
                }
            },
        }
    }
}

fn involved<'r>(instances: &[DecoratorInstance<'r>], steps: &[PlannedStep<'r>]) -> Vec<&'r DecoratorDefinition> {
    let mut definitions: Vec<&'r DecoratorDefinition> = Vec::new();
    let all = instances
        .iter()
        .map(DecoratorInstance::definition)
        .chain(steps.iter().map(|step| step.instance().definition()));
    for definition in all {
        if !definitions.iter().any(|seen| std::ptr::eq(*seen, definition)) {
            definitions.push(definition);
        }
    }
    definitions
}

fn check_conflicts(steps: &[PlannedStep<'_>]) -> CompositionResult<()> {
    for (index, first) in steps.iter().enumerate() {
        for second in &steps[index + 1..] {
            if first.name() == second.name() || first.shares_priority_group(second) {
                continue;
            }
            let declared = first
                .instance()
                .definition()
                .compatibility()
                .conflicts_with(second.name())
                || second
                    .instance()
                    .definition()
                    .compatibility()
                    .conflicts_with(first.name());
            if declared {
                return Err(CompositionError::ConflictingDecorators {
                    first: first.name().to_owned(),
                    second: second.name().to_owned(),
                });
            }
        }
    }
    Ok(())
}

fn check_requirements(
    instances: &[DecoratorInstance<'_>],
    steps: &[PlannedStep<'_>],
    definitions: &[&DecoratorDefinition],
) -> CompositionResult<()> {
    let present: BTreeSet<&str> = instances
        .iter()
        .map(DecoratorInstance::name)
        .chain(steps.iter().map(PlannedStep::name))
        .collect();

    for definition in definitions {
        let missing: Vec<String> = definition
            .compatibility()
            .requires()
            .iter()
            .filter(|required| !present.contains(required.as_str()))
            .map(|required| required.as_str().to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(CompositionError::MissingRequiredDecorator {
                decorator: definition.name().to_string(),
                missing,
            });
        }
    }
    Ok(())
}

fn check_standard(definitions: &[&DecoratorDefinition], standard: &Version) -> CompositionResult<()> {
    match definitions
        .iter()
        .find(|definition| !definition.compatibility().supports_standard(standard))
    {
        Some(definition) => Err(CompositionError::UnsupportedStandardVersion {
            decorator: definition.name().to_string(),
            standard: standard.clone(),
        }),
        None => Ok(()),
    }
}

fn check_replacements(steps: &[PlannedStep<'_>]) -> CompositionResult<()> {
    let mut replacing = steps.iter().filter(|step| step.placement().replaces_prompt());
    if let (Some(first), Some(second)) = (replacing.next(), replacing.next()) {
        return Err(CompositionError::ConflictingReplace {
            first: first.name().to_owned(),
            second: second.name().to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecoratorError;
    use decorator_registry::RegistryError;
    use decorator_schema::{ItemSchema, ParameterKind, ParameterSchema};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};

    fn simple(name: &str, instruction: &str, placement: Placement) -> DecoratorDefinition {
        DecoratorDefinition::builder(name, "1.0.0")
            .instruction(instruction)
            .placement(placement)
            .build()
            .unwrap()
    }

    fn names_parameter(name: &str) -> ParameterSchema {
        ParameterSchema::new(name, ParameterKind::Array).with_items(ItemSchema::new(ParameterKind::String))
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_all([
                DecoratorDefinition::builder("Version", "1.0.0")
                    .parameter(ParameterSchema::new("standard", ParameterKind::String).required())
                    .build()
                    .unwrap(),
                DecoratorDefinition::builder("Chain", "1.0.0")
                    .parameter(names_parameter("decorators").required())
                    .parameter(ParameterSchema::new("stopOnFailure", ParameterKind::Boolean).with_default(true))
                    .build()
                    .unwrap(),
                DecoratorDefinition::builder("Priority", "1.0.0")
                    .parameter(names_parameter("decorators").required())
                    .parameter(
                        ParameterSchema::new("mode", ParameterKind::Enum)
                            .with_values(["override", "merge", "cascade"])
                            .with_default("override"),
                    )
                    .parameter(ParameterSchema::new("explicit", ParameterKind::Boolean).with_default(false))
                    .build()
                    .unwrap(),
                DecoratorDefinition::builder("Conditional", "1.0.0")
                    .parameter(ParameterSchema::new("condition", ParameterKind::String).required())
                    .parameter(names_parameter("then").required())
                    .parameter(names_parameter("otherwise"))
                    .build()
                    .unwrap(),
                simple("Concise", "Be concise.", Placement::Prepend),
                simple("Detailed", "Be detailed.", Placement::Prepend),
                simple("Summary", "End with a summary.", Placement::Append),
                DecoratorDefinition::builder("Academic", "1.0.0")
                    .instruction("Use an academic register.")
                    .conflicts("ELI5")
                    .build()
                    .unwrap(),
                simple("ELI5", "Explain like I'm five.", Placement::Prepend),
                DecoratorDefinition::builder("Tone", "1.0.0")
                    .instruction("Tone:")
                    .parameter(
                        ParameterSchema::new("style", ParameterKind::Enum)
                            .with_values(["formal", "casual"])
                            .required(),
                    )
                    .value_map("style", [("formal", "Be formal."), ("casual", "Be casual.")])
                    .behavior(CompositionBehavior::Override)
                    .build()
                    .unwrap(),
                DecoratorDefinition::builder("Critique", "1.0.0")
                    .instruction("Critique the answer.")
                    .requires("Summary")
                    .placement(Placement::Append)
                    .build()
                    .unwrap(),
                simple("Rewrite", "Rewrite everything.", Placement::Replace),
                simple("Takeover", "Ignore the prompt.", Placement::Override),
                DecoratorDefinition::builder("Modern", "1.0.0")
                    .instruction("Modern only.")
                    .standard_range(Some("1.1.0"), None)
                    .build()
                    .unwrap(),
                DecoratorDefinition::builder("OpenAIOnly", "1.0.0")
                    .instruction("Use JSON mode.")
                    .model("gpt-4o")
                    .build()
                    .unwrap(),
            ])
            .unwrap();
        registry
    }

    fn bind<'r>(registry: &'r Registry, name: &str, parameters: Value) -> DecoratorInstance<'r> {
        let raw: Map<String, Value> = serde_json::from_value(parameters).unwrap();
        DecoratorInstance::bind(registry.lookup(name, None).unwrap(), &raw).unwrap()
    }

    fn plain<'r>(registry: &'r Registry, name: &str) -> DecoratorInstance<'r> {
        bind(registry, name, json!({}))
    }

    #[test]
    fn places_buckets_around_base_prompt() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [plain(&registry, "Summary"), plain(&registry, "Concise")];

        let output = engine.compose(&instances, "Explain tides.").unwrap();
        assert_eq!(output, "Be concise.\n\nExplain tides.\n\nEnd with a summary.");
    }

    #[test]
    fn empty_request_returns_base_prompt() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        assert_eq!(engine.compose(&[], "Hello").unwrap(), "Hello");
    }

    #[test]
    fn accumulate_keeps_every_fragment_in_order() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [plain(&registry, "Detailed"), plain(&registry, "Concise")];

        let output = engine.compose(&instances, "Q").unwrap();
        assert_eq!(output, "Be detailed.\n\nBe concise.\n\nQ");
    }

    #[test]
    fn override_behavior_keeps_last_fragment() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [
            bind(&registry, "Tone", json!({"style": "formal"})),
            plain(&registry, "Concise"),
            bind(&registry, "Tone", json!({"style": "casual"})),
        ];

        let output = engine.compose(&instances, "Q").unwrap();
        assert_eq!(output, "Be casual.\n\nBe concise.\n\nQ");
        assert!(!output.contains("Be formal."));
    }

    #[test]
    fn conflicts_are_detected_in_both_directions() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);

        let forward = [plain(&registry, "Academic"), plain(&registry, "ELI5")];
        let err = engine.compose(&forward, "Q").expect_err("conflict");
        assert_eq!(
            err,
            CompositionError::ConflictingDecorators {
                first: "Academic".into(),
                second: "ELI5".into(),
            }
        );

        let reverse = [plain(&registry, "ELI5"), plain(&registry, "Academic")];
        let err = engine.compose(&reverse, "Q").expect_err("conflict");
        assert!(matches!(err, CompositionError::ConflictingDecorators { ref first, .. } if first == "ELI5"));
    }

    #[test]
    fn missing_requirement_is_reported() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);

        let err = engine
            .compose(&[plain(&registry, "Critique")], "Q")
            .expect_err("requires Summary");
        assert_eq!(
            err,
            CompositionError::MissingRequiredDecorator {
                decorator: "Critique".into(),
                missing: vec!["Summary".into()],
            }
        );

        let satisfied = [plain(&registry, "Critique"), plain(&registry, "Summary")];
        assert!(engine.compose(&satisfied, "Q").is_ok());
    }

    #[test]
    fn version_must_come_first() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [
            plain(&registry, "Concise"),
            bind(&registry, "Version", json!({"standard": "1.0.0"})),
        ];

        let err = engine.compose(&instances, "Q").expect_err("misplaced");
        assert_eq!(err, CompositionError::MisplacedVersionDecorator { position: 1 });
    }

    #[test]
    fn version_selects_standard_for_gating() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);

        let old = [
            bind(&registry, "Version", json!({"standard": "1.0.0"})),
            plain(&registry, "Modern"),
        ];
        let err = engine.compose(&old, "Q").expect_err("too old");
        assert!(matches!(
            err,
            CompositionError::UnsupportedStandardVersion { ref decorator, ref standard }
                if decorator == "Modern" && *standard == Version::new(1, 0, 0)
        ));

        let new = [
            bind(&registry, "Version", json!({"standard": "1.2.0"})),
            plain(&registry, "Modern"),
        ];
        assert_eq!(engine.compose(&new, "Q").unwrap(), "Modern only.\n\nQ");
    }

    #[test]
    fn invalid_standard_value_is_rejected() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [bind(&registry, "Version", json!({"standard": "one"}))];

        let err = engine.compose(&instances, "Q").expect_err("bad standard");
        assert!(matches!(err, CompositionError::InvalidStandardVersion { ref value } if value == "one"));
    }

    #[test]
    fn replacing_placements_take_whole_output() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);

        let single = [plain(&registry, "Concise"), plain(&registry, "Rewrite")];
        assert_eq!(engine.compose(&single, "Q").unwrap(), "Rewrite everything.");

        let double = [plain(&registry, "Rewrite"), plain(&registry, "Takeover")];
        let err = engine.compose(&double, "Q").expect_err("two replacements");
        assert!(matches!(err, CompositionError::ConflictingReplace { .. }));
    }

    #[test]
    fn model_gating_warns_or_rejects() {
        let registry = registry();
        let instances = [plain(&registry, "OpenAIOnly")];

        let lenient = CompositionEngine::with_config(&registry, EngineConfig::default().with_target_model("claude"));
        assert!(lenient.compose(&instances, "Q").is_ok());

        let strict = CompositionEngine::with_config(
            &registry,
            EngineConfig::default()
                .with_target_model("claude")
                .with_strict_models(true),
        );
        let err = strict.compose(&instances, "Q").expect_err("strict");
        assert!(matches!(err, CompositionError::UnsupportedModel { ref model, .. } if model == "claude"));
    }

    #[test]
    fn priority_override_keeps_highest_per_bucket() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [
            bind(&registry, "Priority", json!({"decorators": ["Concise", "Detailed"], "mode": "override"})),
            plain(&registry, "Concise"),
            plain(&registry, "Detailed"),
        ];

        assert_eq!(engine.compose(&instances, "Q").unwrap(), "Be concise.\n\nQ");
    }

    #[test]
    fn priority_resolves_declared_conflicts() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [
            plain(&registry, "ELI5"),
            plain(&registry, "Academic"),
            bind(&registry, "Priority", json!({"decorators": ["Academic", "ELI5"]})),
        ];

        assert_eq!(engine.compose(&instances, "Q").unwrap(), "Use an academic register.\n\nQ");
    }

    #[test]
    fn priority_merge_and_cascade() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);

        let merge = [bind(&registry, "Priority", json!({"decorators": ["Detailed", "Concise"], "mode": "merge"}))];
        assert_eq!(engine.compose(&merge, "Q").unwrap(), "Be detailed.\n\nBe concise.\n\nQ");

        let cascade = [bind(
            &registry,
            "Priority",
            json!({"decorators": ["Detailed", "Concise"], "mode": "cascade", "explicit": true}),
        )];
        assert_eq!(
            engine.compose(&cascade, "Q").unwrap(),
            "Be detailed.\n\n(Lower priority than Detailed) Be concise.\n\nQ"
        );
    }

    #[test]
    fn chain_expands_in_place_and_consumes_members() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [
            plain(&registry, "Detailed"),
            bind(&registry, "Chain", json!({"decorators": ["Summary", "Concise"]})),
            plain(&registry, "Summary"),
        ];

        let plan = engine.plan(&instances).unwrap();
        let order: Vec<_> = plan.steps().iter().map(PlannedStep::name).collect();
        assert_eq!(order, ["Detailed", "Summary", "Concise"]);
        assert_eq!(plan.steps()[1].introduced_by_meta(), Some("Chain"));
    }

    #[test]
    fn chain_unknown_member_respects_stop_on_failure() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);

        let strict = [bind(&registry, "Chain", json!({"decorators": ["Nope"]}))];
        let err = engine.compose(&strict, "Q").expect_err("unknown");
        assert!(matches!(err, CompositionError::Registry(RegistryError::UnknownDecorator { .. })));

        let lenient = [bind(
            &registry,
            "Chain",
            json!({"decorators": ["Nope", "Concise"], "stopOnFailure": false}),
        )];
        assert_eq!(engine.compose(&lenient, "Q").unwrap(), "Be concise.\n\nQ");
    }

    #[test]
    fn meta_cannot_reference_meta() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [bind(&registry, "Chain", json!({"decorators": ["Priority"]}))];

        let err = engine.compose(&instances, "Q").expect_err("nested meta");
        assert!(matches!(err, CompositionError::InvalidMetaReference { ref reference, .. } if reference == "Priority"));
    }

    #[test]
    fn conditional_picks_branch_by_presence() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let conditional = json!({"condition": "Summary", "then": ["Detailed"], "otherwise": ["Concise"]});

        let met = [
            plain(&registry, "Summary"),
            bind(&registry, "Conditional", conditional.clone()),
        ];
        assert_eq!(
            engine.compose(&met, "Q").unwrap(),
            "Be detailed.\n\nQ\n\nEnd with a summary."
        );

        let unmet = [bind(&registry, "Conditional", conditional)];
        assert_eq!(engine.compose(&unmet, "Q").unwrap(), "Be concise.\n\nQ");
    }

    #[test]
    fn conditional_drops_present_members_of_rejected_branch() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [
            plain(&registry, "Academic"),
            plain(&registry, "ELI5"),
            bind(
                &registry,
                "Conditional",
                json!({"condition": "Summary", "then": ["ELI5"], "otherwise": ["Academic"]}),
            ),
        ];

        assert_eq!(engine.compose(&instances, "Q").unwrap(), "Use an academic register.\n\nQ");
    }

    #[test]
    fn composition_is_deterministic() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);
        let instances = [
            bind(&registry, "Tone", json!({"style": "formal"})),
            plain(&registry, "Summary"),
        ];

        let first = engine.compose(&instances, "Q").unwrap();
        let second = engine.compose(&instances, "Q").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn apply_parses_binds_and_composes() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);

        let output = engine
            .apply("+++Tone(style=casual)\n+++Summary\nWhat is rust?")
            .unwrap();
        assert_eq!(output, "Be casual.\n\nWhat is rust?\n\nEnd with a summary.");
    }

    #[test]
    fn apply_surfaces_each_error_kind() {
        let registry = registry();
        let engine = CompositionEngine::new(&registry);

        assert!(matches!(engine.apply("+++Tone(style=formal"), Err(DecoratorError::Syntax(_))));
        assert!(matches!(engine.apply("+++Missing Q"), Err(DecoratorError::Registry(_))));
        assert!(matches!(engine.apply("+++Tone(style=loud) Q"), Err(DecoratorError::Validation(_))));
        assert!(matches!(engine.apply("+++Academic +++ELI5 Q"), Err(DecoratorError::Composition(_))));
        assert!(matches!(
            engine.apply("+++Concise@2.0.0 Q"),
            Err(DecoratorError::Registry(RegistryError::IncompatibleVersion { .. }))
        ));
    }
}
