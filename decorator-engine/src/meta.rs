//! Meta-decorators: decorators that arrange other decorators.
//!
//! `Chain`, `Priority`, and `Conditional` render no text of their own. Each
//! expands, in its own position, to the decorators it names. A named
//! decorator that already appears in the request is taken from its original
//! position; otherwise the latest registered version is bound with its
//! defaults.

use decorator_registry::{CompositionBehavior, DecoratorInstance, Placement, Registry};
use decorator_schema::ParamValue;
use tracing::{debug, warn};

use crate::error::{CompositionError, CompositionResult};

/// Name of the control decorator that selects the standard version.
pub const VERSION: &str = "Version";
/// Name of the sequencing meta-decorator.
pub const CHAIN: &str = "Chain";
/// Name of the precedence meta-decorator.
pub const PRIORITY: &str = "Priority";
/// Name of the branching meta-decorator.
pub const CONDITIONAL: &str = "Conditional";

/// Decorators the engine interprets instead of rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaKind {
    /// Selects the standard version; must be first.
    Version,
    /// Applies the listed decorators in order.
    Chain,
    /// Applies the listed decorators by precedence.
    Priority,
    /// Applies one of two lists depending on whether a decorator is present.
    Conditional,
}

impl MetaKind {
    /// Classifies a decorator name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            VERSION => Some(Self::Version),
            CHAIN => Some(Self::Chain),
            PRIORITY => Some(Self::Priority),
            CONDITIONAL => Some(Self::Conditional),
            _ => None,
        }
    }
}

/// How `Priority` resolves its members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriorityMode {
    /// Per placement bucket only the highest-priority member survives.
    #[default]
    Override,
    /// Every member's text is kept, highest priority first.
    Merge,
    /// Every member is applied in priority order; lower-priority members can
    /// be annotated as subordinate.
    Cascade,
}

impl PriorityMode {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("merge") => Self::Merge,
            Some("cascade") => Self::Cascade,
            _ => Self::Override,
        }
    }
}

/// One decorator scheduled for rendering after meta-decorators have been
/// expanded.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedStep<'r> {
    instance: DecoratorInstance<'r>,
    behavior: CompositionBehavior,
    introduced_by: Option<&'r str>,
    priority_group: Option<usize>,
    subordinate_to: Option<&'r str>,
}

impl<'r> PlannedStep<'r> {
    fn new(instance: DecoratorInstance<'r>) -> Self {
        let behavior = instance.composition_behavior();
        Self {
            instance,
            behavior,
            introduced_by: None,
            priority_group: None,
            subordinate_to: None,
        }
    }

    fn introduced_by(mut self, meta: &'r str) -> Self {
        self.introduced_by = Some(meta);
        self
    }

    /// Bound decorator.
    #[must_use]
    pub fn instance(&self) -> &DecoratorInstance<'r> {
        &self.instance
    }

    /// Decorator name.
    #[must_use]
    pub fn name(&self) -> &'r str {
        self.instance.name()
    }

    /// Placement bucket.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.instance.placement()
    }

    /// Effective behavior. `Priority` in merge or cascade mode forces
    /// accumulation.
    #[must_use]
    pub fn behavior(&self) -> CompositionBehavior {
        self.behavior
    }

    /// Meta-decorator that scheduled this step, if any.
    #[must_use]
    pub fn introduced_by_meta(&self) -> Option<&'r str> {
        self.introduced_by
    }

    /// Higher-priority decorator this step is subordinate to, when a
    /// cascading `Priority` asked for explicit annotation.
    #[must_use]
    pub fn subordinate_to(&self) -> Option<&'r str> {
        self.subordinate_to
    }

    /// Returns true when both steps were ordered by the same `Priority`.
    /// Such pairs have had their precedence resolved explicitly.
    #[must_use]
    pub fn shares_priority_group(&self, other: &Self) -> bool {
        self.priority_group.is_some() && self.priority_group == other.priority_group
    }

    /// Rendered text, annotated when subordinate.
    #[must_use]
    pub fn render(&self) -> String {
        let text = self.instance.render();
        match self.subordinate_to {
            Some(higher) if !text.trim().is_empty() => {
                format!("(Lower priority than {higher}) {text}")
            }
            _ => text,
        }
    }
}

/// Expands meta-decorators in `instances` into a flat, ordered list of steps.
///
/// `Version` is consumed and contributes no step.
pub(crate) fn expand<'r>(
    registry: &'r Registry,
    instances: &[DecoratorInstance<'r>],
) -> CompositionResult<Vec<PlannedStep<'r>>> {
    let mut claimed = vec![false; instances.len()];
    let mut expansions: Vec<Option<Vec<PlannedStep<'r>>>> = vec![None; instances.len()];

    for (index, instance) in instances.iter().enumerate() {
        let Some(kind) = MetaKind::from_name(instance.name()) else {
            continue;
        };
        claimed[index] = true;
        let mut resolver = Resolver {
            registry,
            instances,
            claimed: &mut claimed,
            meta: instance.name(),
        };

        let steps = match kind {
            MetaKind::Version => Vec::new(),
            MetaKind::Chain => {
                let strict = instance
                    .get("stopOnFailure")
                    .and_then(ParamValue::as_bool)
                    .unwrap_or(true);
                resolver
                    .resolve_all(&names(instance, "decorators"), strict)?
                    .into_iter()
                    .map(|member| PlannedStep::new(member).introduced_by(CHAIN))
                    .collect()
            }
            MetaKind::Conditional => {
                let condition = instance.get("condition").and_then(ParamValue::as_str);
                let holds = instances
                    .iter()
                    .enumerate()
                    .any(|(other, candidate)| other != index && Some(candidate.name()) == condition);
                let (chosen, rejected) = if holds {
                    (names(instance, "then"), names(instance, "otherwise"))
                } else {
                    (names(instance, "otherwise"), names(instance, "then"))
                };
                for name in &rejected {
                    if resolver.claim_present(name) {
                        debug!(decorator = %name, "dropped by unmet conditional branch");
                    }
                }
                debug!(condition = ?condition, holds, "evaluated conditional");
                resolver
                    .resolve_all(&chosen, true)?
                    .into_iter()
                    .map(|member| PlannedStep::new(member).introduced_by(CONDITIONAL))
                    .collect()
            }
            MetaKind::Priority => {
                let mode = PriorityMode::parse(instance.get("mode").and_then(ParamValue::as_str));
                let explicit = instance
                    .get("explicit")
                    .and_then(ParamValue::as_bool)
                    .unwrap_or(false);
                let members = resolver.resolve_all(&names(instance, "decorators"), true)?;
                prioritize(members, mode, explicit, index)
            }
        };
        expansions[index] = Some(steps);
    }

    let mut steps = Vec::with_capacity(instances.len());
    for (index, instance) in instances.iter().enumerate() {
        if let Some(expanded) = expansions[index].take() {
            steps.extend(expanded);
        } else if !claimed[index] {
            steps.push(PlannedStep::new(instance.clone()));
        }
    }
    Ok(steps)
}

fn names(instance: &DecoratorInstance<'_>, parameter: &str) -> Vec<String> {
    instance
        .get(parameter)
        .map(|value| value.string_items().into_iter().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn prioritize<'r>(
    members: Vec<DecoratorInstance<'r>>,
    mode: PriorityMode,
    explicit: bool,
    group: usize,
) -> Vec<PlannedStep<'r>> {
    let highest = members.first().map(DecoratorInstance::name);
    let mut seen: Vec<Placement> = Vec::new();
    let mut steps = Vec::with_capacity(members.len());

    for (rank, member) in members.into_iter().enumerate() {
        let mut step = PlannedStep::new(member).introduced_by(PRIORITY);
        step.priority_group = Some(group);
        match mode {
            PriorityMode::Override => {
                if seen.contains(&step.placement()) {
                    debug!(decorator = step.name(), placement = step.placement().as_str(), "outranked by higher priority");
                    continue;
                }
                seen.push(step.placement());
            }
            PriorityMode::Merge => step.behavior = CompositionBehavior::Accumulate,
            PriorityMode::Cascade => {
                step.behavior = CompositionBehavior::Accumulate;
                if explicit && rank > 0 {
                    step.subordinate_to = highest;
                }
            }
        }
        steps.push(step);
    }
    steps
}

struct Resolver<'a, 'r> {
    registry: &'r Registry,
    instances: &'a [DecoratorInstance<'r>],
    claimed: &'a mut [bool],
    meta: &'r str,
}

impl<'r> Resolver<'_, 'r> {
    fn resolve_all(
        &mut self,
        names: &[String],
        strict: bool,
    ) -> CompositionResult<Vec<DecoratorInstance<'r>>> {
        let mut members = Vec::with_capacity(names.len());
        for name in names {
            if let Some(member) = self.resolve(name, strict)? {
                members.push(member);
            }
        }
        Ok(members)
    }

    fn resolve(&mut self, name: &str, strict: bool) -> CompositionResult<Option<DecoratorInstance<'r>>> {
        if MetaKind::from_name(name).is_some() {
            return Err(CompositionError::InvalidMetaReference {
                meta: self.meta.to_owned(),
                reference: name.to_owned(),
            });
        }
        if let Some(position) = self.unclaimed(name) {
            self.claimed[position] = true;
            return Ok(Some(self.instances[position].clone()));
        }

        match self.registry.lookup(name, None) {
            Ok(definition) => Ok(Some(DecoratorInstance::with_defaults(definition)?)),
            Err(err) if !strict => {
                warn!(meta = self.meta, decorator = name, %err, "skipping unresolved decorator");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn claim_present(&mut self, name: &str) -> bool {
        match self.unclaimed(name) {
            Some(position) => {
                self.claimed[position] = true;
                true
            }
            None => false,
        }
    }

    fn unclaimed(&self, name: &str) -> Option<usize> {
        self.instances
            .iter()
            .enumerate()
            .position(|(position, instance)| !self.claimed[position] && instance.name() == name)
    }
}
