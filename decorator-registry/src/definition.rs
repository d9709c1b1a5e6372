//! Immutable decorator definitions and the record format they load from.

use std::collections::BTreeSet;

use decorator_primitives::{DecoratorName, StandardRange, Version, parse_version};
use decorator_schema::{ParameterSchema, ValidationPipeline};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};
use crate::template::{CompositionBehavior, ParameterMapping, Placement, TransformationTemplate};

const DEFAULT_CATEGORY: &str = "general";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_owned()
}

/// Compatibility block as written in definition data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRecord {
    /// Decorators that must also be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// Decorators that may not be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
    /// Lowest supported standard version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_standard_version: Option<String>,
    /// Highest supported standard version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_standard_version: Option<String>,
    /// Supported model identifiers; empty means any model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
}

/// One decorator as written in definition data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionRecord {
    /// Case-sensitive decorator name.
    pub decorator_name: String,
    /// `major.minor.patch`.
    pub version: String,
    /// Grouping used by category queries.
    #[serde(default = "default_category")]
    pub category: String,
    /// Human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter schemas in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParameterSchema>,
    /// Text transformation.
    pub transformation_template: TransformationTemplate,
    /// Relationships with other decorators.
    #[serde(default)]
    pub compatibility: CompatibilityRecord,
}

/// Validated compatibility metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compatibility {
    requires: BTreeSet<DecoratorName>,
    conflicts: BTreeSet<DecoratorName>,
    standard: StandardRange,
    models: BTreeSet<String>,
}

impl Compatibility {
    /// Names that must be present alongside this decorator.
    #[must_use]
    pub fn requires(&self) -> &BTreeSet<DecoratorName> {
        &self.requires
    }

    /// Names that may not be present alongside this decorator.
    #[must_use]
    pub fn conflicts(&self) -> &BTreeSet<DecoratorName> {
        &self.conflicts
    }

    /// Returns true when this decorator declares a conflict with `name`.
    #[must_use]
    pub fn conflicts_with(&self, name: &str) -> bool {
        self.conflicts.contains(name)
    }

    /// Supported standard versions.
    #[must_use]
    pub fn standard_range(&self) -> &StandardRange {
        &self.standard
    }

    /// Declared model identifiers.
    #[must_use]
    pub fn models(&self) -> &BTreeSet<String> {
        &self.models
    }

    /// Returns true when the model is supported; an empty list supports all.
    #[must_use]
    pub fn supports_model(&self, model: &str) -> bool {
        self.models.is_empty() || self.models.contains(model)
    }

    /// Returns true when the standard version lies within the declared range.
    #[must_use]
    pub fn supports_standard(&self, version: &Version) -> bool {
        self.standard.contains(version)
    }

    fn from_record(name: &str, record: CompatibilityRecord) -> RegistryResult<Self> {
        let parse_names = |names: Vec<String>| {
            names
                .into_iter()
                .map(|other| {
                    DecoratorName::new(other).map_err(|err| RegistryError::invalid(name, err.to_string()))
                })
                .collect::<RegistryResult<BTreeSet<_>>>()
        };
        let parse_bound = |bound: Option<String>| {
            bound
                .as_deref()
                .map(parse_version)
                .transpose()
                .map_err(|err| RegistryError::invalid(name, err.to_string()))
        };

        let requires = parse_names(record.requires)?;
        let conflicts = parse_names(record.conflicts)?;
        if let Some(both) = requires.intersection(&conflicts).next() {
            return Err(RegistryError::invalid(
                name,
                format!("`{both}` is both required and conflicting"),
            ));
        }
        if conflicts.contains(name) || requires.contains(name) {
            return Err(RegistryError::invalid(name, "a decorator cannot reference itself"));
        }

        let standard = StandardRange::new(
            parse_bound(record.min_standard_version)?,
            parse_bound(record.max_standard_version)?,
        )
        .map_err(|err| RegistryError::invalid(name, err.to_string()))?;

        Ok(Self {
            requires,
            conflicts,
            standard,
            models: record.models.into_iter().collect(),
        })
    }

    fn to_record(&self) -> CompatibilityRecord {
        CompatibilityRecord {
            requires: self.requires.iter().map(ToString::to_string).collect(),
            conflicts: self.conflicts.iter().map(ToString::to_string).collect(),
            min_standard_version: self.standard.min().map(ToString::to_string),
            max_standard_version: self.standard.max().map(ToString::to_string),
            models: self.models.iter().cloned().collect(),
        }
    }
}

/// Immutable, validated decorator definition.
///
/// Construct from a [`DefinitionRecord`] (directly or via serde) or with
/// [`DecoratorDefinition::builder`]. Invariants enforced at construction:
/// - the name is a valid identifier and the version parses,
/// - parameter names are unique and every schema is self-consistent,
///   including its default,
/// - every `parameterMapping` key names a declared parameter,
/// - no decorator is both required and conflicting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DefinitionRecord", into = "DefinitionRecord")]
pub struct DecoratorDefinition {
    name: DecoratorName,
    version: Version,
    category: String,
    description: Option<String>,
    parameters: Vec<ParameterSchema>,
    template: TransformationTemplate,
    compatibility: Compatibility,
}

impl DecoratorDefinition {
    /// Starts building a definition programmatically.
    #[must_use]
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> DefinitionBuilder {
        DefinitionBuilder::new(name, version)
    }

    /// Parses and validates a JSON definition record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDefinition`] when the JSON is malformed
    /// or violates a definition invariant.
    pub fn from_json(input: &str) -> RegistryResult<Self> {
        let record: DefinitionRecord = serde_json::from_str(input)
            .map_err(|err| RegistryError::invalid("<unparsed>", err.to_string()))?;
        Self::try_from(record)
    }

    /// Decorator name.
    #[must_use]
    pub fn name(&self) -> &DecoratorName {
        &self.name
    }

    /// Definition version.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Category label.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Parameter schemas in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.parameters
    }

    /// Looks up a parameter schema by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters.iter().find(|schema| schema.name() == name)
    }

    /// Transformation template.
    #[must_use]
    pub fn template(&self) -> &TransformationTemplate {
        &self.template
    }

    /// Target placement bucket.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.template.placement
    }

    /// Bucket combination rule.
    #[must_use]
    pub fn composition_behavior(&self) -> CompositionBehavior {
        self.template.composition_behavior
    }

    /// Compatibility metadata.
    #[must_use]
    pub fn compatibility(&self) -> &Compatibility {
        &self.compatibility
    }

    /// Validation pipeline over this definition's parameters.
    #[must_use]
    pub fn pipeline(&self) -> ValidationPipeline<'_> {
        ValidationPipeline::new(self.name.as_str(), &self.parameters)
    }
}

impl TryFrom<DefinitionRecord> for DecoratorDefinition {
    type Error = RegistryError;

    fn try_from(record: DefinitionRecord) -> RegistryResult<Self> {
        let raw_name = record.decorator_name;
        let name = DecoratorName::new(raw_name.as_str())
            .map_err(|err| RegistryError::invalid(raw_name.as_str(), err.to_string()))?;
        let version = parse_version(&record.version)
            .map_err(|err| RegistryError::invalid(name.as_str(), err.to_string()))?;

        let mut seen = BTreeSet::new();
        for schema in &record.parameters {
            if schema.name().trim().is_empty() {
                return Err(RegistryError::invalid(name.as_str(), "parameter name cannot be empty"));
            }
            if !seen.insert(schema.name()) {
                return Err(RegistryError::invalid(
                    name.as_str(),
                    format!("parameter `{}` is declared twice", schema.name()),
                ));
            }
            schema
                .check_consistency(name.as_str())
                .map_err(|err| RegistryError::invalid(name.as_str(), err.to_string()))?;
        }

        if let Some(orphan) = record
            .transformation_template
            .parameter_mapping
            .keys()
            .find(|key| !seen.contains(key.as_str()))
        {
            return Err(RegistryError::invalid(
                name.as_str(),
                format!("parameterMapping references undeclared parameter `{orphan}`"),
            ));
        }

        let compatibility = Compatibility::from_record(name.as_str(), record.compatibility)?;

        Ok(Self {
            name,
            version,
            category: record.category,
            description: record.description,
            parameters: record.parameters,
            template: record.transformation_template,
            compatibility,
        })
    }
}

impl From<DecoratorDefinition> for DefinitionRecord {
    fn from(definition: DecoratorDefinition) -> Self {
        let compatibility = definition.compatibility.to_record();
        Self {
            decorator_name: definition.name.into(),
            version: definition.version.to_string(),
            category: definition.category,
            description: definition.description,
            parameters: definition.parameters,
            transformation_template: definition.template,
            compatibility,
        }
    }
}

/// Builder for [`DecoratorDefinition`].
#[derive(Debug, Clone)]
pub struct DefinitionBuilder {
    record: DefinitionRecord,
}

impl DefinitionBuilder {
    /// Creates a builder with an empty instruction, prepend placement, and
    /// accumulate behavior.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            record: DefinitionRecord {
                decorator_name: name.into(),
                version: version.into(),
                category: default_category(),
                description: None,
                parameters: Vec::new(),
                transformation_template: TransformationTemplate::default(),
                compatibility: CompatibilityRecord::default(),
            },
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.record.category = category.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.record.description = Some(description.into());
        self
    }

    /// Appends a parameter schema.
    #[must_use]
    pub fn parameter(mut self, schema: ParameterSchema) -> Self {
        self.record.parameters.push(schema);
        self
    }

    /// Sets the base instruction.
    #[must_use]
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.record.transformation_template.instruction = instruction.into();
        self
    }

    /// Adds a fragment mapping for a parameter.
    #[must_use]
    pub fn mapping(mut self, parameter: impl Into<String>, mapping: ParameterMapping) -> Self {
        self.record
            .transformation_template
            .parameter_mapping
            .insert(parameter.into(), mapping);
        self
    }

    /// Adds a lookup mapping for an enum or boolean parameter.
    #[must_use]
    pub fn value_map<I, K, V>(self, parameter: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.mapping(parameter, ParameterMapping::value_map(entries))
    }

    /// Adds a `{value}` format mapping.
    #[must_use]
    pub fn format(self, parameter: impl Into<String>, format: impl Into<String>) -> Self {
        self.mapping(parameter, ParameterMapping::format(format))
    }

    /// Sets the placement bucket.
    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.record.transformation_template.placement = placement;
        self
    }

    /// Sets the composition behavior.
    #[must_use]
    pub fn behavior(mut self, behavior: CompositionBehavior) -> Self {
        self.record.transformation_template.composition_behavior = behavior;
        self
    }

    /// Declares a required companion decorator.
    #[must_use]
    pub fn requires(mut self, name: impl Into<String>) -> Self {
        self.record.compatibility.requires.push(name.into());
        self
    }

    /// Declares a conflicting decorator.
    #[must_use]
    pub fn conflicts(mut self, name: impl Into<String>) -> Self {
        self.record.compatibility.conflicts.push(name.into());
        self
    }

    /// Declares the supported standard version range.
    #[must_use]
    pub fn standard_range(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.record.compatibility.min_standard_version = min.map(str::to_owned);
        self.record.compatibility.max_standard_version = max.map(str::to_owned);
        self
    }

    /// Declares a supported model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.record.compatibility.models.push(model.into());
        self
    }

    /// Validates and finalises the definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDefinition`] when any definition
    /// invariant is violated.
    pub fn build(self) -> RegistryResult<DecoratorDefinition> {
        DecoratorDefinition::try_from(self.record)
    }
}
