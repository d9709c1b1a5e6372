//! Decorator definitions bound to validated parameter values.

use std::fmt;

use decorator_schema::{ParamValue, ValidatedParameters, ValidationErrors};
use serde_json::{Map, Value};

use crate::definition::DecoratorDefinition;
use crate::template::{CompositionBehavior, Placement};

const FRAGMENT_SEPARATOR: &str = "\n\n";

/// A definition bound to concrete, validated parameter values.
///
/// The instance borrows its definition; definitions outlive every instance
/// created from them.
#[derive(Clone, Debug, PartialEq)]
pub struct DecoratorInstance<'a> {
    definition: &'a DecoratorDefinition,
    parameters: ValidatedParameters,
}

impl<'a> DecoratorInstance<'a> {
    /// Validates `raw` against the definition and binds the result, filling
    /// in defaults for omitted optional parameters.
    ///
    /// # Errors
    ///
    /// Returns every [`ValidationErrors`] entry produced by the definition's
    /// validation pipeline.
    pub fn bind(
        definition: &'a DecoratorDefinition,
        raw: &Map<String, Value>,
    ) -> Result<Self, ValidationErrors> {
        let parameters = definition.pipeline().validate(raw)?;
        Ok(Self {
            definition,
            parameters,
        })
    }

    /// Binds the definition with no explicit parameters.
    ///
    /// # Errors
    ///
    /// Fails when the definition has a required parameter without a default.
    pub fn with_defaults(definition: &'a DecoratorDefinition) -> Result<Self, ValidationErrors> {
        Self::bind(definition, &Map::new())
    }

    /// Bound definition.
    #[must_use]
    pub fn definition(&self) -> &'a DecoratorDefinition {
        self.definition
    }

    /// Decorator name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.definition.name().as_str()
    }

    /// Placement bucket of the bound definition.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.definition.placement()
    }

    /// Composition behavior of the bound definition.
    #[must_use]
    pub fn composition_behavior(&self) -> CompositionBehavior {
        self.definition.composition_behavior()
    }

    /// Bound values, including resolved defaults.
    #[must_use]
    pub fn parameters(&self) -> &ValidatedParameters {
        &self.parameters
    }

    /// Returns the bound value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    /// Renders this instance's instruction text.
    ///
    /// Starts from the base instruction and walks parameters in schema
    /// declaration order. A fragment fills the `{name}` placeholder when the
    /// base instruction has one. Otherwise an accumulating decorator appends
    /// it after a blank line, while an overriding decorator substitutes its
    /// fragments for the base instruction. Empty fragments and absent
    /// parameters contribute nothing.
    #[must_use]
    pub fn render(&self) -> String {
        let template = self.definition.template();
        let mut base = template.instruction.clone();
        let mut fragments = Vec::new();

        for schema in self.definition.parameters() {
            let placeholder = format!("{{{}}}", schema.name());
            let fragment = self
                .parameters
                .get(schema.name())
                .zip(template.parameter_mapping.get(schema.name()))
                .map(|(value, mapping)| mapping.render(value))
                .unwrap_or_default();

            if base.contains(&placeholder) {
                base = base.replace(&placeholder, &fragment);
            } else if !fragment.trim().is_empty() {
                fragments.push(fragment);
            }
        }

        if self.composition_behavior() == CompositionBehavior::Override && !fragments.is_empty() {
            base.clear();
        }

        std::iter::once(base)
            .chain(fragments)
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join(FRAGMENT_SEPARATOR)
    }

    /// Canonical JSON form: name, version, and parameters in declaration
    /// order.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut parameters = Map::new();
        for schema in self.definition.parameters() {
            if let Some(value) = self.parameters.get(schema.name()) {
                parameters.insert(schema.name().to_owned(), value.to_json());
            }
        }

        let mut object = Map::new();
        object.insert("name".into(), Value::from(self.name()));
        object.insert("version".into(), Value::from(self.definition.version().to_string()));
        object.insert("parameters".into(), Value::Object(parameters));
        Value::Object(object)
    }
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text == "true"
        || text == "false"
        || text.parse::<f64>().is_ok()
        || text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '(' | ')' | '[' | ']' | '=' | '"' | '\'' | '\\'))
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &ParamValue) -> fmt::Result {
    match value {
        ParamValue::String(text) if needs_quotes(text) => {
            f.write_str("\"")?;
            for c in text.chars() {
                match c {
                    '"' | '\\' => write!(f, "\\{c}")?,
                    '\n' => f.write_str("\\n")?,
                    '\t' => f.write_str("\\t")?,
                    _ => write!(f, "{c}")?,
                }
            }
            f.write_str("\"")
        }
        ParamValue::Array(items) => {
            f.write_str("[")?;
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write_literal(f, item)?;
            }
            f.write_str("]")
        }
        other => write!(f, "{other}"),
    }
}

/// Invocation-syntax form: `+++Name(key=value, ...)` with parameters in
/// declaration order; the parentheses are omitted when nothing is bound.
impl fmt::Display for DecoratorInstance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+++{}", self.name())?;
        let bound: Vec<_> = self
            .definition
            .parameters()
            .iter()
            .filter_map(|schema| {
                self.parameters
                    .get(schema.name())
                    .map(|value| (schema.name(), value))
            })
            .collect();
        if bound.is_empty() {
            return Ok(());
        }

        f.write_str("(")?;
        for (index, (name, value)) in bound.into_iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}=")?;
            write_literal(f, value)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decorator_schema::{ParameterKind, ParameterSchema, ValidationError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn reasoning() -> DecoratorDefinition {
        DecoratorDefinition::builder("Reasoning", "1.0.0")
            .parameter(
                ParameterSchema::new("depth", ParameterKind::Enum)
                    .with_values(["basic", "moderate", "comprehensive"])
                    .with_default("moderate"),
            )
            .parameter(ParameterSchema::new("cite", ParameterKind::Boolean))
            .instruction("Please provide detailed reasoning...")
            .value_map(
                "depth",
                [
                    ("basic", "Focus on the most important logical steps."),
                    ("moderate", "Cover the main steps and their connections."),
                    ("comprehensive", ""),
                ],
            )
            .value_map("cite", [("true", "Cite sources."), ("false", "Skip citations.")])
            .build()
            .unwrap()
    }

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn renders_base_then_fragments_in_schema_order() {
        let definition = reasoning();
        let instance =
            DecoratorInstance::bind(&definition, &raw(json!({ "cite": false, "depth": "basic" }))).unwrap();

        assert_eq!(
            instance.render(),
            "Please provide detailed reasoning...\n\nFocus on the most important logical steps.\n\nSkip citations."
        );
    }

    #[test]
    fn defaults_fill_omitted_parameters() {
        let definition = reasoning();
        let instance = DecoratorInstance::with_defaults(&definition).unwrap();
        assert_eq!(instance.get("depth"), Some(&ParamValue::String("moderate".into())));
        assert!(instance.get("cite").is_none());
        assert!(instance.render().ends_with("Cover the main steps and their connections."));
    }

    #[test]
    fn empty_fragments_add_no_whitespace() {
        let definition = reasoning();
        let instance =
            DecoratorInstance::bind(&definition, &raw(json!({ "depth": "comprehensive" }))).unwrap();
        assert_eq!(instance.render(), "Please provide detailed reasoning...");
    }

    #[test]
    fn placeholders_are_substituted_in_place() {
        let definition = DecoratorDefinition::builder("Audience", "1.0.0")
            .parameter(ParameterSchema::new("level", ParameterKind::String).required())
            .parameter(ParameterSchema::new("note", ParameterKind::String))
            .instruction("Write for {level} readers.{note}")
            .format("level", "{value}")
            .format("note", " {value}")
            .build()
            .unwrap();

        let instance = DecoratorInstance::bind(&definition, &raw(json!({ "level": "expert" }))).unwrap();
        assert_eq!(instance.render(), "Write for expert readers.");
    }

    #[test]
    fn missing_required_parameter_is_reported() {
        let definition = DecoratorDefinition::builder("Audience", "1.0.0")
            .parameter(ParameterSchema::new("level", ParameterKind::String).required())
            .build()
            .unwrap();

        let errors = DecoratorInstance::with_defaults(&definition).expect_err("required");
        assert_eq!(
            errors.errors(),
            [ValidationError::MissingRequiredParameter {
                decorator: "Audience".into(),
                parameter: "level".into(),
            }]
        );
    }

    #[test]
    fn canonical_forms_follow_declaration_order() {
        let definition = reasoning();
        let instance =
            DecoratorInstance::bind(&definition, &raw(json!({ "cite": true, "depth": "basic" }))).unwrap();

        assert_eq!(instance.to_string(), "+++Reasoning(depth=basic, cite=true)");
        assert_eq!(
            instance.to_value().to_string(),
            r#"{"name":"Reasoning","version":"1.0.0","parameters":{"depth":"basic","cite":true}}"#
        );
    }

    #[test]
    fn canonical_json_keeps_integers_integral() {
        let definition = DecoratorDefinition::builder("Outline", "1.0.0")
            .parameter(ParameterSchema::new("depth", ParameterKind::Number).with_default(3))
            .parameter(ParameterSchema::new("ratio", ParameterKind::Number))
            .build()
            .unwrap();
        let instance = DecoratorInstance::bind(&definition, &raw(json!({ "ratio": 0.5 }))).unwrap();

        assert_eq!(instance.to_value()["parameters"].to_string(), r#"{"depth":3,"ratio":0.5}"#);
    }

    #[test]
    fn override_behavior_substitutes_for_instruction() {
        let definition = DecoratorDefinition::builder("Tone", "1.0.0")
            .parameter(
                ParameterSchema::new("style", ParameterKind::Enum)
                    .with_values(["formal", "casual"])
                    .required(),
            )
            .instruction("Tone:")
            .value_map("style", [("formal", "Be formal."), ("casual", "")])
            .behavior(CompositionBehavior::Override)
            .build()
            .unwrap();

        let formal = DecoratorInstance::bind(&definition, &raw(json!({ "style": "formal" }))).unwrap();
        assert_eq!(formal.render(), "Be formal.");

        let casual = DecoratorInstance::bind(&definition, &raw(json!({ "style": "casual" }))).unwrap();
        assert_eq!(casual.render(), "Tone:");
    }

    #[test]
    fn display_quotes_ambiguous_strings() {
        let definition = DecoratorDefinition::builder("Tone", "1.0.0")
            .parameter(ParameterSchema::new("style", ParameterKind::String))
            .build()
            .unwrap();
        let instance =
            DecoratorInstance::bind(&definition, &raw(json!({ "style": "warm, \"friendly\"" }))).unwrap();
        assert_eq!(instance.to_string(), r#"+++Tone(style="warm, \"friendly\"")"#);

        let quoted = DecoratorInstance::bind(&definition, &raw(json!({ "style": "'hi" }))).unwrap();
        assert_eq!(quoted.to_string(), r#"+++Tone(style="'hi")"#);

        let multiline = DecoratorInstance::bind(&definition, &raw(json!({ "style": "dry\nwit" }))).unwrap();
        assert_eq!(multiline.to_string(), r#"+++Tone(style="dry\nwit")"#);
    }
}
