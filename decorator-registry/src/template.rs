//! Transformation templates: how a decorator turns parameters into text.

use std::collections::BTreeMap;

use decorator_schema::ParamValue;
use serde::{Deserialize, Serialize};

/// Where a decorator's rendered text goes relative to the base prompt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Before the base prompt.
    #[default]
    Prepend,
    /// After the base prompt.
    Append,
    /// Becomes the entire output.
    Override,
    /// Becomes the entire output.
    Replace,
}

impl Placement {
    /// Returns true for placements whose text replaces the whole prompt.
    #[must_use]
    pub const fn replaces_prompt(self) -> bool {
        matches!(self, Self::Override | Self::Replace)
    }

    /// Lowercase name as written in definitions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepend => "prepend",
            Self::Append => "append",
            Self::Override => "override",
            Self::Replace => "replace",
        }
    }
}

/// How several decorators sharing a placement bucket combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionBehavior {
    /// Later instances replace earlier ones in the bucket, and parameter
    /// fragments stand in for the base instruction.
    Override,
    /// Fragments are concatenated in application order, after the base
    /// instruction.
    #[default]
    Accumulate,
}

/// Maps one parameter's value to an instruction fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterMapping {
    /// Format string with a `{value}` placeholder.
    Format {
        /// Text containing `{value}`.
        format: String,
    },
    /// Lookup table from the value's literal form to text. Booleans use the
    /// keys `true` and `false`.
    ValueMap {
        /// Value literal to fragment.
        #[serde(rename = "valueMap")]
        value_map: BTreeMap<String, String>,
    },
}

impl ParameterMapping {
    /// Creates a format mapping.
    #[must_use]
    pub fn format(format: impl Into<String>) -> Self {
        Self::Format {
            format: format.into(),
        }
    }

    /// Creates a lookup mapping.
    #[must_use]
    pub fn value_map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::ValueMap {
            value_map: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Renders the fragment for `value`. An unmapped lookup key yields an
    /// empty fragment.
    #[must_use]
    pub fn render(&self, value: &ParamValue) -> String {
        match self {
            Self::Format { format } => format.replace("{value}", &value.to_string()),
            Self::ValueMap { value_map } => value_map
                .get(&value.to_string())
                .cloned()
                .unwrap_or_default(),
        }
    }
}

/// Declarative description of a decorator's transformation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationTemplate {
    /// Base instruction text; may embed `{parameter}` placeholders.
    pub instruction: String,
    /// Per-parameter fragment rules.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameter_mapping: BTreeMap<String, ParameterMapping>,
    /// Target bucket.
    #[serde(default)]
    pub placement: Placement,
    /// Bucket combination rule.
    #[serde(default)]
    pub composition_behavior: CompositionBehavior,
}
