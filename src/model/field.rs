//! Field declarations as they appear in a cube catalog (spec §3).
//!
//! A [`FieldDecl`] is the catalog's immutable view of a dimension, metric or
//! window metric. Which of the three it is comes from which list of the
//! owning [`crate::model::Cube`] it sits in, not from a property on the
//! struct itself -- matching the YAML shape the original `dotML` catalogs
//! use (`dimensions: [...]`, `metrics: [...]`, `window_metrics: [...]`).

use serde::de::{Deserialize, Deserializer, Error as DeError};
use serde::Serialize;
use std::collections::HashMap;

/// The three kinds a resolved field can carry (spec §3, §9 typed rewrite).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Dimension,
    Metric,
    WindowMetric,
}

impl FieldKind {
    pub fn is_dimension(self) -> bool {
        matches!(self, FieldKind::Dimension)
    }

    pub fn is_window(self) -> bool {
        matches!(self, FieldKind::WindowMetric)
    }
}

/// A single dimension, metric or window metric as declared in a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub sql: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub variants: Vec<VariantSpec>,
}

/// `{ placeholder: identifier, values: [scalar | {alias: scalar}] }` (spec §3).
///
/// On disk this is written as a one-key mapping, e.g.
/// `{granularity: [day, week, month]}`, so it needs a custom [`Deserialize`]
/// impl rather than a derive.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSpec {
    pub placeholder: String,
    pub values: Vec<VariantValue>,
}

impl Serialize for VariantSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = HashMap::new();
        map.insert(self.placeholder.clone(), self.values.clone());
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VariantSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map: HashMap<String, Vec<VariantValue>> = HashMap::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(DeError::custom(
                "a variant spec must be a mapping with exactly one placeholder key",
            ));
        }
        let (placeholder, values) = map.into_iter().next().expect("checked len == 1");
        Ok(VariantSpec { placeholder, values })
    }
}

/// One value of a [`VariantSpec`]: either a bare scalar (alias suffix and
/// substituted text are the same) or a single-key mapping where the key is
/// the alias suffix and the value is the substituted text (spec §3, §4.2).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VariantValue {
    Scalar(serde_json::Value),
    Aliased {
        alias: String,
        value: serde_json::Value,
    },
}

impl<'de> Deserialize<'de> for VariantValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match raw {
            serde_json::Value::Object(map) if map.len() == 1 => {
                let (alias, value) = map.into_iter().next().expect("checked len == 1");
                Ok(VariantValue::Aliased { alias, value })
            }
            other => Ok(VariantValue::Scalar(other)),
        }
    }
}

/// Render a scalar the way Python's `str(value)` would, since the alias
/// suffix and substituted text are built by string concatenation.
pub fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
