//! Cubes, joins and the catalog that ties them together (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{CompileError, CompileResult};
use crate::model::field::FieldDecl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
            JoinType::Full => "full",
        }
    }

    /// Swap `left`/`right`; `inner`/`full` are unchanged (spec §4.6 step 2).
    pub fn reversed(self) -> JoinType {
        match self {
            JoinType::Left => JoinType::Right,
            JoinType::Right => JoinType::Left,
            other => other,
        }
    }
}

/// `{ left, right, type, on_sql }` (spec §3). `on_sql` may reference
/// `${left}`/`${right}`, substituted with the two cubes' aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub left: String,
    pub right: String,
    #[serde(rename = "type")]
    pub join_type: JoinType,
    pub on_sql: String,
}

/// `{ name, table, dimensions, metrics, window_metrics }` (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub dimensions: Vec<FieldDecl>,
    #[serde(default)]
    pub metrics: Vec<FieldDecl>,
    #[serde(default)]
    pub window_metrics: Vec<FieldDecl>,
}

/// `{ cubes, joins }` (spec §3). Immutable input to a compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CubeCatalog {
    #[serde(default)]
    pub cubes: Vec<Cube>,
    #[serde(default)]
    pub joins: Vec<Join>,
}

impl CubeCatalog {
    pub fn cube(&self, name: &str) -> Option<&Cube> {
        self.cubes.iter().find(|c| c.name == name)
    }

    /// Validate catalog-level invariants that can't be checked while
    /// deserializing a single cube in isolation: unique cube names and
    /// joins that only reference declared cubes (spec §3, §7 `InvalidCatalog`).
    pub fn validate(&self) -> CompileResult<()> {
        let mut seen = HashSet::new();
        for cube in &self.cubes {
            if !seen.insert(cube.name.as_str()) {
                return Err(CompileError::InvalidCatalog(format!(
                    "duplicate cube name '{}'",
                    cube.name
                )));
            }
        }
        for join in &self.joins {
            if self.cube(&join.left).is_none() {
                return Err(CompileError::InvalidCatalog(format!(
                    "join references undeclared cube '{}'",
                    join.left
                )));
            }
            if self.cube(&join.right).is_none() {
                return Err(CompileError::InvalidCatalog(format!(
                    "join references undeclared cube '{}'",
                    join.right
                )));
            }
        }
        Ok(())
    }
}
