//! For one cube, the complete field table and variable map the Template
//! Engine resolves against (spec §4.3).

use std::collections::{HashMap, HashSet};

use crate::alias::AliasSource;
use crate::error::CompileResult;
use crate::model::{Cube, FieldKind};
use crate::template::VarMap;
use crate::variant::{expand_variants, ResolvedField};

/// The union of a cube's dimensions, metrics and window metrics, variants
/// expanded, indexed by field name but iterable in declaration order.
#[derive(Debug, Clone, Default)]
pub struct CubeFields {
    order: Vec<String>,
    by_name: HashMap<String, ResolvedField>,
}

impl CubeFields {
    fn from_resolved(fields: Vec<ResolvedField>) -> Self {
        let mut order = Vec::with_capacity(fields.len());
        let mut by_name = HashMap::with_capacity(fields.len());
        for field in fields {
            order.push(field.name.clone());
            by_name.insert(field.name.clone(), field);
        }
        Self { order, by_name }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedField> {
        self.by_name.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedField> {
        self.order.iter().map(move |n| &self.by_name[n])
    }
}

/// A cube's resolved field table, alias and variable map for one compilation.
pub struct CubeView {
    pub alias: String,
    pub fields: CubeFields,
    pub vars: VarMap,
}

impl CubeView {
    /// Assemble `cube_fields` (union of dimensions/metrics/window metrics,
    /// variants expanded) and `cube_vars` (spec §4.3): `table` -> alias,
    /// every field name -> its sql, and `<cube>__<field>` -> its sql so
    /// `${cube.field}` references (rewritten to `${cube__field}`) resolve.
    pub fn build(
        cube: &Cube,
        alias_source: &mut dyn AliasSource,
        used_aliases: &mut HashSet<String>,
    ) -> CompileResult<Self> {
        let mut resolved = Vec::new();
        resolved.extend(expand_variants(FieldKind::Dimension, &cube.dimensions)?);
        resolved.extend(expand_variants(FieldKind::Metric, &cube.metrics)?);
        resolved.extend(expand_variants(
            FieldKind::WindowMetric,
            &cube.window_metrics,
        )?);
        let fields = CubeFields::from_resolved(resolved);

        let alias = loop {
            let candidate = alias_source.next_alias(&cube.name);
            if used_aliases.insert(candidate.clone()) {
                break candidate;
            }
        };

        let mut vars = VarMap::new();
        vars.insert("table".to_string(), alias.clone());
        for field in fields.iter() {
            vars.insert(field.name.clone(), field.sql.clone());
            vars.insert(format!("{}__{}", cube.name, field.name), field.sql.clone());
        }

        Ok(CubeView {
            alias,
            fields,
            vars,
        })
    }
}
