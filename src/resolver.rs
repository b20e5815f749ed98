//! Enumerate the fields available across all cubes, validate every field a
//! query references, and determine the minimal set of cubes needed (spec §4.4).

use std::collections::HashSet;

use crate::error::{CompileError, CompileResult};
use crate::model::{CubeCatalog, Query};
use crate::template::referenced_names;
use crate::variant::variant_field_names;

/// The outcome of resolving a query against a catalog: every field the
/// query touches (its own fields, plus fields referenced by filters and
/// sorts) and the distinct cubes needed to answer it, in first-seen order.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub all_query_fields: Vec<String>,
    pub needed_cubes: Vec<String>,
}

/// All fully-qualified `"cube.field"` names the catalog exposes, variants
/// pre-expanded by enumerating alias suffixes without running the template
/// engine (spec §4.4 step 1).
fn enumerate_all_fields(catalog: &CubeCatalog) -> HashSet<String> {
    let mut all = HashSet::new();
    for cube in &catalog.cubes {
        for decls in [&cube.dimensions, &cube.metrics, &cube.window_metrics] {
            for decl in decls.iter() {
                for name in variant_field_names(decl) {
                    all.insert(format!("{}.{}", cube.name, name));
                }
            }
        }
    }
    all
}

/// Extract the field name a sort spec refers to, dropping the optional
/// `" desc"` suffix (spec §3: `sort_spec` is `"cube.field"` optionally
/// followed by `" desc"`).
fn sort_field_ref(sort: &str) -> &str {
    sort.split_whitespace().next().unwrap_or(sort)
}

/// Resolve `query` against `catalog` (spec §4.4).
pub fn resolve(catalog: &CubeCatalog, query: &Query) -> CompileResult<Resolution> {
    let all_fields = enumerate_all_fields(catalog);

    let mut filter_refs = Vec::new();
    for filter in &query.filters {
        filter_refs.extend(referenced_names(filter));
    }
    let sort_refs: Vec<String> = query.sorts.iter().map(|s| sort_field_ref(s).to_string()).collect();

    let mut all_query_fields = Vec::with_capacity(query.fields.len() + filter_refs.len() + sort_refs.len());
    all_query_fields.extend(query.fields.iter().cloned());
    all_query_fields.extend(filter_refs);
    all_query_fields.extend(sort_refs);

    let mut needed_cubes: Vec<String> = Vec::new();
    for field in &all_query_fields {
        if !all_fields.contains(field) {
            return Err(CompileError::UnknownField(field.clone()));
        }
        let cube_name = field.split('.').next().unwrap_or_default().to_string();
        if !needed_cubes.contains(&cube_name) {
            needed_cubes.push(cube_name);
        }
    }

    if needed_cubes.is_empty() {
        return Err(CompileError::EmptyQuery);
    }

    Ok(Resolution {
        all_query_fields,
        needed_cubes,
    })
}
