//! Emit a `WITH` statement that builds per-cube dimension and metric CTEs
//! and joins them on the queried dimensions, avoiding fan-out (spec §4.6).

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::alias::AliasSource;
use crate::compiler::emit::{emit, Clauses};
use crate::cube_view::CubeView;
use crate::error::{CompileError, CompileResult};
use crate::model::{Cube, CubeCatalog, Join, Query};
use crate::template::{rewrite_dotted_placeholders, substitute, VarMap};

/// A dimension referenced by the query, owned by exactly one needed cube.
struct QueriedDim {
    name: String,
    sql: String,
    owner: usize,
}

struct PreparedCube<'c> {
    cube: &'c Cube,
    view: CubeView,
    pk: String,       // resolved sql of the single primary-key dimension
    joins: Vec<&'c Join>,
    exposing_dimension_cols: Vec<String>, // "<alias>_dimension.<name>" for foreign dims
    exposing_metrics_col_names: Vec<String>,
}

/// Compile a query spanning `cubes` (spec §4.6).
pub fn compile(
    catalog: &CubeCatalog,
    cubes: &[&Cube],
    query: &Query,
    all_query_fields: &[String],
    alias_source: &mut dyn AliasSource,
) -> CompileResult<String> {
    let mut used_aliases = HashSet::new();

    // Step 1: prepare each cube -- cube view, primary key, attached joins.
    let mut prepared: Vec<PreparedCube> = Vec::with_capacity(cubes.len());
    for cube in cubes {
        let view = CubeView::build(cube, alias_source, &mut used_aliases)?;

        let pk_fields: Vec<_> = cube.dimensions.iter().filter(|d| d.primary_key).collect();
        if pk_fields.is_empty() {
            return Err(CompileError::NoPrimaryKey(cube.name.clone()));
        }
        if pk_fields.len() > 1 {
            return Err(CompileError::MultiColumnPKUnsupported(cube.name.clone()));
        }
        let pk_field = view
            .fields
            .get(&pk_fields[0].name)
            .expect("primary key field must be present after variant expansion");
        let pk = substitute(&pk_field.sql, &view.vars, true)?;

        let joins: Vec<&Join> = catalog
            .joins
            .iter()
            .filter(|j| j.left == cube.name || j.right == cube.name)
            .collect();
        if joins.is_empty() {
            return Err(CompileError::DisconnectedCube(cube.name.clone()));
        }

        prepared.push(PreparedCube {
            cube,
            view,
            pk,
            joins,
            exposing_dimension_cols: Vec::new(),
            exposing_metrics_col_names: Vec::new(),
        });
    }

    // Reject window metrics on the multi-cube path (spec §4.6 step 3, known gap).
    for field in all_query_fields {
        let Some((cube_name, field_name)) = field.split_once('.') else {
            continue;
        };
        if let Some(pc) = prepared.iter().find(|pc| pc.cube.name == cube_name) {
            if let Some(f) = pc.view.fields.get(field_name) {
                if f.kind.is_window() {
                    return Err(CompileError::UnsupportedWindowInJoin(field.clone()));
                }
            }
        }
    }

    // all_queried_dimensions: dimensions of a needed cube referenced anywhere
    // in the query, indexed by field name, owner recorded (spec §4.6 step 1).
    let mut all_queried_dimensions: Vec<QueriedDim> = Vec::new();
    for (owner, pc) in prepared.iter().enumerate() {
        for field in all_query_fields {
            let Some((cube_name, field_name)) = field.split_once('.') else {
                continue;
            };
            if cube_name != pc.cube.name {
                continue;
            }
            let Some(f) = pc.view.fields.get(field_name) else {
                continue;
            };
            if !f.kind.is_dimension() {
                continue;
            }
            if all_queried_dimensions.iter().any(|d| d.name == f.name) {
                continue;
            }
            let sql = substitute(&f.sql, &pc.view.vars, true)?;
            all_queried_dimensions.push(QueriedDim {
                name: f.name.clone(),
                sql,
                owner,
            });
        }
    }

    // Step 2: dimension CTEs.
    let mut ctes_dim = Vec::with_capacity(prepared.len());
    for i in 0..prepared.len() {
        let primary_key_cols = vec![format!("{} as pk0", prepared[i].pk)];

        let mut foreign_dimension_cols = Vec::new();
        let mut needed_partners: HashSet<usize> = HashSet::new();
        for qdim in &all_queried_dimensions {
            if qdim.owner == i {
                continue;
            }
            if prepared[i].view.fields.get(&qdim.name).is_some() {
                // this cube owns a field of the same name itself; not foreign
                continue;
            }
            foreign_dimension_cols.push(format!("{} as {}", qdim.sql, qdim.name));
            needed_partners.insert(qdim.owner);
            prepared[i]
                .exposing_dimension_cols
                .push(format!("{}_dimension.{}", prepared[i].view.alias, qdim.name));
        }

        let mut from_expr = format!("{} as {} ", prepared[i].cube.table, prepared[i].view.alias);
        for join in prepared[i].joins.clone() {
            let left_is_c = join.left == prepared[i].cube.name;
            let right_is_c = join.right == prepared[i].cube.name;
            if !left_is_c && !right_is_c {
                continue;
            }
            let other_name = if right_is_c { &join.left } else { &join.right };
            let Some(other_idx) = prepared.iter().position(|pc| &pc.cube.name == other_name) else {
                continue;
            };
            if !needed_partners.contains(&other_idx) {
                continue;
            }
            let mut join_type = join.join_type;
            if right_is_c {
                join_type = join_type.reversed();
            }
            let mut on_vars = VarMap::new();
            on_vars.insert("left".to_string(), prepared[i].view.alias.clone());
            on_vars.insert("right".to_string(), prepared[other_idx].view.alias.clone());
            let on_sql = substitute(&join.on_sql, &on_vars, false)?;
            from_expr.push_str(&format!(
                " {} join {} as {} on {}",
                join_type.as_sql(),
                prepared[other_idx].cube.table,
                prepared[other_idx].view.alias,
                on_sql
            ));
        }

        let select_cols: Vec<String> = primary_key_cols.into_iter().chain(foreign_dimension_cols).collect();
        let group_expr = (1..=select_cols.len())
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let select_expr = select_cols.join(",\n");

        ctes_dim.push(format!(
            "{alias}_dimension as (\nselect {select}\nfrom {from}\ngroup by {group}\n)",
            alias = prepared[i].view.alias,
            select = select_expr,
            from = from_expr,
            group = group_expr
        ));
    }

    // Step 3: metric CTEs.
    let mut ctes_metrics = Vec::with_capacity(prepared.len());
    for i in 0..prepared.len() {
        let mut cube_expressions = Vec::new();
        let mut cube_expressions_are_dims = Vec::new();
        let mut exposing_metrics_col_names = Vec::new();
        for field in all_query_fields {
            let Some((cube_name, field_name)) = field.split_once('.') else {
                continue;
            };
            if cube_name != prepared[i].cube.name {
                continue;
            }
            let Some(f) = prepared[i].view.fields.get(field_name) else {
                continue;
            };
            if exposing_metrics_col_names.contains(&f.name) {
                continue;
            }
            let sql = substitute(&f.sql, &prepared[i].view.vars, true)?;
            cube_expressions.push(format!("{} as {}", sql, f.name));
            cube_expressions_are_dims.push(f.kind.is_dimension());
            exposing_metrics_col_names.push(f.name.clone());
        }

        let select_cols: Vec<String> = prepared[i]
            .exposing_dimension_cols
            .iter()
            .cloned()
            .chain(cube_expressions)
            .collect();
        let select_expr = select_cols.join(",\n");

        let from_expr = format!(
            "{table} as {alias} join {alias}_dimension as {alias}_dimension on {alias}.id = {alias}_dimension.pk0",
            table = prepared[i].cube.table,
            alias = prepared[i].view.alias
        );

        // GROUP BY the exposing (foreign) dimension positions plus this
        // cube's own *dimension* positions only -- metrics must never
        // appear in GROUP BY (spec §4.6 step 3).
        let exposing_count = prepared[i].exposing_dimension_cols.len();
        let own_dim_positions = cube_expressions_are_dims
            .iter()
            .enumerate()
            .filter(|(_, is_dim)| **is_dim)
            .map(|(idx, _)| (exposing_count + idx + 1).to_string());
        let group_expr = (1..=exposing_count)
            .map(|p| p.to_string())
            .chain(own_dim_positions)
            .collect::<Vec<_>>()
            .join(", ");

        ctes_metrics.push(format!(
            "{alias}_metrics as (\nselect {select}\nfrom {from}\ngroup by {group}\n)",
            alias = prepared[i].view.alias,
            select = select_expr,
            from = from_expr,
            group = group_expr
        ));

        prepared[i].exposing_metrics_col_names = exposing_metrics_col_names;
    }

    // Step 4: final join of every cube's metric CTE.
    let mut select_parts = Vec::new();
    for pc in &prepared {
        for name in &pc.exposing_metrics_col_names {
            select_parts.push(format!("{}_metrics.{}", pc.view.alias, name));
        }
    }
    let select_expr = select_parts.join(", ");

    let anchor_alias = prepared[0].view.alias.clone();
    let mut from_expr = format!("{}_metrics as {}_metrics", anchor_alias, anchor_alias);
    for pc in prepared.iter().skip(1) {
        let on_parts: Vec<String> = all_queried_dimensions
            .iter()
            .map(|d| {
                format!(
                    "{}_metrics.{} = {}_metrics.{}",
                    anchor_alias, d.name, pc.view.alias, d.name
                )
            })
            .collect();
        from_expr.push_str(&format!(
            "\njoin {alias}_metrics as {alias}_metrics on {on}",
            alias = pc.view.alias,
            on = on_parts.join(" and ")
        ));
    }

    // Step 5: WHERE, built against a merged variable map, then every bare
    // cube alias is rewritten to its `_metrics` CTE by whole-token match
    // (spec §9: fixes the source's substring-replace ambiguity).
    let where_expr = if query.filters.is_empty() {
        None
    } else {
        let mut merged_vars = VarMap::new();
        for pc in &prepared {
            for (k, v) in &pc.view.vars {
                let resolved = substitute(v, &pc.view.vars, true)?;
                merged_vars.insert(k.clone(), resolved);
            }
        }

        let mut parts = Vec::with_capacity(query.filters.len());
        for filter in &query.filters {
            let rewritten = rewrite_dotted_placeholders(filter);
            let resolved = substitute(&rewritten, &merged_vars, true)?;
            parts.push(format!("({})", resolved));
        }
        let mut joined = parts.join(" and ");
        for pc in &prepared {
            joined = replace_whole_token(&joined, &pc.view.alias, &format!("{}_metrics", pc.view.alias));
        }
        Some(joined)
    };

    // Sorts: `<cube_alias>_metrics.<field_name>` (the `desc` flag is parsed
    // but not emitted, matching the single-cube path, spec §9).
    let order_expr = if query.sorts.is_empty() {
        None
    } else {
        let mut parts = Vec::new();
        for sort in &query.sorts {
            let field_ref = sort.split_whitespace().next().unwrap_or(sort);
            let Some((cube_name, field_name)) = field_ref.split_once('.') else {
                continue;
            };
            if let Some(pc) = prepared.iter().find(|pc| pc.cube.name == cube_name) {
                parts.push(format!("{}_metrics.{}", pc.view.alias, field_name));
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    };

    // No default limit on the multi-cube path.
    let limit_expr = query.limit.map(|l| l.to_string());

    let with_expr = ctes_dim.into_iter().chain(ctes_metrics).collect::<Vec<_>>().join(",\n");

    Ok(emit(&Clauses {
        with: Some(with_expr),
        select: select_expr,
        from: from_expr,
        where_: where_expr,
        group_by: None,
        order_by: order_expr,
        limit: limit_expr,
    }))
}

/// Replace every whole-token occurrence of `token` in `text` with `replacement`.
fn replace_whole_token(text: &str, token: &str, replacement: &str) -> String {
    let pattern = format!(r"\b{}\b", regex::escape(token));
    Regex::new(&pattern).unwrap().replace_all(text, replacement).into_owned()
}
