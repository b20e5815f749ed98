//! Emit a flat `SELECT ... FROM ... [WHERE] [GROUP BY] [ORDER BY] LIMIT`,
//! with an optional outer window-function wrapper (spec §4.5).

use std::collections::HashSet;

use crate::alias::AliasSource;
use crate::compiler::emit::{emit, Clauses};
use crate::cube_view::CubeView;
use crate::error::CompileResult;
use crate::model::{Cube, FieldKind, Query};
use crate::template::{rewrite_dotted_placeholders, substitute};

const DEFAULT_LIMIT: i64 = 5000;

/// Compile a query against a single cube (spec §4.5).
pub fn compile(cube: &Cube, query: &Query, alias_source: &mut dyn AliasSource) -> CompileResult<String> {
    let mut used_aliases = HashSet::new();
    let view = CubeView::build(cube, alias_source, &mut used_aliases)?;

    // Step 1-2: partition queried fields by kind, resolving each against cube_vars.
    struct SelectItem {
        field_name: String,
        sql: String,
        kind: FieldKind,
    }
    let mut select_items = Vec::new();
    let mut window_items: Vec<(String, String)> = Vec::new(); // (field_name, stripped_sql)

    for query_field in &query.fields {
        let field_name = query_field.split('.').nth(1).unwrap_or(query_field);
        let Some(field) = view.fields.get(field_name) else {
            continue; // validated already by the resolver before dispatch
        };
        if field.kind.is_window() {
            let stripped = field.sql.replace("${", "").replace('}', "");
            window_items.push((field.name.clone(), stripped));
        } else {
            let sql = substitute(&field.sql, &view.vars, true)?;
            select_items.push(SelectItem {
                field_name: field.name.clone(),
                sql,
                kind: field.kind,
            });
        }
    }

    let select_expr = select_items
        .iter()
        .map(|item| format!("{} as {}", item.sql, item.field_name))
        .collect::<Vec<_>>()
        .join(", ");

    let from_expr = format!("{} as {}", cube.table, view.alias);

    // Step 4: filters, dot-rewritten inside placeholders, substituted, parenthesized.
    let where_expr = if query.filters.is_empty() {
        None
    } else {
        let mut parts = Vec::with_capacity(query.filters.len());
        for filter in &query.filters {
            let rewritten = rewrite_dotted_placeholders(filter);
            let resolved = substitute(&rewritten, &view.vars, true)?;
            parts.push(format!("({})", resolved));
        }
        Some(parts.join(" and "))
    };

    // Step 5: GROUP BY positions of dimensions. The reference source emits
    // this whenever any dimension is selected at all, even with no metric
    // selected -- a pointless GROUP BY in that case. Kept as-is here for
    // bit-compatibility (spec §4.5 step 5, §9 open question).
    let dim_positions: Vec<usize> = select_items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.kind.is_dimension())
        .map(|(i, _)| i + 1)
        .collect();
    let group_expr = if !dim_positions.is_empty() {
        Some(
            dim_positions
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )
    } else {
        None
    };

    // Step 6: ORDER BY positions. The `desc` flag is parsed (stripped off
    // here) but never emitted (spec §4.5 step 6, §9 open question).
    let order_expr = if query.sorts.is_empty() {
        None
    } else {
        let mut positions = Vec::new();
        for sort in &query.sorts {
            let field_ref = sort.split_whitespace().next().unwrap_or(sort);
            let sort_name = field_ref.split('.').nth(1).unwrap_or(field_ref);
            if let Some(pos) = select_items.iter().position(|item| item.field_name == sort_name) {
                positions.push((pos + 1).to_string());
            }
        }
        if positions.is_empty() {
            None
        } else {
            Some(positions.join(", "))
        }
    };

    let base_sql = emit(&Clauses {
        with: None,
        select: select_expr,
        from: from_expr,
        where_: where_expr,
        group_by: group_expr,
        order_by: order_expr,
        limit: None,
    });

    // Step 7: wrap in a window-function base CTE when window fields are selected.
    let body = if window_items.is_empty() {
        base_sql
    } else {
        let window_expr = window_items
            .iter()
            .map(|(name, sql)| format!("{} as {}", sql, name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "with {alias}_base as (\n{base}\n)\nselect *, {window}\nfrom {alias}_base",
            alias = view.alias,
            base = base_sql,
            window = window_expr
        )
    };

    // Step 8: append the LIMIT clause, defaulting to 5000.
    Ok(format!("{}\nlimit {}", body, query.limit.unwrap_or(DEFAULT_LIMIT)))
}
