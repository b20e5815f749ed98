use std::collections::HashSet;

use cubesql::alias::SequentialAliasSource;
use cubesql::cube_view::CubeView;
use cubesql::model::{Cube, FieldDecl, FieldKind, VariantSpec, VariantValue};

fn orders_cube() -> Cube {
    Cube {
        name: "orders".to_string(),
        table: "my_orders".to_string(),
        dimensions: vec![
            FieldDecl {
                name: "id".to_string(),
                sql: "${table}.id".to_string(),
                primary_key: true,
                variants: vec![],
            },
            FieldDecl {
                name: "booking_date".to_string(),
                sql: "date_trunc('${granularity}', ${table}.booking_date)".to_string(),
                primary_key: false,
                variants: vec![VariantSpec {
                    placeholder: "granularity".to_string(),
                    values: vec![
                        VariantValue::Scalar(serde_json::Value::String("day".to_string())),
                        VariantValue::Scalar(serde_json::Value::String("month".to_string())),
                    ],
                }],
            },
        ],
        metrics: vec![FieldDecl {
            name: "revenue".to_string(),
            sql: "sum(${table}.total)".to_string(),
            primary_key: false,
            variants: vec![],
        }],
        window_metrics: vec![],
    }
}

fn order_items_cube() -> Cube {
    Cube {
        name: "order_items".to_string(),
        table: "my_order_items".to_string(),
        dimensions: vec![FieldDecl {
            name: "id".to_string(),
            sql: "${table}.id".to_string(),
            primary_key: true,
            variants: vec![],
        }],
        metrics: vec![FieldDecl {
            name: "quantity".to_string(),
            sql: "sum(${table}.quantity)".to_string(),
            primary_key: false,
            variants: vec![],
        }],
        window_metrics: vec![],
    }
}

#[test]
fn aliases_are_unique_across_a_shared_compilation() {
    let mut aliases = SequentialAliasSource::new();
    let mut used = HashSet::new();
    let orders = CubeView::build(&orders_cube(), &mut aliases, &mut used).unwrap();
    let items = CubeView::build(&order_items_cube(), &mut aliases, &mut used).unwrap();
    assert_ne!(orders.alias, items.alias);
    assert!(used.contains(&orders.alias));
    assert!(used.contains(&items.alias));
}

#[test]
fn cube_vars_exposes_variant_expanded_fields_under_plain_and_qualified_names() {
    let mut aliases = SequentialAliasSource::new();
    let mut used = HashSet::new();
    let view = CubeView::build(&orders_cube(), &mut aliases, &mut used).unwrap();

    assert!(view.fields.get("booking_date_day").is_some());
    assert!(view.fields.get("booking_date_month").is_some());
    assert!(view.fields.get("booking_date").is_none());

    assert!(view.vars.contains_key("booking_date_day"));
    assert!(view.vars.contains_key("orders__booking_date_day"));
    assert_eq!(
        view.vars.get("booking_date_day").unwrap(),
        "date_trunc('day', ${table}.booking_date)"
    );
}

#[test]
fn field_kinds_are_tagged_by_the_list_they_came_from() {
    let mut aliases = SequentialAliasSource::new();
    let mut used = HashSet::new();
    let view = CubeView::build(&orders_cube(), &mut aliases, &mut used).unwrap();
    assert_eq!(view.fields.get("id").unwrap().kind, FieldKind::Dimension);
    assert_eq!(view.fields.get("revenue").unwrap().kind, FieldKind::Metric);
    assert!(view.fields.get("id").unwrap().primary_key);
}

#[test]
fn each_build_call_produces_an_independent_field_table() {
    let mut aliases = SequentialAliasSource::new();
    let mut used = HashSet::new();
    let first = CubeView::build(&orders_cube(), &mut aliases, &mut used).unwrap();
    let second = CubeView::build(&orders_cube(), &mut aliases, &mut used).unwrap();
    assert_ne!(first.alias, second.alias);
    assert_eq!(first.fields.iter().count(), second.fields.iter().count());
}
