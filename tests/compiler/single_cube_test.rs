use cubesql::alias::SequentialAliasSource;
use cubesql::model::{Cube, CubeCatalog, FieldDecl, Query};
use cubesql::{compile_query, CompileError};

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
                name: "booking_date_day".to_string(),
                sql: "date(${table}.booking_date)".to_string(),
                primary_key: false,
                variants: vec![],
            },
            FieldDecl {
                name: "country_id".to_string(),
                sql: "${table}.country_id".to_string(),
                primary_key: false,
                variants: vec![],
            },
        ],
        metrics: vec![FieldDecl {
            name: "revenue".to_string(),
            sql: "sum(${table}.total)".to_string(),
            primary_key: false,
            variants: vec![],
        }],
        window_metrics: vec![FieldDecl {
            name: "average_order_value_rolling_30d".to_string(),
            sql: "avg(${revenue}) over (order by booking_date_day rows 30 preceding)".to_string(),
            primary_key: false,
            variants: vec![],
        }],
    }
}

fn catalog() -> CubeCatalog {
    CubeCatalog {
        cubes: vec![orders_cube()],
        joins: vec![],
    }
}

#[test]
fn scenario_1_single_cube_no_window_no_filters_exact_sql() {
    let query = Query {
        fields: vec![
            "orders.id".to_string(),
            "orders.booking_date_day".to_string(),
            "orders.revenue".to_string(),
        ],
        limit: Some(10),
        ..Default::default()
    };
    let mut aliases = SequentialAliasSource::new();
    let sql = compile_query(&catalog(), &query, &mut aliases).unwrap();
    assert_eq!(
        sql,
        "select orders_000.id as id, date(orders_000.booking_date) as booking_date_day, sum(orders_000.total) as revenue\n\
         from my_orders as orders_000\n\
         group by 1, 2\n\
         limit 10"
    );
}

#[test]
fn default_limit_is_5000_when_the_query_does_not_specify_one() {
    let query = Query {
        fields: vec!["orders.revenue".to_string()],
        ..Default::default()
    };
    let mut aliases = SequentialAliasSource::new();
    let sql = compile_query(&catalog(), &query, &mut aliases).unwrap();
    assert!(sql.ends_with("limit 5000"));
}

#[test]
fn scenario_2_window_metric_wraps_in_a_base_cte() {
    let query = Query {
        fields: vec![
            "orders.booking_date_day".to_string(),
            "orders.revenue".to_string(),
            "orders.average_order_value_rolling_30d".to_string(),
        ],
        ..Default::default()
    };
    let mut aliases = SequentialAliasSource::new();
    let sql = compile_query(&catalog(), &query, &mut aliases).unwrap();
    assert!(sql.starts_with("with orders_000_base as ("));
    assert!(sql.contains(
        "select *, avg(revenue) over (order by booking_date_day rows 30 preceding) as average_order_value_rolling_30d"
    ));
    assert!(sql.contains("from orders_000_base"));
    assert!(sql.ends_with("limit 5000"));
}

#[test]
fn scenario_3_filter_substitution_is_parenthesized_and_and_joined() {
    let query = Query {
        fields: vec!["orders.country_id".to_string(), "orders.revenue".to_string()],
        filters: vec![
            "${orders.country_id} = '67'".to_string(),
            "${orders.revenue} > 0".to_string(),
        ],
        ..Default::default()
    };
    let mut aliases = SequentialAliasSource::new();
    let sql = compile_query(&catalog(), &query, &mut aliases).unwrap();
    assert!(sql.contains("where (orders_000.country_id = '67') and (sum(orders_000.total) > 0)"));
}

#[test]
fn sort_desc_is_parsed_but_not_emitted() {
    let query = Query {
        fields: vec!["orders.country_id".to_string(), "orders.revenue".to_string()],
        sorts: vec!["orders.revenue desc".to_string()],
        ..Default::default()
    };
    let mut aliases = SequentialAliasSource::new();
    let sql = compile_query(&catalog(), &query, &mut aliases).unwrap();
    assert!(sql.contains("order by 2"));
    assert!(!sql.to_lowercase().contains("desc"));
}

#[test]
fn group_by_is_emitted_even_when_only_dimensions_are_selected() {
    let query = Query {
        fields: vec!["orders.country_id".to_string()],
        ..Default::default()
    };
    let mut aliases = SequentialAliasSource::new();
    let sql = compile_query(&catalog(), &query, &mut aliases).unwrap();
    assert!(sql.contains("group by 1"));
}

#[test]
fn unknown_field_is_rejected_before_any_sql_is_produced() {
    let query = Query {
        fields: vec!["orders.nope".to_string()],
        ..Default::default()
    };
    let mut aliases = SequentialAliasSource::new();
    let err = compile_query(&catalog(), &query, &mut aliases).unwrap_err();
    assert_eq!(err, CompileError::UnknownField("orders.nope".to_string()));
}
