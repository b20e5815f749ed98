use std::fs;
use std::sync::atomic::{AtomicU32, Ordering};

use cubesql::config::{load_catalog_dir, load_catalog_file, load_first_catalog_dir, LoadError};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A fresh scratch directory under the system temp dir, cleaned up on drop.
struct ScratchDir(std::path::PathBuf);

impl ScratchDir {
    fn new() -> Self {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "cubesql_loader_integration_test_{}_{}",
            std::process::id(),
            n
        ));
        fs::create_dir_all(&path).unwrap();
        ScratchDir(path)
    }

    fn write(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self.0.join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

const ORDERS_YAML: &str = r#"
cubes:
  - name: orders
    table: my_orders
    dimensions:
      - name: id
        sql: "${table}.id"
        primary_key: true
      - name: booking_date
        sql: "date_trunc('${granularity}', ${table}.booking_date)"
        variants:
          - granularity: [day, week, month]
    metrics:
      - name: revenue
        sql: "sum(${table}.total)"
joins: []
"#;

const ORDER_ITEMS_YAML: &str = r#"
cubes:
  - name: order_items
    table: my_order_items
    dimensions:
      - name: id
        sql: "${table}.id"
        primary_key: true
    metrics:
      - name: quantity
        sql: "sum(${table}.quantity)"
joins: []
"#;

#[test]
fn loads_a_catalog_with_variants_from_disk() {
    let dir = ScratchDir::new();
    let path = dir.write("orders.yml", ORDERS_YAML);
    let catalog = load_catalog_file(&path).unwrap();
    assert_eq!(catalog.cubes.len(), 1);
    assert_eq!(catalog.cubes[0].dimensions[1].variants[0].placeholder, "granularity");
}

#[test]
fn a_directory_scan_parses_every_recognized_file_independently() {
    let dir = ScratchDir::new();
    dir.write("orders.yml", ORDERS_YAML);
    dir.write("order_items.yaml", ORDER_ITEMS_YAML);
    let catalogs = load_catalog_dir(&dir.0).unwrap();
    assert_eq!(catalogs.len(), 2);
    let names: Vec<&str> = catalogs
        .iter()
        .flat_map(|c| c.cubes.iter().map(|cube| cube.name.as_str()))
        .collect();
    assert!(names.contains(&"orders"));
    assert!(names.contains(&"order_items"));
}

#[test]
fn a_catalog_referencing_an_undeclared_join_cube_fails_invalid_catalog() {
    let dir = ScratchDir::new();
    let bad = r#"
cubes:
  - name: orders
    table: my_orders
joins:
  - left: orders
    right: missing_cube
    type: inner
    on_sql: "${left}.id = ${right}.order_id"
"#;
    let path = dir.write("bad.yml", bad);
    let result = load_catalog_file(&path);
    assert!(matches!(result, Err(LoadError::Invalid(_, _))));
}

#[test]
fn first_catalog_in_dir_picks_the_lexicographically_first_filename() {
    let dir = ScratchDir::new();
    dir.write("zzz.yml", ORDER_ITEMS_YAML);
    dir.write("aaa.yml", ORDERS_YAML);
    let first = load_first_catalog_dir(&dir.0).unwrap().unwrap();
    assert_eq!(first.cubes[0].name, "orders");
}

#[test]
fn an_empty_directory_yields_no_catalog() {
    let dir = ScratchDir::new();
    let first = load_first_catalog_dir(&dir.0).unwrap();
    assert!(first.is_none());
}
