//! The structured query a caller asks the compiler to answer (spec §3, §6).

use serde::{Deserialize, Serialize};

/// `{ fields, filters, sorts, limit }` (spec §3).
///
/// `fields` are qualified `"cube.field"` references. `sorts` are
/// `"cube.field"` optionally followed by `" desc"`. `filters` are free-form
/// SQL that may reference `${cube.field}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub sorts: Vec<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}
