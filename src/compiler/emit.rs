//! Assemble the final SQL string with stable clause ordering (spec §4.7).

/// The clauses of a single SQL statement, assembled in the fixed order
/// `WITH`, `SELECT`, `FROM`, `WHERE`, `GROUP BY`, `ORDER BY`, `LIMIT`.
/// Missing clauses are omitted, with their separating newline suppressed.
#[derive(Debug, Default)]
pub struct Clauses {
    pub with: Option<String>,
    pub select: String,
    pub from: String,
    pub where_: Option<String>,
    pub group_by: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<String>,
}

pub fn emit(clauses: &Clauses) -> String {
    let mut lines = Vec::new();
    if let Some(with) = &clauses.with {
        lines.push(format!("with {}", with));
    }
    lines.push(format!("select {}", clauses.select));
    lines.push(format!("from {}", clauses.from));
    if let Some(where_) = &clauses.where_ {
        lines.push(format!("where {}", where_));
    }
    if let Some(group_by) = &clauses.group_by {
        lines.push(format!("group by {}", group_by));
    }
    if let Some(order_by) = &clauses.order_by {
        lines.push(format!("order by {}", order_by));
    }
    if let Some(limit) = &clauses.limit {
        lines.push(format!("limit {}", limit));
    }
    lines.join("\n")
}
