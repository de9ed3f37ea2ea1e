use crate::values::json_value;
use duckdb::Connection;
use ifcduck_parser::split_statements;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, debug_span, warn};

/// Outcome of one query call. `error` is set exactly when `ok` is false, and a
/// failed result never carries columns or rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub ok: bool,
    pub error: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>, // row-major
}

impl QueryResult {
    pub fn success(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            ok: true,
            error: None,
            columns,
            rows,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Run every statement in `sql` in order on `conn`. Statements before the last
/// are executed for their side effects only; the last one's rows are returned.
///
/// The connection is in autocommit mode, so each statement is committed as soon
/// as it succeeds. A failure stops the script and leaves earlier statements
/// committed.
pub(crate) fn run_script(conn: &Connection, sql: &str) -> QueryResult {
    let statements = split_statements(sql);
    let Some((last, init)) = statements.split_last() else {
        return QueryResult::success(Vec::new(), Vec::new());
    };

    for stmt in init {
        if let Err(e) = conn.execute_batch(&stmt.sql) {
            warn!(line = stmt.lineno, error = %e, "statement failed");
            return QueryResult::failure(e.to_string());
        }
    }

    match fetch_all(conn, &last.sql) {
        Ok((columns, rows)) => QueryResult::success(columns, rows),
        Err(e) => {
            warn!(line = last.lineno, error = %e, "query failed");
            QueryResult::failure(e.to_string())
        }
    }
}

/// Execute one statement and collect its column names and every row.
pub(crate) fn fetch_all(
    conn: &Connection,
    sql: &str,
) -> Result<(Vec<String>, Vec<Vec<Value>>), duckdb::Error> {
    let span = debug_span!("db.query", duration_ms = tracing::field::Empty);
    let _guard = span.enter();
    let start = Instant::now();

    let mut stmt = conn.prepare(sql)?;
    let mut rows_iter = stmt.query([])?;

    let columns: Vec<String> = match rows_iter.as_ref() {
        Some(stmt_ref) => (0..stmt_ref.column_count())
            .map(|i| {
                stmt_ref
                    .column_name(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| format!("col{}", i))
            })
            .collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };

    let mut rows = Vec::new();
    while let Some(row) = rows_iter.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            values.push(json_value(row.get_ref(i)?));
        }
        rows.push(values);
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    span.record("duration_ms", duration_ms);
    debug!(rows = rows.len(), "query fetched");
    Ok((columns, rows))
}
