//! The five illustrative queries run after a conversion.
//!
//! Each query is executed on its own: one failing (for example because the
//! converter was told to skip geometry, so `shape` does not exist) does not
//! stop the rest.

use crate::query::{QueryResult, fetch_all};
use duckdb::Connection;
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// A demonstration query and how to print one of its rows.
#[derive(Debug, Clone, Copy)]
pub struct DemoQuery {
    pub title: &'static str,
    pub sql: &'static str,
    pub format_row: fn(&[Value]) -> String,
}

pub const DEMO_QUERIES: &[DemoQuery] = &[
    DemoQuery {
        title: "Available tables",
        sql: "SHOW TABLES",
        format_row: |row| cell(row, 0),
    },
    DemoQuery {
        title: "Entity counts by type",
        sql: "SELECT ifc_class, COUNT(*) AS count \
              FROM id_map \
              GROUP BY ifc_class \
              ORDER BY count DESC \
              LIMIT 10",
        format_row: |row| format!("{}: {}", cell(row, 0), cell(row, 1)),
    },
    DemoQuery {
        title: "IFC file metadata",
        sql: "SELECT * FROM metadata",
        format_row: |row| {
            format!(
                "Preprocessor: {}\n   - Schema: {}\n   - Description: {}",
                cell(row, 0),
                cell(row, 1),
                cell(row, 2)
            )
        },
    },
    DemoQuery {
        title: "Geometry data sample",
        sql: "SELECT s.ifc_id, s.x, s.y, s.z, g.id AS geometry_id \
              FROM shape s \
              LEFT JOIN geometry g ON s.geometry = g.id \
              LIMIT 5",
        format_row: |row| {
            format!(
                "ID: {}, Position: ({}, {}, {}), Geometry: {}",
                cell(row, 0),
                coord(row, 1),
                coord(row, 2),
                coord(row, 3),
                cell(row, 4)
            )
        },
    },
    DemoQuery {
        title: "Property sets sample",
        sql: "SELECT pset_name, name, value FROM psets LIMIT 10",
        format_row: |row| format!("{}.{}: {}", cell(row, 0), cell(row, 1), cell(row, 2)),
    },
];

/// One executed demonstration query.
#[derive(Debug, Clone)]
pub struct DemoStep {
    pub index: usize,
    pub query: DemoQuery,
    pub result: QueryResult,
}

impl fmt::Display for DemoStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}. {}:", self.index, self.query.title)?;
        if let Some(err) = &self.result.error {
            return writeln!(f, "   Error querying {}: {}", self.query.title.to_lowercase(), err);
        }
        for row in &self.result.rows {
            writeln!(f, "   - {}", (self.query.format_row)(row))?;
        }
        Ok(())
    }
}

pub(crate) fn run(conn: &Connection, queries: &[DemoQuery]) -> Vec<DemoStep> {
    queries
        .iter()
        .enumerate()
        .map(|(i, query)| {
            let result = match fetch_all(conn, query.sql) {
                Ok((columns, rows)) => QueryResult::success(columns, rows),
                Err(e) => {
                    warn!(query = query.title, error = %e, "demonstration query failed");
                    QueryResult::failure(e.to_string())
                }
            };
            DemoStep {
                index: i + 1,
                query: *query,
                result,
            }
        })
        .collect()
}

fn cell(row: &[Value], idx: usize) -> String {
    match row.get(idx) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "NULL".to_string(),
        Some(other) => other.to_string(),
    }
}

fn coord(row: &[Value], idx: usize) -> String {
    match row.get(idx).and_then(Value::as_f64) {
        Some(v) => format!("{:.2}", v),
        None => cell(row, idx),
    }
}
