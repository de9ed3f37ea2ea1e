//! HTML templates for the viewer.
//!
//! Plain string interpolation; every value that came from a user or a database
//! goes through [`html_escape`].

use ifcduck_executor::QueryResult;
use serde_json::Value;
use std::fmt::Write;

/// Pre-filled SQL once a database is loaded.
pub const DEFAULT_SQL: &str = "SELECT * FROM information_schema.tables LIMIT 50;";

/// Data for the index page.
#[derive(Debug, Default)]
pub struct IndexPage<'a> {
    pub db_name: Option<&'a str>,
    pub sql: &'a str,
    pub result: Option<&'a QueryResult>,
    /// Message carried in the `?error=` query parameter.
    pub error: Option<&'a str>,
}

/// Template renderer.
pub struct Templates;

impl Templates {
    /// Render the base layout with content.
    pub fn layout(title: &str, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - DuckDB Viewer</title>
    <style>
        {css}
    </style>
</head>
<body>
    <header class="header">
        <h1>DuckDB Viewer</h1>
        <nav><a href="/">Server</a> | <a href="/client">In-browser</a></nav>
    </header>
    <main class="content">
{content}
    </main>
</body>
</html>"#,
            title = html_escape(title),
            css = CSS,
            content = content,
        )
    }

    pub fn index(page: &IndexPage<'_>) -> String {
        let mut body = String::new();

        if let Some(error) = page.error.filter(|e| !e.is_empty()) {
            let _ = writeln!(body, r#"<div class="error banner">{}</div>"#, html_escape(error));
        }

        body.push_str(
            r#"<section class="card">
    <h2>Database</h2>
    <form action="/upload" method="post" enctype="multipart/form-data">
        <input type="file" name="file" accept=".duckdb" required>
        <button type="submit">Upload</button>
    </form>
"#,
        );
        match page.db_name {
            Some(name) => {
                let _ = writeln!(
                    body,
                    r#"    <p class="status">Loaded: <code id="db-name">{}</code></p>"#,
                    html_escape(name)
                );
            }
            None => body.push_str(
                "    <p class=\"status\">No database loaded. Upload a .duckdb file to begin.</p>\n",
            ),
        }
        body.push_str("</section>\n");

        if page.db_name.is_some() {
            let _ = write!(
                body,
                r#"<section class="card">
    <h2>Query</h2>
    <form action="/query" method="post">
        <textarea name="sql" rows="8" spellcheck="false">{}</textarea>
        <button type="submit">Run</button>
    </form>
</section>
"#,
                html_escape(page.sql)
            );
        }

        if let Some(result) = page.result {
            body.push_str(&Self::result(result));
        }

        Self::layout("Query", &body)
    }

    fn result(result: &QueryResult) -> String {
        let mut out = String::from("<section class=\"card results\">\n");
        if let Some(error) = &result.error {
            let _ = writeln!(out, r#"<div class="error">{}</div>"#, html_escape(error));
        } else if result.columns.is_empty() {
            out.push_str("<p class=\"muted\">Statement executed. No rows returned.</p>\n");
        } else {
            out.push_str("<table>\n<thead><tr>");
            for column in &result.columns {
                let _ = write!(out, "<th>{}</th>", html_escape(column));
            }
            out.push_str("</tr></thead>\n<tbody>\n");
            for row in &result.rows {
                out.push_str("<tr>");
                for cell in row {
                    match cell {
                        Value::Null => out.push_str("<td class=\"null\">NULL</td>"),
                        Value::String(s) => {
                            let _ = write!(out, "<td>{}</td>", html_escape(s));
                        }
                        other => {
                            let _ = write!(out, "<td>{}</td>", html_escape(&other.to_string()));
                        }
                    }
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n</table>\n");
            let n = result.row_count();
            let _ = writeln!(
                out,
                r#"<p class="muted">{n} row{}</p>"#,
                if n == 1 { "" } else { "s" }
            );
        }
        out.push_str("</section>\n");
        out
    }

    /// The in-browser viewer. Queries run in DuckDB-WASM; nothing is sent to the server.
    pub fn client() -> String {
        let body = r#"<section class="card">
    <h2>In-browser DuckDB</h2>
    <p class="muted">The file stays in this browser tab.</p>
    <input type="file" id="file" accept=".duckdb">
    <span id="fileInfo" class="muted"></span>
</section>
<section class="card">
    <textarea id="sql" rows="8" spellcheck="false"></textarea>
    <button id="run" disabled>Run</button>
</section>
<div id="error" class="error" style="display:none"></div>
<section class="card results">
    <table id="table"></table>
</section>
<script type="module" src="/static/duckdb-app.js"></script>"#;
        Self::layout("Client", body)
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const CSS: &str = r#"
        body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7f9; color: #1f2328; }
        .header { display: flex; align-items: baseline; gap: 2rem; padding: 1rem 2rem; background: #fff200; }
        .header h1 { margin: 0; font-size: 1.4rem; }
        .content { padding: 1rem 2rem; }
        .card { background: #fff; border: 1px solid #d0d7de; border-radius: 6px; padding: 1rem; margin-bottom: 1rem; }
        textarea { width: 100%; font-family: ui-monospace, monospace; font-size: 0.9rem; }
        table { border-collapse: collapse; width: 100%; font-size: 0.85rem; }
        th, td { border: 1px solid #d0d7de; padding: 0.25rem 0.5rem; text-align: left; }
        th { background: #f0f2f4; }
        td.null { color: #8c959f; font-style: italic; }
        .error { background: #ffebe9; border: 1px solid #ff8182; padding: 0.75rem; border-radius: 6px; white-space: pre-wrap; }
        .banner { margin-bottom: 1rem; }
        .muted { color: #57606a; }
"#;
