use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use ifcduck_engine::{Engine, EngineConfig};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "ifcduck-test-boundary";

fn engine(dir: &TempDir) -> Engine {
    let config = EngineConfig::default()
        .set_data_dir(dir.path())
        .set_provision_assets(false);
    Engine::new_with_config(config).unwrap()
}

fn sample_database(dir: &Path) -> Vec<u8> {
    let path = dir.join("sample-source.duckdb");
    {
        let conn = duckdb::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE walls (id INTEGER, name VARCHAR);
             INSERT INTO walls VALUES (1, 'North'), (2, NULL);
             CHECKPOINT;",
        )
        .unwrap();
    }
    std::fs::read(&path).unwrap()
}

fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn query_request(form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, String) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let location = resp
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, location, String::from_utf8_lossy(&body).into_owned())
}

async fn health(app: &Router) -> serde_json::Value {
    let (status, _, body) = send(app, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_str(&body).unwrap()
}

fn uploaded_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path().join("uploads"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

async fn loaded_app(dir: &TempDir) -> Router {
    let app = engine(dir).router();
    let bytes = sample_database(dir.path());
    let (status, location, _) = send(&app, upload_request("sample.duckdb", &bytes)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));
    app
}

#[tokio::test]
async fn valid_upload_becomes_current_database() {
    let dir = tempfile::tempdir().unwrap();
    let app = loaded_app(&dir).await;

    let health = health(&app).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["db_loaded"], true);
    let name = health["db_name"].as_str().unwrap().to_string();
    assert!(name.ends_with(".duckdb"));
    assert_eq!(uploaded_files(&dir), vec![name.clone()]);

    let (status, _, page) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains(&name));
    assert!(page.contains("SELECT * FROM information_schema.tables LIMIT 50;"));
}

#[tokio::test]
async fn wrong_extension_is_rejected_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine(&dir).router();

    let (status, location, _) = send(&app, upload_request("sample.txt", b"hello")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location.as_deref(),
        Some("/?error=Please+upload+a+.duckdb+file")
    );
    assert!(uploaded_files(&dir).is_empty());
    assert_eq!(health(&app).await["db_loaded"], false);
}

#[tokio::test]
async fn invalid_database_is_removed_and_previous_kept() {
    let dir = tempfile::tempdir().unwrap();
    let app = loaded_app(&dir).await;
    let before = health(&app).await["db_name"].clone();

    let (status, location, _) =
        send(&app, upload_request("broken.duckdb", b"definitely not duckdb")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/?error=Invalid+DuckDB+file"));
    assert_eq!(uploaded_files(&dir).len(), 1);
    assert_eq!(health(&app).await["db_name"], before);
}

#[tokio::test]
async fn query_without_database_redirects() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine(&dir).router();

    let (status, location, _) = send(&app, query_request("sql=SELECT+1")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location.as_deref(),
        Some("/?error=Upload+a+DuckDB+file+first")
    );
}

#[tokio::test]
async fn query_renders_result_table() {
    let dir = tempfile::tempdir().unwrap();
    let app = loaded_app(&dir).await;

    let (status, _, page) = send(&app, query_request("sql=SELECT+1+AS+x")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<th>x</th>"));
    assert!(page.contains("<td>1</td>"));
    assert!(page.contains("1 row</p>"));
    assert!(page.contains(">SELECT 1 AS x</textarea>"));
    assert!(!page.contains("class=\"error\""));

    let (_, _, page) = send(
        &app,
        query_request("sql=SELECT+name+FROM+walls+ORDER+BY+id"),
    )
    .await;
    assert!(page.contains("<td>North</td>"));
    assert!(page.contains("<td class=\"null\">NULL</td>"));
}

#[tokio::test]
async fn query_error_is_shown_inline() {
    let dir = tempfile::tempdir().unwrap();
    let app = loaded_app(&dir).await;
    let before = health(&app).await;

    let (status, location, page) = send(&app, query_request("sql=SELEC+nonsense")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(location, None);
    assert!(page.contains("<div class=\"error\">"));
    assert!(!page.contains("<table>"));

    // a failing query leaves the current database alone
    let after = health(&app).await;
    assert_eq!(after["db_loaded"], true);
    assert_eq!(after["db_name"], before["db_name"]);
    assert_eq!(uploaded_files(&dir).len(), 1);
}

#[tokio::test]
async fn dollar_quoted_query_runs_as_one_statement() {
    let dir = tempfile::tempdir().unwrap();
    let app = loaded_app(&dir).await;

    // sql=SELECT $$a;b$$ AS x
    let (status, _, page) = send(&app, query_request("sql=SELECT+%24%24a%3Bb%24%24+AS+x")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<th>x</th>"));
    assert!(page.contains("<td>a;b</td>"));
    assert!(!page.contains("<div class=\"error\">"));
}

#[tokio::test]
async fn index_shows_error_banner_escaped() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine(&dir).router();

    let (status, _, page) = send(&app, get("/?error=%3Cb%3Ebad%3C%2Fb%3E+input")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("&lt;b&gt;bad&lt;/b&gt; input"));
    assert!(page.contains("No database loaded"));
}

#[tokio::test]
async fn static_files_are_served_from_static_dir() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine(&dir).router();
    let wasm_dir = dir.path().join("static/duckdb");
    std::fs::create_dir_all(&wasm_dir).unwrap();
    std::fs::write(wasm_dir.join("duckdb-browser-mvp.wasm"), b"\0asm").unwrap();
    std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

    let resp = app
        .clone()
        .oneshot(get("/static/duckdb/duckdb-browser-mvp.wasm"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/wasm");

    let (status, _, _) = send(&app, get("/static/../secret.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, get("/static/duckdb/%2E%2E/%2E%2E/secret.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, get("/static/missing.js")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn client_page_loads_embedded_script() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine(&dir).router();

    let (status, _, page) = send(&app, get("/client")).await;
    assert_eq!(status, StatusCode::OK);
    for id in ["file", "fileInfo", "sql", "run", "error", "table"] {
        assert!(page.contains(&format!("id=\"{id}\"")), "missing #{id}");
    }
    assert!(page.contains("/static/duckdb-app.js"));

    let (status, _, script) = send(&app, get("/static/duckdb-app.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(script.contains("/static/duckdb/duckdb-browser-mvp.worker.js"));
}
