use crate::error::AppError;
use crate::fs::{content_type_for, has_database_extension};
use crate::state::AppState;
use crate::templates::{DEFAULT_SQL, IndexPage, Templates};
use axum::Router;
use axum::extract::{DefaultBodyLimit, Form, Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use ifcduck_executor::{execute_query, validate_database};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

const UPLOAD_REJECTED: &str = "/?error=Please+upload+a+.duckdb+file";
const UPLOAD_INVALID: &str = "/?error=Invalid+DuckDB+file";
const NO_DATABASE: &str = "/?error=Upload+a+DuckDB+file+first";

const APP_JS: &str = include_str!("../static/duckdb-app.js");

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/client", get(client))
        .route("/healthz", get(healthz))
        .route("/upload", post(upload))
        .route("/query", post(query))
        .route("/static/duckdb-app.js", get(app_js))
        .route("/static/{*path}", get(static_file))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct IndexParams {
    error: Option<String>,
}

async fn index(State(state): State<AppState>, Query(params): Query<IndexParams>) -> Html<String> {
    let name = state.current.name();
    Html(Templates::index(&IndexPage {
        db_name: name.as_deref(),
        sql: DEFAULT_SQL,
        result: None,
        error: params.error.as_deref(),
    }))
}

async fn client() -> Html<String> {
    Html(Templates::client())
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, content_type_for("duckdb-app.js"))], APP_JS)
}

async fn static_file(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    match state.static_dir.read_file(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(&path))], bytes).into_response(),
        Err(e) => {
            debug!(path = %path, error = %e, "static file not served");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Redirect, AppError> {
    let mut received = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if !has_database_extension(&filename) {
            info!(filename = %filename, "rejected upload without .duckdb extension");
            return Ok(Redirect::to(UPLOAD_REJECTED));
        }
        received = Some((filename, field.bytes().await?));
        break;
    }
    let Some((filename, bytes)) = received else {
        info!("upload without a file field");
        return Ok(Redirect::to(UPLOAD_REJECTED));
    };

    let uploads = state.uploads.clone();
    let stored = tokio::task::spawn_blocking(move || -> std::io::Result<Option<PathBuf>> {
        let path = uploads.save(&bytes)?;
        match validate_database(&path) {
            Ok(()) => Ok(Some(path)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "uploaded file is not a DuckDB database");
                if let Err(e) = uploads.discard(&path) {
                    warn!(path = %path.display(), error = %e, "failed to remove rejected upload");
                }
                Ok(None)
            }
        }
    })
    .await??;

    match stored {
        Some(path) => {
            info!(filename = %filename, path = %path.display(), "database loaded");
            state.current.replace(path);
            Ok(Redirect::to("/"))
        }
        None => Ok(Redirect::to(UPLOAD_INVALID)),
    }
}

#[derive(Debug, Deserialize)]
struct QueryForm {
    #[serde(default)]
    sql: String,
}

async fn query(State(state): State<AppState>, Form(form): Form<QueryForm>) -> Result<Response, AppError> {
    let Some(database) = state.current.get() else {
        return Ok(Redirect::to(NO_DATABASE).into_response());
    };
    let name = state.current.name();
    let sql = form.sql;

    let result = tokio::task::spawn_blocking({
        let sql = sql.clone();
        move || execute_query(&database, &sql)
    })
    .await?;
    if let Some(e) = &result.error {
        debug!(error = %e, "query failed");
    }

    let page = Templates::index(&IndexPage {
        db_name: name.as_deref(),
        sql: &sql,
        result: Some(&result),
        error: None,
    });
    Ok(Html(page).into_response())
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    db_loaded: bool,
    db_name: Option<String>,
}

async fn healthz(State(state): State<AppState>) -> axum::Json<Health> {
    let db_name = state.current.name();
    axum::Json(Health {
        status: "ok",
        db_loaded: db_name.is_some(),
        db_name,
    })
}
