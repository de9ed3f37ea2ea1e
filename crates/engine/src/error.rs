use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Failures that are not part of the normal request flow.
///
/// Bad uploads and failing queries are answered with redirects or inline
/// messages; only these reach the client as `500`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
