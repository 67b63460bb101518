use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Anything that stops a request from reaching the analysis backend or its
/// answer from coming back. All of them surface as a 500.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend responded with status: {0}")]
    Upstream(u16),

    #[error("Backend returned an invalid body: {0}")]
    InvalidBody(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!(error = %self, "upstream request failed");
        let body = Json(json!({
            "error": "Failed to connect to API server",
            "details": { "message": self.to_string() },
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
