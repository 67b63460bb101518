use axum::{
    extract::{Path, State},
    Json,
};
use reqwest::{Response, Url};
use serde_json::Value;
use tracing::{debug, info};

use seo_client::AnalysisRequest;

use crate::error::ProxyError;
use crate::state::AppState;

/// Relays a successful upstream JSON body; anything else becomes a [`ProxyError`].
async fn relay(response: Response, upstream: &Url) -> Result<Json<Value>, ProxyError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProxyError::Upstream(status.as_u16()));
    }

    let body = response
        .json::<Value>()
        .await
        .map_err(|e| ProxyError::InvalidBody(e.to_string()))?;
    debug!(%upstream, %body, "backend response");
    Ok(Json(body))
}

/// POST /api/seo/analyze
pub async fn analyze(
    State(state): State<AppState>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<Json<Value>, ProxyError> {
    let upstream = state.endpoint(&["analyze"]);
    info!(url = %payload.url, %upstream, "forwarding analysis request");

    let response = state.client.post(upstream.clone()).json(&payload).send().await?;
    relay(response, &upstream).await
}

/// GET /api/seo/status/{id}
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let upstream = state.endpoint(&["status", id.as_str()]);
    info!(analysis_id = %id, %upstream, "forwarding status check");

    let response = state.client.get(upstream.clone()).send().await?;
    relay(response, &upstream).await
}

/// GET /api/seo/result/{id}
pub async fn result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let upstream = state.endpoint(&["result", id.as_str()]);
    info!(analysis_id = %id, %upstream, "forwarding result request");

    let response = state.client.get(upstream.clone()).send().await?;
    relay(response, &upstream).await
}

/// GET /api/seo/health
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ProxyError> {
    let upstream = state.endpoint(&["health"]);
    info!(%upstream, "forwarding health check");

    let response = state.client.get(upstream.clone()).send().await?;
    relay(response, &upstream).await
}
