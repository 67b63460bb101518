use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::handlers::seo_handlers::{analyze, health, result, status};
use crate::state::AppState;

pub fn seo_routes(state: AppState) -> Router {
    Router::new()
        .route("/seo/analyze", post(analyze))
        .route("/seo/status/{id}", get(status))
        .route("/seo/result/{id}", get(result))
        .route("/seo/health", get(health))
        .with_state(state)
}

/// Mounts the SEO routes under `/api`, allowing `client_url` as a CORS origin
/// when given.
pub fn app(state: AppState, client_url: Option<HeaderValue>) -> Router {
    let app = Router::new().nest("/api", seo_routes(state));

    match client_url {
        Some(origin) => app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        ),
        None => app,
    }
}
