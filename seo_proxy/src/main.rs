mod error;
mod handlers;
mod routes;
mod state;

use std::env;

use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use routes::seo::app;
use state::{AppState, DEFAULT_API_URL};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let api_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let client_url = match env::var("CLIENT_URL") {
        Ok(origin) => Some(origin.parse::<HeaderValue>()?),
        Err(_) => None,
    };

    let state = AppState::new(&api_url)?;
    let app = app(state, client_url);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, %api_url, "seo proxy listening");
    axum::serve(listener, app).await?;
    Ok(())
}
