use std::time::Duration;

use reqwest::{Client, Url};

pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";

/// Shared by every handler: one pooled HTTP client and the backend's base URL.
#[derive(Clone, Debug)]
pub struct AppState {
    pub client: Client,
    upstream: Url,
}

impl AppState {
    pub fn new(api_url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut upstream = Url::parse(api_url)?;
        if upstream.cannot_be_a_base() {
            return Err(format!("API_URL cannot carry a path: {api_url}").into());
        }
        if !upstream.path().ends_with('/') {
            let path = format!("{}/", upstream.path());
            upstream.set_path(&path);
        }

        Ok(AppState {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            upstream,
        })
    }

    /// `{API_URL}/seo/<segments...>`, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.upstream.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("seo").extend(segments);
        }
        url
    }
}
