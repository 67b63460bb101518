use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{BackendError, SetupError};
use crate::{AnalysisHandle, AnalysisRequest, AnalysisResult, ResultEnvelope, StatusSnapshot};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The four backend operations the lifecycle controller depends on.
#[async_trait]
pub trait SeoApi: Send + Sync + 'static {
    async fn submit(&self, request: &AnalysisRequest) -> Result<AnalysisHandle, BackendError>;

    async fn get_status(&self, analysis_id: &str) -> Result<StatusSnapshot, BackendError>;

    /// Only meaningful once a status check reported `completed`; the backend
    /// rejects it otherwise.
    async fn get_result(&self, analysis_id: &str) -> Result<AnalysisResult, BackendError>;

    /// Best-effort diagnostic. Failures are logged, never returned.
    async fn health_check(&self);
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// HTTP implementation of [`SeoApi`] rooted at the proxy's `/api` prefix.
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, SetupError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(SetupError::NotABase(base_url.to_string()));
        }
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .default_headers(headers)
                .build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Maps a response onto `T`, or onto a [`BackendError::Status`] carrying the
/// backend's `error` message when the status is not 2xx.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(ErrorBody { error: Some(serde_json::Value::String(msg)) }) if !msg.is_empty() => msg,
            Ok(_) => format!("Server responded with status: {}", status.as_u16()),
            Err(_) => "Unknown error".to_string(),
        };
        warn!(status = status.as_u16(), %message, "backend returned an error");
        return Err(BackendError::Status { status: status.as_u16(), message });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl SeoApi for ApiClient {
    async fn submit(&self, request: &AnalysisRequest) -> Result<AnalysisHandle, BackendError> {
        let url = self.endpoint(&["seo", "analyze"]);
        info!(target_url = %request.url, endpoint = %url, "submitting analysis");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to start analysis");
                BackendError::from(e)
            })?;

        let handle: AnalysisHandle = read_json(response).await?;
        info!(analysis_id = %handle.analysis_id, status = ?handle.status, "analysis started");
        Ok(handle)
    }

    async fn get_status(&self, analysis_id: &str) -> Result<StatusSnapshot, BackendError> {
        let url = self.endpoint(&["seo", "status", analysis_id]);
        debug!(analysis_id, "checking analysis status");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(analysis_id, error = %e, "failed to check analysis status");
            BackendError::from(e)
        })?;

        let snapshot: StatusSnapshot = read_json(response).await?;
        debug!(analysis_id, status = ?snapshot.status, "status check result");
        Ok(snapshot)
    }

    async fn get_result(&self, analysis_id: &str) -> Result<AnalysisResult, BackendError> {
        let url = self.endpoint(&["seo", "result", analysis_id]);
        debug!(analysis_id, "fetching analysis result");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(analysis_id, error = %e, "failed to retrieve analysis result");
            BackendError::from(e)
        })?;

        let envelope: ResultEnvelope = read_json(response).await?;
        info!(analysis_id, tasks = envelope.result.tasks.len(), "result retrieved");
        Ok(envelope.result)
    }

    async fn health_check(&self) {
        let url = self.endpoint(&["seo", "health"]);
        let outcome = async {
            let response = self.client.get(url).send().await?;
            read_json::<serde_json::Value>(response).await
        }
        .await;

        match outcome {
            Ok(payload) => info!(%payload, "backend health check"),
            Err(e) => warn!(error = %e, "backend health check failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_the_api_prefix() {
        let client = ApiClient::new("http://localhost:3000/api").unwrap();
        assert_eq!(
            client.endpoint(&["seo", "analyze"]).as_str(),
            "http://localhost:3000/api/seo/analyze"
        );

        let client = ApiClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(
            client.endpoint(&["seo", "status", "abc"]).as_str(),
            "http://localhost:3000/api/seo/status/abc"
        );
    }

    #[test]
    fn analysis_id_is_encoded_as_one_segment() {
        let client = ApiClient::new("http://localhost:3000/api").unwrap();
        assert_eq!(
            client.endpoint(&["seo", "result", "a/b c"]).as_str(),
            "http://localhost:3000/api/seo/result/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(ApiClient::new("not a url"), Err(SetupError::InvalidBaseUrl(_))));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com"),
            Err(SetupError::NotABase(_))
        ));
    }
}
