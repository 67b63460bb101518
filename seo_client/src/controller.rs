//! Analysis lifecycle: `idle → queued → running → completed | failed`.
//!
//! One [`LifecycleController`] owns at most one active session. A session is a
//! spawned task that submits the URL and then polls the status endpoint with a
//! fixed delay until the analysis reaches a terminal state. Every session has
//! its own id and cancellation token; a reset or a new submission cancels the
//! token, and every write a session makes to the published [`ViewState`] is
//! checked against its id inside the watch channel's lock, so a late task can
//! never overwrite a newer session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::SeoApi;
use crate::error::ValidationError;
use crate::validate::validate_url;
use crate::{AnalysisRequest, AnalysisResult, AnalysisStatus};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleStatus {
    #[default]
    Idle,
    Queued,
    Running,
    Completed,
    Failed,
}

impl LifecycleStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleStatus::Completed | LifecycleStatus::Failed)
    }

    pub fn is_loading(self) -> bool {
        matches!(self, LifecycleStatus::Queued | LifecycleStatus::Running)
    }

    fn rank(self) -> u8 {
        match self {
            LifecycleStatus::Idle => 0,
            LifecycleStatus::Queued => 1,
            LifecycleStatus::Running => 2,
            LifecycleStatus::Completed | LifecycleStatus::Failed => 3,
        }
    }
}

impl From<AnalysisStatus> for LifecycleStatus {
    fn from(status: AnalysisStatus) -> Self {
        match status {
            AnalysisStatus::Queued => LifecycleStatus::Queued,
            AnalysisStatus::Running => LifecycleStatus::Running,
            AnalysisStatus::Completed => LifecycleStatus::Completed,
            AnalysisStatus::Failed => LifecycleStatus::Failed,
        }
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub session: Option<SessionId>,
    pub status: LifecycleStatus,
    pub url: Option<String>,
    pub analysis_id: Option<String>,
    pub error: Option<String>,
    pub result: Option<AnalysisResult>,
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    /// `None` polls until the backend reports a terminal status.
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

struct ActiveSession {
    id: SessionId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct LifecycleController<A: SeoApi> {
    api: Arc<A>,
    config: PollConfig,
    view: Arc<watch::Sender<ViewState>>,
    last_session: SessionId,
    active: Option<ActiveSession>,
}

impl<A: SeoApi> LifecycleController<A> {
    pub fn new(api: Arc<A>, config: PollConfig) -> Self {
        let (view, _) = watch::channel(ViewState::default());
        Self {
            api,
            config,
            view: Arc::new(view),
            last_session: 0,
            active: None,
        }
    }

    pub fn state(&self) -> ViewState {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    /// Validates `url` and starts a new session, cancelling any previous one.
    ///
    /// Invalid input leaves the current state untouched and nothing is sent.
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, url: &str) -> Result<SessionId, ValidationError> {
        let request = validate_url(url)?;

        self.cancel_active();
        self.last_session += 1;
        let id = self.last_session;

        self.view.send_replace(ViewState {
            session: Some(id),
            status: LifecycleStatus::Queued,
            url: Some(request.url.clone()),
            ..ViewState::default()
        });
        info!(session = id, url = %request.url, "analysis session queued");

        let cancel = CancellationToken::new();
        let session = Session {
            id,
            api: Arc::clone(&self.api),
            view: Arc::clone(&self.view),
            config: self.config.clone(),
        };
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => debug!(session = id, "analysis session cancelled"),
                _ = session.run(request) => {}
            }
        });

        self.active = Some(ActiveSession { id, cancel, task });
        Ok(id)
    }

    /// Returns to `idle` and cancels any pending poll. Idempotent.
    pub fn reset(&mut self) {
        self.cancel_active();
        self.view.send_if_modified(|view| {
            if *view == ViewState::default() {
                return false;
            }
            *view = ViewState::default();
            true
        });
    }

    /// Waits until the view is terminal or idle.
    pub async fn settled(&self) -> ViewState {
        let mut rx = self.view.subscribe();
        let settled = rx
            .wait_for(|view| view.status.is_terminal() || view.status == LifecycleStatus::Idle)
            .await
            .map(|view| ViewState::clone(&view));
        match settled {
            Ok(view) => view,
            Err(_) => self.state(),
        }
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            if !active.task.is_finished() {
                debug!(session = active.id, "cancelling active session");
            }
            active.cancel.cancel();
        }
    }
}

impl<A: SeoApi> Drop for LifecycleController<A> {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

struct Session<A: SeoApi> {
    id: SessionId,
    api: Arc<A>,
    view: Arc<watch::Sender<ViewState>>,
    config: PollConfig,
}

impl<A: SeoApi> Session<A> {
    async fn run(&self, request: AnalysisRequest) {
        let handle = match self.api.submit(&request).await {
            Ok(handle) => handle,
            Err(e) => return self.fail(e.message()),
        };
        let analysis_id = handle.analysis_id;
        self.update(|view| {
            view.analysis_id = Some(analysis_id.clone());
            true
        });

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let snapshot = match self.api.get_status(&analysis_id).await {
                Ok(snapshot) => snapshot,
                Err(e) => return self.fail(e.message()),
            };

            if !snapshot.status.is_terminal() {
                self.advance(snapshot.status.into());
                if self.config.max_attempts.is_some_and(|max| attempts >= max) {
                    return self.fail(format!(
                        "Analysis did not finish after {attempts} status checks"
                    ));
                }
                tokio::time::sleep(self.config.interval).await;
                continue;
            }

            if snapshot.status == AnalysisStatus::Completed {
                match self.api.get_result(&analysis_id).await {
                    Ok(result) => self.complete(result),
                    Err(e) => self.fail(e.message()),
                }
            } else {
                let message = snapshot.error.unwrap_or_else(|| "Analysis failed".to_string());
                self.fail(message);
            }
            return;
        }
    }

    /// Applies `apply` only while this session owns the view and is not yet
    /// terminal. `apply` returns whether it changed anything; subscribers are
    /// notified only when it did.
    fn update(&self, apply: impl FnOnce(&mut ViewState) -> bool) -> bool {
        self.view.send_if_modified(|view| {
            if view.session != Some(self.id) || view.status.is_terminal() {
                return false;
            }
            apply(view)
        })
    }

    fn advance(&self, status: LifecycleStatus) {
        let id = self.id;
        self.update(|view| {
            if status.rank() <= view.status.rank() {
                return false;
            }
            debug!(session = id, from = ?view.status, to = ?status, "analysis status changed");
            view.status = status;
            true
        });
    }

    fn complete(&self, result: AnalysisResult) {
        let id = self.id;
        if self.update(|view| {
            view.status = LifecycleStatus::Completed;
            view.result = Some(result);
            true
        }) {
            info!(session = id, "analysis completed");
        }
    }

    fn fail(&self, message: String) {
        let id = self.id;
        let logged = message.clone();
        if self.update(|view| {
            view.status = LifecycleStatus::Failed;
            view.error = Some(message);
            true
        }) {
            warn!(session = id, error = %logged, "analysis failed");
        }
    }
}
