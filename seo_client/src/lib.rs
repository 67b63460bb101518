pub mod api;
pub mod controller;
pub mod error;
pub mod render;
pub mod utils;
pub mod validate;

use serde::{Deserialize, Serialize};

/// Body of `POST /seo/analyze`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub url: String,
}

/// Backend-reported progress of one analysis.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisStatus::Completed | AnalysisStatus::Failed)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisHandle {
    pub analysis_id: String,
    pub status: AnalysisStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub check_status_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub analysis_id: String,
    pub url: String,
    pub status: AnalysisStatus,
    /// Unix seconds.
    pub created_at: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TaskOutput {
    pub task_number: u32,
    pub task_name: String,
    pub task_output: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisResult {
    pub url: String,
    /// Unix seconds.
    pub timestamp: f64,
    pub result_summary: String,
    pub analysis_text: String,
    pub tasks: Vec<TaskOutput>,
}

impl AnalysisResult {
    pub fn task(&self, task_number: u32) -> Option<&TaskOutput> {
        self.tasks.iter().find(|t| t.task_number == task_number)
    }
}

/// Wire form of `GET /seo/result/{id}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResultEnvelope {
    pub analysis_id: String,
    pub url: String,
    pub status: AnalysisStatus,
    pub created_at: f64,
    pub completed_at: f64,
    pub result: AnalysisResult,
}
