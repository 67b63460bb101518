//! Text views for each lifecycle state.

use std::fmt::Write;

use chrono::DateTime;

use crate::controller::{LifecycleStatus, ViewState};
use crate::{AnalysisResult, TaskOutput};

const RULE: &str = "------------------------------------------------------------";

/// Renders whichever view matches `view.status`.
pub fn render(view: &ViewState) -> String {
    match (view.status, &view.result) {
        (LifecycleStatus::Idle, _) => render_form(None),
        (status, _) if status.is_loading() => {
            render_progress(status, view.url.as_deref().unwrap_or_default())
        }
        (LifecycleStatus::Completed, Some(result)) => render_results(result),
        _ => render_error(view.error.as_deref()),
    }
}

pub fn render_form(validation_error: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analyze Your Website's SEO");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "Enter your website URL to get a comprehensive SEO analysis powered by AI.\n\
         The crew analyzes page structure, content, and visuals and returns actionable \
         recommendations."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "What we analyze:");
    for area in ["Content Quality", "Page Structure", "Visual Elements"] {
        let _ = writeln!(out, "  - {area}");
    }
    if let Some(message) = validation_error {
        let _ = writeln!(out);
        let _ = writeln!(out, "! {message}");
    }
    out
}

pub fn render_progress(status: LifecycleStatus, url: &str) -> String {
    let queued = status == LifecycleStatus::Queued;
    let (heading, description, label, percent) = if queued {
        (
            "Analysis Queued",
            "Your request is in the queue and will begin processing shortly.",
            "In Queue",
            25,
        )
    } else {
        (
            "Analyzing Your Website",
            "Our AI crew is analyzing your website and generating insights.",
            "Analyzing",
            75,
        )
    };

    let mut out = String::new();
    let _ = writeln!(out, "{heading}");
    let _ = writeln!(out, "{description}");
    let _ = writeln!(out, "  {}", display_domain(url));
    let _ = writeln!(out, "  [{}] {label} {percent}%", progress_bar(percent, 20));
    if queued {
        let _ = writeln!(out, "  Preparing analysis agents...");
    } else {
        let _ = writeln!(out, "  [x] Analyzing page structure");
        let _ = writeln!(out, "  [ ] Analyzing visual elements");
        let _ = writeln!(out, "  [ ] Generating recommendations");
    }
    out
}

pub fn render_results(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analysis Complete");
    let _ = writeln!(out, "Analysis completed on {}", format_timestamp(result.timestamp));
    let _ = writeln!(out, "  {}", display_domain(&result.url));
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Summary");
    let _ = writeln!(out, "{}", result.result_summary);
    let _ = writeln!(out);
    let _ = writeln!(out, "Analysis Results");
    for task in &result.tasks {
        let _ = writeln!(out, "  Task {}: {}", task.task_number, task.task_name);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Key Findings");
    let _ = writeln!(out, "{}", result.analysis_text);
    out
}

pub fn render_task(task: &TaskOutput) -> String {
    format!("Task {}: {}\n{RULE}\n{}\n", task.task_number, task.task_name, task.task_output)
}

pub fn render_error(error: Option<&str>) -> String {
    format!(
        "Analysis Error\n{}\n",
        error.unwrap_or("An unknown error occurred")
    )
}

/// `https://example.com/` → `example.com`
pub fn display_domain(url: &str) -> &str {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme.strip_suffix('/').unwrap_or(without_scheme)
}

/// Unix seconds to `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_timestamp(secs: f64) -> String {
    let whole = secs.trunc() as i64;
    let nanos = (secs.fract().abs() * 1e9) as u32;
    DateTime::from_timestamp(whole, nanos)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "an unknown time".to_string())
}

fn progress_bar(percent: usize, width: usize) -> String {
    let filled = width * percent / 100;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            url: "https://example.com/".into(),
            timestamp: 1_700_000_000.0,
            result_summary: "Solid structure, weak keywords.".into(),
            analysis_text: "Restructure headings.".into(),
            tasks: vec![
                TaskOutput {
                    task_number: 1,
                    task_name: "Content Analysis".into(),
                    task_output: "Thin content.".into(),
                },
                TaskOutput {
                    task_number: 2,
                    task_name: "Visual Analysis".into(),
                    task_output: "Large images.".into(),
                },
            ],
        }
    }

    #[test]
    fn domain_strips_scheme_and_trailing_slash() {
        assert_eq!(display_domain("https://example.com/"), "example.com");
        assert_eq!(display_domain("http://example.com/blog"), "example.com/blog");
        assert_eq!(display_domain("example.com"), "example.com");
    }

    #[test]
    fn timestamp_is_rendered_in_utc() {
        assert_eq!(format_timestamp(1_700_000_000.0), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn progress_differs_between_queued_and_running() {
        let queued = render_progress(LifecycleStatus::Queued, "https://example.com");
        assert!(queued.contains("Analysis Queued"));
        assert!(queued.contains("In Queue 25%"));
        assert!(queued.contains("  example.com\n"));

        let running = render_progress(LifecycleStatus::Running, "https://example.com");
        assert!(running.contains("Analyzing Your Website"));
        assert!(running.contains("Analyzing 75%"));
    }

    #[test]
    fn results_list_every_task_and_findings() {
        let text = render_results(&sample());
        assert!(text.contains("Analysis Complete"));
        assert!(text.contains("Solid structure, weak keywords."));
        assert!(text.contains("Task 1: Content Analysis"));
        assert!(text.contains("Task 2: Visual Analysis"));
        assert!(text.contains("Key Findings\nRestructure headings."));
    }

    #[test]
    fn task_detail_shows_output() {
        let result = sample();
        let text = render_task(result.task(2).unwrap());
        assert!(text.starts_with("Task 2: Visual Analysis"));
        assert!(text.contains("Large images."));
    }

    #[test]
    fn view_dispatch() {
        assert!(render(&ViewState::default()).contains("What we analyze:"));

        let failed = ViewState {
            status: LifecycleStatus::Failed,
            error: Some("Analysis not found".into()),
            ..ViewState::default()
        };
        assert_eq!(render(&failed), "Analysis Error\nAnalysis not found\n");

        // Completed without a stored result falls back to the error view.
        let completed = ViewState { status: LifecycleStatus::Completed, ..ViewState::default() };
        assert_eq!(render(&completed), "Analysis Error\nAn unknown error occurred\n");

        let done = ViewState {
            status: LifecycleStatus::Completed,
            result: Some(sample()),
            ..ViewState::default()
        };
        assert!(render(&done).starts_with("Analysis Complete"));
    }

    #[test]
    fn form_shows_validation_message() {
        let text = render_form(Some("Please enter a URL"));
        assert!(text.ends_with("! Please enter a URL\n"));
    }
}
