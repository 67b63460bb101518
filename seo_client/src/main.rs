use clap::Parser;
use dotenv::dotenv;
use seo_client::api::{ApiClient, SeoApi, DEFAULT_API_URL};
use seo_client::controller::{LifecycleController, LifecycleStatus, PollConfig, ViewState};
use seo_client::render::{render, render_form, render_results, render_task};
use seo_client::{utils, AnalysisResult};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Website URL to analyze; omit to enter URLs interactively
    #[arg(short, long, env = "SEO_URL")]
    url: Option<String>,

    /// Base URL of the analysis API
    #[arg(long, env = "SEO_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Delay between status checks (in milliseconds)
    #[arg(short, long, env = "SEO_POLL_INTERVAL_MS", default_value_t = 3000)]
    poll_interval_ms: u64,

    /// Give up after this many status checks
    #[arg(short, long, env = "SEO_MAX_POLLS")]
    max_polls: Option<u32>,

    /// Save the result JSON to this file
    #[arg(short, long, env = "SEO_OUTPUT")]
    output: Option<PathBuf>,

    /// Save the rendered report to this file
    #[arg(short, long, env = "SEO_REPORT")]
    report: Option<PathBuf>,

    /// Print the full output of this task once the analysis completes
    #[arg(short, long, env = "SEO_TASK")]
    task: Option<u32>,

    /// Skip the start-up health check
    #[arg(short, long, env = "SEO_SKIP_HEALTH")]
    skip_health: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let api = Arc::new(ApiClient::new(&args.api_url)?);
    info!(api_url = %api.base_url(), "using analysis API");
    if !args.skip_health {
        api.health_check().await;
    }

    let mut controller = LifecycleController::new(
        api,
        PollConfig {
            interval: Duration::from_millis(args.poll_interval_ms),
            max_attempts: args.max_polls,
        },
    );

    match args.url.clone() {
        Some(url) => {
            if let Err(e) = controller.submit(&url) {
                eprintln!("{e}");
                return Ok(ExitCode::from(2));
            }
            match follow_session(&mut controller).await {
                Some(view) if view.status == LifecycleStatus::Completed => {
                    finish(&args, &view)?;
                    Ok(ExitCode::SUCCESS)
                }
                _ => Ok(ExitCode::FAILURE),
            }
        }
        None => {
            interactive(&mut controller, &args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Form → progress → result loop driven from stdin.
async fn interactive(
    controller: &mut LifecycleController<ApiClient>,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut validation: Option<String> = None;

    loop {
        println!("{}", render_form(validation.as_deref()));
        prompt("Website URL: ")?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        if let Err(e) = controller.submit(&line) {
            validation = Some(e.to_string());
            continue;
        }
        validation = None;

        let Some(view) = follow_session(controller).await else {
            return Ok(());
        };
        if view.status == LifecycleStatus::Completed {
            finish(args, &view)?;
        }

        prompt("Start a new analysis? [y/N] ")?;
        let answer = lines.next_line().await?.unwrap_or_default();
        if !answer.trim().eq_ignore_ascii_case("y") {
            return Ok(());
        }
        controller.reset();
    }
}

/// Prints each status change until the session settles. Returns `None` when
/// interrupted with Ctrl-C, after cancelling the session.
async fn follow_session(controller: &mut LifecycleController<ApiClient>) -> Option<ViewState> {
    let mut rx = controller.subscribe();
    let mut shown = None;

    loop {
        let view = rx.borrow_and_update().clone();
        if shown != Some(view.status) {
            println!("{}", render(&view));
            shown = Some(view.status);
        }
        if view.status.is_terminal() {
            return Some(view);
        }
        if view.status == LifecycleStatus::Idle {
            return None;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return None;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted, cancelling analysis");
                controller.reset();
                return None;
            }
        }
    }
}

/// Prints the requested task detail and writes the requested files.
fn finish(args: &Args, view: &ViewState) -> Result<(), Box<dyn std::error::Error>> {
    let Some(result) = &view.result else {
        return Ok(());
    };

    if let Some(task_number) = args.task {
        match task_detail(result, task_number) {
            Some(detail) => println!("{detail}"),
            None => warn!(task_number, "result has no such task"),
        }
    }

    if let Some(path) = &args.output {
        utils::save_json(result, path)?;
    }
    if let Some(path) = &args.report {
        let mut report = render_results(result);
        for task in &result.tasks {
            report.push('\n');
            report.push_str(&render_task(task));
        }
        utils::save_text(&report, path)?;
    }
    Ok(())
}

fn task_detail(result: &AnalysisResult, task_number: u32) -> Option<String> {
    result.task(task_number).map(render_task)
}

fn prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}
