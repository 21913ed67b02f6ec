//! assetgen - typed constants for a project's bundled assets
//!
//! Command-line entry point.
//!
//! # Execution Flow
//!
//! 1. Initialize logging (console on stderr, optional rotating file log)
//! 2. Load global defaults (`--settings` YAML layered with `ASSETGEN_*` variables)
//! 3. Enumerate the project's modules from `settings.gradle(.kts)`
//! 4. Generate every module, sequentially or with `--jobs N` workers
//! 5. Print one summary notification and exit with 0 (success),
//!    2 (partial success) or 1 (failure)
//!
//! Ctrl-C requests cancellation: modules already running finish, the rest are
//! reported as skipped.

use anyhow::{Context, Result};
use assetgen::{
    APP_NAME, ConfigManager, GenerationOrchestrator, GradleProject, LocalFs, Metrics, RunOutcome,
    RunSummary, StateManager, Trigger, VERSION,
};
use camino::Utf8PathBuf;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Generate Kotlin constants for the assets declared by each module of a project
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(value_name = "PROJECT_DIR", default_value = ".", value_hint = clap::ValueHint::DirPath)]
    project_dir: PathBuf,

    /// YAML file with global defaults for every module
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    settings: Option<PathBuf>,

    /// Number of modules generated concurrently
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Run as an automatic trigger; modules with `autoDetection: false` are skipped
    #[arg(long)]
    auto: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Also write daily-rotated log files to this directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(RunOutcome::Success) => ExitCode::SUCCESS,
        Ok(RunOutcome::PartialSuccess) => ExitCode::from(2),
        Ok(RunOutcome::Failure) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn utf8(path: PathBuf, what: &str) -> Result<Utf8PathBuf> {
    Utf8PathBuf::try_from(path).with_context(|| format!("{} must be a UTF-8 path", what))
}

fn run(cli: Cli) -> Result<RunOutcome> {
    let log_dir = cli.log_dir.map(|p| utf8(p, "Log directory")).transpose()?;
    let _guard = assetgen::logging::setup_logging(log_dir.as_deref(), APP_NAME, cli.debug, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let project_dir = utf8(cli.project_dir, "Project directory")?;
    let settings = cli.settings.map(|p| utf8(p, "Settings file")).transpose()?;
    let jobs = cli.jobs.max(1);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(jobs.min(4))
        .thread_name("assetgen-worker")
        .build()
        .context("Failed to start the tokio runtime")?;

    let config_manager = ConfigManager::new(settings.as_deref());
    let defaults = config_manager.load_global_settings()?;
    let project = GradleProject::new(&project_dir, config_manager);

    let state_manager = StateManager::new();
    let metrics = Arc::new(Metrics::new());

    runtime.spawn(assetgen::state::report_progress(state_manager.subscribe()));

    let cancel_state = state_manager.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_state.request_cancel();
        }
    });

    let trigger = if cli.auto {
        Trigger::Automatic
    } else {
        Trigger::Manual
    };
    let orchestrator = Arc::new(
        GenerationOrchestrator::new(Arc::new(LocalFs), defaults)
            .with_state(state_manager)
            .with_metrics(Arc::clone(&metrics))
            .with_trigger(trigger),
    );

    tracing::info!("Generating assets for {} ({:?} trigger)", project_dir, trigger);

    let results = if jobs > 1 {
        runtime.block_on(Arc::clone(&orchestrator).generate_all_parallel(&project, jobs))
    } else {
        orchestrator.generate_all(&project)
    };

    let summary = match &results {
        Ok(results) => RunSummary::from_results(results),
        Err(e) => {
            tracing::error!("{}", e);
            RunSummary::from_error(e)
        }
    };

    metrics.log_summary();
    println!("{}", summary.notification);

    runtime.shutdown_timeout(std::time::Duration::from_secs(1));

    Ok(summary.outcome)
}
