use crate::config::AppConfig;
use crate::errors::{HarnessError, HarnessResult, RunError};
use crate::scheduler::{RunMode, RunOptions, Runner};
use crate::store::Store;
use crate::workload::DynWorkload;
use crate::workloads;
use chrono::Utc;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Serial,
    Parallel,
    Composed,
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Serial => RunMode::Serial,
            ModeArg::Parallel => RunMode::Parallel,
            ModeArg::Composed => RunMode::Composed,
        }
    }
}

#[derive(Args)]
pub struct RunCommand {
    /// Workload names to run (see `list`)
    workloads: Vec<String>,

    /// Run every registered workload
    #[arg(long)]
    all: bool,

    /// How the selected workloads share the run
    #[arg(long, value_enum, default_value = "serial")]
    mode: ModeArg,

    /// RNG seed; a fresh one is drawn and logged when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Global worker thread cap (overrides config)
    #[arg(long)]
    threads_cap: Option<u32>,

    /// Override every workload's iteration count
    #[arg(long)]
    iterations: Option<u64>,

    /// Scale every workload's configured thread count
    #[arg(long)]
    thread_multiplier: Option<f64>,

    /// Overall run timeout in seconds (overrides config)
    #[arg(long)]
    timeout_seconds: Option<u64>,

    /// Emit the run report as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Configuration file path (defaults to ./fsm-harness.toml discovery)
    #[arg(long)]
    config_path: Option<PathBuf>,
}

impl RunCommand {
    pub async fn run(&self) -> HarnessResult<()> {
        info!("=== FSM Harness - Run ===");

        // Load configuration from file/environment
        let app_config = match AppConfig::load_from(self.config_path.as_deref()) {
            Ok(config) => {
                info!("Configuration loaded successfully");
                config
            }
            Err(e) => {
                if self.config_path.is_some() {
                    return Err(HarnessError::Config(e.to_string()));
                }
                warn!("Failed to load configuration: {}", e);
                info!("Using defaults and CLI arguments");
                AppConfig::get_defaults()
            }
        };

        let registry = workloads::builtins();
        let names: Vec<String> = if self.all {
            registry.names()
        } else {
            self.workloads.clone()
        };
        if names.is_empty() {
            return Err(RunError::EmptyRun.into());
        }
        let mut selected: Vec<DynWorkload> = Vec::with_capacity(names.len());
        for name in &names {
            selected.push(registry.get(name)?);
        }

        // CLI arguments override config values
        let seed = self
            .seed
            .or(app_config.runner.seed)
            .unwrap_or_else(rand::random);
        let thread_cap = self.threads_cap.unwrap_or(app_config.runner.max_threads);
        let timeout_seconds = self
            .timeout_seconds
            .unwrap_or(app_config.runner.run_timeout_seconds);
        let run_id = format!(
            "run{}_{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            std::process::id()
        );

        let mut options = RunOptions::new(run_id);
        options.mode = self.mode.into();
        options.thread_cap = thread_cap;
        options.seed = seed;
        options.allowed_spawn_failure_ratio = app_config.runner.allowed_spawn_failure_ratio;
        options.iterations_override = self.iterations.or(app_config.runner.default_iterations);
        options.thread_multiplier = self.thread_multiplier.unwrap_or(1.0);

        info!("Configuration:");
        info!("  Workloads: {}", names.join(", "));
        info!("  Mode: {}", options.mode);
        info!("  Seed: {}", options.seed);
        info!("  Thread cap: {}", options.thread_cap);
        info!("  Timeout: {}s", timeout_seconds);
        if let Some(iterations) = options.iterations_override {
            info!("  Iterations override: {}", iterations);
        }

        let runner = Runner::new(Arc::new(Store::new()));
        let run_options = options.clone();
        let outcome = tokio::time::timeout(
            Duration::from_secs(timeout_seconds),
            tokio::task::spawn_blocking(move || runner.run(&selected, &run_options)),
        )
        .await;

        let report = match outcome {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => {
                return Err(RunError::CoordinatorPanic(join_error.to_string()).into())
            }
            Err(_) => return Err(RunError::Timeout(timeout_seconds).into()),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", report.summary());
        }

        if !report.failures.is_empty() {
            return Err(RunError::WorkersFailed {
                failed: report.failures.len(),
            }
            .into());
        }
        if !report.teardown_errors.is_empty() {
            return Err(RunError::TeardownsFailed(report.teardown_errors.len()).into());
        }

        println!("Run {} completed successfully", report.run_id);
        Ok(())
    }
}
