use crate::errors::HarnessResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// FSM Concurrency Workload Harness
#[derive(Parser)]
#[command(name = "fsm-harness")]
#[command(about = "FSM concurrency workload harness")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run workloads against the embedded target store
    Run(commands::run::RunCommand),
    /// List registered workloads
    List(commands::list::ListCommand),
    /// Describe a workload's states and transition probabilities
    Describe(commands::describe::DescribeCommand),
    /// Lint workload definitions without running anything
    Validate(commands::validate::ValidateCommand),
    /// Print the effective configuration as TOML
    Config(commands::show_config::ShowConfigCommand),
}

pub async fn run() -> HarnessResult<()> {
    // Initialise tracing subscriber to capture info!() macros
    // RUST_LOG wins; otherwise the configured filter (default "error")
    let default_filter = crate::config::AppConfig::get_defaults().logging.filter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(command) => command.run().await,
        Commands::List(command) => command.run(),
        Commands::Describe(command) => command.run(),
        Commands::Validate(command) => command.run(),
        Commands::Config(command) => command.run(),
    }
}
