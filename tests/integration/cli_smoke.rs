//! CLI argument parsing smoke tests.

use clap::Parser;
use fsm_harness::cli::{Cli, Commands};

#[test]
fn test_run_command_parses_with_flags() {
    let cli = Cli::try_parse_from([
        "fsm-harness",
        "run",
        "--all",
        "--mode",
        "parallel",
        "--seed",
        "7",
        "--threads-cap",
        "16",
        "--iterations",
        "50",
        "--json",
    ])
    .unwrap();
    assert!(matches!(cli.command, Commands::Run(_)));
}

#[test]
fn test_run_command_accepts_workload_names() {
    let cli =
        Cli::try_parse_from(["fsm-harness", "run", "crud_churn", "contended_counter"]).unwrap();
    assert!(matches!(cli.command, Commands::Run(_)));
}

#[test]
fn test_invalid_mode_is_rejected() {
    assert!(Cli::try_parse_from(["fsm-harness", "run", "--all", "--mode", "bogus"]).is_err());
}

#[test]
fn test_list_command_parses() {
    let cli = Cli::try_parse_from(["fsm-harness", "list"]).unwrap();
    assert!(matches!(cli.command, Commands::List(_)));
}

#[test]
fn test_describe_requires_a_name() {
    assert!(Cli::try_parse_from(["fsm-harness", "describe"]).is_err());
    let cli = Cli::try_parse_from(["fsm-harness", "describe", "scan_churn", "--json"]).unwrap();
    assert!(matches!(cli.command, Commands::Describe(_)));
}

#[test]
fn test_validate_command_parses() {
    let cli = Cli::try_parse_from(["fsm-harness", "validate", "--deny"]).unwrap();
    assert!(matches!(cli.command, Commands::Validate(_)));
}

#[test]
fn test_config_command_parses() {
    let cli = Cli::try_parse_from(["fsm-harness", "config"]).unwrap();
    assert!(matches!(cli.command, Commands::Config(_)));
}

#[test]
fn test_unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["fsm-harness", "launch"]).is_err());
}
