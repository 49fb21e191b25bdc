//! runner-fleet CLI - manage a fleet of GitHub Actions self-hosted runners
//!
//! This module contains the shared CLI implementation used by the
//! `runner-fleet` binary; the `runner-agent` container entrypoint lives in
//! [`agent`].

pub mod agent;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use runner_fleet_core::get_version;
use std::path::PathBuf;

/// Manage a fleet of GitHub Actions self-hosted runners in Docker
#[derive(Parser)]
#[command(name = "runner-fleet")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage a fleet of GitHub Actions self-hosted runners", long_about = None)]
#[command(after_help = get_banner())]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to the env file (default: ./.env)
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the base fleet (instances 1-2), or the named services
    Up(commands::UpArgs),
    /// Start the whole fleet (instances 1-4)
    UpExtra(commands::UpExtraArgs),
    /// Stop all running fleet containers
    Down(commands::DownArgs),
    /// Live fleet status table
    Monitor(commands::MonitorArgs),
    /// Restart one instance
    Restart(commands::RestartArgs),
    /// Stream logs for one instance, or the whole fleet
    Logs(commands::LogsArgs),
    /// Build the runner image
    Build(commands::BuildArgs),
    /// Remove fleet containers, the runner image, and optionally volumes
    Cleanup(commands::CleanupArgs),
    /// Scaffold the .env configuration file
    CreateEnv(commands::CreateEnvArgs),
}

/// Get the ASCII banner for help display
fn get_banner() -> &'static str {
    r#"
 ___ _ _ ___ ___ ___ ___    ___ _ ___ ___ _____
|  _| | |   |   | -_|  _|  |  _| | -_| -_|_   _|
|_| |___|_|_|_|_|___|_|    |_| |_|___|___| |_|
"#
}

pub fn run() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Configure color output
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let env_file = cli.env_file.as_deref();

    match cli.command {
        Some(Commands::Up(args)) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_up(&args, env_file, cli.quiet, cli.verbose))
        }
        Some(Commands::UpExtra(args)) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_up_extra(
                &args,
                env_file,
                cli.quiet,
                cli.verbose,
            ))
        }
        Some(Commands::Down(args)) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_down(&args, cli.quiet))
        }
        Some(Commands::Monitor(args)) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_monitor(&args, cli.quiet))
        }
        Some(Commands::Restart(args)) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_restart(&args, cli.quiet))
        }
        Some(Commands::Logs(args)) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_logs(&args, cli.quiet))
        }
        Some(Commands::Build(args)) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_build(&args, cli.quiet, cli.verbose))
        }
        Some(Commands::Cleanup(args)) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_cleanup(&args, cli.quiet))
        }
        Some(Commands::CreateEnv(args)) => commands::cmd_create_env(&args, env_file, cli.quiet),
        None => {
            if !cli.quiet {
                print_help_hint();
            }
            Ok(())
        }
    }
}

fn print_help_hint() {
    println!(
        "{} {}",
        style("runner-fleet").cyan().bold(),
        style(get_version()).dim()
    );
    println!();
    println!("Run {} for available commands.", style("--help").green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn up_captures_service_arguments() {
        let cli = Cli::try_parse_from(["runner-fleet", "up", "runner-fleet-1", "3"]).unwrap();
        let Some(Commands::Up(args)) = cli.command else {
            panic!("expected up command");
        };
        assert_eq!(args.services, vec!["runner-fleet-1", "3"]);
    }

    #[test]
    fn restart_requires_a_selector() {
        assert!(Cli::try_parse_from(["runner-fleet", "restart"]).is_err());
        assert!(Cli::try_parse_from(["runner-fleet", "restart", "2"]).is_ok());
    }

    #[test]
    fn logs_selector_is_optional() {
        assert!(Cli::try_parse_from(["runner-fleet", "logs"]).is_ok());
        assert!(Cli::try_parse_from(["runner-fleet", "logs", "4"]).is_ok());
    }

    #[test]
    fn env_file_is_a_global_flag() {
        let cli =
            Cli::try_parse_from(["runner-fleet", "up", "--env-file", "/tmp/fleet.env"]).unwrap();
        assert_eq!(
            cli.env_file.as_deref(),
            Some(std::path::Path::new("/tmp/fleet.env"))
        );
    }
}
