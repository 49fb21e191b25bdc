//! Down command implementation
//!
//! Stops every running fleet container with a graceful timeout wide enough
//! for the in-container agent to deregister from GitHub.

use super::connect_docker;
use crate::output::{CommandSpinner, format_docker_error_anyhow};
use anyhow::Result;
use clap::Args;
use console::style;
use runner_fleet_core::docker::down_fleet;

/// Arguments for the down command
#[derive(Args, Default)]
pub struct DownArgs {}

/// Stop all running fleet containers (idempotent).
pub async fn cmd_down(_args: &DownArgs, quiet: bool) -> Result<()> {
    let client = connect_docker().await?;

    let spinner = CommandSpinner::new_maybe("Stopping fleet...", quiet);

    match down_fleet(&client).await {
        Ok(0) => {
            spinner.success("Fleet is already stopped");
        }
        Ok(stopped) => {
            spinner.success(&format!("Stopped {stopped} instance(s)"));
        }
        Err(e) => {
            spinner.fail("Failed to stop fleet");
            return Err(format_docker_error_anyhow(&e));
        }
    }

    if !quiet {
        println!(
            "{}",
            style("Runners deregister from GitHub during shutdown.").dim()
        );
    }

    Ok(())
}
