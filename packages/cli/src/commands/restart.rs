//! Restart command implementation
//!
//! Restarts one instance selected by number. The selector is validated
//! before any Docker call.

use super::connect_docker;
use crate::output::{CommandSpinner, format_docker_error_anyhow};
use anyhow::{Result, anyhow};
use clap::Args;
use runner_fleet_core::docker::{InstanceId, container_name, restart_instance};

/// Arguments for the restart command
#[derive(Args)]
pub struct RestartArgs {
    /// Instance to restart (1-4)
    pub instance: String,
}

/// Restart one fleet instance.
pub async fn cmd_restart(args: &RestartArgs, quiet: bool) -> Result<()> {
    // Selector validation happens before connecting to Docker
    let id = InstanceId::parse(&args.instance).map_err(|e| anyhow!("{e}"))?;

    let client = connect_docker().await?;

    let name = container_name(id);
    let spinner = CommandSpinner::new_maybe(&format!("Restarting {name}..."), quiet);

    match restart_instance(&client, id).await {
        Ok(()) => {
            spinner.success(&format!("{name} restarted"));
            Ok(())
        }
        Err(e) => {
            spinner.fail(&format!("Failed to restart {name}"));
            Err(format_docker_error_anyhow(&e))
        }
    }
}
