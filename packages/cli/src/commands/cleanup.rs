//! Cleanup command implementation
//!
//! Removes fleet containers, the runner image, and optionally the work
//! volumes. Destructive, so it confirms unless --yes is given.

use super::connect_docker;
use crate::output::{CommandSpinner, format_docker_error_anyhow};
use anyhow::Result;
use clap::Args;
use console::style;
use dialoguer::Confirm;
use runner_fleet_core::docker::prune_fleet;

/// Arguments for the cleanup command
#[derive(Args)]
pub struct CleanupArgs {
    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Also remove the work volumes (job workspaces are lost)
    #[arg(long)]
    pub volumes: bool,
}

/// Remove everything the fleet created.
pub async fn cmd_cleanup(args: &CleanupArgs, quiet: bool) -> Result<()> {
    if !args.yes {
        let prompt = if args.volumes {
            "Remove all fleet containers, the runner image, and work volumes?"
        } else {
            "Remove all fleet containers and the runner image?"
        };
        let confirmed = Confirm::new().with_prompt(prompt).default(false).interact()?;
        if !confirmed {
            if !quiet {
                println!("{}", style("Cleanup cancelled").dim());
            }
            return Ok(());
        }
    }

    let client = connect_docker().await?;

    let spinner = CommandSpinner::new_maybe("Cleaning up fleet...", quiet);

    match prune_fleet(&client, args.volumes).await {
        Ok(summary) => {
            spinner.success("Cleanup complete");
            if !quiet {
                println!();
                println!("Containers removed: {}", summary.containers);
                println!("Images removed:     {}", summary.images);
                if args.volumes {
                    println!("Volumes removed:    {}", summary.volumes);
                }
            }
            Ok(())
        }
        Err(e) => {
            spinner.fail("Cleanup failed");
            Err(format_docker_error_anyhow(&e))
        }
    }
}
