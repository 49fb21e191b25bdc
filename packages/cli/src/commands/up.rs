//! Up / up-extra command implementations
//!
//! Brings fleet instances up: ensures work volumes, creates missing
//! containers from the validated configuration, and starts them.

use super::connect_docker;
use crate::output::{CommandSpinner, format_config_error_anyhow, format_docker_error_anyhow};
use anyhow::{Result, anyhow};
use clap::Args;
use console::style;
use runner_fleet_core::config::load_fleet_config;
use runner_fleet_core::docker::{
    IMAGE_NAME, IMAGE_TAG_DEFAULT, InstanceId, Profile, UpOutcome, container_name, image_exists,
    resolve_services, up_instance,
};
use std::path::Path;

/// Arguments for the up command
#[derive(Args, Default)]
pub struct UpArgs {
    /// Services to start (names or instance numbers); default: the base profile
    pub services: Vec<String>,
}

/// Arguments for the up-extra command
#[derive(Args, Default)]
pub struct UpExtraArgs {}

/// Start the base fleet, or the named services.
pub async fn cmd_up(
    args: &UpArgs,
    env_file: Option<&Path>,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    let targets = if args.services.is_empty() {
        Profile::Base.instances()
    } else {
        resolve_services(&args.services).map_err(|e| anyhow!("{e}"))?
    };
    start_instances(&targets, env_file, quiet, verbose).await
}

/// Start the whole fleet.
pub async fn cmd_up_extra(
    _args: &UpExtraArgs,
    env_file: Option<&Path>,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    start_instances(&Profile::Extra.instances(), env_file, quiet, verbose).await
}

async fn start_instances(
    targets: &[InstanceId],
    env_file: Option<&Path>,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    // Configuration is loaded and validated before any external call
    let config = load_fleet_config(env_file).map_err(|e| format_config_error_anyhow(&e))?;

    if verbose > 0 {
        eprintln!("{} Config: {:?}", style("[info]").cyan(), config);
    }

    let client = connect_docker().await?;

    if !image_exists(&client, IMAGE_NAME, IMAGE_TAG_DEFAULT)
        .await
        .map_err(|e| format_docker_error_anyhow(&e))?
    {
        return Err(anyhow!(
            "Runner image '{IMAGE_NAME}:{IMAGE_TAG_DEFAULT}' not found. Run '{}' first.",
            style("runner-fleet build").cyan()
        ));
    }

    let mut started = 0usize;
    for &id in targets {
        let name = container_name(id);
        let spinner = CommandSpinner::new_maybe(&format!("Starting {name}..."), quiet);

        match up_instance(&client, &config, id).await {
            Ok(UpOutcome::Created) => {
                spinner.success(&format!("{name} created and started"));
                started += 1;
            }
            Ok(UpOutcome::Started) => {
                spinner.success(&format!("{name} started"));
                started += 1;
            }
            Ok(UpOutcome::AlreadyRunning) => {
                spinner.success(&format!("{name} already running"));
            }
            Err(e) => {
                spinner.fail(&format!("Failed to start {name}"));
                return Err(format_docker_error_anyhow(&e));
            }
        }
    }

    if !quiet {
        println!();
        println!(
            "{} instance(s) started, {} targeted",
            style(started).green().bold(),
            targets.len()
        );
        println!(
            "Runners register with {} shortly; watch with '{}'.",
            style("GitHub").cyan(),
            style("runner-fleet monitor").cyan()
        );
    }

    Ok(())
}
