//! Build command implementation
//!
//! Builds the runner image from the embedded Dockerfile with streaming
//! progress.

use super::connect_docker;
use crate::output::format_docker_error_anyhow;
use anyhow::Result;
use clap::Args;
use console::style;
use runner_fleet_core::docker::{ProgressReporter, RUNNER_VERSION_DEFAULT, build_image};
use runner_fleet_core::get_version;
use std::collections::HashMap;

/// Arguments for the build command
#[derive(Args)]
pub struct BuildArgs {
    /// Build without the Docker layer cache
    #[arg(long)]
    pub no_cache: bool,

    /// Actions runner release to bake into the image
    #[arg(long, default_value = RUNNER_VERSION_DEFAULT)]
    pub runner_version: String,

    /// Expected SHA-256 of the runner tarball; the build fails on mismatch
    #[arg(long)]
    pub runner_sha256: Option<String>,

    /// Image tag
    #[arg(long, default_value = "latest")]
    pub tag: String,
}

/// Build the runner image.
pub async fn cmd_build(args: &BuildArgs, quiet: bool, verbose: u8) -> Result<()> {
    let client = connect_docker().await?;

    let mut build_args = HashMap::from([
        ("RUNNER_VERSION".to_string(), args.runner_version.clone()),
        ("AGENT_VERSION".to_string(), get_version().to_string()),
    ]);
    if let Some(sha) = &args.runner_sha256 {
        build_args.insert("RUNNER_SHA256".to_string(), sha.clone());
    } else if !quiet {
        eprintln!(
            "{} No --runner-sha256 given; the runner download is not verified.",
            style("Warning:").yellow().bold()
        );
    }

    if verbose > 0 {
        eprintln!(
            "{} Building runner {} (agent {})",
            style("[info]").cyan(),
            args.runner_version,
            get_version()
        );
    }

    let mut progress = if quiet {
        ProgressReporter::plain()
    } else {
        ProgressReporter::new()
    };

    let image = build_image(
        &client,
        Some(&args.tag),
        args.no_cache,
        build_args,
        &mut progress,
    )
    .await
    .map_err(|e| format_docker_error_anyhow(&e))?;

    if !quiet {
        println!();
        println!("Image: {}", style(&image).cyan());
        println!(
            "Start the fleet with '{}'.",
            style("runner-fleet up").cyan()
        );
    }

    Ok(())
}
