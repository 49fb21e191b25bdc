//! Create-env command implementation
//!
//! Scaffolds the .env configuration file. An existing file is preserved
//! under a timestamped backup name, never overwritten.

use crate::output::format_config_error_anyhow;
use anyhow::Result;
use clap::Args;
use console::style;
use runner_fleet_core::config::{DEFAULT_ENV_FILE, ScaffoldOutcome, create_env_scaffold};
use std::path::Path;

/// Arguments for the create-env command
#[derive(Args, Default)]
pub struct CreateEnvArgs {}

/// Write the env template.
pub fn cmd_create_env(
    _args: &CreateEnvArgs,
    env_file: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let path = env_file.unwrap_or(Path::new(DEFAULT_ENV_FILE));

    let outcome = create_env_scaffold(path).map_err(|e| format_config_error_anyhow(&e))?;

    if quiet {
        return Ok(());
    }

    match outcome {
        ScaffoldOutcome::Created => {
            println!(
                "{} Wrote {}",
                style("Success:").green().bold(),
                style(path.display()).cyan()
            );
        }
        ScaffoldOutcome::BackedUp { backup } => {
            println!(
                "{} Wrote {} (previous file kept as {})",
                style("Success:").green().bold(),
                style(path.display()).cyan(),
                style(backup.display()).yellow()
            );
        }
    }
    println!();
    println!(
        "Fill in {} and {} before starting the fleet.",
        style("GITHUB_URL").cyan(),
        style("GITHUB_ORG_TOKEN").cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scaffolds_then_backs_up() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        let args = CreateEnvArgs::default();

        cmd_create_env(&args, Some(&path), true).expect("first scaffold");
        std::fs::write(&path, "GITHUB_URL=https://github.com/acme\n").expect("write");

        cmd_create_env(&args, Some(&path), true).expect("second scaffold");

        // the edited file survived under a backup name
        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".bak-"))
            .collect();
        assert_eq!(backups.len(), 1);
        let preserved = std::fs::read_to_string(backups[0].path()).expect("read backup");
        assert!(preserved.contains("github.com/acme"));
    }
}
