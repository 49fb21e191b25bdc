//! CLI command implementations
//!
//! One module per verb. Every command is independent: it loads what it
//! needs, talks to Docker, and exits.

mod build;
mod cleanup;
mod create_env;
mod down;
mod logs;
mod monitor;
mod restart;
mod up;

pub use build::{BuildArgs, cmd_build};
pub use cleanup::{CleanupArgs, cmd_cleanup};
pub use create_env::{CreateEnvArgs, cmd_create_env};
pub use down::{DownArgs, cmd_down};
pub use logs::{LogsArgs, cmd_logs};
pub use monitor::{MonitorArgs, cmd_monitor};
pub use restart::{RestartArgs, cmd_restart};
pub use up::{UpArgs, UpExtraArgs, cmd_up, cmd_up_extra};

use crate::output::format_docker_error_anyhow;
use anyhow::Result;
use runner_fleet_core::DockerClient;

/// Connect to Docker and verify the daemon answers.
///
/// All commands that touch the engine go through here so connection
/// failures get the same actionable formatting.
pub(crate) async fn connect_docker() -> Result<DockerClient> {
    let client = DockerClient::new().map_err(|e| format_docker_error_anyhow(&e))?;
    client
        .verify_connection()
        .await
        .map_err(|e| format_docker_error_anyhow(&e))?;
    Ok(client)
}
