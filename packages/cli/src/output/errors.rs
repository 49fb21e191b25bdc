//! Centralized error formatting
//!
//! Consistent, actionable error messages for Docker and configuration
//! errors across all CLI commands.

use anyhow::anyhow;
use console::style;
use runner_fleet_core::{ConfigError, DockerError};

/// Format Docker errors with actionable guidance
///
/// Returns a styled, multi-line error message with troubleshooting steps.
pub fn format_docker_error(e: &DockerError) -> String {
    match e {
        DockerError::NotRunning => {
            format!(
                "{}\n\n  {}\n  {}",
                style("Docker is not responding").red().bold(),
                "Start or restart the Docker daemon:",
                style("  sudo systemctl start docker").cyan()
            )
        }
        DockerError::SocketNotFound => {
            format!(
                "{}\n\n  {}\n  {}\n  {}",
                style("Docker socket not found").red().bold(),
                "Docker may not be installed or the service isn't running:",
                style("  sudo systemctl enable --now docker").cyan(),
                "Then verify the socket exists at /var/run/docker.sock."
            )
        }
        DockerError::PermissionDenied => {
            format!(
                "{}\n\n  {}\n  {}\n  {}",
                style("Permission denied accessing Docker").red().bold(),
                "Add your user to the docker group:",
                style("  sudo usermod -aG docker $USER").cyan(),
                "Then log out and back in (or run: newgrp docker)."
            )
        }
        DockerError::Connection(msg) => {
            format!(
                "{}\n\n  {}",
                style("Cannot connect to Docker").red().bold(),
                msg
            )
        }
        _ => e.to_string(),
    }
}

/// Format Docker errors as anyhow::Error
pub fn format_docker_error_anyhow(e: &DockerError) -> anyhow::Error {
    anyhow!("{}", format_docker_error(e))
}

/// Format configuration errors, appending the fix hint when one exists.
pub fn format_config_error_anyhow(e: &ConfigError) -> anyhow::Error {
    match e.fix_hint() {
        Some(hint) => anyhow!(
            "{}\n\n  {} {}",
            e,
            style("Tip:").cyan(),
            hint
        ),
        None => anyhow!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_running_mentions_systemctl() {
        let msg = format_docker_error(&DockerError::NotRunning);
        assert!(msg.contains("Docker is not responding"));
        assert!(msg.contains("systemctl start docker"));
    }

    #[test]
    fn permission_denied_mentions_docker_group() {
        let msg = format_docker_error(&DockerError::PermissionDenied);
        assert!(msg.contains("usermod -aG docker"));
    }

    #[test]
    fn other_errors_surface_verbatim() {
        let msg = format_docker_error(&DockerError::Container("boom".to_string()));
        assert_eq!(msg, "boom");
    }

    #[test]
    fn config_error_carries_fix_hint() {
        let err = ConfigError::MissingRequired { key: "GITHUB_URL" };
        let rendered = format_config_error_anyhow(&err).to_string();
        assert!(rendered.contains("GITHUB_URL"));
        assert!(rendered.contains("create-env"));
    }
}
