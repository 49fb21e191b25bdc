//! Container entrypoint for one fleet runner
//!
//! Lifecycle, in order: scrub stale registration state, exchange the PAT
//! for a registration token, run the vendor configure step, then supervise
//! the vendor run process while concurrently awaiting SIGTERM/SIGINT. On
//! signal the runner is deregistered before the process is allowed to exit,
//! so `down` never strands a registration on GitHub.
//!
//! Deregistration is best-effort: a failure is logged and ignored, because
//! at that point the only alternative is refusing to shut down.

use anyhow::{Context, Result, bail};
use runner_fleet_core::config::RunnerConfig;
use runner_fleet_core::github;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info, warn};

/// Runner root inside the container (the vendor tarball is unpacked here)
pub const RUNNER_ROOT: &str = "/runner";

/// Registration state the vendor configure step leaves behind.
///
/// A restarted container may still carry these from a previous registration;
/// they are scrubbed so the fresh registration starts clean.
const STALE_STATE_FILES: &[&str] = &[".runner", ".credentials", ".credentials_rsaparams"];

/// How long the run process gets after SIGTERM before it is killed
const RUN_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Agent entrypoint. Returns the process exit code.
pub async fn run() -> i32 {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match run_agent(Path::new(RUNNER_ROOT)).await {
        Ok(code) => code,
        Err(e) => {
            error!("Runner agent failed: {e:#}");
            1
        }
    }
}

async fn run_agent(root: &Path) -> Result<i32> {
    let config = RunnerConfig::from_env()?;
    info!(
        "Starting runner '{}' for {} (labels: {})",
        config.name, config.github_url, config.labels
    );

    remove_stale_state(root);

    let http = reqwest::Client::new();
    let registration = github::registration_token(&http, &config.github_url, &config.token)
        .await
        .context("failed to obtain a registration token")?;

    configure_runner(root, &config, &registration.token).await?;

    let mut child = spawn_run(root)?;

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    // The run process and signal delivery race; whichever finishes first
    // decides the shutdown path.
    let exited = tokio::select! {
        status = child.wait() => Some(status.context("failed to wait for run process")?),
        _ = sigterm.recv() => None,
        _ = sigint.recv() => None,
    };

    match exited {
        Some(status) => {
            info!("Run process exited with {status}");
            Ok(status.code().unwrap_or(1))
        }
        None => {
            info!("Termination signal received; shutting down");
            shutdown_child(&mut child).await;
            // Deregistration completes before this function returns; the
            // process must not exit with the call still in flight.
            deregister(&http, root, &config).await;
            Ok(0)
        }
    }
}

/// Best-effort removal of registration state from a previous run.
fn remove_stale_state(root: &Path) {
    for path in stale_state_paths(root) {
        match std::fs::remove_file(&path) {
            Ok(()) => info!("Removed stale registration state: {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", path.display(), e),
        }
    }
}

fn stale_state_paths(root: &Path) -> Vec<PathBuf> {
    STALE_STATE_FILES.iter().map(|f| root.join(f)).collect()
}

/// Arguments for the vendor configure step.
///
/// `--unattended` suppresses prompts, `--replace` takes over a same-name
/// registration so container restarts are idempotent.
fn configure_args(config: &RunnerConfig, registration_token: &str) -> Vec<String> {
    vec![
        "--url".to_string(),
        config.github_url.clone(),
        "--token".to_string(),
        registration_token.to_string(),
        "--name".to_string(),
        config.name.clone(),
        "--work".to_string(),
        config.workdir.clone(),
        "--labels".to_string(),
        config.labels.clone(),
        "--unattended".to_string(),
        "--replace".to_string(),
    ]
}

/// Arguments for the vendor remove step.
fn remove_args(remove_token: &str) -> Vec<String> {
    vec![
        "remove".to_string(),
        "--token".to_string(),
        remove_token.to_string(),
    ]
}

async fn configure_runner(
    root: &Path,
    config: &RunnerConfig,
    registration_token: &str,
) -> Result<()> {
    info!("Registering runner '{}'", config.name);

    let status = Command::new("./config.sh")
        .current_dir(root)
        .args(configure_args(config, registration_token))
        .status()
        .await
        .context("failed to run config.sh")?;

    if !status.success() {
        bail!("config.sh exited with {status}");
    }

    info!("Runner registered");
    Ok(())
}

fn spawn_run(root: &Path) -> Result<Child> {
    Command::new("./run.sh")
        .current_dir(root)
        .spawn()
        .context("failed to start run.sh")
}

/// Stop the run process: SIGTERM, a grace period, then SIGKILL.
async fn shutdown_child(child: &mut Child) {
    let Some(pid) = child.id() else {
        // already exited; reap it
        let _ = child.wait().await;
        return;
    };

    // SAFETY: pid is a live child of this process
    unsafe {
        libc::kill(pid as libc::pid_t, libc::SIGTERM);
    }

    match tokio::time::timeout(RUN_SHUTDOWN_GRACE, child.wait()).await {
        Ok(_) => info!("Run process stopped"),
        Err(_) => {
            warn!(
                "Run process did not stop within {}s; killing",
                RUN_SHUTDOWN_GRACE.as_secs()
            );
            let _ = child.kill().await;
        }
    }
}

/// Deregister from GitHub using the same credential supplied at startup.
///
/// Runs even when registration or the run step failed earlier; errors are
/// logged and swallowed.
async fn deregister(http: &reqwest::Client, root: &Path, config: &RunnerConfig) {
    info!("Deregistering runner '{}'", config.name);

    let token = match github::remove_token(http, &config.github_url, &config.token).await {
        Ok(token) => token,
        Err(e) => {
            warn!("Could not obtain a remove token: {e}; the registration will expire on GitHub");
            return;
        }
    };

    match Command::new("./config.sh")
        .current_dir(root)
        .args(remove_args(&token.token))
        .status()
        .await
    {
        Ok(status) if status.success() => info!("Runner deregistered"),
        Ok(status) => warn!("config.sh remove exited with {status}"),
        Err(e) => warn!("Could not run config.sh remove: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RunnerConfig {
        RunnerConfig {
            github_url: "https://github.com/acme".to_string(),
            token: "ghp_pat".to_string(),
            name: "buildhost-2".to_string(),
            workdir: "_work".to_string(),
            labels: "docker,self-hosted,linux,org".to_string(),
        }
    }

    #[test]
    fn configure_args_carry_the_whole_config() {
        let args = configure_args(&test_config(), "REG123");
        let joined = args.join(" ");
        assert!(joined.contains("--url https://github.com/acme"));
        assert!(joined.contains("--token REG123"));
        assert!(joined.contains("--name buildhost-2"));
        assert!(joined.contains("--work _work"));
        assert!(joined.contains("--labels docker,self-hosted,linux,org"));
        assert!(joined.contains("--unattended"));
        assert!(joined.contains("--replace"));
    }

    #[test]
    fn configure_uses_registration_token_not_pat() {
        let args = configure_args(&test_config(), "REG123");
        assert!(!args.iter().any(|a| a == "ghp_pat"));
    }

    #[test]
    fn remove_args_shape() {
        assert_eq!(remove_args("RM456"), vec!["remove", "--token", "RM456"]);
    }

    #[test]
    fn stale_state_covers_vendor_files() {
        let paths = stale_state_paths(Path::new("/runner"));
        let rendered: Vec<String> = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        assert!(rendered.contains(&"/runner/.runner".to_string()));
        assert!(rendered.contains(&"/runner/.credentials".to_string()));
        assert!(rendered.contains(&"/runner/.credentials_rsaparams".to_string()));
    }
}
