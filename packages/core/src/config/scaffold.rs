//! Env file scaffolding for `create-env`
//!
//! Writes a commented template with every recognized key. An existing file
//! is never overwritten silently: it is renamed to a timestamped backup
//! first, and the outcome reports the backup path.

use super::validation::ConfigError;
use std::path::{Path, PathBuf};

/// Template written by `runner-fleet create-env`
pub const ENV_TEMPLATE: &str = r#"# runner-fleet configuration
#
# Values here can be overridden by the process environment.

# Required: organization or repository URL the runners attach to
GITHUB_URL=

# Required: personal access token with admin:org (or repo) scope.
# GITHUB_TOKEN is accepted as a fallback key.
GITHUB_ORG_TOKEN=

# Comma-separated labels used by workflow `runs-on` matching
RUNNER_LABELS=docker,self-hosted,linux,org

# Per-container resource limits
MEMORY_LIMIT=2G
CPU_LIMIT=2.0

# Runner display-name prefix; instances append -1..-4.
# Defaults to this host's name.
#RUNNER_NAME=

# Work directory, relative to the runner root
RUNNER_WORKDIR=_work

# GID granted to containers for Docker socket access.
# Auto-detected from /var/run/docker.sock when unset.
#DOCKER_GID=999
"#;

/// What `create_env_scaffold` did.
#[derive(Debug, PartialEq, Eq)]
pub enum ScaffoldOutcome {
    /// No prior file existed; the template was written fresh
    Created,
    /// A prior file was moved aside before writing the template
    BackedUp { backup: PathBuf },
}

/// Write the env template at `path`, preserving any prior file.
pub fn create_env_scaffold(path: &Path) -> Result<ScaffoldOutcome, ConfigError> {
    let read_err = |source: std::io::Error| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    };

    let outcome = if path.exists() {
        let backup = backup_path(path);
        std::fs::rename(path, &backup).map_err(read_err)?;
        ScaffoldOutcome::BackedUp { backup }
    } else {
        ScaffoldOutcome::Created
    };

    std::fs::write(path, ENV_TEMPLATE).map_err(read_err)?;
    Ok(outcome)
}

/// Timestamped sibling name for the backup, e.g. `.env.bak-20260807T114300Z`.
fn backup_path(path: &Path) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".env".to_string());
    path.with_file_name(format!("{file_name}.bak-{stamp}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_template_when_absent() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(".env");

        let outcome = create_env_scaffold(&path).expect("scaffold");

        assert_eq!(outcome, ScaffoldOutcome::Created);
        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written.contains("GITHUB_URL="));
        assert!(written.contains("GITHUB_ORG_TOKEN="));
    }

    #[test]
    fn preserves_prior_file_under_backup_name() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        std::fs::write(&path, "GITHUB_URL=https://github.com/acme\n").expect("write");

        let outcome = create_env_scaffold(&path).expect("scaffold");

        let ScaffoldOutcome::BackedUp { backup } = outcome else {
            panic!("expected backup outcome");
        };
        let preserved = std::fs::read_to_string(&backup).expect("read backup");
        assert_eq!(preserved, "GITHUB_URL=https://github.com/acme\n");

        // and the live file is the fresh template
        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written.starts_with("# runner-fleet configuration"));
    }

    #[test]
    fn template_parses_with_documented_defaults() {
        let map = super::super::parse_env_file(ENV_TEMPLATE);
        assert_eq!(map.get("RUNNER_LABELS").map(String::as_str), Some("docker,self-hosted,linux,org"));
        assert_eq!(map.get("MEMORY_LIMIT").map(String::as_str), Some("2G"));
        assert_eq!(map.get("CPU_LIMIT").map(String::as_str), Some("2.0"));
        // required keys are present but intentionally empty
        assert_eq!(map.get("GITHUB_URL").map(String::as_str), Some(""));
    }
}
