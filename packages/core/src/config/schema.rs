//! Configuration schema for the runner fleet
//!
//! Two views over the same key space: [`FleetConfig`] is what the controller
//! needs to run containers, [`RunnerConfig`] is the per-instance view the
//! agent builds from its container environment.

use super::validation::ConfigError;
use super::{EnvSource, keys};
use std::fmt;

/// Default label set applied to every runner
pub const DEFAULT_LABELS: &str = "docker,self-hosted,linux,org";

/// Default per-container memory limit
pub const DEFAULT_MEMORY_LIMIT: &str = "2G";

/// Default per-container CPU limit
pub const DEFAULT_CPU_LIMIT: &str = "2.0";

/// Default runner work directory, relative to the runner root
pub const DEFAULT_WORKDIR: &str = "_work";

/// Fallback GID for Docker socket access when auto-detection fails
pub const FALLBACK_DOCKER_GID: u32 = 999;

/// Fleet-level configuration, constructed once per controller invocation.
///
/// Immutable for the process lifetime. The token is a secret; `Debug`
/// redacts it so it cannot leak through diagnostic output.
#[derive(Clone, PartialEq)]
pub struct FleetConfig {
    /// Organization or repository URL the runners attach to
    pub github_url: String,

    /// Personal access token used for the registration-token exchange
    pub token: String,

    /// Comma-separated label set passed to each runner
    pub runner_labels: String,

    /// Prefix for runner display names; instances append `-<n>`
    pub runner_name_prefix: String,

    /// Runner work directory, relative to the runner root
    pub runner_workdir: String,

    /// Per-container memory limit, e.g. `2G`
    pub memory_limit: String,

    /// Per-container CPU limit, e.g. `2.0`
    pub cpu_limit: String,

    /// GID granted to each container for Docker socket access
    pub docker_gid: u32,
}

impl FleetConfig {
    pub(crate) fn from_source(source: &EnvSource) -> Result<Self, ConfigError> {
        let github_url = source
            .get(keys::GITHUB_URL)
            .ok_or(ConfigError::MissingRequired {
                key: keys::GITHUB_URL,
            })?;
        let token = token_from_source(source)?;

        let docker_gid = match source.get(keys::DOCKER_GID) {
            Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::Invalid {
                key: keys::DOCKER_GID,
                message: format!("'{raw}' is not a valid GID"),
            })?,
            None => detect_docker_gid(),
        };

        Ok(Self {
            github_url,
            token,
            runner_labels: source
                .get(keys::RUNNER_LABELS)
                .unwrap_or_else(|| DEFAULT_LABELS.to_string()),
            runner_name_prefix: source
                .get(keys::RUNNER_NAME)
                .unwrap_or_else(default_runner_name),
            runner_workdir: source
                .get(keys::RUNNER_WORKDIR)
                .unwrap_or_else(|| DEFAULT_WORKDIR.to_string()),
            memory_limit: source
                .get(keys::MEMORY_LIMIT)
                .unwrap_or_else(|| DEFAULT_MEMORY_LIMIT.to_string()),
            cpu_limit: source
                .get(keys::CPU_LIMIT)
                .unwrap_or_else(|| DEFAULT_CPU_LIMIT.to_string()),
            docker_gid,
        })
    }
}

impl fmt::Debug for FleetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FleetConfig")
            .field("github_url", &self.github_url)
            .field("token", &"<redacted>")
            .field("runner_labels", &self.runner_labels)
            .field("runner_name_prefix", &self.runner_name_prefix)
            .field("runner_workdir", &self.runner_workdir)
            .field("memory_limit", &self.memory_limit)
            .field("cpu_limit", &self.cpu_limit)
            .field("docker_gid", &self.docker_gid)
            .finish()
    }
}

/// Per-instance configuration the agent reads from its container environment.
#[derive(Clone, PartialEq)]
pub struct RunnerConfig {
    /// Organization or repository URL the runner attaches to
    pub github_url: String,

    /// Personal access token used for the token exchange
    pub token: String,

    /// Runner display name shown in the GitHub UI
    pub name: String,

    /// Work directory, relative to the runner root
    pub workdir: String,

    /// Comma-separated label set
    pub labels: String,
}

impl RunnerConfig {
    /// Build the agent's configuration from the process environment only.
    ///
    /// Inside the container there is no env file; the controller injected
    /// everything as container environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = EnvSource::process_only();

        let github_url = source
            .get(keys::GITHUB_URL)
            .ok_or(ConfigError::MissingRequired {
                key: keys::GITHUB_URL,
            })?;
        let token = token_from_source(&source)?;

        Ok(Self {
            github_url,
            token,
            name: source.get(keys::RUNNER_NAME).unwrap_or_else(default_runner_name),
            workdir: source
                .get(keys::RUNNER_WORKDIR)
                .unwrap_or_else(|| DEFAULT_WORKDIR.to_string()),
            labels: source
                .get(keys::RUNNER_LABELS)
                .unwrap_or_else(|| DEFAULT_LABELS.to_string()),
        })
    }
}

impl fmt::Debug for RunnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("github_url", &self.github_url)
            .field("token", &"<redacted>")
            .field("name", &self.name)
            .field("workdir", &self.workdir)
            .field("labels", &self.labels)
            .finish()
    }
}

/// Resolve the token: `GITHUB_ORG_TOKEN` preferred, `GITHUB_TOKEN` fallback.
fn token_from_source(source: &EnvSource) -> Result<String, ConfigError> {
    source
        .get(keys::GITHUB_ORG_TOKEN)
        .or_else(|| source.get(keys::GITHUB_TOKEN))
        .ok_or(ConfigError::MissingRequired {
            key: keys::GITHUB_ORG_TOKEN,
        })
}

/// Host-derived default runner name.
fn default_runner_name() -> String {
    whoami::hostname().unwrap_or_else(|_| "runner".to_string())
}

/// GID of `/var/run/docker.sock`, or [`FALLBACK_DOCKER_GID`] when the socket
/// is missing (e.g. building the config on a machine without Docker).
fn detect_docker_gid() -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let Ok(meta) = std::fs::metadata("/var/run/docker.sock") {
            return meta.gid();
        }
    }
    FALLBACK_DOCKER_GID
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source_with(pairs: &[(&str, &str)]) -> EnvSource {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        // empty env map keeps these tests hermetic against the ambient
        // process environment (CI sets GITHUB_TOKEN)
        EnvSource::with_maps(HashMap::new(), map)
    }

    fn minimal_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("GITHUB_URL", "https://github.com/acme"),
            ("GITHUB_ORG_TOKEN", "ghp_secret"),
        ]
    }

    #[test]
    fn defaults_applied_for_optional_keys() {
        let config = FleetConfig::from_source(&source_with(&minimal_pairs())).unwrap();
        assert_eq!(config.runner_labels, DEFAULT_LABELS);
        assert_eq!(config.runner_workdir, DEFAULT_WORKDIR);
        assert_eq!(config.memory_limit, DEFAULT_MEMORY_LIMIT);
        assert_eq!(config.cpu_limit, DEFAULT_CPU_LIMIT);
        assert!(!config.runner_name_prefix.is_empty());
    }

    #[test]
    fn missing_url_is_required_error() {
        let err = FleetConfig::from_source(&source_with(&[("GITHUB_ORG_TOKEN", "ghp_x")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingRequired { key: "GITHUB_URL" }
        ));
    }

    #[test]
    fn missing_token_is_required_error() {
        let err =
            FleetConfig::from_source(&source_with(&[("GITHUB_URL", "https://github.com/acme")]))
                .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingRequired {
                key: "GITHUB_ORG_TOKEN"
            }
        ));
    }

    #[test]
    fn github_token_accepted_as_fallback() {
        let config = FleetConfig::from_source(&source_with(&[
            ("GITHUB_URL", "https://github.com/acme"),
            ("GITHUB_TOKEN", "ghp_fallback"),
        ]))
        .unwrap();
        assert_eq!(config.token, "ghp_fallback");
    }

    #[test]
    fn org_token_preferred_over_fallback() {
        let config = FleetConfig::from_source(&source_with(&[
            ("GITHUB_URL", "https://github.com/acme"),
            ("GITHUB_TOKEN", "ghp_fallback"),
            ("GITHUB_ORG_TOKEN", "ghp_org"),
        ]))
        .unwrap();
        assert_eq!(config.token, "ghp_org");
    }

    #[test]
    fn explicit_docker_gid_parsed() {
        let mut pairs = minimal_pairs();
        pairs.push(("DOCKER_GID", "412"));
        let config = FleetConfig::from_source(&source_with(&pairs)).unwrap();
        assert_eq!(config.docker_gid, 412);
    }

    #[test]
    fn garbage_docker_gid_rejected() {
        let mut pairs = minimal_pairs();
        pairs.push(("DOCKER_GID", "docker"));
        let err = FleetConfig::from_source(&source_with(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DOCKER_GID", .. }));
    }

    #[test]
    fn debug_redacts_token() {
        let config = FleetConfig::from_source(&source_with(&minimal_pairs())).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
