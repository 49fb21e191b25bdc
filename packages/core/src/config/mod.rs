//! Configuration for the runner fleet
//!
//! Configuration is read from a dotenv-style file (`./.env` by default) and
//! the process environment. A value set in the process environment wins over
//! the same key in the file; documented defaults apply when neither source
//! sets a key. Required keys missing after defaulting are a fatal
//! [`ConfigError::MissingRequired`].

mod env_file;
mod scaffold;
mod schema;
mod validation;

pub use env_file::{parse_env_file, read_env_file};
pub use scaffold::{ENV_TEMPLATE, ScaffoldOutcome, create_env_scaffold};
pub use schema::{FleetConfig, RunnerConfig};
pub use validation::{ConfigError, validate_fleet_config};

use std::collections::HashMap;
use std::path::Path;

/// Configuration key names, shared between the loader and the scaffold.
pub mod keys {
    /// Org-scoped personal access token (preferred)
    pub const GITHUB_ORG_TOKEN: &str = "GITHUB_ORG_TOKEN";
    /// Fallback token key
    pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
    /// Organization or repository URL the runners attach to
    pub const GITHUB_URL: &str = "GITHUB_URL";
    /// Comma-separated label set
    pub const RUNNER_LABELS: &str = "RUNNER_LABELS";
    /// Per-container memory limit, e.g. `2G`
    pub const MEMORY_LIMIT: &str = "MEMORY_LIMIT";
    /// Per-container CPU limit, e.g. `2.0`
    pub const CPU_LIMIT: &str = "CPU_LIMIT";
    /// Runner display-name (prefix on the controller, full name in the agent)
    pub const RUNNER_NAME: &str = "RUNNER_NAME";
    /// Runner work directory, relative to the runner root
    pub const RUNNER_WORKDIR: &str = "RUNNER_WORKDIR";
    /// GID granted to the container for Docker socket access
    pub const DOCKER_GID: &str = "DOCKER_GID";
}

/// Default env file path, relative to the working directory
pub const DEFAULT_ENV_FILE: &str = ".env";

/// A layered configuration source: process environment over file values.
///
/// The environment is snapshotted at construction; this is the only place
/// lookup order is decided, and both config types are built from it.
pub(crate) struct EnvSource {
    env: HashMap<String, String>,
    file: HashMap<String, String>,
}

impl EnvSource {
    pub(crate) fn from_file_map(file: HashMap<String, String>) -> Self {
        Self {
            env: std::env::vars().collect(),
            file,
        }
    }

    /// Process-environment-only source (used inside the container by the agent)
    pub(crate) fn process_only() -> Self {
        Self::from_file_map(HashMap::new())
    }

    #[cfg(test)]
    pub(crate) fn with_maps(env: HashMap<String, String>, file: HashMap<String, String>) -> Self {
        Self { env, file }
    }

    /// Look up a key: process environment first, then the file map.
    ///
    /// Empty values are treated as unset so `KEY=` lines in a scaffolded
    /// file don't mask the default.
    pub(crate) fn get(&self, key: &str) -> Option<String> {
        let lookup = |map: &HashMap<String, String>| {
            map.get(key).filter(|v| !v.trim().is_empty()).cloned()
        };
        lookup(&self.env).or_else(|| lookup(&self.file))
    }
}

/// Load and validate the fleet configuration for the controller.
///
/// `env_file` overrides the default `./.env` location. A missing file is not
/// an error (the process environment alone may be sufficient); an unreadable
/// file is.
pub fn load_fleet_config(env_file: Option<&Path>) -> Result<FleetConfig, ConfigError> {
    let path = env_file.unwrap_or(Path::new(DEFAULT_ENV_FILE));

    let file_map = if path.exists() {
        read_env_file(path)?
    } else {
        HashMap::new()
    };

    let source = EnvSource::from_file_map(file_map);
    let config = FleetConfig::from_source(&source)?;
    validate_fleet_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_source_empty_values_are_unset() {
        let mut file = HashMap::new();
        file.insert("SOME_KEY".to_string(), "  ".to_string());
        let source = EnvSource::with_maps(HashMap::new(), file);
        assert_eq!(source.get("SOME_KEY"), None);
    }

    #[test]
    fn env_source_process_env_wins_over_file() {
        let mut env = HashMap::new();
        env.insert("SHARED_KEY".to_string(), "from-env".to_string());
        let mut file = HashMap::new();
        file.insert("SHARED_KEY".to_string(), "from-file".to_string());
        file.insert("FILE_ONLY_KEY".to_string(), "from-file".to_string());
        let source = EnvSource::with_maps(env, file);
        assert_eq!(source.get("SHARED_KEY").as_deref(), Some("from-env"));
        assert_eq!(source.get("FILE_ONLY_KEY").as_deref(), Some("from-file"));
    }
}
