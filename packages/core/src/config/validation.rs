//! Configuration validation with actionable error messages
//!
//! Validation runs before any external call; a bad value never reaches
//! Docker or the GitHub API. Every error carries a fix hint with the exact
//! command or key to correct.

use super::keys;
use crate::docker::limits::{parse_cpu_limit, parse_memory_limit};
use std::path::PathBuf;

/// Configuration errors, fatal before any external call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A mandatory key is absent after defaulting
    #[error("required configuration '{key}' is not set")]
    MissingRequired { key: &'static str },

    /// A key is present but its value does not parse
    #[error("invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },

    /// The env file exists but could not be read
    #[error("failed to read env file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ConfigError {
    /// An actionable hint for the operator, printed under the error.
    pub fn fix_hint(&self) -> Option<String> {
        match self {
            ConfigError::MissingRequired { key } => Some(format!(
                "run 'runner-fleet create-env' and set {key} in the generated .env file"
            )),
            ConfigError::Invalid { key, .. } => match *key {
                keys::MEMORY_LIMIT => {
                    Some(format!("use a size with a unit suffix, e.g. {key}=2G"))
                }
                keys::CPU_LIMIT => Some(format!("use a positive decimal, e.g. {key}=2.0")),
                keys::DOCKER_GID => Some(format!(
                    "use the GID of the docker group, e.g. {key}=$(getent group docker | cut -d: -f3)"
                )),
                _ => None,
            },
            ConfigError::Read { .. } => None,
        }
    }
}

/// Validate a loaded fleet configuration.
///
/// Checks run in order and stop at the first error, so the operator fixes
/// one thing at a time.
pub fn validate_fleet_config(config: &super::FleetConfig) -> Result<(), ConfigError> {
    if !config.github_url.starts_with("https://") && !config.github_url.starts_with("http://") {
        return Err(ConfigError::Invalid {
            key: keys::GITHUB_URL,
            message: format!("'{}' is not an absolute URL", config.github_url),
        });
    }

    if let Err(message) = parse_memory_limit(&config.memory_limit) {
        return Err(ConfigError::Invalid {
            key: keys::MEMORY_LIMIT,
            message,
        });
    }

    if let Err(message) = parse_cpu_limit(&config.cpu_limit) {
        return Err(ConfigError::Invalid {
            key: keys::CPU_LIMIT,
            message,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::EnvSource;
    use super::super::FleetConfig;
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> FleetConfig {
        let mut map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.entry("GITHUB_URL".to_string())
            .or_insert_with(|| "https://github.com/acme".to_string());
        map.entry("GITHUB_ORG_TOKEN".to_string())
            .or_insert_with(|| "ghp_x".to_string());
        FleetConfig::from_source(&EnvSource::with_maps(HashMap::new(), map)).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_fleet_config(&config_with(&[])).is_ok());
    }

    #[test]
    fn relative_url_rejected() {
        let config = config_with(&[("GITHUB_URL", "github.com/acme")]);
        let err = validate_fleet_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "GITHUB_URL", .. }));
    }

    #[test]
    fn bad_memory_limit_rejected() {
        let config = config_with(&[("MEMORY_LIMIT", "lots")]);
        let err = validate_fleet_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "MEMORY_LIMIT", .. }
        ));
    }

    #[test]
    fn bad_cpu_limit_rejected() {
        let config = config_with(&[("CPU_LIMIT", "-1")]);
        let err = validate_fleet_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CPU_LIMIT", .. }));
    }

    #[test]
    fn missing_required_hint_names_create_env() {
        let err = ConfigError::MissingRequired {
            key: keys::GITHUB_URL,
        };
        let hint = err.fix_hint().unwrap();
        assert!(hint.contains("create-env"));
        assert!(hint.contains("GITHUB_URL"));
    }
}
