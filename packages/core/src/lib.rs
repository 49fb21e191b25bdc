//! Core library for runner-fleet
//!
//! Everything the `runner-fleet` and `runner-agent` binaries share:
//! configuration loading and validation, Docker fleet operations, and the
//! GitHub runner registration-token exchange.

pub mod config;
pub mod docker;
pub mod github;

// Re-export bollard so binaries can use its types without a direct dependency
pub use bollard;

pub use config::{ConfigError, FleetConfig, RunnerConfig, load_fleet_config};
pub use docker::{DockerClient, DockerError};

/// Get the crate version
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
