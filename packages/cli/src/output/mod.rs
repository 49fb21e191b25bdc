//! Output utilities for CLI commands
//!
//! Terminal output helpers: spinners for long-running operations, color
//! utilities for container states and log levels, and centralized error
//! formatting with actionable guidance.

pub mod colors;
pub mod errors;
pub mod spinner;

pub use colors::{log_level_style, state_style};
pub use errors::{format_config_error_anyhow, format_docker_error, format_docker_error_anyhow};
pub use spinner::CommandSpinner;
