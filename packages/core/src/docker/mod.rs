//! Docker operations for the runner fleet
//!
//! Everything the controller needs from the Engine API:
//! - client wrapper with connection handling and actionable error types
//! - embedded Dockerfile for the runner image, plus build/remove operations
//! - per-instance container lifecycle with resource limits
//! - work volumes
//! - fleet-level orchestration (roster, profiles, up/down/status/prune)

mod client;
pub mod container;
mod dockerfile;
mod error;
pub mod fleet;
pub mod image;
pub mod limits;
pub mod progress;
pub mod volume;

pub use client::DockerClient;
pub use error::DockerError;
pub use progress::ProgressReporter;

pub use dockerfile::{DOCKERFILE, IMAGE_NAME, IMAGE_TAG_DEFAULT, RUNNER_VERSION_DEFAULT};

pub use container::{
    ContainerState, container_exists, container_is_running, container_state,
    create_runner_container, remove_container, start_container, stop_container,
};

pub use image::{build_image, image_exists, remove_fleet_images};

pub use fleet::{
    FLEET_SIZE, InstanceId, InstanceStatus, Profile, PruneSummary, SelectorError, UpOutcome,
    container_name, down_fleet, fleet_status, prune_fleet, restart_instance, resolve_services,
    runner_name, up_instance, work_volume_name,
};

pub use volume::{ensure_volume_exists, remove_volume};

/// Graceful stop timeout for fleet containers, in seconds.
///
/// Sized so the agent's deregistration sequence (remove-token exchange plus
/// the vendor remove step) fits inside the window.
pub const STOP_TIMEOUT_SECS: i64 = 60;
