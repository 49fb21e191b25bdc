//! Fleet roster and orchestration
//!
//! The fleet is a fixed roster of four named instances. The base profile
//! covers instances 1-2; the extra profile adds 3-4 for load peaks. Every
//! operation here is independent: no state is kept between invocations
//! beyond what the engine itself holds.

use super::container::{self, ContainerState};
use super::volume;
use super::{DockerClient, DockerError, STOP_TIMEOUT_SECS};
use crate::config::FleetConfig;
use tracing::debug;

/// Number of instances in the roster
pub const FLEET_SIZE: u8 = 4;

/// Instances started by the base profile
const BASE_PROFILE_SIZE: u8 = 2;

/// Name prefix for containers and volumes
const NAME_PREFIX: &str = "runner-fleet";

/// A validated instance selector, 1 through [`FLEET_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u8);

/// The selector did not name an instance in the roster.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid runner selector '{input}': expected an integer between 1 and {FLEET_SIZE}")]
pub struct SelectorError {
    pub input: String,
}

impl InstanceId {
    /// Validate a raw instance number.
    pub fn new(n: u8) -> Result<Self, SelectorError> {
        if (1..=FLEET_SIZE).contains(&n) {
            Ok(Self(n))
        } else {
            Err(SelectorError {
                input: n.to_string(),
            })
        }
    }

    /// Parse a selector argument (`"1"`..`"4"`).
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        input
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|n| Self::new(n).ok())
            .ok_or_else(|| SelectorError {
                input: input.to_string(),
            })
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The full roster, in order.
    pub fn all() -> impl Iterator<Item = InstanceId> {
        (1..=FLEET_SIZE).map(InstanceId)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named subset of the roster activated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Instances 1-2
    Base,
    /// The whole roster
    Extra,
}

impl Profile {
    pub fn instances(self) -> Vec<InstanceId> {
        let count = match self {
            Profile::Base => BASE_PROFILE_SIZE,
            Profile::Extra => FLEET_SIZE,
        };
        (1..=count).map(InstanceId).collect()
    }
}

/// Container name for an instance, e.g. `runner-fleet-3`
pub fn container_name(id: InstanceId) -> String {
    format!("{NAME_PREFIX}-{}", id.get())
}

/// Work volume name for an instance
pub fn work_volume_name(id: InstanceId) -> String {
    format!("{NAME_PREFIX}-work-{}", id.get())
}

/// Runner display name for an instance, e.g. `buildhost-3`
pub fn runner_name(prefix: &str, id: InstanceId) -> String {
    format!("{prefix}-{}", id.get())
}

/// Resolve `up` service arguments against the roster.
///
/// Accepts container names (`runner-fleet-2`) or bare instance numbers.
pub fn resolve_services(services: &[String]) -> Result<Vec<InstanceId>, SelectorError> {
    services
        .iter()
        .map(|raw| {
            let bare = raw
                .strip_prefix(NAME_PREFIX)
                .and_then(|rest| rest.strip_prefix('-'))
                .unwrap_or(raw);
            InstanceId::parse(bare).map_err(|_| SelectorError { input: raw.clone() })
        })
        .collect()
}

/// What [`up_instance`] found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpOutcome {
    /// Container was created and started
    Created,
    /// Container existed stopped and was started
    Started,
    /// Nothing to do
    AlreadyRunning,
}

/// Bring one instance up: ensure its work volume, create the container if
/// missing, start it if stopped.
pub async fn up_instance(
    client: &DockerClient,
    config: &FleetConfig,
    id: InstanceId,
) -> Result<UpOutcome, DockerError> {
    let name = container_name(id);
    let volume = work_volume_name(id);

    volume::ensure_volume_exists(client, &volume).await?;

    let created = if container::container_exists(client, &name).await? {
        false
    } else {
        let runner = runner_name(&config.runner_name_prefix, id);
        container::create_runner_container(client, &name, &runner, id.get(), &volume, config)
            .await?;
        true
    };

    if container::container_is_running(client, &name).await? {
        debug!("Instance {} already running", id);
        return Ok(UpOutcome::AlreadyRunning);
    }

    container::start_container(client, &name).await?;
    Ok(if created {
        UpOutcome::Created
    } else {
        UpOutcome::Started
    })
}

/// Stop every running fleet container gracefully. Returns how many were
/// actually stopped.
pub async fn down_fleet(client: &DockerClient) -> Result<usize, DockerError> {
    let mut stopped = 0;
    for id in InstanceId::all() {
        let name = container_name(id);
        if container::container_is_running(client, &name).await? {
            container::stop_container(client, &name, STOP_TIMEOUT_SECS).await?;
            stopped += 1;
        }
    }
    Ok(stopped)
}

/// Restart one instance: graceful stop (when running) then start.
///
/// The container must already exist; restarting an instance that was never
/// brought up is an error with a hint toward `up`.
pub async fn restart_instance(client: &DockerClient, id: InstanceId) -> Result<(), DockerError> {
    let name = container_name(id);

    if !container::container_exists(client, &name).await? {
        return Err(DockerError::Container(format!(
            "Container '{name}' does not exist. Run 'runner-fleet up' first."
        )));
    }

    if container::container_is_running(client, &name).await? {
        container::stop_container(client, &name, STOP_TIMEOUT_SECS).await?;
    }
    container::start_container(client, &name).await
}

/// Status row for one roster slot.
#[derive(Debug, Clone)]
pub struct InstanceStatus {
    pub id: InstanceId,
    pub name: String,
    /// `None` when the container does not exist
    pub state: Option<ContainerState>,
}

/// Inspect the whole roster.
pub async fn fleet_status(client: &DockerClient) -> Result<Vec<InstanceStatus>, DockerError> {
    let mut rows = Vec::with_capacity(FLEET_SIZE as usize);
    for id in InstanceId::all() {
        let name = container_name(id);
        let state = container::container_state(client, &name).await?;
        rows.push(InstanceStatus { id, name, state });
    }
    Ok(rows)
}

/// What [`prune_fleet`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneSummary {
    pub containers: usize,
    pub images: usize,
    pub volumes: usize,
}

/// Tear the fleet down: stop and remove every container, remove the runner
/// image, and optionally the work volumes.
pub async fn prune_fleet(
    client: &DockerClient,
    remove_volumes: bool,
) -> Result<PruneSummary, DockerError> {
    let mut summary = PruneSummary::default();

    for id in InstanceId::all() {
        let name = container_name(id);
        if !container::container_exists(client, &name).await? {
            continue;
        }
        if container::container_is_running(client, &name).await? {
            container::stop_container(client, &name, STOP_TIMEOUT_SECS).await?;
        }
        container::remove_container(client, &name, false).await?;
        summary.containers += 1;
    }

    summary.images = super::image::remove_fleet_images(client).await?;

    if remove_volumes {
        for id in InstanceId::all() {
            if volume::remove_volume(client, &work_volume_name(id)).await? {
                summary.volumes += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_accepts_roster_range() {
        for raw in ["1", "2", "3", "4"] {
            assert!(InstanceId::parse(raw).is_ok(), "selector {raw} should parse");
        }
    }

    #[test]
    fn selector_rejects_out_of_range() {
        for raw in ["0", "5", "abc", "", "-1", "1.5"] {
            assert!(
                InstanceId::parse(raw).is_err(),
                "selector {raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn selector_error_reports_input() {
        let err = InstanceId::parse("5").unwrap_err();
        assert!(err.to_string().contains("'5'"));
        assert!(err.to_string().contains("between 1 and 4"));
    }

    #[test]
    fn base_profile_is_first_two() {
        let ids: Vec<u8> = Profile::Base.instances().iter().map(|i| i.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn extra_profile_is_whole_roster() {
        let ids: Vec<u8> = Profile::Extra.instances().iter().map(|i| i.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn names_are_derived_from_instance() {
        let id = InstanceId::new(3).unwrap();
        assert_eq!(container_name(id), "runner-fleet-3");
        assert_eq!(work_volume_name(id), "runner-fleet-work-3");
        assert_eq!(runner_name("buildhost", id), "buildhost-3");
    }

    #[test]
    fn resolve_services_accepts_names_and_numbers() {
        let ids = resolve_services(&[
            "runner-fleet-1".to_string(),
            "3".to_string(),
        ])
        .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].get(), 1);
        assert_eq!(ids[1].get(), 3);
    }

    #[test]
    fn resolve_services_rejects_unknown_names() {
        let err = resolve_services(&["runner-fleet-9".to_string()]).unwrap_err();
        assert_eq!(err.input, "runner-fleet-9");

        assert!(resolve_services(&["web".to_string()]).is_err());
    }
}
