//! Container lifecycle for runner instances
//!
//! Create, start, stop, remove, and inspect the per-instance containers.
//! Fleet-level orchestration (which instances, in what order) lives in
//! [`super::fleet`].

use super::dockerfile::{IMAGE_NAME, IMAGE_TAG_DEFAULT};
use super::limits::{parse_cpu_limit, parse_memory_limit};
use super::{DockerClient, DockerError};
use crate::config::FleetConfig;
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    CreateContainerOptions, RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::service::{
    HostConfig, Mount, MountTypeEnum, RestartPolicy, RestartPolicyNameEnum,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Label marking containers owned by this tool
pub const MANAGED_LABEL: &str = "io.runner-fleet.managed";

/// Label carrying the instance number
pub const INSTANCE_LABEL: &str = "io.runner-fleet.instance";

/// Mount point of the work volume inside the container
pub const WORKDIR_MOUNT: &str = "/runner/_work";

/// Create a runner container for one fleet instance.
///
/// Does not start the container. The runner configuration is injected as
/// container environment; resource limits come from the fleet config and
/// were validated at load time. Returns the container ID.
pub async fn create_runner_container(
    client: &DockerClient,
    name: &str,
    runner_name: &str,
    instance: u8,
    work_volume: &str,
    config: &FleetConfig,
) -> Result<String, DockerError> {
    let image = format!("{IMAGE_NAME}:{IMAGE_TAG_DEFAULT}");
    debug!("Creating container {} from image {}", name, image);

    let memory = parse_memory_limit(&config.memory_limit)
        .map_err(DockerError::Container)?;
    let nano_cpus = parse_cpu_limit(&config.cpu_limit).map_err(DockerError::Container)?;

    let mounts = vec![Mount {
        target: Some(WORKDIR_MOUNT.to_string()),
        source: Some(work_volume.to_string()),
        typ: Some(MountTypeEnum::VOLUME),
        read_only: Some(false),
        ..Default::default()
    }];

    let host_config = HostConfig {
        mounts: Some(mounts),
        // Jobs drive the host engine through the socket; the GID grant is
        // what makes the socket writable for the unprivileged runner user.
        binds: Some(vec![
            "/var/run/docker.sock:/var/run/docker.sock".to_string(),
        ]),
        group_add: Some(vec![config.docker_gid.to_string()]),
        memory: Some(memory),
        nano_cpus: Some(nano_cpus),
        restart_policy: Some(RestartPolicy {
            name: Some(RestartPolicyNameEnum::UNLESS_STOPPED),
            maximum_retry_count: None,
        }),
        auto_remove: Some(false),
        ..Default::default()
    };

    let env = vec![
        format!("GITHUB_URL={}", config.github_url),
        format!("GITHUB_ORG_TOKEN={}", config.token),
        format!("RUNNER_NAME={runner_name}"),
        format!("RUNNER_WORKDIR={}", config.runner_workdir),
        format!("RUNNER_LABELS={}", config.runner_labels),
    ];

    let labels = HashMap::from([
        (MANAGED_LABEL.to_string(), "true".to_string()),
        (INSTANCE_LABEL.to_string(), instance.to_string()),
    ]);

    let body = ContainerCreateBody {
        image: Some(image),
        hostname: Some(runner_name.to_string()),
        env: Some(env),
        labels: Some(labels),
        host_config: Some(host_config),
        ..Default::default()
    };

    let options = CreateContainerOptions {
        name: Some(name.to_string()),
        platform: String::new(),
    };

    let response = client
        .inner()
        .create_container(Some(options), body)
        .await
        .map_err(|e| DockerError::Container(format!("Failed to create container {name}: {e}")))?;

    debug!("Container {} created with ID {}", name, response.id);
    Ok(response.id)
}

/// Start an existing container
pub async fn start_container(client: &DockerClient, name: &str) -> Result<(), DockerError> {
    debug!("Starting container: {}", name);

    client
        .inner()
        .start_container(name, None::<StartContainerOptions>)
        .await
        .map_err(|e| DockerError::Container(format!("Failed to start container {name}: {e}")))?;

    Ok(())
}

/// Stop a running container, waiting `timeout_secs` before force kill.
pub async fn stop_container(
    client: &DockerClient,
    name: &str,
    timeout_secs: i64,
) -> Result<(), DockerError> {
    debug!("Stopping container {} with {}s timeout", name, timeout_secs);

    let options = StopContainerOptions {
        signal: None,
        t: Some(timeout_secs as i32),
    };

    match client.inner().stop_container(name, Some(options)).await {
        Ok(()) => Ok(()),
        // 304: already stopped, which is the state we wanted
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 304, ..
        }) => {
            debug!("Container {} was already stopped", name);
            Ok(())
        }
        Err(e) => Err(DockerError::Container(format!(
            "Failed to stop container {name}: {e}"
        ))),
    }
}

/// Remove a container.
pub async fn remove_container(
    client: &DockerClient,
    name: &str,
    force: bool,
) -> Result<(), DockerError> {
    debug!("Removing container {} (force={})", name, force);

    let options = RemoveContainerOptions {
        force,
        v: false,
        link: false,
    };

    client
        .inner()
        .remove_container(name, Some(options))
        .await
        .map_err(|e| DockerError::Container(format!("Failed to remove container {name}: {e}")))?;

    Ok(())
}

/// Check if a container exists
pub async fn container_exists(client: &DockerClient, name: &str) -> Result<bool, DockerError> {
    match client.inner().inspect_container(name, None).await {
        Ok(_) => Ok(true),
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        }) => Ok(false),
        Err(e) => Err(DockerError::Container(format!(
            "Failed to inspect container {name}: {e}"
        ))),
    }
}

/// Check if a container is running
pub async fn container_is_running(client: &DockerClient, name: &str) -> Result<bool, DockerError> {
    match client.inner().inspect_container(name, None).await {
        Ok(info) => Ok(info.state.and_then(|s| s.running).unwrap_or(false)),
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        }) => Ok(false),
        Err(e) => Err(DockerError::Container(format!(
            "Failed to inspect container {name}: {e}"
        ))),
    }
}

/// Observed state of one container.
#[derive(Debug, Clone)]
pub struct ContainerState {
    /// Engine state string (`running`, `exited`, ...)
    pub state: String,
    /// When the container was last started, if it ever ran
    pub started_at: Option<DateTime<Utc>>,
}

/// Get a container's state, or `None` when it does not exist.
pub async fn container_state(
    client: &DockerClient,
    name: &str,
) -> Result<Option<ContainerState>, DockerError> {
    match client.inner().inspect_container(name, None).await {
        Ok(info) => {
            let state = info.state.as_ref();
            let status = state
                .and_then(|s| s.status)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let started_at = state
                .and_then(|s| s.started_at.as_deref())
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|dt| dt.with_timezone(&Utc))
                // the engine reports the zero time for never-started containers
                .filter(|dt| dt.timestamp() > 0);
            Ok(Some(ContainerState {
                state: status,
                started_at,
            }))
        }
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        }) => Ok(None),
        Err(e) => Err(DockerError::Container(format!(
            "Failed to inspect container {name}: {e}"
        ))),
    }
}
