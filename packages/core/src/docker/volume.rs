//! Work volume management
//!
//! Each instance gets a named volume for the runner work directory so job
//! workspaces survive container recreation.

use super::container::MANAGED_LABEL;
use super::{DockerClient, DockerError};
use bollard::models::VolumeCreateRequest;
use std::collections::HashMap;
use tracing::debug;

/// Ensure a work volume exists.
///
/// `create_volume` is idempotent: it returns the existing volume when one
/// with the same name is already present.
pub async fn ensure_volume_exists(client: &DockerClient, name: &str) -> Result<(), DockerError> {
    debug!("Ensuring volume exists: {}", name);

    let options = VolumeCreateRequest {
        name: Some(name.to_string()),
        driver: Some("local".to_string()),
        driver_opts: Some(HashMap::new()),
        labels: Some(HashMap::from([(
            MANAGED_LABEL.to_string(),
            "true".to_string(),
        )])),
        cluster_volume_spec: None,
    };

    client
        .inner()
        .create_volume(options)
        .await
        .map_err(|e| DockerError::Volume(format!("Failed to create volume {name}: {e}")))?;

    Ok(())
}

/// Remove a volume. A missing volume is not an error.
pub async fn remove_volume(client: &DockerClient, name: &str) -> Result<bool, DockerError> {
    debug!("Removing volume: {}", name);

    match client
        .inner()
        .remove_volume(name, None::<bollard::query_parameters::RemoveVolumeOptions>)
        .await
    {
        Ok(()) => Ok(true),
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        }) => Ok(false),
        Err(e) => Err(DockerError::Volume(format!(
            "Failed to remove volume {name}: {e}"
        ))),
    }
}
