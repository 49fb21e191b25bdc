//! Docker client wrapper with connection handling

use super::DockerError;
use bollard::Docker;
use tracing::debug;

/// Thin wrapper over the bollard client.
///
/// Construction only builds the transport; [`verify_connection`] performs
/// the first round trip and is where daemon-down errors actually surface.
///
/// [`verify_connection`]: DockerClient::verify_connection
pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    /// Connect using the platform defaults (UNIX socket on Linux).
    pub fn new() -> Result<Self, DockerError> {
        let docker = Docker::connect_with_local_defaults().map_err(DockerError::from)?;
        Ok(Self { docker })
    }

    /// Access the underlying bollard client.
    pub fn inner(&self) -> &Docker {
        &self.docker
    }

    /// Ping the daemon to confirm it is reachable.
    pub async fn verify_connection(&self) -> Result<(), DockerError> {
        self.docker.ping().await.map_err(DockerError::from)?;
        debug!("Docker daemon reachable");
        Ok(())
    }
}
