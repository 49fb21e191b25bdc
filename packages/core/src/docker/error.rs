//! Docker-specific error types

/// Errors from Docker operations.
///
/// Connection failures are mapped onto dedicated variants so the CLI can
/// print exact remediation steps; everything else surfaces the underlying
/// engine message verbatim.
#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    /// The daemon did not answer on the socket
    #[error("Docker daemon is not responding")]
    NotRunning,

    /// The socket exists but access was denied
    #[error("permission denied accessing the Docker socket")]
    PermissionDenied,

    /// The socket path does not exist
    #[error("Docker socket not found")]
    SocketNotFound,

    /// Other connection-level failure
    #[error("cannot connect to Docker: {0}")]
    Connection(String),

    /// Container operation failed
    #[error("{0}")]
    Container(String),

    /// Image operation failed
    #[error("{0}")]
    Image(String),

    /// Image build failed
    #[error("image build failed: {0}")]
    Build(String),

    /// Volume operation failed
    #[error("{0}")]
    Volume(String),

    /// Any other engine API error, surfaced verbatim
    #[error(transparent)]
    Api(bollard::errors::Error),
}

impl From<bollard::errors::Error> for DockerError {
    fn from(e: bollard::errors::Error) -> Self {
        if let bollard::errors::Error::IOError { err } = &e {
            match err.kind() {
                std::io::ErrorKind::ConnectionRefused => return DockerError::NotRunning,
                std::io::ErrorKind::NotFound => return DockerError::SocketNotFound,
                std::io::ErrorKind::PermissionDenied => return DockerError::PermissionDenied,
                _ => {}
            }
        }
        DockerError::Api(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error(kind: std::io::ErrorKind) -> bollard::errors::Error {
        bollard::errors::Error::IOError {
            err: std::io::Error::new(kind, "test"),
        }
    }

    #[test]
    fn connection_refused_maps_to_not_running() {
        let err = DockerError::from(io_error(std::io::ErrorKind::ConnectionRefused));
        assert!(matches!(err, DockerError::NotRunning));
    }

    #[test]
    fn missing_socket_maps_to_socket_not_found() {
        let err = DockerError::from(io_error(std::io::ErrorKind::NotFound));
        assert!(matches!(err, DockerError::SocketNotFound));
    }

    #[test]
    fn permission_denied_maps_to_permission_denied() {
        let err = DockerError::from(io_error(std::io::ErrorKind::PermissionDenied));
        assert!(matches!(err, DockerError::PermissionDenied));
    }

    #[test]
    fn other_io_errors_surface_as_api() {
        let err = DockerError::from(io_error(std::io::ErrorKind::TimedOut));
        assert!(matches!(err, DockerError::Api(_)));
    }
}
