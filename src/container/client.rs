//! Docker/Podman client wrapper.
//!
//! Provides a simplified interface to the bollard Docker API with automatic
//! connection handling and a running-container query keyed by name.

use crate::container::{ProvisionError, Result};
use bollard::Docker;
use std::sync::Arc;
use tracing::{debug, info};

/// Docker/Podman API client wrapper.
///
/// Manages connection to the Docker or Podman daemon with automatic fallback
/// between sockets.
#[derive(Clone)]
pub struct RuntimeClient {
    docker: Arc<Docker>,
}

impl RuntimeClient {
    /// Create a new runtime client.
    ///
    /// Attempts to connect to Docker first, then falls back to Podman
    /// sockets, and verifies the connection with a ping.
    ///
    /// # Errors
    ///
    /// Returns error if neither Docker nor Podman are reachable.
    pub async fn new() -> Result<Self> {
        let docker = Self::connect().await?;

        let client = Self {
            docker: Arc::new(docker),
        };
        client.ping().await?;

        Ok(client)
    }

    /// Connect to the Docker or Podman daemon.
    ///
    /// Tries multiple connection strategies in order:
    /// 1. Local defaults (Unix socket or Windows named pipe)
    /// 2. Rootless Podman socket
    /// 3. System Podman socket
    async fn connect() -> Result<Docker> {
        debug!("Attempting to connect to container runtime...");

        match Docker::connect_with_local_defaults() {
            Ok(docker) => {
                info!("Connected to container runtime via local defaults");
                return Ok(docker);
            }
            Err(e) => {
                debug!("Local defaults failed: {}", e);
            }
        }

        #[cfg(unix)]
        {
            if let Ok(home) = std::env::var("HOME") {
                let podman_socket = format!("unix://{}/run/podman/podman.sock", home);
                debug!("Trying Podman socket: {}", podman_socket);

                match Docker::connect_with_socket(&podman_socket, 120, bollard::API_DEFAULT_VERSION)
                {
                    Ok(docker) => {
                        info!("Connected to Podman via rootless socket");
                        return Ok(docker);
                    }
                    Err(e) => {
                        debug!("Podman rootless socket failed: {}", e);
                    }
                }
            }

            let system_socket = "unix:///run/podman/podman.sock";
            debug!("Trying system Podman socket: {}", system_socket);

            match Docker::connect_with_socket(system_socket, 120, bollard::API_DEFAULT_VERSION) {
                Ok(docker) => {
                    info!("Connected to Podman via system socket");
                    return Ok(docker);
                }
                Err(e) => {
                    debug!("Podman system socket failed: {}", e);
                }
            }
        }

        Err(ProvisionError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "failed to connect to Docker or Podman; ensure a container runtime is installed and running",
        )))
    }

    /// Ping the container runtime to verify connectivity.
    ///
    /// # Errors
    ///
    /// Returns error if the ping fails.
    pub async fn ping(&self) -> Result<()> {
        self.docker.ping().await?;
        debug!("Container runtime ping successful");
        Ok(())
    }

    /// Get the underlying Docker client.
    pub fn docker(&self) -> &Docker {
        &self.docker
    }

    /// Query for a running container by name.
    ///
    /// Returns the container ID if a container with this name exists and is
    /// in the running state; `None` if the container is absent or present
    /// but not running.
    ///
    /// # Errors
    ///
    /// Returns error if inspection fails for reasons other than not-found.
    pub async fn running_container_id(&self, name: &str) -> Result<Option<String>> {
        let inspect = match self
            .docker
            .inspect_container(
                name,
                None::<bollard::query_parameters::InspectContainerOptions>,
            )
            .await
        {
            Ok(inspect) => inspect,
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => return Ok(None),
            Err(e) => return Err(ProvisionError::Runtime(e)),
        };

        let running = inspect
            .state
            .as_ref()
            .and_then(|state| state.running)
            .unwrap_or(false);

        if running {
            Ok(inspect.id)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Docker/Podman to be running
    async fn test_client_connection() {
        let client = RuntimeClient::new().await.unwrap();
        client.ping().await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_absent_container_is_not_running() {
        let client = RuntimeClient::new().await.unwrap();
        let id = client
            .running_container_id("mcpup-does-not-exist")
            .await
            .unwrap();
        assert!(id.is_none());
    }
}
