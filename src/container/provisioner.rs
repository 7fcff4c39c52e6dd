//! Container provisioning state machine.
//!
//! Drives one provisioning attempt through
//! `absent -> building-image -> starting -> {running | failed}`:
//! build the image, start a named detached container with the configuration
//! injected, then confirm liveness within a bounded window. On a liveness
//! failure the container's captured output is retrieved as diagnostics and
//! the container is force-removed, so no failed instance outlives the
//! attempt. Nothing is retried at this level; callers re-invoke with a fresh
//! name if they want retries.

use crate::container::{ProvisionError, Result, RuntimeClient, image};
use crate::workspace::Workspace;
use bollard::service::{HostConfig, PortBinding};
use futures::stream::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Derive the deterministic container name for a workspace name.
pub fn container_name_for(workspace_name: &str) -> String {
    format!("mcp-{}", workspace_name)
}

/// Liveness confirmation policy.
///
/// After the start command is issued, the provisioner waits `grace` for
/// process initialization, then polls the runtime up to `attempts` times for
/// a running container by name, doubling `initial_interval` between polls.
/// The defaults give roughly a ten second budget; tests inject near-zero
/// values.
#[derive(Debug, Clone)]
pub struct LivenessPolicy {
    /// Initial wait before the first poll
    pub grace: Duration,
    /// Maximum number of polls
    pub attempts: u32,
    /// Delay after the first unsuccessful poll, doubled after each retry
    pub initial_interval: Duration,
}

impl Default for LivenessPolicy {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(2),
            attempts: 5,
            initial_interval: Duration::from_millis(500),
        }
    }
}

impl LivenessPolicy {
    /// A single immediate poll with no waiting, for tests.
    pub fn immediate() -> Self {
        Self {
            grace: Duration::ZERO,
            attempts: 1,
            initial_interval: Duration::ZERO,
        }
    }
}

/// A successfully provisioned, running server container.
#[derive(Debug, Clone)]
pub struct ProvisionedServer {
    /// Container ID assigned by the runtime
    pub container_id: String,
    /// Container name the instance is addressable by
    pub container_name: String,
    /// Bound host port
    pub port: u16,
}

/// Container lifecycle controller.
///
/// Owns a runtime client and a liveness policy; holds no per-attempt state,
/// so one provisioner can serve concurrent attempts on distinct names.
pub struct Provisioner {
    client: RuntimeClient,
    policy: LivenessPolicy,
}

impl Provisioner {
    /// Create a provisioner with the given liveness policy.
    ///
    /// # Errors
    ///
    /// Returns error if connection to the container runtime fails.
    pub async fn new(policy: LivenessPolicy) -> Result<Self> {
        let client = RuntimeClient::new().await?;
        Ok(Self { client, policy })
    }

    /// Create a provisioner with an existing client.
    pub fn with_client(client: RuntimeClient, policy: LivenessPolicy) -> Self {
        Self { client, policy }
    }

    /// Get the runtime client.
    pub fn client(&self) -> &RuntimeClient {
        &self.client
    }

    /// Provision a server container from a workspace.
    ///
    /// Builds the image, starts a detached container named `container_name`
    /// bound to `port` with every `env` entry injected, and confirms the
    /// container is running within the liveness window.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::Build`]: the image build exited non-zero; no
    ///   container was ever created.
    /// - [`ProvisionError::Start`]: the runtime rejected container creation
    ///   or start (name/port conflict, bad image); no health check is
    ///   attempted and any created-but-unstarted container is removed.
    /// - [`ProvisionError::HealthCheck`]: the container started but was not
    ///   running at the end of the liveness window; its captured output is
    ///   returned and the container is force-removed.
    pub async fn provision(
        &self,
        workspace: &Workspace,
        port: u16,
        container_name: &str,
        env: &HashMap<String, String>,
    ) -> Result<ProvisionedServer> {
        let image_tag = image::build_image(workspace).await?;

        let container_id = self
            .start_container(&image_tag, container_name, port, env)
            .await?;
        debug!(
            "Started container {} ({})",
            container_name,
            container_id.get(..12).unwrap_or(&container_id)
        );

        if self.await_running(container_name).await {
            info!(
                "Container {} is running on port {}",
                container_name, port
            );
            return Ok(ProvisionedServer {
                container_id,
                container_name: container_name.to_string(),
                port,
            });
        }

        // Failed liveness: grab diagnostics before removing the instance.
        let (stdout, stderr) = self.capture_logs(container_name).await;
        if let Err(e) = self.remove_container(container_name).await {
            warn!("Failed to remove container {}: {}", container_name, e);
        }

        Err(ProvisionError::HealthCheck { stdout, stderr })
    }

    /// Create and start a detached container.
    ///
    /// Runtime errors at either step surface as [`ProvisionError::Start`].
    /// A container that was created but failed to start is removed so the
    /// attempt leaves nothing behind.
    async fn start_container(
        &self,
        image_tag: &str,
        container_name: &str,
        port: u16,
        env: &HashMap<String, String>,
    ) -> Result<String> {
        let port_key = format!("{}/tcp", port);

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            port_key.clone(),
            Some(vec![PortBinding {
                host_ip: Some("0.0.0.0".to_string()),
                host_port: Some(port.to_string()),
            }]),
        );

        let mut exposed_ports = HashMap::new();
        exposed_ports.insert(port_key, HashMap::new());

        let env_lines: Vec<String> = env
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();

        let labels = HashMap::from([
            ("mcpup.managed".to_string(), "true".to_string()),
            ("mcpup.image".to_string(), image_tag.to_string()),
        ]);

        let options = bollard::container::CreateContainerOptions {
            name: container_name,
            ..Default::default()
        };

        let config = bollard::container::Config {
            image: Some(image_tag.to_string()),
            env: Some(env_lines),
            labels: Some(labels),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        debug!("Creating container: {}", container_name);
        let response = self
            .client
            .docker()
            .create_container(Some(options), config)
            .await
            .map_err(|e| ProvisionError::Start {
                stderr: e.to_string(),
            })?;

        if let Err(e) = self
            .client
            .docker()
            .start_container(
                container_name,
                None::<bollard::container::StartContainerOptions<String>>,
            )
            .await
        {
            // Created but never started; remove it so nothing lingers.
            if let Err(remove_err) = self.remove_container(container_name).await {
                warn!(
                    "Failed to remove unstarted container {}: {}",
                    container_name, remove_err
                );
            }
            return Err(ProvisionError::Start {
                stderr: e.to_string(),
            });
        }

        Ok(response.id)
    }

    /// Poll the runtime for a running container within the liveness window.
    ///
    /// Poll errors are logged and treated as not-running so the failure path
    /// still captures diagnostics and removes the instance.
    async fn await_running(&self, container_name: &str) -> bool {
        tokio::time::sleep(self.policy.grace).await;

        let mut interval = self.policy.initial_interval;
        for attempt in 1..=self.policy.attempts {
            match self.client.running_container_id(container_name).await {
                Ok(Some(_)) => return true,
                Ok(None) => {
                    debug!(
                        "Liveness poll {}/{} for {}: not running",
                        attempt, self.policy.attempts, container_name
                    );
                }
                Err(e) => {
                    warn!(
                        "Liveness poll {}/{} for {} errored: {}",
                        attempt, self.policy.attempts, container_name, e
                    );
                }
            }

            if attempt < self.policy.attempts {
                tokio::time::sleep(interval).await;
                interval *= 2;
            }
        }

        false
    }

    /// Retrieve a container's captured stdout and stderr.
    ///
    /// This is a diagnostics path: errors are logged and yield empty
    /// streams rather than masking the failure being reported.
    async fn capture_logs(&self, container_name: &str) -> (String, String) {
        let mut stream = self.client.docker().logs(
            container_name,
            Some(bollard::container::LogsOptions {
                stdout: true,
                stderr: true,
                tail: "all".to_string(),
                ..Default::default()
            }),
        );

        let mut stdout = String::new();
        let mut stderr = String::new();

        while let Some(result) = stream.next().await {
            match result {
                Ok(bollard::container::LogOutput::StdOut { message }) => {
                    stdout.push_str(&String::from_utf8_lossy(&message));
                }
                Ok(bollard::container::LogOutput::StdErr { message }) => {
                    stderr.push_str(&String::from_utf8_lossy(&message));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Failed to read logs for {}: {}", container_name, e);
                    break;
                }
            }
        }

        (stdout, stderr)
    }

    /// Force-remove a container by name.
    ///
    /// Idempotent: removing a container that is already gone is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns error if removal fails for reasons other than not-found.
    pub async fn remove_container(&self, container_name: &str) -> Result<()> {
        debug!("Removing container: {}", container_name);

        match self
            .client
            .docker()
            .remove_container(
                container_name,
                Some(bollard::container::RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                }),
            )
            .await
        {
            Ok(()) => {
                info!("Removed container: {}", container_name);
                Ok(())
            }
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                debug!("Container {} already gone", container_name);
                Ok(())
            }
            Err(e) => Err(ProvisionError::Runtime(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_name_derivation() {
        assert_eq!(container_name_for("demo"), "mcp-demo");
        assert_ne!(container_name_for("alpha"), container_name_for("beta"));
    }

    #[test]
    fn test_default_policy_budget() {
        let policy = LivenessPolicy::default();
        assert_eq!(policy.grace, Duration::from_secs(2));
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.initial_interval, Duration::from_millis(500));

        // grace + 500ms + 1s + 2s + 4s stays within ~10s
        let backoff: Duration = (0..policy.attempts - 1)
            .map(|i| policy.initial_interval * 2u32.pow(i))
            .sum();
        assert!(policy.grace + backoff <= Duration::from_secs(10));
    }

    #[test]
    fn test_immediate_policy_has_no_delays() {
        let policy = LivenessPolicy::immediate();
        assert_eq!(policy.grace, Duration::ZERO);
        assert_eq!(policy.attempts, 1);
        assert_eq!(policy.initial_interval, Duration::ZERO);
    }

    #[test]
    fn test_build_error_carries_stderr() {
        let err = ProvisionError::Build {
            stderr: "unknown instruction: FORM".to_string(),
        };
        assert!(err.to_string().contains("unknown instruction: FORM"));
    }

    #[test]
    fn test_health_check_error_display() {
        let err = ProvisionError::HealthCheck {
            stdout: "booting".to_string(),
            stderr: "panic".to_string(),
        };
        assert!(err.to_string().contains("liveness window"));
    }
}
