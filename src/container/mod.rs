//! Container image build and lifecycle control.
//!
//! This module turns a materialized workspace into a running container:
//! build a runtime image from the workspace's Dockerfile, start a named
//! detached container with the caller's configuration injected as
//! environment variables, confirm the container is actually running within a
//! bounded liveness window, and tear down anything that failed.
//!
//! ## Architecture
//!
//! - [`client`]: Docker/Podman API client wrapper with connection management
//! - [`image`]: image builds from a workspace directory via the Docker CLI
//! - [`provisioner`]: the provisioning state machine and failure handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use mcpup::container::{LivenessPolicy, Provisioner, container_name_for};
//! use mcpup::workspace::WorkspaceManager;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = WorkspaceManager::new("servers");
//!     let workspace = manager.create("demo", &HashMap::new())?;
//!
//!     let provisioner = Provisioner::new(LivenessPolicy::default()).await?;
//!     let env = HashMap::from([("API_KEY".to_string(), "secret".to_string())]);
//!     let server = provisioner
//!         .provision(&workspace, 4000, &container_name_for("demo"), &env)
//!         .await?;
//!
//!     println!("up on port {}", server.port);
//!     Ok(())
//! }
//! ```

mod client;
mod image;
mod provisioner;

pub use client::RuntimeClient;
pub use image::{build_image, image_tag_for};
pub use provisioner::{
    LivenessPolicy, ProvisionedServer, Provisioner, container_name_for,
};

/// Provisioning errors.
///
/// All variants are terminal for a single provisioning attempt; nothing is
/// retried internally. Build and start failures carry the captured stderr of
/// the failing step; a liveness failure carries the failed container's
/// captured output.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Docker/Podman API or connection error
    #[error("Container runtime error: {0}")]
    Runtime(#[from] bollard::errors::Error),

    /// Filesystem error (workspace unreadable, build tool missing)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image build process exited non-zero
    #[error("Image build failed: {stderr}")]
    Build {
        /// Captured stderr of the build process
        stderr: String,
    },

    /// Container start command errored (name or port already in use, etc.)
    #[error("Container start failed: {stderr}")]
    Start {
        /// Diagnostic text from the runtime
        stderr: String,
    },

    /// Container was started but did not report running within the liveness window
    #[error("Container did not come up within the liveness window")]
    HealthCheck {
        /// Captured stdout of the failed container
        stdout: String,
        /// Captured stderr of the failed container
        stderr: String,
    },
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
