//! Container image building.
//!
//! Builds a runtime image from a workspace directory using the Docker CLI.
//! The CLI is invoked with argument arrays, never shell-concatenated
//! strings, so workspace names cannot inject into the command line and the
//! exit code and stderr are captured as a first-class contract.

use crate::container::{ProvisionError, Result};
use crate::workspace::Workspace;
use tokio::process::Command;
use tracing::{debug, info};

/// Derive the deterministic image tag for a workspace name.
pub fn image_tag_for(workspace_name: &str) -> String {
    format!("mcp-server-{}", workspace_name)
}

/// Build a runtime image from the workspace's Dockerfile.
///
/// The image is tagged deterministically from the workspace name so repeated
/// builds of the same workspace replace the previous image. Returns the tag.
///
/// # Errors
///
/// Returns [`ProvisionError::Io`] if the Docker CLI is missing or cannot be
/// spawned, and [`ProvisionError::Build`] with the captured stderr if the
/// build exits non-zero.
pub async fn build_image(workspace: &Workspace) -> Result<String> {
    which::which("docker").map_err(|_| {
        ProvisionError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "docker CLI not found in PATH",
        ))
    })?;

    let tag = image_tag_for(workspace.name());
    info!("Building image {} from {}", tag, workspace.path().display());

    let output = Command::new("docker")
        .arg("build")
        .arg("-t")
        .arg(&tag)
        .arg(workspace.path())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!("Image build for {} failed with {}", tag, output.status);
        return Err(ProvisionError::Build { stderr });
    }

    info!("Successfully built image: {}", tag);
    Ok(tag)
}
