//! Workspace directory management.
//!
//! Each provisioning attempt owns one directory under the servers root,
//! holding the generated server source, the Dockerfile, the dependency
//! manifest, and optionally a persisted `.env` file. The directory exists
//! exactly as long as the attempt has neither succeeded permanently nor been
//! rolled back.
//!
//! Rollback is scoped, not global: [`WorkspaceManager::rollback_guard`]
//! returns a handle that removes the directory when dropped unless it has
//! been disarmed. Holding the guard across the pipeline means a failure,
//! an early return, or a cancelled future all clean up the same way.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Workspace management errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// Workspace name is empty or not filesystem-safe
    #[error(
        "invalid workspace name {0:?}: names may only contain letters, numbers, hyphens, and underscores"
    )]
    InvalidName(String),

    /// Filesystem error while creating or writing the workspace
    #[error("workspace I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Handle to a materialized workspace directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    name: String,
    path: PathBuf,
}

impl Workspace {
    /// Get the workspace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the workspace directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Manages workspace directories under a servers root.
///
/// All state lives on the filesystem, addressed by workspace name; managers
/// are cheap to clone and safe to use for distinct names concurrently.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    /// Create a manager rooted at the given servers directory.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Get the servers root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the directory path for a workspace name.
    pub fn workspace_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the workspace directory and write the given files into it.
    ///
    /// Creation is idempotent: a pre-existing directory is reused. Partial
    /// writes from a failed call are not cleaned up here; rollback is the
    /// caller's responsibility via [`destroy`](Self::destroy) or a
    /// [`WorkspaceGuard`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::InvalidName`] for unsafe names and
    /// [`WorkspaceError::Io`] if directory creation or any write fails.
    pub fn create(&self, name: &str, files: &HashMap<String, String>) -> Result<Workspace> {
        validate_name(name)?;

        let path = self.workspace_path(name);
        fs::create_dir_all(&path)?;
        debug!("Created workspace directory: {}", path.display());

        for (file_name, content) in files {
            let file_path = path.join(file_name);
            fs::write(&file_path, content)?;
            debug!("Wrote workspace file: {}", file_path.display());
        }

        info!("Workspace '{}' materialized with {} files", name, files.len());

        Ok(Workspace {
            name: name.to_string(),
            path,
        })
    }

    /// Persist configuration values as a `.env` file in the workspace.
    ///
    /// One `KEY=VALUE` line per entry, keys sorted for stable output. Used
    /// only for the non-containerized run path; containers get their values
    /// injected as environment variables instead.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Io`] if the write fails.
    pub fn write_config(&self, name: &str, values: &HashMap<String, String>) -> Result<()> {
        validate_name(name)?;

        let path = self.workspace_path(name);
        fs::create_dir_all(&path)?;

        let mut entries: Vec<_> = values.iter().collect();
        entries.sort_by_key(|(key, _)| key.as_str());

        let content = entries
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("\n");

        fs::write(crate::env::env_file_path(&path), content)?;
        info!("Wrote env file for workspace '{}' ({} entries)", name, values.len());
        Ok(())
    }

    /// Recursively remove the workspace directory.
    ///
    /// Idempotent: destroying a workspace that does not exist is a no-op.
    /// This is a cleanup path, so errors are logged and swallowed rather
    /// than propagated; they must never mask the failure that triggered the
    /// rollback.
    pub fn destroy(&self, name: &str) {
        let path = self.workspace_path(name);

        if !path.exists() {
            debug!("Workspace '{}' already gone, nothing to destroy", name);
            return;
        }

        match fs::remove_dir_all(&path) {
            Ok(()) => info!("Destroyed workspace '{}'", name),
            Err(e) => warn!("Failed to destroy workspace '{}': {}", name, e),
        }
    }

    /// Create a rollback guard for a workspace name.
    ///
    /// The guard destroys the workspace when dropped unless
    /// [`disarm`](WorkspaceGuard::disarm) is called first. Take the guard
    /// before creating the workspace so a failure at any later pipeline
    /// stage rolls back the directory.
    pub fn rollback_guard(&self, name: &str) -> WorkspaceGuard {
        WorkspaceGuard {
            manager: self.clone(),
            name: name.to_string(),
            armed: true,
        }
    }
}

/// Scoped rollback handle for one provisioning attempt.
///
/// Removes the workspace directory on drop while armed. Each attempt carries
/// its own guard, so concurrent attempts on distinct names never share a
/// rollback target.
#[derive(Debug)]
pub struct WorkspaceGuard {
    manager: WorkspaceManager,
    name: String,
    armed: bool,
}

impl WorkspaceGuard {
    /// Keep the workspace: the attempt succeeded.
    pub fn disarm(mut self) {
        self.armed = false;
    }

    /// Get the guarded workspace name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        if self.armed {
            debug!("Rolling back workspace '{}'", self.name);
            self.manager.destroy(&self.name);
        }
    }
}

/// Validate that a workspace name is non-empty and filesystem-safe.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(WorkspaceError::InvalidName(name.to_string()));
    }
    Ok(())
}
