//! # mcpup
//!
//! Turns REST API documentation into a runnable MCP server. A remote
//! generation API produces the server source, Dockerfile, and dependency
//! manifest; mcpup materializes those artifacts into a workspace directory,
//! builds a Docker image from it, starts a named container with the user's
//! configuration injected, and verifies the container actually comes up
//! before declaring success. Any failure rolls back cleanly: no orphaned
//! containers, no half-written workspace directories.
//!
//! ## Architecture Overview
//!
//! - **[`workspace`]**: on-disk workspace management, one directory per
//!   provisioning attempt, with scoped rollback
//! - **[`container`]**: image build and container lifecycle (build, start,
//!   liveness confirmation, diagnostics, teardown)
//! - **[`generate`]**: client for the remote server-generation API
//! - **[`clients`]**: connection-config snippets for MCP clients
//! - **[`cli`]**: argument parsing, config discovery, and prompting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use mcpup::{LivenessPolicy, Provisioner, WorkspaceManager, container_name_for};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = WorkspaceManager::new("servers");
//!     let files = HashMap::from([(
//!         "Dockerfile".to_string(),
//!         "FROM alpine:3.20\nCMD [\"sleep\", \"300\"]\n".to_string(),
//!     )]);
//!
//!     let guard = manager.rollback_guard("demo");
//!     let workspace = manager.create("demo", &files)?;
//!
//!     let provisioner = Provisioner::new(LivenessPolicy::default()).await?;
//!     let server = provisioner
//!         .provision(&workspace, 4000, &container_name_for("demo"), &HashMap::new())
//!         .await?;
//!
//!     guard.disarm();
//!     println!("running on port {}", server.port);
//!     Ok(())
//! }
//! ```

/// Workspace directory management.
///
/// Owns the on-disk working directory for one provisioning attempt:
/// creation, artifact writes, env-file persistence, and rollback.
pub mod workspace;

/// Container image build and lifecycle control.
///
/// Builds a runtime image from a workspace, starts a named container with
/// injected configuration, confirms liveness within a bounded window, and
/// tears down failed instances.
pub mod container;

/// Remote server-generation API client.
pub mod generate;

/// Connection-config snippets for MCP clients (Cursor, Claude Desktop, Windsurf).
pub mod clients;

/// Environment constants and path utilities.
///
/// Centralizes the workspace file-name contract and config file locations
/// used throughout the application.
pub mod env;

// CLI module for command-line interface
pub mod cli;

// Re-export main workspace types
pub use workspace::{Workspace, WorkspaceError, WorkspaceGuard, WorkspaceManager};

// Re-export main container types
pub use container::{
    LivenessPolicy, ProvisionError, ProvisionedServer, Provisioner, RuntimeClient,
    container_name_for, image_tag_for,
};

// Re-export generation API types
pub use generate::{GeneratedServer, GenerateError, GenerationClient, PagesData};

// Re-export client snippet types
pub use clients::ConnectedClient;
