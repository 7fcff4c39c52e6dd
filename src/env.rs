//! Environment constants and path utilities for mcpup.
//!
//! This module centralizes the workspace file-name contract shared with the
//! generation API and the config file locations, making them easier to
//! maintain and modify.

/// Root directory that holds one subdirectory per generated server
pub const SERVERS_DIR_NAME: &str = "servers";

/// Main application directory name (hidden directory like .git, .vscode)
pub const MCPUP_DIR_NAME: &str = ".mcpup";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable holding the generation API key
pub const API_KEY_ENV_VAR: &str = "MCPUP_API_KEY";

/// Environment variable overriding the generation API base URL
pub const API_URL_ENV_VAR: &str = "MCPUP_API_URL";

/// Default generation API base URL
pub const DEFAULT_API_URL: &str = "https://api.automcp.app";

/// Workspace file names written for each generated server.
///
/// These names are a contract with the generation API: the artifacts it
/// returns are written under exactly these names, and the Dockerfile it
/// produces expects its siblings to exist.
pub mod files {
    /// Generated server source file name
    pub const SERVER_SOURCE: &str = "server.py";

    /// Image build descriptor file name
    pub const BUILD_DESCRIPTOR: &str = "Dockerfile";

    /// Dependency manifest file name
    pub const DEPENDENCY_MANIFEST: &str = "requirements.txt";

    /// Persisted configuration values for the local (non-container) run path
    pub const ENV_FILE: &str = ".env";
}

use std::path::{Path, PathBuf};

/// Build the servers root path from a base directory
pub fn servers_dir_path(base: &Path) -> PathBuf {
    base.join(SERVERS_DIR_NAME)
}

/// Build a specific workspace directory path
pub fn workspace_dir_path(servers_dir: &Path, name: &str) -> PathBuf {
    servers_dir.join(name)
}

/// Build the env file path inside a workspace
pub fn env_file_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join(files::ENV_FILE)
}

/// Build config file path in the user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    home_dir.join(MCPUP_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Build local config file path in the current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(MCPUP_DIR_NAME).join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_path_construction() {
        let base = Path::new("/test/project");

        assert_eq!(servers_dir_path(base), Path::new("/test/project/servers"));

        let servers = servers_dir_path(base);
        assert_eq!(
            workspace_dir_path(&servers, "demo"),
            Path::new("/test/project/servers/demo")
        );

        assert_eq!(
            env_file_path(&workspace_dir_path(&servers, "demo")),
            Path::new("/test/project/servers/demo/.env")
        );
    }

    #[test]
    fn test_config_paths() {
        let home_dir = Path::new("/home/user");
        let current_dir = Path::new("/current/project");

        assert_eq!(
            user_config_file_path(home_dir),
            Path::new("/home/user/.mcpup/config.toml")
        );

        assert_eq!(
            local_config_file_path(current_dir),
            Path::new("/current/project/.mcpup/config.toml")
        );
    }
}
