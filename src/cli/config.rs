//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./mcpup.toml or ./.mcpup/config.toml
//! 2. User config: ~/.mcpup/config.toml
//! 3. System config: /etc/mcpup/config.toml
//! 4. Built-in defaults
//!
//! Environment variables (`MCPUP_API_KEY`, `MCPUP_API_URL`) override file
//! values; the API key is never written to logs.

use crate::env;
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// User-editable configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Generation API base URL
    pub api_url: Option<String>,
    /// Generation API key
    pub api_key: Option<String>,
    /// Directory that holds generated server workspaces
    pub servers_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: CliConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides and defaults.
    pub fn resolve(self) -> ResolvedConfig {
        let api_url = std_env::var(env::API_URL_ENV_VAR)
            .ok()
            .or(self.api_url)
            .unwrap_or_else(|| env::DEFAULT_API_URL.to_string());

        let api_key = std_env::var(env::API_KEY_ENV_VAR).ok().or(self.api_key);

        let servers_dir = self
            .servers_dir
            .unwrap_or_else(|| PathBuf::from(env::SERVERS_DIR_NAME));

        ResolvedConfig {
            api_url,
            api_key,
            servers_dir,
        }
    }
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Generation API base URL
    pub api_url: String,
    /// Generation API key, if configured anywhere
    pub api_key: Option<String>,
    /// Directory that holds generated server workspaces
    pub servers_dir: PathBuf,
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Discover and load configuration using the hierarchy.
    pub fn discover_config() -> Result<CliConfig, Box<dyn std::error::Error>> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return CliConfig::from_toml_file(config_path);
        }

        debug!("No configuration file found, using defaults");
        Ok(CliConfig::default())
    }

    /// Find a configuration file using the discovery hierarchy.
    pub fn find_config_file() -> Option<PathBuf> {
        for candidate in Self::get_config_candidates() {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.exists() && candidate.is_file() {
                debug!("Found config file: {:?}", candidate);
                return Some(candidate);
            }
        }

        None
    }

    /// Get the list of configuration file candidates in priority order.
    fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        // 1. Current directory: ./mcpup.toml or ./.mcpup/config.toml
        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join("mcpup.toml"));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        // 2. User config: ~/.mcpup/config.toml
        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        // 3. System config: /etc/mcpup/config.toml (Unix-like systems)
        #[cfg(unix)]
        candidates.push(PathBuf::from("/etc/mcpup/config.toml"));

        candidates
    }

    /// Get the home directory path.
    fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Print the discovery hierarchy and which file, if any, is in effect.
    pub fn show_discovery_info() {
        println!("Configuration discovery order:");
        for (i, candidate) in Self::get_config_candidates().iter().enumerate() {
            let marker = if candidate.exists() && candidate.is_file() {
                " (found)"
            } else {
                ""
            };
            println!("  {}. {}{}", i + 1, candidate.display(), marker);
        }

        match Self::find_config_file() {
            Some(path) => println!("\nActive config file: {}", path.display()),
            None => println!("\nNo config file found; using built-in defaults."),
        }

        println!(
            "\nEnvironment overrides: {} (API key), {} (API base URL)",
            env::API_KEY_ENV_VAR,
            env::API_URL_ENV_VAR
        );
    }
}
