//! Command-line interface layer.
//!
//! Thin I/O glue around the pipeline: argument parsing, config discovery,
//! and user prompting. The core never prompts or retries; everything
//! interactive lives here.

pub mod args;
pub mod config;
pub mod prompt;

pub use args::{Args, Commands};
pub use config::{CliConfig, ConfigDiscovery, ResolvedConfig};
