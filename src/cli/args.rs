//! Command line argument parsing
//!
//! This module handles CLI argument parsing with subcommands:
//! - `up`: generate a server from API documentation and bring it up
//! - `show-config`: show configuration discovery information

use crate::clients::ConnectedClient;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mcpup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate MCP servers from REST API documentation and launch them in Docker")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a server and bring it up
    Up {
        /// Server name (prompted for when omitted)
        #[arg(short = 'n', long = "name")]
        name: Option<String>,
        /// Host port to bind (random 1024-9999 when omitted)
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
        /// Documentation URL (can be used multiple times; prompted for when omitted)
        #[arg(short = 'u', long = "url", value_name = "URL")]
        urls: Vec<String>,
        /// Prepare a local run instead of a Docker container
        #[arg(long = "local", conflicts_with = "docker")]
        local: bool,
        /// Launch in Docker without asking (prompted for when neither flag is given)
        #[arg(long = "docker")]
        docker: bool,
        /// Client to print a connection snippet for (prompted for when omitted)
        #[arg(long = "client", value_enum)]
        client: Option<ConnectedClient>,
        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
    /// Show configuration discovery information
    ShowConfig,
}
