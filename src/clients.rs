//! Connection-config snippets for MCP clients.
//!
//! After a server comes up, the user wires it into their editor or desktop
//! client by hand; these helpers render the JSON block to paste for each
//! supported client.

use clap::ValueEnum;
use serde_json::{Value, json};

/// Supported MCP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectedClient {
    /// Cursor (.cursor/mcp.json)
    Cursor,
    /// Claude Desktop (claude_desktop_config.json)
    ClaudeDesktop,
    /// Windsurf (.codeium/windsurf/mcp_config.json)
    Windsurf,
}

impl ConnectedClient {
    /// All supported clients, in prompt order.
    pub const ALL: [ConnectedClient; 3] = [
        ConnectedClient::Cursor,
        ConnectedClient::ClaudeDesktop,
        ConnectedClient::Windsurf,
    ];

    /// Where this client keeps its MCP configuration.
    pub fn config_location(&self) -> &'static str {
        match self {
            ConnectedClient::Cursor => ".cursor/mcp.json",
            ConnectedClient::ClaudeDesktop => "claude_desktop_config.json",
            ConnectedClient::Windsurf => ".codeium/windsurf/mcp_config.json",
        }
    }

    /// Human-readable client name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectedClient::Cursor => "Cursor",
            ConnectedClient::ClaudeDesktop => "Claude Desktop",
            ConnectedClient::Windsurf => "Windsurf",
        }
    }
}

impl std::fmt::Display for ConnectedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Build the JSON configuration body for a client.
pub fn config_json(client: ConnectedClient, name: &str, port: u16) -> Value {
    let sse_url = format!("http://localhost:{}/sse", port);

    match client {
        ConnectedClient::Cursor => json!({
            "mcpServers": {
                name: { "url": sse_url }
            }
        }),
        ConnectedClient::ClaudeDesktop => json!({
            "mcpServers": {
                name: {
                    "command": "npx",
                    "args": ["mcp-remote", sse_url]
                }
            }
        }),
        ConnectedClient::Windsurf => json!({
            "mcpServers": {
                name: {
                    "id": format!("mcpup-{}", name),
                    "command": "npx",
                    "args": ["mcp-remote", sse_url]
                }
            }
        }),
    }
}

/// Render the full snippet to print for a client: a header naming the
/// config file, then the pretty-printed JSON body.
pub fn connection_snippet(client: ConnectedClient, name: &str, port: u16) -> String {
    let body = serde_json::to_string_pretty(&config_json(client, name, port))
        .unwrap_or_else(|_| String::from("{}"));

    format!(
        "{} ({}):\n{}\n{}\n{}",
        client.display_name(),
        client.config_location(),
        "-".repeat(55),
        body,
        "-".repeat(55),
    )
}
