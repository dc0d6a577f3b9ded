//! Dashboard server configuration.

use serde::{Deserialize, Serialize};

/// Dashboard server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Enable the HTTP/WebSocket surface.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Address to bind.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum concurrent WebSocket connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Render frames buffered per slow WebSocket client.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
    /// Directory of static page assets served at `/` (none = API only).
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> usize {
    10
}

fn default_broadcast_capacity() -> usize {
    32
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            bind_address: default_bind_address(),
            port: default_port(),
            max_connections: default_max_connections(),
            broadcast_capacity: default_broadcast_capacity(),
            static_dir: None,
        }
    }
}

impl DashboardConfig {
    /// `address:port` string for binding.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
