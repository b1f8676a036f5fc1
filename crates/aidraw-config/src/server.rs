use std::{net::SocketAddr, path::PathBuf};

/// Default port of the local web UI
pub const DEFAULT_PORT: u16 = 5178;

/// Local web server options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_address: SocketAddr,
    /// Built UI assets, served with an `index.html` fallback
    pub ui_dir: Option<PathBuf>,
    pub health: HealthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            ui_dir: None,
            health: HealthConfig::default(),
        }
    }
}

/// Health check endpoint configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/health".to_string(),
        }
    }
}
