//! TOML configuration for the forwarder.

use std::net::Ipv4Addr;
use std::path::Path;

use serde::Deserialize;

use crate::error::RouterError;
use crate::forward::TtlPolicy;
use crate::network::MacAddr;
use crate::routing::{RouteEntry, RouteTable};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub router: RouterSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl RouterConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, RouterError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RouterError::Config(format!("failed to read config file: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, RouterError> {
        toml::from_str(s).map_err(|e| RouterError::Config(format!("failed to parse config: {e}")))
    }

    /// Build the static route table from the `[[routes]]` entries.
    pub fn route_table(&self) -> Result<RouteTable, RouterError> {
        RouteTable::from_entries(
            self.routes
                .iter()
                .map(|r| (r.destination, RouteEntry::new(r.interface, r.mac))),
        )
    }
}

/// The `[router]` section.
#[derive(Debug, Default, Deserialize)]
pub struct RouterSection {
    /// Interfaces to listen on. Empty means every host interface.
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub ttl_policy: TtlPolicy,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// The `[logging]` section.
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// A `[[routes]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub destination: Ipv4Addr,
    /// Egress interface index
    pub interface: u32,
    /// Next-hop MAC, e.g. "00:00:00:00:00:01"
    pub mac: MacAddr,
}
