use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::WsPortal`]: bind address, upgrade path,
/// keep-alive cadence, message size cap, and the subprotocols it offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WsPortalConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    #[serde(default = "default_pong_wait_secs")]
    pub pong_wait_secs: u64,
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    #[serde(default = "default_subprotocols")]
    pub subprotocols: Vec<String>,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_path() -> String {
    "/ws".to_string()
}

const fn default_ping_interval_secs() -> u64 {
    30
}

const fn default_pong_wait_secs() -> u64 {
    90
}

const fn default_max_message_bytes() -> usize {
    1024 * 1024
}

fn default_subprotocols() -> Vec<String> {
    vec!["defs-ws-v1".to_string()]
}

const fn default_shutdown_timeout_secs() -> u64 {
    10
}

impl Default for WsPortalConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            path: default_path(),
            ping_interval_secs: default_ping_interval_secs(),
            pong_wait_secs: default_pong_wait_secs(),
            max_message_bytes: default_max_message_bytes(),
            subprotocols: default_subprotocols(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl WsPortalConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_and_subprotocol_match_the_wire_contract() {
        let cfg = WsPortalConfig::default();
        assert_eq!(cfg.path, "/ws");
        assert_eq!(cfg.subprotocols, vec!["defs-ws-v1".to_string()]);
    }

    #[test]
    fn pong_wait_exceeds_ping_interval_by_default() {
        let cfg = WsPortalConfig::default();
        assert!(cfg.pong_wait() > cfg.ping_interval());
    }
}
