use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for an [`crate::HttpPortal`]: bind address, optional TLS,
/// CORS policy, request timeout/size limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpPortalConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: String,
    pub key_path: String,
}

/// CORS policy. An empty `origins` list (the default) means "reflect any
/// origin" (`*`), matching `modules/api_ingress`'s `CorsLayer::permissive()`
/// default when `cors_enabled` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    #[serde(default)]
    pub origins: Vec<String>,
    #[serde(default = "default_cors_methods")]
    pub methods: Vec<String>,
    #[serde(default = "default_cors_headers")]
    pub headers: Vec<String>,
}

fn default_cors_methods() -> Vec<String> {
    vec!["GET".into(), "POST".into(), "OPTIONS".into()]
}

fn default_cors_headers() -> Vec<String> {
    vec!["Content-Type".into(), "Authorization".into()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: Vec::new(),
            methods: default_cors_methods(),
            headers: default_cors_headers(),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_request_bytes() -> usize {
    16 * 1024 * 1024
}

const fn default_shutdown_timeout_secs() -> u64 {
    10
}

impl Default for HttpPortalConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            tls: None,
            cors: CorsConfig::default(),
            request_timeout_secs: default_timeout_secs(),
            max_request_bytes: default_max_request_bytes(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl HttpPortalConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
