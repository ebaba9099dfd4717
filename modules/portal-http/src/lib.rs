//! # portal-http
//!
//! HTTP transport implementation of the `Portal` contract: an axum server
//! exposing registered functions/services over `POST /functions/<name>` and
//! `POST /services/<service>/<method>`, plus a `reqwest`-backed client for
//! resolving functions/services that live behind a remote authority.

mod client;
mod config;
mod error;
mod server;
mod wire;

pub use config::{CorsConfig, HttpPortalConfig, TlsConfig};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use defs_address::Address;
use defs_core::{Function, FunctionRegistry, Portal, Service, ServiceRegistry};
use defs_errors::{PortalError, RegistryError};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use client::{RemoteFunction, RemoteService};

const SCHEMES: &[&str] = &["http", "https"];

struct RunningServer {
    bound_addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// HTTP transport binding. Registrations go into its own
/// `FunctionRegistry`/`ServiceRegistry` (always with `validate_on_call:
/// true` — every function on the wire has a schema, so every call is
/// checked against it); `resolve_*` distinguishes "is this address
/// actually ours" (served from the local registries) from "this is some
/// other host" (built into a `RemoteFunction`/`RemoteService`).
pub struct HttpPortal {
    config: HttpPortalConfig,
    client: reqwest::Client,
    functions: Arc<FunctionRegistry>,
    services: Arc<ServiceRegistry>,
    running: RwLock<Option<RunningServer>>,
    next_id: AtomicU64,
}

impl HttpPortal {
    pub fn new(config: HttpPortalConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            functions: Arc::new(FunctionRegistry::new()),
            services: Arc::new(ServiceRegistry::new()),
            running: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// The authority this portal's own addresses are minted with: the bound
    /// socket address once `start` has run, the configured `host:port`
    /// otherwise.
    fn own_authority(&self) -> String {
        match self.running.read().as_ref() {
            Some(running) => running.bound_addr.to_string(),
            None => self.config.bind_addr(),
        }
    }

    fn is_own_authority(&self, authority: &str) -> bool {
        authority == self.own_authority()
    }
}

#[async_trait]
impl Portal for HttpPortal {
    fn schemes(&self) -> &[&'static str] {
        SCHEMES
    }

    async fn apply(&self, _ctx: CancellationToken, function: Arc<dyn Function>) -> Result<Address, PortalError> {
        let name = function.name().to_string();
        self.functions.register(function, true).map_err(|e| match e {
            RegistryError::DuplicateName(n) => PortalError::Conflict(n),
            other => PortalError::Registry(other),
        })?;

        let id = self.allocate_id();
        Ok(Address::builder("http")
            .authority(self.own_authority())
            .path(format!("/functions/{name}"))
            .query("id", id.to_string())
            .build())
    }

    async fn apply_service(&self, _ctx: CancellationToken, service: Arc<dyn Service>) -> Result<Address, PortalError> {
        let name = service.name().to_string();
        self.services
            .register_service_with_instance(service)
            .map_err(|e| match e {
                RegistryError::DuplicateName(n) => PortalError::Conflict(n),
                other => PortalError::Registry(other),
            })?;

        let id = self.allocate_id();
        Ok(Address::builder("http")
            .authority(self.own_authority())
            .path(format!("/services/{name}"))
            .query("id", id.to_string())
            .build())
    }

    async fn resolve_function(&self, _ctx: CancellationToken, address: &Address) -> Result<Arc<dyn Function>, PortalError> {
        if !SCHEMES.contains(&address.scheme()) {
            return Err(PortalError::SchemeMismatch {
                expected: SCHEMES.to_vec(),
                actual: address.scheme().to_string(),
            });
        }

        if self.is_own_authority(address.authority()) {
            let name = address
                .path()
                .strip_prefix("/functions/")
                .ok_or_else(|| PortalError::AddressNotFound(address.to_string()))?;
            return self.functions.get(name).ok_or_else(|| PortalError::AddressNotFound(address.to_string()));
        }

        let name = address.path().rsplit('/').next().unwrap_or("").to_string();
        let url = format!("{}://{}{}", address.scheme(), address.authority(), address.path());
        Ok(Arc::new(RemoteFunction::new(name, url, self.client.clone())))
    }

    async fn resolve_service(&self, _ctx: CancellationToken, address: &Address) -> Result<Arc<dyn Service>, PortalError> {
        if !SCHEMES.contains(&address.scheme()) {
            return Err(PortalError::SchemeMismatch {
                expected: SCHEMES.to_vec(),
                actual: address.scheme().to_string(),
            });
        }

        if self.is_own_authority(address.authority()) {
            let name = address
                .path()
                .strip_prefix("/services/")
                .ok_or_else(|| PortalError::AddressNotFound(address.to_string()))?;
            return self
                .services
                .get_service_instance(name)
                .ok_or_else(|| PortalError::AddressNotFound(address.to_string()));
        }

        let name = address.path().rsplit('/').next().unwrap_or("").to_string();
        let base_url = format!("{}://{}{}", address.scheme(), address.authority(), address.path());
        Ok(Arc::new(RemoteService::new(name, base_url, self.client.clone())))
    }

    fn generate_address(&self, name: &str, metadata: Option<Value>) -> Address {
        let kind = metadata.as_ref().and_then(|m| m.get("kind")).and_then(|v| v.as_str()).unwrap_or("functions");
        Address::builder("http")
            .authority(self.own_authority())
            .path(format!("/{kind}/{name}"))
            .build()
    }

    async fn start(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        if self.running.read().is_some() {
            return Ok(());
        }

        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let bound_addr = listener.local_addr()?;
        let router = server::build_router(&self.config, self.functions.clone(), self.services.clone());
        let shutdown = CancellationToken::new();
        let shutdown_signal = shutdown.clone();

        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                shutdown_signal.cancelled().await;
            });
            if let Err(e) = server.await {
                tracing::error!(error = %e, "http portal server task exited with an error");
            }
        });

        *self.running.write() = Some(RunningServer { bound_addr, shutdown, handle });
        tracing::info!(%bound_addr, "http portal listening");
        Ok(())
    }

    async fn stop(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        let running = self.running.write().take();
        let Some(running) = running else {
            return Ok(());
        };
        running.shutdown.cancel();
        let _ = tokio::time::timeout(self.config.shutdown_timeout(), running.handle).await;
        Ok(())
    }

    async fn health(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        if self.running.read().is_some() {
            Ok(())
        } else {
            Err(PortalError::NotRunning.into())
        }
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.stop(CancellationToken::new()).await?;
        self.functions.clear();
        self.services.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defs_core::SimpleFunction;
    use defs_schema::FunctionSchema;

    fn noop(name: &str) -> Arc<dyn Function> {
        Arc::new(SimpleFunction::new(name, FunctionSchema::new(vec![], vec![]).unwrap(), |_ctx, input| async move {
            Ok(input)
        }))
    }

    #[tokio::test]
    async fn apply_mints_an_http_address_under_functions() {
        let portal = HttpPortal::new(HttpPortalConfig::default());
        let address = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        assert_eq!(address.scheme(), "http");
        assert_eq!(address.path(), "/functions/greet");
    }

    #[tokio::test]
    async fn re_applying_the_same_name_is_a_conflict() {
        let portal = HttpPortal::new(HttpPortalConfig::default());
        portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        let err = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));
    }

    #[tokio::test]
    async fn resolve_own_address_returns_the_registered_function() {
        let portal = HttpPortal::new(HttpPortalConfig::default());
        let address = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        let resolved = portal.resolve_function(CancellationToken::new(), &address).await.unwrap();
        assert_eq!(resolved.name(), "greet");
    }

    #[tokio::test]
    async fn resolve_foreign_authority_builds_a_remote_function() {
        let portal = HttpPortal::new(HttpPortalConfig::default());
        let address = Address::builder("http").authority("example.com:9000").path("/functions/greet").build();
        let resolved = portal.resolve_function(CancellationToken::new(), &address).await.unwrap();
        assert_eq!(resolved.name(), "greet");
    }

    #[tokio::test]
    async fn health_before_start_reports_not_running() {
        let portal = HttpPortal::new(HttpPortalConfig::default());
        assert!(portal.health(CancellationToken::new()).await.is_err());
    }

    #[tokio::test]
    async fn start_then_health_then_stop() {
        let mut config = HttpPortalConfig::default();
        config.port = 0;
        let portal = HttpPortal::new(config);
        portal.start(CancellationToken::new()).await.unwrap();
        assert!(portal.health(CancellationToken::new()).await.is_ok());
        portal.stop(CancellationToken::new()).await.unwrap();
        assert!(portal.health(CancellationToken::new()).await.is_err());
    }
}
