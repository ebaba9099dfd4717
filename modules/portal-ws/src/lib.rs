//! # portal-ws
//!
//! WebSocket transport implementation of the `Portal` contract. Built on
//! `axum::extract::ws` for the server side (the teacher's existing `axum`
//! dependency, `ws` feature) with a per-connection write mutex, a
//! connection map, and server-initiated ping/pong keep-alive.

mod client;
mod config;
mod protocol;
mod server;
mod wire;

pub use config::WsPortalConfig;
pub use protocol::{MessageType, WsMessage};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use defs_address::Address;
use defs_core::{Function, FunctionRegistry, Portal, Service, ServiceRegistry};
use defs_errors::{PortalError, RegistryError};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use client::{RemoteFunction, RemoteService};
use server::ConnectionMap;

const SCHEMES: &[&str] = &["ws", "wss"];

struct RunningServer {
    bound_addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// WebSocket transport binding. Functions/services apply into their own
/// registries exactly like `HttpPortal`; the connection map tracked here is
/// purely for the server side (broadcast/targeted send, `/health`'s
/// `connections` count) and has no bearing on `resolve_*`.
pub struct WsPortal {
    config: WsPortalConfig,
    functions: Arc<FunctionRegistry>,
    services: Arc<ServiceRegistry>,
    connections: Arc<ConnectionMap>,
    running: RwLock<Option<RunningServer>>,
    next_id: AtomicU64,
}

impl WsPortal {
    pub fn new(config: WsPortalConfig) -> Self {
        Self {
            config,
            functions: Arc::new(FunctionRegistry::new()),
            services: Arc::new(ServiceRegistry::new()),
            connections: Arc::new(RwLock::new(IndexMap::new())),
            running: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn own_authority(&self) -> String {
        match self.running.read().as_ref() {
            Some(running) => running.bound_addr.to_string(),
            None => self.config.bind_addr(),
        }
    }

    /// Number of currently open connections, surfaced in `GET /health`.
    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }

    /// Sends `message` to every open connection.
    pub async fn broadcast(&self, message: &WsMessage) {
        server::broadcast(&self.connections, message).await;
    }
}

#[async_trait]
impl Portal for WsPortal {
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
        Ok(Address::builder("ws")
            .authority(self.own_authority())
            .path(format!("{}/functions/{name}", self.config.path))
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
        Ok(Address::builder("ws")
            .authority(self.own_authority())
            .path(format!("{}/services/{name}", self.config.path))
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

        if address.authority() == self.own_authority() {
            let name = address
                .path()
                .rsplit('/')
                .next()
                .ok_or_else(|| PortalError::AddressNotFound(address.to_string()))?;
            return self.functions.get(name).ok_or_else(|| PortalError::AddressNotFound(address.to_string()));
        }

        let name = address.path().rsplit('/').next().unwrap_or("").to_string();
        let url = format!("{}://{}{}", address.scheme(), address.authority(), self.config.path);
        Ok(Arc::new(RemoteFunction::new(name, url)))
    }

    async fn resolve_service(&self, _ctx: CancellationToken, address: &Address) -> Result<Arc<dyn Service>, PortalError> {
        if !SCHEMES.contains(&address.scheme()) {
            return Err(PortalError::SchemeMismatch {
                expected: SCHEMES.to_vec(),
                actual: address.scheme().to_string(),
            });
        }

        if address.authority() == self.own_authority() {
            let name = address
                .path()
                .rsplit('/')
                .next()
                .ok_or_else(|| PortalError::AddressNotFound(address.to_string()))?;
            return self
                .services
                .get_service_instance(name)
                .ok_or_else(|| PortalError::AddressNotFound(address.to_string()));
        }

        let name = address.path().rsplit('/').next().unwrap_or("").to_string();
        let url = format!("{}://{}{}", address.scheme(), address.authority(), self.config.path);
        Ok(Arc::new(RemoteService::new(name, url)))
    }

    fn generate_address(&self, name: &str, metadata: Option<Value>) -> Address {
        let kind = metadata.as_ref().and_then(|m| m.get("kind")).and_then(|v| v.as_str()).unwrap_or("functions");
        Address::builder("ws")
            .authority(self.own_authority())
            .path(format!("{}/{kind}/{name}", self.config.path))
            .build()
    }

    async fn start(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        if self.running.read().is_some() {
            return Ok(());
        }

        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let bound_addr = listener.local_addr()?;
        let router = server::build_router(
            self.config.clone(),
            self.functions.clone(),
            self.services.clone(),
            self.connections.clone(),
        );
        let shutdown = CancellationToken::new();
        let shutdown_signal = shutdown.clone();

        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                shutdown_signal.cancelled().await;
            });
            if let Err(e) = server.await {
                tracing::error!(error = %e, "ws portal server task exited with an error");
            }
        });

        *self.running.write() = Some(RunningServer { bound_addr, shutdown, handle });
        tracing::info!(%bound_addr, path = %self.config.path, "ws portal listening");
        Ok(())
    }

    async fn stop(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        let running = self.running.write().take();
        let Some(running) = running else {
            return Ok(());
        };
        running.shutdown.cancel();
        let _ = tokio::time::timeout(self.config.shutdown_timeout(), running.handle).await;
        self.connections.write().clear();
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
    async fn apply_mints_a_ws_address_under_the_configured_path() {
        let portal = WsPortal::new(WsPortalConfig::default());
        let address = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        assert_eq!(address.scheme(), "ws");
        assert_eq!(address.path(), "/ws/functions/greet");
    }

    #[tokio::test]
    async fn re_applying_the_same_name_is_a_conflict() {
        let portal = WsPortal::new(WsPortalConfig::default());
        portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        let err = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));
    }

    #[tokio::test]
    async fn connection_count_starts_at_zero() {
        let portal = WsPortal::new(WsPortalConfig::default());
        assert_eq!(portal.connection_count(), 0);
    }

    #[tokio::test]
    async fn start_then_health_then_stop() {
        let portal = WsPortal::new(WsPortalConfig::default());
        portal.start(CancellationToken::new()).await.unwrap();
        assert!(portal.health(CancellationToken::new()).await.is_ok());
        portal.stop(CancellationToken::new()).await.unwrap();
        assert!(portal.health(CancellationToken::new()).await.is_err());
    }
}
