use std::sync::Arc;

use async_trait::async_trait;
use defs_address::Address;
use defs_errors::PortalError;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::function::Function;
use crate::service::Service;

/// A transport binding: in-process, HTTP, WebSocket, or a test double, all
/// behind the same contract so a `PortalRegistry` can treat them
/// uniformly.
#[async_trait]
pub trait Portal: Send + Sync {
    /// Non-empty set of schemes this portal accepts (a single portal may
    /// own more than one, e.g. the Testing portal's `test` + `mock`).
    fn schemes(&self) -> &[&'static str];

    async fn apply(&self, ctx: CancellationToken, function: Arc<dyn Function>) -> Result<Address, PortalError>;

    async fn apply_service(&self, ctx: CancellationToken, service: Arc<dyn Service>) -> Result<Address, PortalError>;

    async fn resolve_function(&self, ctx: CancellationToken, address: &Address) -> Result<Arc<dyn Function>, PortalError>;

    async fn resolve_service(&self, ctx: CancellationToken, address: &Address) -> Result<Arc<dyn Service>, PortalError>;

    /// Pure address construction; does not register anything.
    fn generate_address(&self, name: &str, metadata: Option<Value>) -> Address;

    /// No-op for in-process portals; binds a socket for network transports.
    async fn start(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        Ok(())
    }

    async fn health(&self, _ctx: CancellationToken) -> anyhow::Result<()> {
        Ok(())
    }

    /// Releases all resources and clears registered functions/services.
    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
