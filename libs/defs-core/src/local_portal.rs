use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use defs_address::Address;
use defs_errors::{PortalError, RegistryError};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::function::Function;
use crate::function_registry::FunctionRegistry;
use crate::portal::Portal;
use crate::service::Service;
use crate::service_registry::ServiceRegistry;

const SCHEMES: &[&str] = &["local"];

/// In-process portal: `apply` registers into a delegated `FunctionRegistry`
/// / `ServiceRegistry` and mints a `local:///<name>?id=<n>` address; the
/// reverse maps below let `resolve_*` go from address back to name without
/// re-parsing every registry entry's own address.
pub struct LocalPortal {
    functions: FunctionRegistry,
    services: ServiceRegistry,
    function_addresses: RwLock<IndexMap<String, String>>,
    service_addresses: RwLock<IndexMap<String, String>>,
    next_id: AtomicU64,
}

impl LocalPortal {
    pub fn new() -> Self {
        Self {
            functions: FunctionRegistry::new(),
            services: ServiceRegistry::new(),
            function_addresses: RwLock::new(IndexMap::new()),
            service_addresses: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Removes both the registry entry and every address mapping pointing
    /// at `name`.
    pub fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        self.functions.unregister(name)?;
        self.function_addresses.write().retain(|_, target| target != name);
        Ok(())
    }
}

impl Default for LocalPortal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Portal for LocalPortal {
    fn schemes(&self) -> &[&'static str] {
        SCHEMES
    }

    async fn apply(&self, _ctx: CancellationToken, function: Arc<dyn Function>) -> Result<Address, PortalError> {
        let name = function.name().to_string();
        self.functions.register(function, false).map_err(|e| match e {
            RegistryError::DuplicateName(n) => PortalError::Conflict(n),
            other => PortalError::Registry(other),
        })?;

        let id = self.allocate_id();
        let address = self.generate_address(&name, None).with_id(id);
        self.function_addresses.write().insert(address.to_string(), name);
        Ok(address)
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
        let address = Address::builder("local")
            .path(format!("/service/{name}"))
            .query("id", id.to_string())
            .build();
        self.service_addresses.write().insert(address.to_string(), name);
        Ok(address)
    }

    async fn resolve_function(&self, _ctx: CancellationToken, address: &Address) -> Result<Arc<dyn Function>, PortalError> {
        if address.scheme() != "local" {
            return Err(PortalError::SchemeMismatch {
                expected: SCHEMES.to_vec(),
                actual: address.scheme().to_string(),
            });
        }
        let name = self
            .function_addresses
            .read()
            .get(&address.to_string())
            .cloned()
            .ok_or_else(|| PortalError::AddressNotFound(address.to_string()))?;
        self.functions.get(&name).ok_or_else(|| PortalError::AddressNotFound(address.to_string()))
    }

    async fn resolve_service(&self, _ctx: CancellationToken, address: &Address) -> Result<Arc<dyn Service>, PortalError> {
        if address.scheme() != "local" {
            return Err(PortalError::SchemeMismatch {
                expected: SCHEMES.to_vec(),
                actual: address.scheme().to_string(),
            });
        }
        let name = self
            .service_addresses
            .read()
            .get(&address.to_string())
            .cloned()
            .ok_or_else(|| PortalError::AddressNotFound(address.to_string()))?;
        self.services
            .get_service_instance(&name)
            .ok_or_else(|| PortalError::AddressNotFound(address.to_string()))
    }

    fn generate_address(&self, name: &str, _metadata: Option<Value>) -> Address {
        Address::builder("local").path(format!("/{name}")).build()
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.functions.clear();
        self.services.clear();
        self.function_addresses.write().clear();
        self.service_addresses.write().clear();
        Ok(())
    }
}

trait WithId {
    fn with_id(self, id: u64) -> Self;
}

impl WithId for Address {
    fn with_id(self, id: u64) -> Self {
        Address::builder(self.scheme())
            .authority(self.authority())
            .path(self.path())
            .query("id", id.to_string())
            .build()
    }
}
