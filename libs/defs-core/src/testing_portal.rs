use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use defs_address::Address;
use defs_errors::PortalError;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::function::Function;
use crate::function_data::FunctionData;
use crate::portal::Portal;
use crate::service::Service;

const SCHEMES: &[&str] = &["test", "mock"];

/// One recorded invocation through a `TestingPortal`-wrapped function.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub function_name: String,
    pub address: String,
    pub input: FunctionData,
    pub output: Option<FunctionData>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Wraps an inner `Function` so that every call is appended to the portal's
/// shared call log before returning — a thin delegating wrapper, grounded on
/// `modules/users_info`'s local-gateway style of wrapping rather than
/// reimplementing the thing it delegates to.
struct RecordingFunction {
    inner: Arc<dyn Function>,
    address: String,
    log: Arc<RwLock<Vec<FunctionCall>>>,
}

#[async_trait]
impl Function for RecordingFunction {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn schema(&self) -> &defs_schema::FunctionSchema {
        self.inner.schema()
    }

    async fn call(&self, ctx: CancellationToken, input: FunctionData) -> anyhow::Result<FunctionData> {
        let result = self.inner.call(ctx, input.clone()).await;
        let call = match &result {
            Ok(output) => FunctionCall {
                function_name: self.inner.name().to_string(),
                address: self.address.clone(),
                input,
                output: Some(output.clone()),
                error: None,
                timestamp: Utc::now(),
            },
            Err(e) => FunctionCall {
                function_name: self.inner.name().to_string(),
                address: self.address.clone(),
                input,
                output: None,
                error: Some(e.to_string()),
                timestamp: Utc::now(),
            },
        };
        self.log.write().push(call);
        result
    }
}

/// Mock/recording portal: behaves like `LocalPortal`, except (a) addresses
/// are minted as `mock://<name>?id=<n>&mock=true`, (b) re-applying the same
/// function name is *allowed* — each `apply` call mints a fresh address and
/// the new registration becomes the one `resolve_function` on that address
/// (and any later address for the same name) returns — and (c) every call
/// that passes through a resolved/wrapped function is appended to an
/// append-only call log.
///
/// This is the documented exception to the portal-wide "duplicate apply is a
/// conflict" policy (see SPEC_FULL.md §4.7/§4.8): mocks are expected to be
/// re-registered across test cases.
pub struct TestingPortal {
    functions: RwLock<IndexMap<String, Arc<dyn Function>>>,
    services: RwLock<IndexMap<String, Arc<dyn Service>>>,
    function_addresses: RwLock<IndexMap<String, String>>,
    service_addresses: RwLock<IndexMap<String, String>>,
    call_log: Arc<RwLock<Vec<FunctionCall>>>,
    next_id: AtomicU64,
}

impl TestingPortal {
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(IndexMap::new()),
            services: RwLock::new(IndexMap::new()),
            function_addresses: RwLock::new(IndexMap::new()),
            service_addresses: RwLock::new(IndexMap::new()),
            call_log: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// The complete append-only call log, oldest first.
    pub fn call_log(&self) -> Vec<FunctionCall> {
        self.call_log.read().clone()
    }

    /// Number of recorded calls for a given function name.
    pub fn call_count(&self, function_name: &str) -> usize {
        self.call_log
            .read()
            .iter()
            .filter(|c| c.function_name == function_name)
            .count()
    }

    /// Clears every registered mock, address mapping, and the call log.
    pub fn reset(&self) {
        self.functions.write().clear();
        self.services.write().clear();
        self.function_addresses.write().clear();
        self.service_addresses.write().clear();
        self.call_log.write().clear();
    }
}

impl Default for TestingPortal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Portal for TestingPortal {
    fn schemes(&self) -> &[&'static str] {
        SCHEMES
    }

    async fn apply(&self, _ctx: CancellationToken, function: Arc<dyn Function>) -> Result<Address, PortalError> {
        let name = function.name().to_string();
        let id = self.allocate_id();
        let address = Address::builder("mock")
            .path(format!("/{name}"))
            .query("id", id.to_string())
            .query("mock", "true")
            .build();

        let wrapped: Arc<dyn Function> = Arc::new(RecordingFunction {
            inner: function,
            address: address.to_string(),
            log: self.call_log.clone(),
        });

        self.functions.write().insert(name.clone(), wrapped);
        self.function_addresses.write().insert(address.to_string(), name);
        Ok(address)
    }

    async fn apply_service(&self, _ctx: CancellationToken, service: Arc<dyn Service>) -> Result<Address, PortalError> {
        let name = service.name().to_string();
        let id = self.allocate_id();
        let address = Address::builder("mock")
            .path(format!("/service/{name}"))
            .query("id", id.to_string())
            .query("mock", "true")
            .build();

        self.services.write().insert(name.clone(), service);
        self.service_addresses.write().insert(address.to_string(), name);
        Ok(address)
    }

    async fn resolve_function(&self, _ctx: CancellationToken, address: &Address) -> Result<Arc<dyn Function>, PortalError> {
        if !SCHEMES.contains(&address.scheme()) {
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
        self.functions
            .read()
            .get(&name)
            .cloned()
            .ok_or_else(|| PortalError::AddressNotFound(address.to_string()))
    }

    async fn resolve_service(&self, _ctx: CancellationToken, address: &Address) -> Result<Arc<dyn Service>, PortalError> {
        if !SCHEMES.contains(&address.scheme()) {
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
            .read()
            .get(&name)
            .cloned()
            .ok_or_else(|| PortalError::AddressNotFound(address.to_string()))
    }

    fn generate_address(&self, name: &str, metadata: Option<Value>) -> Address {
        let mock = metadata
            .as_ref()
            .and_then(|m| m.get("mock"))
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        let builder = Address::builder(if mock { "mock" } else { "test" }).path(format!("/{name}"));
        if mock {
            builder.query("mock", "true").build()
        } else {
            builder.build()
        }
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::SimpleFunction;
    use defs_schema::FunctionSchema;

    fn noop(name: &str) -> Arc<dyn Function> {
        Arc::new(SimpleFunction::new(name, FunctionSchema::new(vec![], vec![]).unwrap(), |_ctx, input| async move {
            Ok(input)
        }))
    }

    #[tokio::test]
    async fn apply_mints_a_mock_address_with_id_and_mock_flag() {
        let portal = TestingPortal::new();
        let address = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        assert_eq!(address.scheme(), "mock");
        assert_eq!(address.query_get("mock"), Some("true"));
        assert!(address.query_get("id").is_some());
    }

    #[tokio::test]
    async fn re_applying_the_same_name_is_allowed_and_yields_a_fresh_address() {
        let portal = TestingPortal::new();
        let first = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        let second = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        assert_ne!(first.to_string(), second.to_string());
    }

    #[tokio::test]
    async fn calls_are_recorded_in_the_append_only_log() {
        let portal = TestingPortal::new();
        let address = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        let function = portal.resolve_function(CancellationToken::new(), &address).await.unwrap();
        function.call(CancellationToken::new(), FunctionData::empty()).await.unwrap();

        assert_eq!(portal.call_count("greet"), 1);
        assert_eq!(portal.call_log().len(), 1);
    }

    #[tokio::test]
    async fn reset_clears_mocks_and_history() {
        let portal = TestingPortal::new();
        let address = portal.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        let function = portal.resolve_function(CancellationToken::new(), &address).await.unwrap();
        function.call(CancellationToken::new(), FunctionData::empty()).await.unwrap();

        portal.reset();
        assert!(portal.call_log().is_empty());
        assert!(portal.resolve_function(CancellationToken::new(), &address).await.is_err());
    }
}
