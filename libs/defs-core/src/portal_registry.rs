use std::sync::Arc;

use defs_address::Address;
use defs_errors::{PortalError, RegistryError};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::function::Function;
use crate::portal::Portal;
use crate::service::Service;

/// Scheme -> Portal multiplexer. A single `Portal` may own more than one
/// scheme (the Testing portal owns both `test` and `mock`); registration
/// enforces that no two portals claim the same scheme.
pub struct PortalRegistry {
    by_scheme: RwLock<IndexMap<&'static str, Arc<dyn Portal>>>,
    portals: RwLock<Vec<Arc<dyn Portal>>>,
}

impl PortalRegistry {
    pub fn new() -> Self {
        Self {
            by_scheme: RwLock::new(IndexMap::new()),
            portals: RwLock::new(Vec::new()),
        }
    }

    /// Registers every scheme `portal.schemes()` claims. Fails (leaving the
    /// registry unchanged) if any of them is already claimed by another
    /// portal.
    pub fn register_portal(&self, portal: Arc<dyn Portal>) -> Result<(), RegistryError> {
        let schemes = portal.schemes();
        {
            let existing = self.by_scheme.read();
            for scheme in schemes {
                if existing.contains_key(scheme) {
                    return Err(RegistryError::SchemeConflict((*scheme).to_string()));
                }
            }
        }
        let mut by_scheme = self.by_scheme.write();
        for scheme in schemes {
            by_scheme.insert(scheme, portal.clone());
        }
        self.portals.write().push(portal);
        Ok(())
    }

    pub fn get_portal_by_scheme(&self, scheme: &str) -> Option<Arc<dyn Portal>> {
        self.by_scheme.read().get(scheme).cloned()
    }

    pub fn get_portal(&self, address: &Address) -> Option<Arc<dyn Portal>> {
        self.get_portal_by_scheme(address.scheme())
    }

    /// Shorthand for `get_portal(address).resolve_function(ctx, address)`.
    pub async fn resolve_function(
        &self,
        ctx: CancellationToken,
        address: &Address,
    ) -> Result<Arc<dyn Function>, PortalError> {
        let portal = self
            .get_portal(address)
            .ok_or_else(|| PortalError::SchemeMismatch {
                expected: self.by_scheme.read().keys().copied().collect(),
                actual: address.scheme().to_string(),
            })?;
        portal.resolve_function(ctx, address).await
    }

    pub async fn resolve_service(
        &self,
        ctx: CancellationToken,
        address: &Address,
    ) -> Result<Arc<dyn Service>, PortalError> {
        let portal = self
            .get_portal(address)
            .ok_or_else(|| PortalError::SchemeMismatch {
                expected: self.by_scheme.read().keys().copied().collect(),
                actual: address.scheme().to_string(),
            })?;
        portal.resolve_service(ctx, address).await
    }

    pub fn schemes(&self) -> Vec<&'static str> {
        self.by_scheme.read().keys().copied().collect()
    }

    /// Polls every distinct portal once and records its result against every
    /// scheme it owns, rather than polling the same portal once per scheme.
    pub async fn health(&self, ctx: CancellationToken) -> IndexMap<&'static str, Option<String>> {
        let by_scheme = self.by_scheme.read().clone();
        let mut results = IndexMap::new();
        for (scheme, portal) in by_scheme {
            let outcome = portal.health(ctx.clone()).await.err().map(|e| e.to_string());
            results.insert(scheme, outcome);
        }
        results
    }

    pub async fn close_all(&self) -> anyhow::Result<()> {
        for portal in self.portals.read().iter() {
            portal.close().await?;
        }
        Ok(())
    }
}

impl Default for PortalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::SimpleFunction;
    use crate::local_portal::LocalPortal;
    use crate::testing_portal::TestingPortal;
    use defs_schema::FunctionSchema;

    fn noop(name: &str) -> Arc<dyn Function> {
        Arc::new(SimpleFunction::new(name, FunctionSchema::new(vec![], vec![]).unwrap(), |_ctx, input| async move {
            Ok(input)
        }))
    }

    #[test]
    fn registering_two_portals_for_the_same_scheme_is_a_conflict() {
        let registry = PortalRegistry::new();
        registry.register_portal(Arc::new(LocalPortal::new())).unwrap();
        let err = registry.register_portal(Arc::new(LocalPortal::new())).unwrap_err();
        assert!(matches!(err, RegistryError::SchemeConflict(_)));
    }

    #[test]
    fn one_portal_can_own_multiple_schemes() {
        let registry = PortalRegistry::new();
        registry.register_portal(Arc::new(TestingPortal::new())).unwrap();
        assert!(registry.get_portal_by_scheme("test").is_some());
        assert!(registry.get_portal_by_scheme("mock").is_some());
    }

    #[tokio::test]
    async fn resolve_function_dispatches_by_scheme() {
        let registry = PortalRegistry::new();
        let local = Arc::new(LocalPortal::new());
        registry.register_portal(local.clone()).unwrap();

        let address = local.apply(CancellationToken::new(), noop("greet")).await.unwrap();
        let resolved = registry.resolve_function(CancellationToken::new(), &address).await.unwrap();
        assert_eq!(resolved.name(), "greet");
    }

    #[tokio::test]
    async fn resolve_unknown_scheme_is_a_scheme_mismatch() {
        let registry = PortalRegistry::new();
        let address = Address::builder("http").authority("example.com").path("/functions/x").build();
        let err = registry.resolve_function(CancellationToken::new(), &address).await.unwrap_err();
        assert!(matches!(err, PortalError::SchemeMismatch { .. }));
    }

    #[tokio::test]
    async fn health_polls_every_registered_scheme() {
        let registry = PortalRegistry::new();
        registry.register_portal(Arc::new(LocalPortal::new())).unwrap();
        let health = registry.health(CancellationToken::new()).await;
        assert_eq!(health.get("local"), Some(&None));
    }
}
