use std::sync::Arc;

use defs_errors::RegistryError;
use defs_schema::{Schema, ServiceSchema};
use defs_validate::ValidationEngine;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::CallError;
use crate::function::Function;
use crate::function_data::FunctionData;
use crate::service::Service;

enum Entry {
    SchemaOnly(ServiceSchema),
    Instance(Arc<dyn Service>),
}

impl Entry {
    fn schema(&self) -> &ServiceSchema {
        match self {
            Entry::SchemaOnly(s) => s,
            Entry::Instance(s) => s.schema(),
        }
    }
}

/// Name-keyed registry of services. A service may be registered with just
/// its `ServiceSchema` (introspectable but not callable) or with a full
/// `Arc<dyn Service>` instance that method calls route to.
pub struct ServiceRegistry {
    services: RwLock<IndexMap<String, Entry>>,
    engine: ValidationEngine,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(IndexMap::new()),
            engine: ValidationEngine::with_builtin_consumers(),
        }
    }

    pub fn register_service(&self, schema: ServiceSchema) -> Result<(), RegistryError> {
        let name = schema.name.clone();
        let mut w = self.services.write();
        if w.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        w.insert(name, Entry::SchemaOnly(schema));
        Ok(())
    }

    pub fn register_service_with_instance(&self, service: Arc<dyn Service>) -> Result<(), RegistryError> {
        let name = service.name().to_string();
        let mut w = self.services.write();
        if w.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        w.insert(name, Entry::Instance(service));
        Ok(())
    }

    pub fn schema(&self, name: &str) -> Option<ServiceSchema> {
        self.services.read().get(name).map(|e| e.schema().clone())
    }

    /// `O(1)` lookup of a method `Function` by service + method name.
    /// Returns `None` for schema-only registrations (no instance to route
    /// a call to) as well as unknown names.
    pub fn get_service_method(&self, service: &str, method: &str) -> Option<Arc<dyn Function>> {
        match self.services.read().get(service)? {
            Entry::SchemaOnly(_) => None,
            Entry::Instance(s) => s.get_method(method),
        }
    }

    /// Returns the backing `Arc<dyn Service>` for a name registered with
    /// `register_service_with_instance`, or `None` for schema-only entries
    /// and unknown names.
    pub fn get_service_instance(&self, service: &str) -> Option<Arc<dyn Service>> {
        match self.services.read().get(service)? {
            Entry::SchemaOnly(_) => None,
            Entry::Instance(s) => Some(s.clone()),
        }
    }

    /// Always recursively validates against the method's own
    /// `FunctionSchema` (never re-derived from the outer `ServiceSchema`)
    /// before invoking it.
    pub async fn call_service_method(
        &self,
        ctx: CancellationToken,
        service: &str,
        method: &str,
        input: FunctionData,
    ) -> Result<FunctionData, CallError> {
        let function = self
            .get_service_method(service, method)
            .ok_or_else(|| RegistryError::NotFound(format!("{service}/{method}")))?;

        let schema = Schema::Function(function.schema().clone());
        let result = self.engine.validate(&schema, &input.value());
        if !result.valid {
            return Err(CallError::Validation(result));
        }

        function.call(ctx, input).await.map_err(CallError::Handler)
    }

    pub fn list(&self) -> Vec<String> {
        self.services.read().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.services.read().len()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.services.read().contains_key(name)
    }

    pub fn clear(&self) {
        self.services.write().clear();
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::SimpleFunction;
    use defs_schema::{FunctionSchema, IntegerSchema, Param};
    use serde_json::json;

    struct Echo {
        schema: ServiceSchema,
    }

    impl Service for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn schema(&self) -> &ServiceSchema {
            &self.schema
        }
        fn get_method(&self, name: &str) -> Option<Arc<dyn Function>> {
            if name == "ping" {
                Some(Arc::new(SimpleFunction::new(
                    "ping",
                    FunctionSchema::new(vec![Param::required("n", Schema::Integer(IntegerSchema::new().min(0)))], vec![])
                        .unwrap(),
                    |_ctx, input| async move { Ok(input) },
                )))
            } else {
                None
            }
        }
    }

    fn registry_with_echo() -> ServiceRegistry {
        let registry = ServiceRegistry::new();
        let method_schema =
            FunctionSchema::new(vec![Param::required("n", Schema::Integer(IntegerSchema::new().min(0)))], vec![]).unwrap();
        let schema = ServiceSchema::new("echo", vec![("ping".to_string(), method_schema)]).unwrap();
        registry
            .register_service_with_instance(Arc::new(Echo { schema }))
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn call_service_method_validates_against_the_methods_own_schema() {
        let registry = registry_with_echo();
        let mut bad = indexmap::IndexMap::new();
        bad.insert("n".to_string(), json!(-1));
        let err = registry
            .call_service_method(CancellationToken::new(), "echo", "ping", FunctionData::from_map(bad))
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::Validation(_)));
    }

    #[test]
    fn schema_only_registration_has_no_callable_method() {
        let registry = ServiceRegistry::new();
        let schema = ServiceSchema::new("s", vec![]).unwrap();
        registry.register_service(schema).unwrap();
        assert!(registry.get_service_method("s", "anything").is_none());
    }
}
