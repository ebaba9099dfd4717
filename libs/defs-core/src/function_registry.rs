use std::sync::Arc;

use defs_errors::RegistryError;
use defs_schema::Schema;
use defs_validate::{ValidationEngine, ValidationResult};
use parking_lot::RwLock;
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::error::CallError;
use crate::function::Function;
use crate::function_data::FunctionData;

struct Entry {
    function: Arc<dyn Function>,
    validate_on_call: bool,
}

/// Name-keyed, concurrency-safe registry of `Function`s.
///
/// Guarded by a single reader/writer lock, the same shape as the teacher's
/// `ClientHub` — read-heavy lookups (`get`, `call`) take the read side,
/// mutation (`register`, `unregister`, `clear`) takes the write side.
/// Insertion order is preserved so `list()` has a stable, observable order.
pub struct FunctionRegistry {
    functions: RwLock<IndexMap<String, Entry>>,
    engine: ValidationEngine,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(IndexMap::new()),
            engine: ValidationEngine::with_builtin_consumers(),
        }
    }

    pub fn register(&self, function: Arc<dyn Function>, validate_on_call: bool) -> Result<(), RegistryError> {
        let name = function.name().to_string();
        let mut w = self.functions.write();
        if w.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        w.insert(name, Entry { function, validate_on_call });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.read().get(name).map(|e| e.function.clone())
    }

    pub fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        let mut w = self.functions.write();
        w.shift_remove(name).map(|_| ()).ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Validates input against the function's schema only when a schema
    /// is present and the function was registered with `validate_on_call:
    /// true`, invokes the handler, and returns its result.
    pub async fn call(
        &self,
        ctx: CancellationToken,
        name: &str,
        input: FunctionData,
    ) -> Result<FunctionData, CallError> {
        let (function, validate_on_call) = {
            let r = self.functions.read();
            let entry = r.get(name).ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
            (entry.function.clone(), entry.validate_on_call)
        };

        if validate_on_call {
            let result = self.validate_against(&function, &input);
            if !result.valid {
                return Err(CallError::Validation(result));
            }
        }

        function.call(ctx, input).await.map_err(CallError::Handler)
    }

    /// Validates `input` against `name`'s schema regardless of its
    /// `validate_on_call` flag — used when a caller wants an explicit
    /// validation pass without invoking the handler.
    pub fn validate(&self, name: &str, input: &FunctionData) -> Result<ValidationResult, RegistryError> {
        let function = self.get(name).ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        Ok(self.validate_against(&function, input))
    }

    fn validate_against(&self, function: &Arc<dyn Function>, input: &FunctionData) -> ValidationResult {
        let schema = Schema::Function(function.schema().clone());
        self.engine.validate(&schema, &input.value())
    }

    pub fn list(&self) -> Vec<String> {
        self.functions.read().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.functions.read().len()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.functions.read().contains_key(name)
    }

    pub fn clear(&self) {
        self.functions.write().clear();
    }
}

impl Default for FunctionRegistry {
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

    fn greet() -> Arc<dyn Function> {
        Arc::new(SimpleFunction::new(
            "greet",
            FunctionSchema::new(vec![Param::required("n", Schema::Integer(IntegerSchema::new().min(0)))], vec![]).unwrap(),
            |_ctx, input| async move { Ok(input) },
        ))
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let registry = FunctionRegistry::new();
        registry.register(greet(), false).unwrap();
        let err = registry.register(greet(), false).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("greet".into()));
    }

    #[tokio::test]
    async fn call_validates_input_when_requested() {
        let registry = FunctionRegistry::new();
        registry.register(greet(), true).unwrap();

        let mut bad = indexmap::IndexMap::new();
        bad.insert("n".to_string(), json!(-1));
        let err = registry.call(CancellationToken::new(), "greet", FunctionData::from_map(bad)).await.unwrap_err();
        assert!(matches!(err, CallError::Validation(_)));

        let mut good = indexmap::IndexMap::new();
        good.insert("n".to_string(), json!(5));
        let ok = registry.call(CancellationToken::new(), "greet", FunctionData::from_map(good)).await.unwrap();
        assert_eq!(ok.get("n"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn call_on_unknown_name_is_not_found() {
        let registry = FunctionRegistry::new();
        let err = registry.call(CancellationToken::new(), "missing", FunctionData::empty()).await.unwrap_err();
        assert!(matches!(err, CallError::Registry(RegistryError::NotFound(_))));
    }
}
