//! # defs-validate
//!
//! The capability-dispatched validation engine: a
//! read-only-after-construction registry of [`ValueConsumer`]s, each
//! declaring a predicate over schema variants and a `process` method that
//! produces a [`ValidationResult`]. `ValidationEngine::validate` dispatches
//! every applicable consumer in registration order and merges their results;
//! composite consumers (Array, Object, Function) recurse back through the
//! engine so that none of them needs to know the full schema-variant
//! universe.

use std::sync::Arc;

pub mod consumer;
pub mod consumers;
pub mod result;

pub use consumer::{Consumer, ValidationCtx, ValueConsumer};
pub use defs_schema::Schema;
pub use result::{Path, PathSegment, ValidationIssue, ValidationResult};
/// Arbitrary dynamic value validated against a `Schema`. Re-exported from
/// `serde_json` rather than hand-rolled — see SPEC_FULL.md §3.2.
pub use serde_json::Value;

/// Owns an immutable, ordered set of [`ValueConsumer`]s and dispatches
/// `validate` calls across whichever of them declare themselves `applicable`
/// to the schema at hand. Once constructed the engine never mutates its
/// consumer list (registries of consumers are read-only after
/// initialization), so `&ValidationEngine` can be shared freely across
/// threads without locking.
pub struct ValidationEngine {
    consumers: Vec<Consumer>,
}

impl ValidationEngine {
    /// Builds an engine with an explicit, caller-chosen consumer list. Useful
    /// for tests that want to isolate a single consumer, or for embedding
    /// additional purpose-tagged consumers (generators, example producers)
    /// alongside the built-in validation set.
    pub fn new(consumers: Vec<Consumer>) -> Self {
        Self { consumers }
    }

    /// The complete built-in consumer set for core types (in the same
    /// table), registered in the order the table lists them.
    pub fn with_builtin_consumers() -> Self {
        Self::new(vec![
            Arc::new(consumers::string::StringConsumer) as Consumer,
            Arc::new(consumers::number::NumberConsumer) as Consumer,
            Arc::new(consumers::integer::IntegerConsumer) as Consumer,
            Arc::new(consumers::boolean::BooleanConsumer) as Consumer,
            Arc::new(consumers::array::ArrayConsumer) as Consumer,
            Arc::new(consumers::object::ObjectConsumer) as Consumer,
            Arc::new(consumers::function::FunctionConsumer) as Consumer,
            Arc::new(consumers::service::ServiceConsumer) as Consumer,
        ])
    }

    pub fn consumers(&self) -> &[Consumer] {
        &self.consumers
    }

    /// Top-level entry point: validates `value` against `schema` starting at
    /// the root path.
    pub fn validate(&self, schema: &Schema, value: &Value) -> ValidationResult {
        self.validate_with_ctx(&ValidationCtx::root(), schema, value)
    }

    /// Recursion entry point used by composite consumers (and by external
    /// consumers that embed this engine) to validate a nested value while
    /// preserving/extending the path already accumulated in `ctx`.
    pub fn validate_with_ctx(
        &self,
        ctx: &ValidationCtx,
        schema: &Schema,
        value: &Value,
    ) -> ValidationResult {
        let mut applicable = self
            .consumers
            .iter()
            .filter(|c| c.purpose() == "validation" && c.applicable(schema))
            .peekable();

        if applicable.peek().is_none() {
            return ValidationResult::ok().with_metadata(serde_json::json!({
                "note": "no applicable consumer for this schema; passed vacuously",
                "type_tag": schema.type_tag(),
            }));
        }

        applicable.fold(ValidationResult::ok(), |acc, consumer| {
            acc.merge(consumer.process(self, ctx, schema, value))
        })
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_builtin_consumers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defs_schema::{IntegerSchema, StringSchema};
    use serde_json::json;

    #[test]
    fn unmatched_schema_passes_vacuously() {
        let engine = ValidationEngine::new(vec![]);
        let schema = Schema::String(StringSchema::new());
        let result = engine.validate(&schema, &json!("hello"));
        assert!(result.valid);
        assert!(result.metadata.is_some());
    }

    #[test]
    fn consumer_not_applicable_is_never_invoked() {
        struct Panicky;
        impl ValueConsumer for Panicky {
            fn name(&self) -> &'static str {
                "panicky"
            }
            fn applicable(&self, _schema: &Schema) -> bool {
                false
            }
            fn process(
                &self,
                _engine: &ValidationEngine,
                _ctx: &ValidationCtx,
                _schema: &Schema,
                _value: &Value,
            ) -> ValidationResult {
                panic!("must not be called");
            }
        }

        let engine = ValidationEngine::new(vec![Arc::new(Panicky) as Consumer]);
        let schema = Schema::Integer(IntegerSchema::new());
        let result = engine.validate(&schema, &json!(1));
        assert!(result.valid);
    }
}
