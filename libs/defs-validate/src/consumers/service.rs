use defs_schema::Schema;
use serde_json::Value;

use crate::consumer::{ValidationCtx, ValueConsumer};
use crate::result::ValidationResult;
use crate::ValidationEngine;

/// Services carry no value-level constraints of their own — method
/// arguments are validated separately, against each method's own
/// `FunctionSchema`, by `ServiceRegistry::call_service_method` re-entering
/// the engine directly rather than through this consumer. So this consumer
/// accepts any value.
pub struct ServiceConsumer;

impl ValueConsumer for ServiceConsumer {
    fn name(&self) -> &'static str {
        "service"
    }

    fn applicable(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::Service(_))
    }

    fn process(
        &self,
        _engine: &ValidationEngine,
        _ctx: &ValidationCtx,
        _schema: &Schema,
        _value: &Value,
    ) -> ValidationResult {
        ValidationResult::ok()
    }
}
