use defs_schema::Schema;
use serde_json::Value;

use crate::consumer::{ValidationCtx, ValueConsumer};
use crate::result::{ValidationIssue, ValidationResult};
use crate::ValidationEngine;

const TRUE_STRINGS: &[&str] = &["true", "1", "yes", "on", "y", "t"];
const FALSE_STRINGS: &[&str] = &["false", "0", "no", "off", "n", "f"];

/// Validates native booleans, plus a fixed set of case-insensitive textual
/// forms when the schema opts into `allow_string_conversion`.
pub struct BooleanConsumer;

impl ValueConsumer for BooleanConsumer {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn applicable(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::Boolean(_))
    }

    fn process(
        &self,
        _engine: &ValidationEngine,
        ctx: &ValidationCtx,
        schema: &Schema,
        value: &Value,
    ) -> ValidationResult {
        let Schema::Boolean(s) = schema else {
            return ValidationResult::ok();
        };

        if value.as_bool().is_some() {
            return ValidationResult::ok();
        }

        if s.allow_string_conversion {
            if let Some(text) = value.as_str() {
                let lower = text.to_ascii_lowercase();
                if TRUE_STRINGS.contains(&lower.as_str()) || FALSE_STRINGS.contains(&lower.as_str()) {
                    return ValidationResult::ok();
                }
            }
        }

        ValidationResult::single_error(
            ValidationIssue::new(ctx.path.clone(), "type_mismatch", "expected a boolean")
                .with_value(value.clone())
                .with_expected("boolean".into()),
        )
    }
}
