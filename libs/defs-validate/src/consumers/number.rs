use defs_schema::Schema;
use serde_json::Value;

use crate::consumer::{ValidationCtx, ValueConsumer};
use crate::result::{ValidationIssue, ValidationResult};
use crate::ValidationEngine;

/// Validates any numeric JSON value against `min`/`max`/`enum_values`. NaN
/// and infinities are always rejected regardless of bounds.
pub struct NumberConsumer;

impl ValueConsumer for NumberConsumer {
    fn name(&self) -> &'static str {
        "number"
    }

    fn applicable(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::Number(_))
    }

    fn process(
        &self,
        _engine: &ValidationEngine,
        ctx: &ValidationCtx,
        schema: &Schema,
        value: &Value,
    ) -> ValidationResult {
        let Schema::Number(s) = schema else {
            return ValidationResult::ok();
        };

        let Some(n) = value.as_f64() else {
            return ValidationResult::single_error(
                ValidationIssue::new(ctx.path.clone(), "type_mismatch", "expected a number")
                    .with_value(value.clone())
                    .with_expected("number".into()),
            );
        };

        if !n.is_finite() {
            return ValidationResult::single_error(ValidationIssue::new(
                ctx.path.clone(),
                "invalid_number",
                "NaN and infinities are not valid numbers",
            ));
        }

        let mut errors = Vec::new();
        if let Some(min) = s.min {
            if n < min {
                errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "number_too_small",
                    format!("{n} is less than the minimum {min}"),
                ));
            }
        }
        if let Some(max) = s.max {
            if n > max {
                errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "number_too_large",
                    format!("{n} is greater than the maximum {max}"),
                ));
            }
        }
        if let Some(values) = &s.enum_values {
            if !values.iter().any(|v| *v == n) {
                errors.push(
                    ValidationIssue::new(
                        ctx.path.clone(),
                        "enum_mismatch",
                        format!("{n} is not one of the allowed values"),
                    )
                    .with_expected(format!("{values:?}")),
                );
            }
        }

        ValidationResult::from_errors(errors)
    }
}
