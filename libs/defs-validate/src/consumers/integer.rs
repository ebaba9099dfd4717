use defs_schema::Schema;
use serde_json::Value;

use crate::consumer::{ValidationCtx, ValueConsumer};
use crate::result::{ValidationIssue, ValidationResult};
use crate::ValidationEngine;

/// Validates integer-shaped JSON values against `min`/`max`/`enum_values`.
/// Accepts any integer width plus whole-valued floats (`3.0` passes,
/// `3.5` doesn't) without mutating the input — coercion to a truncated
/// value, if wanted, is the caller's job.
pub struct IntegerConsumer;

impl ValueConsumer for IntegerConsumer {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn applicable(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::Integer(_))
    }

    fn process(
        &self,
        _engine: &ValidationEngine,
        ctx: &ValidationCtx,
        schema: &Schema,
        value: &Value,
    ) -> ValidationResult {
        let Schema::Integer(s) = schema else {
            return ValidationResult::ok();
        };

        let n: i64 = if let Some(i) = value.as_i64() {
            i
        } else if let Some(u) = value.as_u64() {
            match i64::try_from(u) {
                Ok(i) => i,
                Err(_) => {
                    return ValidationResult::single_error(ValidationIssue::new(
                        ctx.path.clone(),
                        "number_too_large",
                        format!("{u} exceeds the representable integer range"),
                    ));
                }
            }
        } else if let Some(f) = value.as_f64() {
            if f.fract() != 0.0 || !f.is_finite() {
                return ValidationResult::single_error(
                    ValidationIssue::new(ctx.path.clone(), "not_integer", "expected a whole number")
                        .with_value(value.clone()),
                );
            }
            f as i64
        } else {
            return ValidationResult::single_error(
                ValidationIssue::new(ctx.path.clone(), "type_mismatch", "expected an integer")
                    .with_value(value.clone())
                    .with_expected("integer".into()),
            );
        };

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
            if !values.contains(&n) {
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
