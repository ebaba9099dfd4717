use std::collections::HashSet;

use defs_schema::Schema;
use serde_json::Value;

use crate::consumer::{ValidationCtx, ValueConsumer};
use crate::result::{ValidationIssue, ValidationResult};
use crate::ValidationEngine;

/// Validates JSON arrays: size bounds first, then item uniqueness, then
/// per-item recursive validation, then the existential `contains` check.
pub struct ArrayConsumer;

impl ValueConsumer for ArrayConsumer {
    fn name(&self) -> &'static str {
        "array"
    }

    fn applicable(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::Array(_))
    }

    fn process(
        &self,
        engine: &ValidationEngine,
        ctx: &ValidationCtx,
        schema: &Schema,
        value: &Value,
    ) -> ValidationResult {
        let Schema::Array(s) = schema else {
            return ValidationResult::ok();
        };

        let Some(items) = value.as_array() else {
            return ValidationResult::single_error(
                ValidationIssue::new(ctx.path.clone(), "type_mismatch", "expected an array")
                    .with_value(value.clone())
                    .with_expected("array".into()),
            );
        };

        let mut errors = Vec::new();
        let len = items.len();
        if let Some(min) = s.min_items {
            if len < min {
                errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "min_items_violation",
                    format!("array has {len} items, minimum is {min}"),
                ));
            }
        }
        if let Some(max) = s.max_items {
            if len > max {
                errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "max_items_violation",
                    format!("array has {len} items, maximum is {max}"),
                ));
            }
        }

        if s.unique_items {
            let mut seen = HashSet::with_capacity(len);
            for item in items {
                let canonical = serde_json::to_string(item).unwrap_or_default();
                if !seen.insert(canonical) {
                    errors.push(ValidationIssue::new(
                        ctx.path.clone(),
                        "unique_items_violation",
                        "array items must be unique",
                    ));
                    break;
                }
            }
        }

        if let Some(item_schema) = &s.items {
            for (i, item) in items.iter().enumerate() {
                let child_ctx = ctx.child_index(i);
                let result = engine.validate_with_ctx(&child_ctx, item_schema, item);
                errors.extend(result.errors);
            }
        }

        if let Some(contains) = &s.contains {
            let satisfied = items
                .iter()
                .enumerate()
                .any(|(i, item)| engine.validate_with_ctx(&ctx.child_index(i), contains, item).valid);
            if !satisfied {
                errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "contains_violation",
                    "no item satisfies the required 'contains' schema",
                ));
            }
        }

        ValidationResult::from_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use defs_schema::IntegerSchema;
    use serde_json::json;

    use super::*;
    use crate::ValidationEngine;

    fn engine() -> ValidationEngine {
        ValidationEngine::with_builtin_consumers()
    }

    #[test]
    fn enforces_size_bounds() {
        let schema = Schema::Array(defs_schema::ArraySchema::new().min_items(1).max_items(2));
        assert!(!engine().validate(&schema, &json!([])).valid);
        assert!(engine().validate(&schema, &json!([1])).valid);
        assert!(!engine().validate(&schema, &json!([1, 2, 3])).valid);
    }

    #[test]
    fn rejects_duplicate_items_when_unique() {
        let schema = Schema::Array(defs_schema::ArraySchema::new().unique_items());
        assert!(!engine().validate(&schema, &json!([1, 1])).valid);
        assert!(engine().validate(&schema, &json!([1, 2])).valid);
    }

    #[test]
    fn recurses_into_items_with_indexed_path() {
        let schema = Schema::Array(
            defs_schema::ArraySchema::new().items(Schema::Integer(IntegerSchema::new().min(0))),
        );
        let result = engine().validate(&schema, &json!([1, -1]));
        assert!(!result.valid);
        assert_eq!(result.errors[0].path.to_string(), "[1]");
    }

    #[test]
    fn contains_requires_at_least_one_match() {
        let schema = Schema::Array(
            defs_schema::ArraySchema::new().contains(Schema::Integer(IntegerSchema::new().min(10))),
        );
        assert!(engine().validate(&schema, &json!([1, 20])).valid);
        assert!(!engine().validate(&schema, &json!([1, 2])).valid);
    }
}
