use defs_schema::Schema;
use serde_json::Value;

use crate::consumer::{ValidationCtx, ValueConsumer};
use crate::result::{ValidationIssue, ValidationResult};
use crate::ValidationEngine;

/// Validates JSON objects: required properties first, then unknown
/// properties against `additional_properties`, then known properties
/// recursively, then `min_properties`/`max_properties` last.
pub struct ObjectConsumer;

impl ValueConsumer for ObjectConsumer {
    fn name(&self) -> &'static str {
        "object"
    }

    fn applicable(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::Object(_))
    }

    fn process(
        &self,
        engine: &ValidationEngine,
        ctx: &ValidationCtx,
        schema: &Schema,
        value: &Value,
    ) -> ValidationResult {
        let Schema::Object(s) = schema else {
            return ValidationResult::ok();
        };

        let Some(map) = value.as_object() else {
            return ValidationResult::single_error(
                ValidationIssue::new(ctx.path.clone(), "type_mismatch", "expected an object")
                    .with_value(value.clone())
                    .with_expected("object".into()),
            );
        };

        let mut errors = Vec::new();

        for name in &s.required {
            if !map.contains_key(name) {
                errors.push(ValidationIssue::new(
                    ctx.child_property(name.clone()).path,
                    "missing_required_property",
                    format!("required property '{name}' is missing"),
                ));
            }
        }

        for (name, actual) in map {
            match s.properties.get(name) {
                Some(prop_schema) => {
                    let child_ctx = ctx.child_property(name.clone());
                    let result = engine.validate_with_ctx(&child_ctx, prop_schema, actual);
                    errors.extend(result.errors);
                }
                None if !s.additional_properties => {
                    errors.push(ValidationIssue::new(
                        ctx.child_property(name.clone()).path,
                        "additional_property_not_allowed",
                        format!("property '{name}' is not declared and additional properties are disallowed"),
                    ));
                }
                None => {}
            }
        }

        let count = map.len();
        if let Some(min) = s.min_properties {
            if count < min {
                errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "min_properties_violation",
                    format!("object has {count} properties, minimum is {min}"),
                ));
            }
        }
        if let Some(max) = s.max_properties {
            if count > max {
                errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "max_properties_violation",
                    format!("object has {count} properties, maximum is {max}"),
                ));
            }
        }

        ValidationResult::from_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use defs_schema::StringSchema;
    use serde_json::json;

    use super::*;
    use crate::ValidationEngine;

    fn engine() -> ValidationEngine {
        ValidationEngine::with_builtin_consumers()
    }

    fn schema() -> Schema {
        Schema::Object(
            defs_schema::ObjectSchema::new(
                vec![("name".into(), Schema::String(StringSchema::new()))],
                vec!["name".into()],
                false,
            )
            .unwrap(),
        )
    }

    #[test]
    fn flags_missing_required_property() {
        let result = engine().validate(&schema(), &json!({}));
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, "missing_required_property");
    }

    #[test]
    fn rejects_additional_property_when_disallowed() {
        let result = engine().validate(&schema(), &json!({"name": "a", "extra": 1}));
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.code == "additional_property_not_allowed"));
    }

    #[test]
    fn checks_size_bounds_even_with_additional_properties_allowed() {
        let open = Schema::Object(
            defs_schema::ObjectSchema::new(vec![], vec![], true)
                .unwrap()
                .min_properties(1),
        );
        assert!(!engine().validate(&open, &json!({})).valid);
        assert!(engine().validate(&open, &json!({"anything": 1})).valid);
    }
}
