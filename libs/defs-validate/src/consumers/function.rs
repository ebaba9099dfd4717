use defs_schema::Schema;
use serde_json::Value;

use crate::consumer::{ValidationCtx, ValueConsumer};
use crate::result::{ValidationIssue, ValidationResult};
use crate::ValidationEngine;

/// Validates a map-shaped call argument against a function's declared
/// inputs: required inputs must be present, and every present input
/// recurses against its own schema. Extra keys not named by any input are
/// left alone — a function's input list isn't an object schema and carries
/// no `additional_properties` flag of its own.
pub struct FunctionConsumer;

impl ValueConsumer for FunctionConsumer {
    fn name(&self) -> &'static str {
        "function"
    }

    fn applicable(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::Function(_))
    }

    fn process(
        &self,
        engine: &ValidationEngine,
        ctx: &ValidationCtx,
        schema: &Schema,
        value: &Value,
    ) -> ValidationResult {
        let Schema::Function(s) = schema else {
            return ValidationResult::ok();
        };

        let Some(map) = value.as_object() else {
            return ValidationResult::single_error(
                ValidationIssue::new(ctx.path.clone(), "type_mismatch", "expected a map-shaped input")
                    .with_value(value.clone())
                    .with_expected("object".into()),
            );
        };

        let mut errors = Vec::new();
        for param in &s.inputs {
            match map.get(&param.name) {
                Some(actual) => {
                    let child_ctx = ctx.child_property(param.name.clone());
                    let result = engine.validate_with_ctx(&child_ctx, &param.schema, actual);
                    errors.extend(result.errors);
                }
                None if !param.optional => {
                    errors.push(ValidationIssue::new(
                        ctx.child_property(param.name.clone()).path,
                        "missing_required_input",
                        format!("required input '{}' is missing", param.name),
                    ));
                }
                None => {}
            }
        }

        ValidationResult::from_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use defs_schema::{FunctionSchema, IntegerSchema, Param};
    use serde_json::json;

    use super::*;
    use crate::ValidationEngine;

    fn engine() -> ValidationEngine {
        ValidationEngine::with_builtin_consumers()
    }

    #[test]
    fn flags_missing_required_input_and_recurses_into_present_ones() {
        let schema = Schema::Function(
            FunctionSchema::new(
                vec![
                    Param::required("id", Schema::Integer(IntegerSchema::new().min(1))),
                    Param::optional("label", Schema::Integer(IntegerSchema::new())),
                ],
                vec![],
            )
            .unwrap(),
        );

        let result = engine().validate(&schema, &json!({"id": 0}));
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, "number_too_small");

        let missing = engine().validate(&schema, &json!({}));
        assert!(missing.errors.iter().any(|e| e.code == "missing_required_input"));
        assert!(!missing.errors.iter().any(|e| e.message.contains("label")));
    }
}
