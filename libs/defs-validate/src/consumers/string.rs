use std::sync::OnceLock;

use defs_schema::{Schema, StringFormat};
use regex::Regex;
use serde_json::Value;

use crate::consumer::{ValidationCtx, ValueConsumer};
use crate::result::{ValidationIssue, ValidationResult};
use crate::ValidationEngine;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

fn uuid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
    })
}

fn uri_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://\S+$").unwrap())
}

fn date_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap()
    })
}

/// Validates native strings against `min_length`/`max_length`/`pattern`/
/// `format`/`enum_values`.
pub struct StringConsumer;

impl ValueConsumer for StringConsumer {
    fn name(&self) -> &'static str {
        "string"
    }

    fn applicable(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::String(_))
    }

    fn process(
        &self,
        _engine: &ValidationEngine,
        ctx: &ValidationCtx,
        schema: &Schema,
        value: &Value,
    ) -> ValidationResult {
        let Schema::String(s) = schema else {
            return ValidationResult::ok();
        };

        let Some(text) = value.as_str() else {
            return ValidationResult::single_error(
                ValidationIssue::new(ctx.path.clone(), "type_mismatch", "expected a string")
                    .with_value(value.clone())
                    .with_expected("string".into()),
            );
        };

        let mut errors = Vec::new();
        let len = text.chars().count();

        if let Some(min) = s.min_length {
            if len < min {
                errors.push(
                    ValidationIssue::new(
                        ctx.path.clone(),
                        "string_too_short",
                        format!("string has {len} characters, minimum is {min}"),
                    )
                    .with_value(value.clone()),
                );
            }
        }
        if let Some(max) = s.max_length {
            if len > max {
                errors.push(
                    ValidationIssue::new(
                        ctx.path.clone(),
                        "string_too_long",
                        format!("string has {len} characters, maximum is {max}"),
                    )
                    .with_value(value.clone()),
                );
            }
        }
        if let Some(pattern) = &s.pattern {
            match Regex::new(pattern) {
                Ok(re) if re.is_match(text) => {}
                Ok(_) => errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "pattern_mismatch",
                    format!("does not match pattern '{pattern}'"),
                )),
                Err(e) => errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "pattern_mismatch",
                    format!("schema pattern '{pattern}' is not a valid regex: {e}"),
                )),
            }
        }
        if let Some(format) = s.format {
            let matches = match format {
                StringFormat::Email => email_re().is_match(text),
                StringFormat::Uuid => uuid_re().is_match(text),
                StringFormat::Uri => uri_re().is_match(text),
                StringFormat::DateTime => date_time_re().is_match(text),
            };
            if !matches {
                errors.push(ValidationIssue::new(
                    ctx.path.clone(),
                    "format_invalid",
                    format!("'{text}' is not a valid {format:?}"),
                ));
            }
        }
        if let Some(values) = &s.enum_values {
            if !values.iter().any(|v| v == text) {
                errors.push(
                    ValidationIssue::new(
                        ctx.path.clone(),
                        "enum_mismatch",
                        format!("'{text}' is not one of the allowed values"),
                    )
                    .with_expected(format!("{values:?}")),
                );
            }
        }

        ValidationResult::from_errors(errors)
    }
}
