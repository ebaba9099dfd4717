use thiserror::Error;

/// Construction-time invariant violation.
///
/// Schemas are validated once, at construction, so that every `Schema` value
/// reachable afterwards is known-good. This mirrors a general preference
/// for returning `Result` from fallible constructors rather than panicking
/// deep inside unrelated code paths.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("required property '{0}' is not present in `properties`")]
    RequiredPropertyMissing(String),

    #[error("duplicate property name '{0}' in object schema")]
    DuplicateProperty(String),

    #[error("required input '{0}' is not present in `inputs`")]
    RequiredInputMissing(String),

    #[error("duplicate input name '{0}' in function schema")]
    DuplicateInput(String),

    #[error("duplicate output name '{0}' in function schema")]
    DuplicateOutput(String),

    #[error("duplicate method name '{0}' in service schema")]
    DuplicateMethod(String),
}
