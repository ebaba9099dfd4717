use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::metadata::SchemaMetadata;
use crate::param::Param;
use crate::Schema;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub metadata: SchemaMetadata,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub errors: Option<Arc<Schema>>,
    #[serde(default)]
    pub examples: Vec<serde_json::Value>,
}

impl PartialEq for FunctionSchema {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.examples == other.examples
            && match (&self.errors, &other.errors) {
                (Some(a), Some(b)) => **a == **b,
                (None, None) => true,
                _ => false,
            }
    }
}

impl FunctionSchema {
    /// Builds a function schema, checking that input/output names are unique
    /// within their own sequence (required names are simply the non-optional
    /// inputs — see `required_inputs`).
    pub fn new(inputs: Vec<Param>, outputs: Vec<Param>) -> Result<Self, SchemaError> {
        check_unique(&inputs, SchemaError::DuplicateInput)?;
        check_unique(&outputs, SchemaError::DuplicateOutput)?;
        Ok(Self {
            metadata: SchemaMetadata::default(),
            inputs,
            outputs,
            errors: None,
            examples: Vec::new(),
        })
    }

    pub fn with_errors(mut self, errors: Schema) -> Self {
        self.errors = Some(Arc::new(errors));
        self
    }

    pub fn with_example(mut self, example: serde_json::Value) -> Self {
        self.examples.push(example);
        self
    }

    /// Names of every non-optional input, in declaration order.
    pub fn required_inputs(&self) -> Vec<&str> {
        self.inputs
            .iter()
            .filter(|p| !p.optional)
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn input(&self, name: &str) -> Option<&Param> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&Param> {
        self.outputs.iter().find(|p| p.name == name)
    }
}

fn check_unique(
    params: &[Param],
    err: fn(String) -> SchemaError,
) -> Result<(), SchemaError> {
    let mut seen = std::collections::HashSet::with_capacity(params.len());
    for p in params {
        if !seen.insert(p.name.as_str()) {
            return Err(err(p.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::IntegerSchema;

    #[test]
    fn rejects_duplicate_input_names() {
        let err = FunctionSchema::new(
            vec![
                Param::required("a", Schema::Integer(IntegerSchema::new())),
                Param::required("a", Schema::Integer(IntegerSchema::new())),
            ],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateInput("a".into()));
    }

    #[test]
    fn required_inputs_excludes_optional() {
        let schema = FunctionSchema::new(
            vec![
                Param::required("a", Schema::Integer(IntegerSchema::new())),
                Param::optional("b", Schema::Integer(IntegerSchema::new())),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(schema.required_inputs(), vec!["a"]);
    }
}
