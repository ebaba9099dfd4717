use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::function::FunctionSchema;
use crate::metadata::SchemaMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchema {
    pub metadata: SchemaMetadata,
    pub name: String,
    pub methods: IndexMap<String, FunctionSchema>,
}

impl ServiceSchema {
    /// Builds a service schema, checking the invariant that method
    /// names are unique (each method's `FunctionSchema` is already fully
    /// constructed by the time it's handed to us, by construction of `FunctionSchema::new`).
    pub fn new(name: impl Into<String>, methods: Vec<(String, FunctionSchema)>) -> Result<Self, SchemaError> {
        let mut map = IndexMap::with_capacity(methods.len());
        for (method_name, schema) in methods {
            if map.insert(method_name.clone(), schema).is_some() {
                return Err(SchemaError::DuplicateMethod(method_name));
            }
        }
        Ok(Self {
            metadata: SchemaMetadata::default(),
            name: name.into(),
            methods: map,
        })
    }

    pub fn method(&self, name: &str) -> Option<&FunctionSchema> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_method_names() {
        let f = FunctionSchema::new(vec![], vec![]).unwrap();
        let err = ServiceSchema::new("svc", vec![("m".into(), f.clone()), ("m".into(), f)]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateMethod("m".into()));
    }
}
