use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::metadata::SchemaMetadata;
use crate::Schema;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub metadata: SchemaMetadata,
    pub properties: IndexMap<String, Arc<Schema>>,
    pub required: IndexSet<String>,
    #[serde(default = "default_additional_properties")]
    pub additional_properties: bool,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
}

fn default_additional_properties() -> bool {
    true
}

impl PartialEq for ObjectSchema {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.required == other.required
            && self.additional_properties == other.additional_properties
            && self.min_properties == other.min_properties
            && self.max_properties == other.max_properties
            && self.properties.len() == other.properties.len()
            && self
                .properties
                .iter()
                .all(|(k, v)| other.properties.get(k).is_some_and(|ov| **v == **ov))
    }
}

impl ObjectSchema {
    /// Builds an object schema from an ordered `(name, schema)` sequence plus the
    /// required-name set, checking that every name in
    /// `required` must appear in `properties`.
    pub fn new(
        properties: Vec<(String, Schema)>,
        required: Vec<String>,
        additional_properties: bool,
    ) -> Result<Self, SchemaError> {
        let mut map = IndexMap::with_capacity(properties.len());
        for (name, schema) in properties {
            if map.insert(name.clone(), Arc::new(schema)).is_some() {
                return Err(SchemaError::DuplicateProperty(name));
            }
        }

        let required_set: IndexSet<String> = required.into_iter().collect();
        for name in &required_set {
            if !map.contains_key(name) {
                return Err(SchemaError::RequiredPropertyMissing(name.clone()));
            }
        }

        Ok(Self {
            metadata: SchemaMetadata::default(),
            properties: map,
            required: required_set,
            additional_properties,
            min_properties: None,
            max_properties: None,
        })
    }

    pub fn min_properties(mut self, n: usize) -> Self {
        self.min_properties = Some(n);
        self
    }

    pub fn max_properties(mut self, n: usize) -> Self {
        self.max_properties = Some(n);
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string::StringSchema;

    #[test]
    fn rejects_required_not_in_properties() {
        let err = ObjectSchema::new(
            vec![("name".into(), Schema::String(StringSchema::new()))],
            vec!["age".into()],
            true,
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::RequiredPropertyMissing("age".into()));
    }

    #[test]
    fn rejects_duplicate_property_names() {
        let err = ObjectSchema::new(
            vec![
                ("name".into(), Schema::String(StringSchema::new())),
                ("name".into(), Schema::String(StringSchema::new())),
            ],
            vec![],
            true,
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateProperty("name".into()));
    }

    #[test]
    fn accepts_well_formed_schema() {
        let obj = ObjectSchema::new(
            vec![("name".into(), Schema::String(StringSchema::new()))],
            vec!["name".into()],
            false,
        )
        .unwrap();
        assert!(obj.is_required("name"));
        assert!(!obj.additional_properties);
    }
}
