use serde::{Deserialize, Serialize};

use crate::metadata::SchemaMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegerSchema {
    pub metadata: SchemaMetadata,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub enum_values: Option<Vec<i64>>,
    pub default: Option<i64>,
}

impl IntegerSchema {
    pub fn new() -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            min: None,
            max: None,
            enum_values: None,
            default: None,
        }
    }

    pub fn min(mut self, n: i64) -> Self {
        self.min = Some(n);
        self
    }

    pub fn max(mut self, n: i64) -> Self {
        self.max = Some(n);
        self
    }

    pub fn enum_values(mut self, values: Vec<i64>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn default_value(mut self, d: i64) -> Self {
        self.default = Some(d);
        self
    }
}

impl Default for IntegerSchema {
    fn default() -> Self {
        Self::new()
    }
}
