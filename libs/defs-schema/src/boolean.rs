use serde::{Deserialize, Serialize};

use crate::metadata::SchemaMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanSchema {
    pub metadata: SchemaMetadata,
    pub default: Option<bool>,
    /// When set, the string consumer accepts the textual forms enumerated in
    /// the accepted string forms (`"true"/"false"/"1"/"0"/"yes"/"no"/"on"/"off"/
    /// "y"/"n"/"t"/"f"`, case-insensitive).
    pub allow_string_conversion: bool,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            default: None,
            allow_string_conversion: false,
        }
    }

    pub fn default_value(mut self, d: bool) -> Self {
        self.default = Some(d);
        self
    }

    pub fn allow_string_conversion(mut self) -> Self {
        self.allow_string_conversion = true;
        self
    }
}

impl Default for BooleanSchema {
    fn default() -> Self {
        Self::new()
    }
}
