use serde::{Deserialize, Serialize};

use crate::metadata::SchemaMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringSchema {
    pub metadata: SchemaMetadata,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Regex source; compiled lazily by the validation engine, not stored here,
    /// so that `StringSchema` stays plain data and cheap to clone.
    pub pattern: Option<String>,
    pub format: Option<StringFormat>,
    pub enum_values: Option<Vec<String>>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    Email,
    Uuid,
    Uri,
    DateTime,
}

impl StringSchema {
    pub fn new() -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            enum_values: None,
            default: None,
        }
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, p: impl Into<String>) -> Self {
        self.pattern = Some(p.into());
        self
    }

    pub fn format(mut self, f: StringFormat) -> Self {
        self.format = Some(f);
        self
    }

    pub fn enum_values(mut self, values: Vec<String>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn default_value(mut self, d: impl Into<String>) -> Self {
        self.default = Some(d.into());
        self
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}
