use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Schema;

/// One named slot of a `FunctionSchema`'s `inputs` or `outputs` sequence.
///
/// Order is preserved (an `IndexMap`-free `Vec` is enough here since
/// `FunctionSchema` enforces name uniqueness itself at construction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub schema: Arc<Schema>,
    pub optional: bool,
    pub default: Option<serde_json::Value>,
}

impl Param {
    pub fn required(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema: Arc::new(schema),
            optional: false,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema: Arc::new(schema),
            optional: true,
            default: None,
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.optional == other.optional
            && self.default == other.default
            && *self.schema == *other.schema
    }
}
