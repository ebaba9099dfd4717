use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Immutable descriptive metadata shared by every schema variant.
///
/// `SchemaMetadata` is never mutated in place; `Schema::with_metadata` always
/// produces a new `Schema` value carrying a replacement `SchemaMetadata`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub examples: Vec<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form property bag for extensions that don't warrant a dedicated field.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl SchemaMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_example(mut self, example: serde_json::Value) -> Self {
        self.examples.push(example);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_accumulate() {
        let m = SchemaMetadata::new()
            .with_name("age")
            .with_description("years alive")
            .with_tag("core")
            .with_tag("numeric")
            .with_example(serde_json::json!(42))
            .with_property("unit", serde_json::json!("years"));

        assert_eq!(m.name.as_deref(), Some("age"));
        assert_eq!(m.description.as_deref(), Some("years alive"));
        assert_eq!(m.tags, vec!["core", "numeric"]);
        assert_eq!(m.examples, vec![serde_json::json!(42)]);
        assert_eq!(m.properties["unit"], serde_json::json!("years"));
    }

    #[test]
    fn default_is_empty() {
        let m = SchemaMetadata::default();
        assert!(m.name.is_none());
        assert!(m.examples.is_empty());
        assert!(m.tags.is_empty());
        assert!(m.properties.is_empty());
    }
}
