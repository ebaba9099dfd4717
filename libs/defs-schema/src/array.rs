use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::metadata::SchemaMetadata;
use crate::Schema;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArraySchema {
    pub metadata: SchemaMetadata,
    pub items: Option<Arc<Schema>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    #[serde(default)]
    pub unique_items: bool,
    /// Existential: at least one item must satisfy this schema.
    pub contains: Option<Arc<Schema>>,
}

impl PartialEq for ArraySchema {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.min_items == other.min_items
            && self.max_items == other.max_items
            && self.unique_items == other.unique_items
            && opt_schema_eq(&self.items, &other.items)
            && opt_schema_eq(&self.contains, &other.contains)
    }
}

fn opt_schema_eq(a: &Option<Arc<Schema>>, b: &Option<Arc<Schema>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => **a == **b,
        (None, None) => true,
        _ => false,
    }
}

impl ArraySchema {
    pub fn new() -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            items: None,
            min_items: None,
            max_items: None,
            unique_items: false,
            contains: None,
        }
    }

    pub fn items(mut self, items: Schema) -> Self {
        self.items = Some(Arc::new(items));
        self
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn unique_items(mut self) -> Self {
        self.unique_items = true;
        self
    }

    pub fn contains(mut self, schema: Schema) -> Self {
        self.contains = Some(Arc::new(schema));
        self
    }
}

impl Default for ArraySchema {
    fn default() -> Self {
        Self::new()
    }
}
