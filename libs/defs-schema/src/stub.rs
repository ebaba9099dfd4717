use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::metadata::SchemaMetadata;
use crate::Schema;

/// A value must satisfy at least one of `variants` (the only non-Union/core
/// variant required for minimal conformance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnionSchema {
    pub metadata: SchemaMetadata,
    pub variants: Vec<Arc<Schema>>,
}

impl PartialEq for UnionSchema {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.variants.len() == other.variants.len()
            && self
                .variants
                .iter()
                .zip(other.variants.iter())
                .all(|(a, b)| **a == **b)
    }
}

impl UnionSchema {
    pub fn new(variants: Vec<Schema>) -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            variants: variants.into_iter().map(Arc::new).collect(),
        }
    }
}

/// Named indirection to a schema defined elsewhere, resolved by the *consumer*
/// of the schema graph (builders/generators), not by this crate — the core
/// only needs to carry the reference name and the shared contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefSchema {
    pub metadata: SchemaMetadata,
    pub reference: String,
}

impl RefSchema {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            reference: reference.into(),
        }
    }
}

/// Homogeneous string-keyed mapping, as distinct from `ObjectSchema`'s fixed
/// property set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSchema {
    pub metadata: SchemaMetadata,
    pub values: Arc<Schema>,
}

impl PartialEq for MapSchema {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata && *self.values == *other.values
    }
}

impl MapSchema {
    pub fn new(values: Schema) -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            values: Arc::new(values),
        }
    }
}

/// A schema that additionally admits `null`/absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionalSchema {
    pub metadata: SchemaMetadata,
    pub inner: Arc<Schema>,
}

impl PartialEq for OptionalSchema {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata && *self.inner == *other.inner
    }
}

impl OptionalSchema {
    pub fn new(inner: Schema) -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            inner: Arc::new(inner),
        }
    }
}

/// Success/error pair, for consumers that want to model fallible values as data
/// rather than relying on `FunctionSchema::errors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSchema {
    pub metadata: SchemaMetadata,
    pub ok: Arc<Schema>,
    pub err: Arc<Schema>,
}

impl PartialEq for ResultSchema {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata && *self.ok == *other.ok && *self.err == *other.err
    }
}

impl ResultSchema {
    pub fn new(ok: Schema, err: Schema) -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            ok: Arc::new(ok),
            err: Arc::new(err),
        }
    }
}

/// A named, generic slot — used by code generators to represent type
/// parameters; carried here only so the variant set stays closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub metadata: SchemaMetadata,
    pub name: String,
    pub bound: Option<String>,
}

impl ParameterSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: SchemaMetadata::default(),
            name: name.into(),
            bound: None,
        }
    }
}

/// Accepts any value whatsoever.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnySchema {
    pub metadata: SchemaMetadata,
}

/// Accepts only `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NullSchema {
    pub metadata: SchemaMetadata,
}
