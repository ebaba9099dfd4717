use std::sync::Arc;

use defs_schema::Schema;
use serde_json::Value;

use crate::result::{Path, ValidationResult};

/// Ambient context threaded through a single top-level `validate` call,
/// extended by the engine (never by a consumer) as recursion descends into
/// array items or object properties.
#[derive(Debug, Clone)]
pub struct ValidationCtx {
    pub path: Path,
}

impl ValidationCtx {
    pub fn root() -> Self {
        Self { path: Path::root() }
    }

    pub(crate) fn child_property(&self, name: impl Into<String>) -> Self {
        Self {
            path: self.path.child_property(name),
        }
    }

    pub(crate) fn child_index(&self, index: usize) -> Self {
        Self {
            path: self.path.child_index(index),
        }
    }
}

/// A capability-dispatched value consumer: selected by `applicable`, invoked
/// by `process`. The validation engine is the only built-in purpose today,
/// but the trait itself is purpose-agnostic so that
/// external collaborators (generators, example producers) can register their
/// own consumers against the same predicate/dispatch machinery.
pub trait ValueConsumer: Send + Sync {
    /// Stable identifier, used only for diagnostics (`ConsumerError`).
    fn name(&self) -> &'static str;

    /// The purpose this consumer serves; the built-in engine only invokes
    /// consumers tagged `"validation"`.
    fn purpose(&self) -> &'static str {
        "validation"
    }

    /// Whether this consumer has anything to say about `schema`.
    fn applicable(&self, schema: &Schema) -> bool;

    /// Validate `value` against `schema`. Only called when `applicable`
    /// returned `true` for the same schema (Testable Property 4).
    fn process(&self, engine: &super::ValidationEngine, ctx: &ValidationCtx, schema: &Schema, value: &Value) -> ValidationResult;
}

pub type Consumer = Arc<dyn ValueConsumer>;
