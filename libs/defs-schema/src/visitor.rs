use crate::array::ArraySchema;
use crate::boolean::BooleanSchema;
use crate::function::FunctionSchema;
use crate::integer::IntegerSchema;
use crate::number::NumberSchema;
use crate::object::ObjectSchema;
use crate::service::ServiceSchema;
use crate::string::StringSchema;
use crate::stub::{
    AnySchema, MapSchema, NullSchema, OptionalSchema, ParameterSchema, RefSchema, ResultSchema,
    UnionSchema,
};

/// Double-dispatch contract for schema consumers that need variant-specific
/// behavior (code generators, custom renderers — this crate supplies
/// only the dispatch mechanism, never an implementation of a generator).
///
/// The trait is total over the closed variant set: `Schema::accept` always
/// matches every variant exhaustively, so introducing a seventeenth variant
/// would be a compile error across every implementor, not a silent
/// fall-through. Conformance-mandated variants (String, Integer, Number,
/// Boolean, Array, Object, Function, Service, Union) have no default body;
/// the remaining reserved stub variants do, since most visitors have nothing
/// variant-specific to say about them.
pub trait SchemaVisitor<T> {
    fn visit_string(&self, schema: &StringSchema) -> T;
    fn visit_integer(&self, schema: &IntegerSchema) -> T;
    fn visit_number(&self, schema: &NumberSchema) -> T;
    fn visit_boolean(&self, schema: &BooleanSchema) -> T;
    fn visit_array(&self, schema: &ArraySchema) -> T;
    fn visit_object(&self, schema: &ObjectSchema) -> T;
    fn visit_function(&self, schema: &FunctionSchema) -> T;
    fn visit_service(&self, schema: &ServiceSchema) -> T;
    fn visit_union(&self, schema: &UnionSchema) -> T;

    fn visit_ref(&self, schema: &RefSchema) -> T {
        self.visit_stub_ref(schema)
    }
    fn visit_map(&self, schema: &MapSchema) -> T {
        self.visit_stub_map(schema)
    }
    fn visit_optional(&self, schema: &OptionalSchema) -> T {
        self.visit_stub_optional(schema)
    }
    fn visit_result(&self, schema: &ResultSchema) -> T {
        self.visit_stub_result(schema)
    }
    fn visit_parameter(&self, schema: &ParameterSchema) -> T {
        self.visit_stub_parameter(schema)
    }
    fn visit_any(&self, schema: &AnySchema) -> T {
        self.visit_stub_any(schema)
    }
    fn visit_null(&self, schema: &NullSchema) -> T {
        self.visit_stub_null(schema)
    }

    /// Fallback invoked by the default stub-variant methods above. Overriding
    /// just this one method is enough for a visitor that treats every reserved
    /// variant identically (the common case).
    fn visit_stub_ref(&self, _schema: &RefSchema) -> T {
        self.visit_default()
    }
    fn visit_stub_map(&self, _schema: &MapSchema) -> T {
        self.visit_default()
    }
    fn visit_stub_optional(&self, _schema: &OptionalSchema) -> T {
        self.visit_default()
    }
    fn visit_stub_result(&self, _schema: &ResultSchema) -> T {
        self.visit_default()
    }
    fn visit_stub_parameter(&self, _schema: &ParameterSchema) -> T {
        self.visit_default()
    }
    fn visit_stub_any(&self, _schema: &AnySchema) -> T {
        self.visit_default()
    }
    fn visit_stub_null(&self, _schema: &NullSchema) -> T {
        self.visit_default()
    }

    /// Last-resort default shared by every reserved-variant stub. A visitor
    /// that needs no variant-specific reserved-variant behavior can implement
    /// only this one method instead of all seven stubs.
    fn visit_default(&self) -> T;
}
