use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use defs_schema::FunctionSchema;
use tokio_util::sync::CancellationToken;

use crate::function_data::FunctionData;

/// An opaque callable bound to a `FunctionSchema`.
///
/// `call` takes the ambient `CancellationToken` every suspending operation
/// in this crate threads through (see `libs/runtime`'s logging/config
/// story for why this mirrors the rest of the stack), invokes the
/// underlying handler, and returns its `FunctionData` result or a handler
/// error. Validating the input against `schema().inputs()` is the
/// registry's job, not the function's — see `FunctionRegistry::call`.
#[async_trait]
pub trait Function: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> &FunctionSchema;

    async fn call(&self, ctx: CancellationToken, input: FunctionData) -> anyhow::Result<FunctionData>;
}

type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<FunctionData>> + Send>>;
type Handler = Arc<dyn Fn(CancellationToken, FunctionData) -> HandlerFuture + Send + Sync>;

/// A `Function` built from a plain closure, for callers who don't want to
/// hand-roll a struct for every handler.
#[derive(Clone)]
pub struct SimpleFunction {
    name: String,
    schema: FunctionSchema,
    handler: Handler,
}

impl SimpleFunction {
    pub fn new<F, Fut>(name: impl Into<String>, schema: FunctionSchema, handler: F) -> Self
    where
        F: Fn(CancellationToken, FunctionData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<FunctionData>> + Send + 'static,
    {
        Self {
            name: name.into(),
            schema,
            handler: Arc::new(move |ctx, input| Box::pin(handler(ctx, input))),
        }
    }
}

#[async_trait]
impl Function for SimpleFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &FunctionSchema {
        &self.schema
    }

    async fn call(&self, ctx: CancellationToken, input: FunctionData) -> anyhow::Result<FunctionData> {
        (self.handler)(ctx, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn simple_function_invokes_its_closure() {
        let f = SimpleFunction::new("echo", FunctionSchema::new(vec![], vec![]).unwrap(), |_ctx, input| async move {
            Ok(input)
        });
        let result = f.call(CancellationToken::new(), FunctionData::from_value(json!(1))).await.unwrap();
        assert_eq!(result.value(), json!(1));
    }
}
