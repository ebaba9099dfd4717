use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use defs_core::{Function, FunctionData, Service};
use defs_schema::{FunctionSchema, ServiceSchema};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::protocol::{MessageType, WsMessage};

static NEXT_CORRELATION_ID: AtomicU64 = AtomicU64::new(1);

fn next_correlation_id() -> String {
    NEXT_CORRELATION_ID.fetch_add(1, Ordering::Relaxed).to_string()
}

/// Client-side stand-in for a `Function` resolved from a remote `ws`/`wss`
/// authority. Each `call` opens a short-lived connection, sends one `call`
/// frame, and waits for the matching `response`/`error` frame by
/// correlation id — there is no connection pool to keep alive across calls,
/// unlike the server side's per-connection map.
pub(crate) struct RemoteFunction {
    name: String,
    url: String,
    schema: FunctionSchema,
}

impl RemoteFunction {
    pub(crate) fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            schema: FunctionSchema::new(Vec::new(), Vec::new()).expect("empty schema is always valid"),
        }
    }

    async fn call_remote(&self, ctx: CancellationToken, message: WsMessage) -> anyhow::Result<serde_json::Value> {
        let (mut stream, _) = tokio::select! {
            res = tokio_tungstenite::connect_async(&self.url) => res?,
            _ = ctx.cancelled() => anyhow::bail!("call to '{}' was cancelled before connecting", self.name),
        };

        let encoded = serde_json::to_string(&message)?;
        stream.send(Message::Text(encoded)).await?;

        loop {
            let frame = tokio::select! {
                frame = stream.next() => frame,
                _ = ctx.cancelled() => anyhow::bail!("call to '{}' was cancelled", self.name),
            };
            let Some(frame) = frame else {
                anyhow::bail!("connection to '{}' closed before a response arrived", self.url);
            };
            let Message::Text(text) = frame? else {
                continue;
            };
            let reply: WsMessage = serde_json::from_str(&text)?;
            if reply.id != message.id {
                continue;
            }
            match reply.kind {
                MessageType::Response => {
                    let result = reply
                        .data
                        .and_then(|d| d.get("result").cloned())
                        .unwrap_or(serde_json::Value::Null);
                    return Ok(result);
                }
                MessageType::Error => anyhow::bail!(reply.error.unwrap_or_else(|| "remote call failed".to_string())),
                _ => continue,
            }
        }
    }
}

#[async_trait]
impl Function for RemoteFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &FunctionSchema {
        &self.schema
    }

    async fn call(&self, ctx: CancellationToken, input: FunctionData) -> anyhow::Result<FunctionData> {
        let id = next_correlation_id();
        let message = WsMessage::call_function(id, self.name.clone(), input.value());
        let result = self.call_remote(ctx, message).await?;
        Ok(FunctionData::from_json(result))
    }
}

/// Client-side stand-in for a `Service` resolved from a remote authority.
/// Method schemas aren't known without a discovery round-trip, so every
/// `get_method` call mints a fresh remote-call wrapper on demand.
pub(crate) struct RemoteService {
    name: String,
    url: String,
    schema: ServiceSchema,
}

impl RemoteService {
    pub(crate) fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            schema: ServiceSchema::new(name.clone(), Vec::new()).expect("empty method list is always valid"),
            name,
            url: url.into(),
        }
    }
}

impl Service for RemoteService {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &ServiceSchema {
        &self.schema
    }

    fn get_method(&self, name: &str) -> Option<Arc<dyn Function>> {
        Some(Arc::new(RemoteServiceMethod {
            service: self.name.clone(),
            method: name.to_string(),
            url: self.url.clone(),
            schema: FunctionSchema::new(Vec::new(), Vec::new()).expect("empty schema is always valid"),
        }))
    }
}

struct RemoteServiceMethod {
    service: String,
    method: String,
    url: String,
    schema: FunctionSchema,
}

#[async_trait]
impl Function for RemoteServiceMethod {
    fn name(&self) -> &str {
        &self.method
    }

    fn schema(&self) -> &FunctionSchema {
        &self.schema
    }

    async fn call(&self, ctx: CancellationToken, input: FunctionData) -> anyhow::Result<FunctionData> {
        let remote = RemoteFunction::new(self.method.clone(), self.url.clone());
        let id = next_correlation_id();
        let message = WsMessage::call_service(id, self.service.clone(), self.method.clone(), input.value());
        let result = remote.call_remote(ctx, message).await?;
        Ok(FunctionData::from_json(result))
    }
}
