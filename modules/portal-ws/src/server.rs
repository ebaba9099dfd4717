use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use defs_core::{FunctionData, FunctionRegistry, ServiceRegistry};
use futures::{SinkExt, StreamExt};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

use crate::config::WsPortalConfig;
use crate::protocol::{MessageType, WsMessage};
use crate::wire::HealthResponse;

pub(crate) struct Connection {
    pub id: u64,
    sink: AsyncMutex<futures::stream::SplitSink<WebSocket, Message>>,
    last_pong_unix: AtomicI64,
}

pub(crate) type ConnectionMap = RwLock<IndexMap<u64, Arc<Connection>>>;

pub(crate) struct AppState {
    pub functions: Arc<FunctionRegistry>,
    pub services: Arc<ServiceRegistry>,
    pub connections: Arc<ConnectionMap>,
    pub config: WsPortalConfig,
    next_conn_id: AtomicU64,
}

impl AppState {
    fn allocate_conn_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }
}

pub(crate) fn build_router(
    config: WsPortalConfig,
    functions: Arc<FunctionRegistry>,
    services: Arc<ServiceRegistry>,
    connections: Arc<ConnectionMap>,
) -> Router {
    let path = config.path.clone();
    let state = Arc::new(AppState {
        functions,
        services,
        connections,
        config,
        next_conn_id: AtomicU64::new(1),
    });
    Router::new()
        .route(&path, get(upgrade))
        .route("/health", get(health))
        .with_state(state)
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let subprotocols = state.config.subprotocols.clone();
    let ws = ws.protocols(subprotocols).max_message_size(state.config.max_message_bytes);
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_unix(),
        functions: state.functions.count(),
        services: state.services.count(),
        connections: state.connections.read().len(),
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sink, mut stream) = socket.split();
    let id = state.allocate_conn_id();
    let connection = Arc::new(Connection {
        id,
        sink: AsyncMutex::new(sink),
        last_pong_unix: AtomicI64::new(now_unix()),
    });
    state.connections.write().insert(id, connection.clone());
    tracing::debug!(connection_id = id, "websocket connection opened");

    let ping_task = spawn_ping_ticker(connection.clone(), state.clone());

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(connection_id = id, error = %e, "websocket read error");
                break;
            }
        };

        match frame {
            Message::Text(text) => {
                if let Err(e) = handle_text_frame(&text, &connection, &state).await {
                    tracing::debug!(connection_id = id, error = %e, "failed to handle frame");
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    ping_task.abort();
    state.connections.write().shift_remove(&id);
    let _ = connection.sink.lock().await.close().await;
    tracing::debug!(connection_id = id, "websocket connection closed");
}

async fn handle_text_frame(text: &str, connection: &Arc<Connection>, state: &Arc<AppState>) -> anyhow::Result<()> {
    let message: WsMessage = serde_json::from_str(text)?;
    match message.kind {
        MessageType::Call => handle_call(message, connection, state).await,
        MessageType::Pong => {
            connection.last_pong_unix.store(now_unix(), Ordering::Relaxed);
            Ok(())
        }
        MessageType::Ping => send(connection, WsMessage::pong()).await,
        MessageType::Response | MessageType::Error => Ok(()),
    }
}

async fn handle_call(message: WsMessage, connection: &Arc<Connection>, state: &Arc<AppState>) -> anyhow::Result<()> {
    let id = message.id.clone().unwrap_or_default();
    let input = FunctionData::from_json(message.data.unwrap_or(serde_json::Value::Null));
    let ctx = CancellationToken::new();

    let outcome = if let Some(function) = message.function {
        state.functions.call(ctx, &function, input).await
    } else if let (Some(service), Some(method)) = (message.service, message.method) {
        state.services.call_service_method(ctx, &service, &method, input).await
    } else {
        return send(connection, WsMessage::error(Some(id), "call is missing 'function' or 'service'+'method'")).await;
    };

    match outcome {
        Ok(output) => send(connection, WsMessage::response(id, output.value())).await,
        Err(e) => send(connection, WsMessage::error(Some(id), e.to_string())).await,
    }
}

async fn send(connection: &Arc<Connection>, message: WsMessage) -> anyhow::Result<()> {
    let encoded = serde_json::to_string(&message)?;
    connection.sink.lock().await.send(Message::Text(encoded)).await?;
    Ok(())
}

fn spawn_ping_ticker(connection: Arc<Connection>, state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(state.config.ping_interval());
        loop {
            ticker.tick().await;
            let stale = now_unix() - connection.last_pong_unix.load(Ordering::Relaxed) > state.config.pong_wait().as_secs() as i64;
            if stale {
                tracing::debug!(connection_id = connection.id, "pong wait exceeded, closing connection");
                let _ = connection.sink.lock().await.close().await;
                state.connections.write().shift_remove(&connection.id);
                break;
            }
            if send(&connection, WsMessage::ping()).await.is_err() {
                break;
            }
        }
    })
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Sends `message` to every open connection; a send failure drops that
/// connection from the map rather than aborting the broadcast.
pub(crate) async fn broadcast(connections: &Arc<ConnectionMap>, message: &WsMessage) {
    let targets: Vec<Arc<Connection>> = connections.read().values().cloned().collect();
    for connection in targets {
        if send(&connection, message.clone()).await.is_err() {
            connections.write().shift_remove(&connection.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;

    fn empty_router() -> Router {
        build_router(
            WsPortalConfig::default(),
            Arc::new(FunctionRegistry::new()),
            Arc::new(ServiceRegistry::new()),
            Arc::new(RwLock::new(IndexMap::new())),
        )
    }

    #[tokio::test]
    async fn health_route_reports_status_and_counts() {
        let app = empty_router();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "ok");
        assert_eq!(body.functions, 0);
        assert_eq!(body.services, 0);
        assert_eq!(body.connections, 0);
    }

    #[tokio::test]
    async fn health_counts_reflect_the_live_registries_not_constants() {
        use defs_core::{Function, SimpleFunction};
        use defs_schema::FunctionSchema;

        let functions = Arc::new(FunctionRegistry::new());
        functions
            .register(
                Arc::new(SimpleFunction::new(
                    "greet",
                    FunctionSchema::new(vec![], vec![]).unwrap(),
                    |_ctx, input| async move { Ok(input) },
                )) as Arc<dyn Function>,
                false,
            )
            .unwrap();

        let app = build_router(
            WsPortalConfig::default(),
            functions,
            Arc::new(ServiceRegistry::new()),
            Arc::new(RwLock::new(IndexMap::new())),
        );
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.functions, 1);
        // No socket was opened in this test, so the connection map is
        // legitimately empty here; `health_route_reports_status_and_counts`
        // and the WS portal's own connection-count bookkeeping in
        // `handle_socket` are what keep this field live at runtime.
        assert_eq!(body.connections, 0);
    }
}
