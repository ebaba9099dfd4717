use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use defs_core::{FunctionData, FunctionRegistry, ServiceRegistry};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::HttpPortalConfig;
use crate::error::call_error_response;
use crate::wire::{CallEnvelope, HealthResponse};

pub(crate) struct AppState {
    pub functions: Arc<FunctionRegistry>,
    pub services: Arc<ServiceRegistry>,
}

#[derive(Clone, Default)]
struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &axum::http::Request<B>) -> Option<RequestId> {
        let id = uuid_like();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// A dependency-free unique token, good enough for a correlation id; avoids
/// pulling in a dedicated uuid/nanoid crate purely for request-id generation.
fn uuid_like() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0), n)
}

async fn push_request_id_to_span(req: axum::http::Request<axum::body::Body>, next: axum::middleware::Next) -> Response {
    let rid = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    if let Some(rid) = rid {
        tracing::Span::current().record("request_id", rid.as_str());
    }
    next.run(req).await
}

/// Builds the axum router for functions, service methods, and `/health`.
///
/// Middleware order (outermost to innermost), grounded on
/// `modules/api_ingress`'s router construction: propagate/set request-id ->
/// push request-id into the tracing span -> trace -> timeout -> CORS -> body
/// size limit.
pub(crate) fn build_router(config: &HttpPortalConfig, functions: Arc<FunctionRegistry>, services: Arc<ServiceRegistry>) -> Router {
    let state = Arc::new(AppState { functions, services });

    let mut router = Router::new()
        .route("/functions/{name}", post(call_function))
        .route("/services/{service}/{method}", post(call_service_method))
        .route("/health", get(health))
        .with_state(state);

    let x_request_id = axum::http::HeaderName::from_static("x-request-id");
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router = router.layer(SetRequestIdLayer::new(x_request_id, MakeReqId));
    router = router.layer(from_fn(push_request_id_to_span));
    router = router.layer(TraceLayer::new_for_http());
    router = router.layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)));
    router = router.layer(build_cors_layer(config));
    router = router.layer(RequestBodyLimitLayer::new(config.max_request_bytes));

    router
}

fn build_cors_layer(config: &HttpPortalConfig) -> CorsLayer {
    let methods: Vec<Method> = config
        .cors
        .methods
        .iter()
        .filter_map(|m| Method::from_str(m).ok())
        .collect();
    let headers: Vec<axum::http::HeaderName> = config
        .cors
        .headers
        .iter()
        .filter_map(|h| axum::http::HeaderName::from_str(h).ok())
        .collect();

    let origin = if config.cors.origins.is_empty() {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new().allow_origin(origin).allow_methods(methods).allow_headers(headers)
}

async fn call_function(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let input = FunctionData::from_json(body);
    match state.functions.call(tokio_util::sync::CancellationToken::new(), &name, input).await {
        Ok(output) => (StatusCode::OK, Json(CallEnvelope::ok(output.value()))).into_response(),
        Err(err) => call_error_response(err),
    }
}

async fn call_service_method(
    State(state): State<Arc<AppState>>,
    Path((service, method)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let input = FunctionData::from_json(body);
    match state
        .services
        .call_service_method(tokio_util::sync::CancellationToken::new(), &service, &method, input)
        .await
    {
        Ok(output) => (StatusCode::OK, Json(CallEnvelope::ok(output.value()))).into_response(),
        Err(err) => call_error_response(err),
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().timestamp(),
        functions: state.functions.count(),
        services: state.services.count(),
        // HTTP is request/response, not connection-oriented: there is no
        // persistent connection map to count here. `portal-ws`'s own
        // `/health` reports the real, live count from its connection map.
        connections: 0,
    })
}
