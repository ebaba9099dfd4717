use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use defs_core::CallError;
use defs_errors::RegistryError;

/// Maps a dispatch failure onto the literal HTTP status codes §6.2 pins
/// down: 404 for an unknown name, 400 with `Validation error: <message>`
/// for a failed schema check, 500 for anything the handler itself raised.
pub(crate) fn call_error_response(err: CallError) -> Response {
    match err {
        CallError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        CallError::Registry(other) => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
        CallError::Validation(result) => {
            let message = result
                .errors
                .first()
                .map(|e| format!("{}: {}", e.path, e.message))
                .unwrap_or_else(|| "validation failed".to_string());
            (StatusCode::BAD_REQUEST, format!("Validation error: {message}")).into_response()
        }
        CallError::Handler(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
