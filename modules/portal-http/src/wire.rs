use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire envelope for `POST /functions/<name>` and
/// `POST /services/<service>/<method>` success responses:
/// `{"result": <value>, "error": null}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEnvelope {
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl CallEnvelope {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}

/// `GET /health` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: i64,
    pub functions: usize,
    pub services: usize,
    pub connections: usize,
}
