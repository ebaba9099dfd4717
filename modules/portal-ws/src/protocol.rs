use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `defs-ws-v1` frame kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Call,
    Response,
    Error,
    Ping,
    Pong,
}

/// The one JSON envelope shape exchanged in both directions over a
/// `defs-ws-v1` connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<i64>,
}

impl WsMessage {
    pub fn call_function(id: impl Into<String>, function: impl Into<String>, data: Value) -> Self {
        Self {
            kind: MessageType::Call,
            id: Some(id.into()),
            function: Some(function.into()),
            service: None,
            method: None,
            data: Some(data),
            error: None,
            timestamp: None,
        }
    }

    pub fn call_service(id: impl Into<String>, service: impl Into<String>, method: impl Into<String>, data: Value) -> Self {
        Self {
            kind: MessageType::Call,
            id: Some(id.into()),
            function: None,
            service: Some(service.into()),
            method: Some(method.into()),
            data: Some(data),
            error: None,
            timestamp: None,
        }
    }

    pub fn response(id: impl Into<String>, result: Value) -> Self {
        Self {
            kind: MessageType::Response,
            id: Some(id.into()),
            function: None,
            service: None,
            method: None,
            data: Some(serde_json::json!({ "result": result })),
            error: None,
            timestamp: Some(now_unix()),
        }
    }

    pub fn error(id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind: MessageType::Error,
            id,
            function: None,
            service: None,
            method: None,
            data: None,
            error: Some(message.into()),
            timestamp: Some(now_unix()),
        }
    }

    pub fn ping() -> Self {
        Self {
            kind: MessageType::Ping,
            id: None,
            function: None,
            service: None,
            method: None,
            data: None,
            error: None,
            timestamp: Some(now_unix()),
        }
    }

    pub fn pong() -> Self {
        Self {
            kind: MessageType::Pong,
            id: None,
            function: None,
            service: None,
            method: None,
            data: None,
            error: None,
            timestamp: Some(now_unix()),
        }
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_function_round_trips_through_json() {
        let msg = WsMessage::call_function("42", "greet", serde_json::json!({"n": 1}));
        let encoded = serde_json::to_string(&msg).unwrap();
        let decoded: WsMessage = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.kind, MessageType::Call);
        assert_eq!(decoded.id.as_deref(), Some("42"));
        assert_eq!(decoded.function.as_deref(), Some("greet"));
    }

    #[test]
    fn response_wraps_the_result_under_a_data_object() {
        let msg = WsMessage::response("1", serde_json::json!(5));
        assert_eq!(msg.data, Some(serde_json::json!({ "result": 5 })));
    }

    #[test]
    fn absent_optional_fields_are_omitted_from_the_wire_form() {
        let msg = WsMessage::ping();
        let encoded = serde_json::to_value(&msg).unwrap();
        assert!(encoded.get("id").is_none());
        assert!(encoded.get("function").is_none());
    }
}
