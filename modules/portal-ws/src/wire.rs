use serde::{Deserialize, Serialize};

/// `GET /health` response body, same shape as the HTTP portal's — except
/// `connections` here is meaningful: it is the live count from this portal's
/// own connection map, not a constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: i64,
    pub functions: usize,
    pub services: usize,
    pub connections: usize,
}
