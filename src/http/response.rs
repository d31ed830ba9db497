use serde_json::Value;

/// Outcome of a completed HTTP exchange, whatever the status code.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body. `None` when a non-2xx body is not JSON.
    pub body: Option<Value>,
    pub raw: String,
}
