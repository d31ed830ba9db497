use thiserror::Error;

/// Failure to complete an HTTP exchange, as opposed to a response that
/// arrived but does not satisfy an expectation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid URL `{url}`: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Failed to read response: {0}")]
    Read(String),
    #[error("HTTP {status} response is not valid JSON: {message}")]
    MalformedJson { status: u16, message: String },
}

impl TransportError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout(err.to_string());
        }
        if err.is_connect() {
            return TransportError::Connect(err.to_string());
        }
        TransportError::Request(err.to_string())
    }
}
