//! # Endpoint checks
//!
//! One routine per FleetPulse feature area. Each routine sends its requests
//! through [`exchange`], which holds a response to an
//! [`EndpointExpectation`], then layers its own value checks on top and
//! records every outcome with the [`Recorder`](crate::testing::Recorder).

pub mod analytics;
pub mod assistant;
pub mod error_handling;
pub mod listings;
pub mod overview;
pub mod roi;
pub mod root;

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::cli::HarnessConfig;
use crate::http::{ApiClient, ApiRequest, TransportError};
use crate::testing::{EndpointExpectation, ShapeViolation};

/// Everything a check needs besides the recorder.
#[derive(Debug, Clone)]
pub struct CheckContext {
    pub client: ApiClient,
    /// Pause between the two overview fetches of the dynamic-data check.
    pub settle_delay: Duration,
}

impl CheckContext {
    pub fn new(client: ApiClient, settle_delay: Duration) -> Self {
        Self {
            client,
            settle_delay,
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Result<Self, TransportError> {
        let client = ApiClient::new(&config.base_url, config.timeout)?;
        Ok(Self::new(client, config.settle_delay))
    }
}

/// Why a response could not be accepted against its expectation.
#[derive(Debug, Error)]
pub enum CheckFailure {
    #[error("Exception: {0}")]
    Transport(#[from] TransportError),
    #[error("{}", describe_status(.expected, .status, .raw))]
    UnexpectedStatus { expected: u16, status: u16, raw: String },
    #[error("{violation}")]
    Shape { violation: ShapeViolation, body: Value },
}

impl CheckFailure {
    /// Structural failures are reported under `<name> - Structure`.
    pub fn result_name(&self, name: &str) -> String {
        match self {
            CheckFailure::Shape { .. } => format!("{name} - Structure"),
            _ => name.to_string(),
        }
    }

    pub fn sample(&self) -> Option<Value> {
        match self {
            CheckFailure::Shape { body, .. } => Some(body.clone()),
            _ => None,
        }
    }
}

fn describe_status(expected: &u16, status: &u16, raw: &str) -> String {
    if *expected == 200 {
        format!("HTTP {status}: {raw}")
    } else {
        format!("Expected {expected}, got {status}")
    }
}

/// Send `request` and hold the response to `expectation`'s status and
/// field requirements. Returns the JSON body on success.
pub async fn exchange(
    client: &ApiClient,
    expectation: &EndpointExpectation,
    request: &ApiRequest,
) -> Result<Value, CheckFailure> {
    debug_assert_eq!(request.method, expectation.method);
    let response = client.send(request).await?;

    if response.status != expectation.expected_status {
        return Err(CheckFailure::UnexpectedStatus {
            expected: expectation.expected_status,
            status: response.status,
            raw: response.raw,
        });
    }

    let body = response.body.unwrap_or(Value::Null);
    match expectation.verify(&body) {
        Ok(()) => Ok(body),
        Err(violation) => Err(CheckFailure::Shape { violation, body }),
    }
}

/// The default request for an expectation: its method and path, no query.
pub fn default_request(expectation: &EndpointExpectation) -> ApiRequest {
    ApiRequest {
        method: expectation.method,
        path: expectation.path.to_string(),
        query: Vec::new(),
        body: None,
    }
}

pub(crate) fn number_at(body: &Value, pointer: &str) -> Option<f64> {
    body.pointer(pointer).and_then(Value::as_f64)
}

/// Registration numbers look like `MH-12-AB-1234`.
pub(crate) fn looks_like_registration(id: &str) -> bool {
    id.contains('-') && id.chars().count() >= 10
}

/// Whether a vehicle `id` is a registration string. Non-string ids never are.
pub(crate) fn is_registration(id: Option<&Value>) -> bool {
    id.and_then(Value::as_str).is_some_and(looks_like_registration)
}

/// The first `count` elements of an array, or `Null` for anything else.
pub(crate) fn head(value: Option<&Value>, count: usize) -> Value {
    match value.and_then(Value::as_array) {
        Some(items) => Value::Array(items.iter().take(count).cloned().collect()),
        None => Value::Null,
    }
}

/// The last `count` elements of an array, or `Null` for anything else.
pub(crate) fn tail(value: Option<&Value>, count: usize) -> Value {
    match value.and_then(Value::as_array) {
        Some(items) => {
            let start = items.len().saturating_sub(count);
            Value::Array(items[start..].to_vec())
        }
        None => Value::Null,
    }
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
