use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::{Duration, Instant};

use super::error::TransportError;
use super::request::ApiRequest;
use super::response::ApiResponse;

/// HTTP adapter bound to one API base URL.
///
/// Non-2xx statuses are returned as ordinary responses; only failures to
/// complete the exchange (and unparsable 2xx bodies) become errors.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.clone(),
            message: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout.filter(|timeout| !timeout.is_zero()) {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `path` against the base URL and append the query pairs.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let joined = if request.path.starts_with('/') {
            format!("{}{}", self.base_url, request.path)
        } else {
            format!("{}/{}", self.base_url, request.path)
        };
        let mut url = Url::parse(&joined).map_err(|e| TransportError::InvalidUrl {
            url: joined.clone(),
            message: e.to_string(),
        })?;

        if !request.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(request)?;
        let mut req_builder = self.client.request(request.method.into(), url.clone());
        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        let started = Instant::now();
        let response = req_builder.send().await.map_err(|e| {
            tracing::debug!(method = %request.method, %url, error = %e, "request failed");
            TransportError::from_reqwest(e)
        })?;

        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| TransportError::Read(e.to_string()))?;
        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            method = %request.method,
            %url,
            status,
            duration_ms,
            "request completed"
        );

        let body = parse_body(status, &raw)?;

        Ok(ApiResponse {
            status,
            body,
            raw,
        })
    }
}

/// 2xx bodies must be JSON; any other body is parsed best-effort.
fn parse_body(status: u16, raw: &str) -> Result<Option<Value>, TransportError> {
    let success = (200..300).contains(&status);
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) if success => Err(TransportError::MalformedJson {
            status,
            message: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}
