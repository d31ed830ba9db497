//! # CLI & configuration
//!
//! Every option has a default, so a bare invocation runs the full suite
//! against a local FleetPulse server.

use clap::Parser;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

/// Smoke-test the FleetPulse backend API and print a pass/fail report.
#[derive(Parser, Debug, Clone)]
#[command(name = "fleetpulse-smoke", version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the API, including the `/api` prefix
    #[arg(long, env = "FLEETPULSE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Pause between the two overview fetches of the dynamic-data check
    #[arg(long, default_value_t = DEFAULT_SETTLE_DELAY_MS)]
    pub dynamic_delay_ms: u64,

    /// Per-request timeout; the HTTP client default applies when unset
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Treat informational observations as assertions
    #[arg(long)]
    pub strict: bool,

    /// Diagnostic log filter (e.g. `debug`, `fleetpulse_smoke=trace`)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub base_url: String,
    pub settle_delay: Duration,
    pub timeout: Option<Duration>,
    pub strict: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            timeout: None,
            strict: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid base URL `{url}`: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("Unsupported base URL scheme `{0}`, expected http or https")]
    UnsupportedScheme(String),
    #[error("Timeout must be greater than 0")]
    ZeroTimeout,
}

impl Cli {
    pub fn into_config(self) -> Result<HarnessConfig, ConfigError> {
        let base_url = self.base_url.trim().to_string();
        let parsed = Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let timeout = match self.timeout_ms {
            Some(0) => return Err(ConfigError::ZeroTimeout),
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };

        Ok(HarnessConfig {
            base_url,
            settle_delay: Duration::from_millis(self.dynamic_delay_ms),
            timeout,
            strict: self.strict,
        })
    }
}
