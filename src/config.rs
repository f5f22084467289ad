// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the load test harness.
//!
//! Defaults match a local `docker-compose` deployment of the platform with a
//! placeholder webhook.site receiver.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Markers identifying the unedited webhook.site placeholder URL.
const PLACEHOLDER_MARKERS: [&str; 2] = ["YOUR_UUID", "unique-uuid-here"];

/// Configuration for one harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API base URL, including the `/api` prefix (default: http://localhost:8080/api)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Webhook receiver the destination delivers to
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,

    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Destination created at the start of the run
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Scenario sizing
    #[serde(default)]
    pub scenarios: ScenarioConfig,
}

/// Parameters of the destination provisioned for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Display name prefix; the creation time in Unix seconds is appended
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// HTTP method used for deliveries (default: POST)
    #[serde(default = "default_http_method")]
    pub http_method: String,

    /// Delivery rate limit in requests per second (default: 5)
    #[serde(default = "default_rate_limit_rps")]
    pub rate_limit_rps: u32,

    /// Secret used by the platform to sign deliveries
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,
}

/// Sizing of the burst and batch scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Events sent back-to-back in the burst scenario (default: 15)
    #[serde(default = "default_burst_size")]
    pub burst_size: usize,

    /// Events sent in the mixed batch scenario (default: 20)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Every Nth batch index (excluding 0) reuses a fixed key (default: 5)
    #[serde(default = "default_duplicate_every")]
    pub duplicate_every: usize,

    /// Batch progress is reported every N indices (default: 10)
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,

    /// Gap between the two idempotency probe requests in milliseconds (default: 100)
    #[serde(default = "default_duplicate_delay_ms")]
    pub duplicate_delay_ms: u64,

    /// Read the idempotency event back after the scenarios (default: false)
    #[serde(default)]
    pub verify_event_state: bool,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_webhook_url() -> String {
    "https://webhook.site/unique-uuid-here".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_name_prefix() -> String {
    "LoadTest".to_string()
}

fn default_http_method() -> String {
    "POST".to_string()
}

fn default_rate_limit_rps() -> u32 {
    5
}

fn default_signing_secret() -> String {
    "test-secret-key-123".to_string()
}

fn default_burst_size() -> usize {
    15
}

fn default_batch_size() -> usize {
    20
}

fn default_duplicate_every() -> usize {
    5
}

fn default_progress_every() -> usize {
    10
}

fn default_duplicate_delay_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            webhook_url: default_webhook_url(),
            request_timeout_secs: default_request_timeout_secs(),
            destination: DestinationConfig::default(),
            scenarios: ScenarioConfig::default(),
        }
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            http_method: default_http_method(),
            rate_limit_rps: default_rate_limit_rps(),
            signing_secret: default_signing_secret(),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            burst_size: default_burst_size(),
            batch_size: default_batch_size(),
            duplicate_every: default_duplicate_every(),
            progress_every: default_progress_every(),
            duplicate_delay_ms: default_duplicate_delay_ms(),
            verify_event_state: false,
        }
    }
}

impl Config {
    /// Get the per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the delay between the idempotency probe and its duplicate
    pub fn duplicate_delay(&self) -> Duration {
        Duration::from_millis(self.scenarios.duplicate_delay_ms)
    }

    /// Destination display name for a run started at `unix_secs`.
    pub fn destination_name(&self, unix_secs: i64) -> String {
        format!("{}-{}", self.destination.name_prefix, unix_secs)
    }

    /// True while the webhook URL is still the documentation placeholder.
    pub fn has_placeholder_webhook(&self) -> bool {
        PLACEHOLDER_MARKERS
            .iter()
            .any(|marker| self.webhook_url.contains(marker))
    }

    pub fn destinations_url(&self) -> String {
        format!("{}/destinations", self.base())
    }

    pub fn events_url(&self) -> String {
        format!("{}/events", self.base())
    }

    pub fn event_url(&self, id: &str) -> String {
        format!("{}/events/{}", self.base(), id)
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Check the configuration before any request is issued.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_http_url("base_url", &self.base_url)?;
        check_http_url("webhook_url", &self.webhook_url)?;

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Zero("request_timeout_secs"));
        }
        if self.destination.rate_limit_rps == 0 {
            return Err(ConfigError::Zero("rate_limit_rps"));
        }
        if self.scenarios.duplicate_every == 0 {
            return Err(ConfigError::Zero("duplicate_every"));
        }
        if self.scenarios.progress_every == 0 {
            return Err(ConfigError::Zero("progress_every"));
        }
        if self.destination.http_method.trim().is_empty() {
            return Err(ConfigError::Empty("http_method"));
        }
        Ok(())
    }
}

fn check_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        url: value.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            field,
            url: value.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
