// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request bodies, identifiers and event payloads exchanged with the
//! event delivery platform.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Body of `POST /destinations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRequest {
    pub name: String,
    pub url: String,
    pub http_method: String,
    pub rate_limit_rps: u32,
    pub signing_secret: String,
}

/// Body of `POST /events`. The idempotency key travels as a header.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRequest {
    pub destination_id: String,
    /// String-encoded JSON, opaque to the platform
    pub payload: String,
}

impl EventRequest {
    pub fn new(destination: &DestinationId, payload: String) -> Self {
        Self {
            destination_id: destination.as_str().to_string(),
            payload,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "destinationId": self.destination_id,
            "payload": self.payload,
        })
    }
}

/// Service-assigned destination id, fixed for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DestinationId(String);

impl DestinationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DestinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Service-assigned event id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value of the `Idempotency-Key` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub const HEADER: &'static str = "Idempotency-Key";

    /// A key that has never been sent before: `{prefix}-{uuid v4}`.
    pub fn fresh(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4()))
    }

    /// The fixed key reused by batch index `index`.
    pub fn repeated(index: usize) -> Self {
        Self(format!("repeated-key-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Header pair for [`crate::client::RequestExecutor::execute`].
    pub fn header(&self) -> (&'static str, &str) {
        (Self::HEADER, &self.0)
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of an event inside the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Received,
    Processing,
    Delivered,
    Failed,
    PermanentlyFailed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "RECEIVED",
            Self::Processing => "PROCESSING",
            Self::Delivered => "DELIVERED",
            Self::Failed => "FAILED",
            Self::PermanentlyFailed => "PERMANENTLY_FAILED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// The subset of `GET /events/{id}` the harness reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: Value,
    pub status: EventStatus,
}

/// Payload of the idempotency probe.
pub fn idempotency_payload(timestamp: f64) -> String {
    json!({ "test": "idempotency", "timestamp": timestamp }).to_string()
}

/// Payload of burst submission `index`.
pub fn burst_payload(index: usize, timestamp: f64) -> String {
    json!({ "burst_test": true, "index": index, "timestamp": timestamp }).to_string()
}

/// Payload of batch submission `index`.
pub fn batch_payload(index: usize, timestamp: f64) -> String {
    json!({ "event_index": index, "timestamp": timestamp, "data": "test-payload" }).to_string()
}

/// Current time as fractional Unix seconds.
pub fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
