// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Idempotent event creation.
//!
//! One payload is sent twice under the same key with a short gap. Both
//! requests must be accepted and resolve to the same event id.

use super::{submit_event, EVENT_ACCEPTED};
use crate::client::{Outcome, RequestExecutor};
use crate::config::Config;
use crate::models::{idempotency_payload, unix_timestamp, DestinationId, EventId, EventRequest, IdempotencyKey};
use tracing::{info, warn};

/// Result of the idempotency check.
#[derive(Debug, Clone, PartialEq)]
pub enum IdempotencyOutcome {
    /// Both requests accepted with the same event id
    Passed { event_id: EventId },
    /// The first request was not accepted; the duplicate was not sent
    FirstRequestFailed { detail: String },
    /// The duplicate request was not accepted
    DuplicateRequestFailed { first: EventId, detail: String },
    /// Both accepted, but with different event ids
    Mismatch { first: EventId, second: EventId },
}

impl IdempotencyOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    /// Event id of the first accepted request, if there was one.
    pub fn first_event_id(&self) -> Option<&EventId> {
        match self {
            Self::Passed { event_id } => Some(event_id),
            Self::DuplicateRequestFailed { first, .. } | Self::Mismatch { first, .. } => Some(first),
            Self::FirstRequestFailed { .. } => None,
        }
    }
}

impl std::fmt::Display for IdempotencyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed { event_id } => {
                write!(f, "Idempotency working! Same event ID returned: {event_id}")
            }
            Self::FirstRequestFailed { detail } => write!(f, "First request failed: {detail}"),
            Self::DuplicateRequestFailed { detail, .. } => {
                write!(f, "Duplicate request failed: {detail}")
            }
            Self::Mismatch { first, second } => {
                write!(f, "Idempotency failed! Different IDs: {first} vs {second}")
            }
        }
    }
}

/// Accepted event id from `outcome`, or a description of why there is none.
fn accepted_id(outcome: &Outcome) -> Result<EventId, String> {
    let response = outcome
        .expect_status(EVENT_ACCEPTED)
        .ok_or_else(|| outcome.to_string())?;
    response
        .body
        .id()
        .map(EventId::new)
        .ok_or_else(|| format!("accepted without an event id: {}", response.body))
}

/// Send the same event twice under one fresh key and compare the ids.
pub async fn verify_idempotency(
    executor: &RequestExecutor,
    config: &Config,
    destination: &DestinationId,
) -> IdempotencyOutcome {
    let key = IdempotencyKey::fresh("test-idemp");
    let request = EventRequest::new(destination, idempotency_payload(unix_timestamp()));
    info!(idempotency_key = %key, "Testing idempotency");

    let first = match accepted_id(&submit_event(executor, config, &request, &key).await) {
        Ok(id) => id,
        Err(detail) => {
            warn!(idempotency_key = %key, %detail, "First idempotency request failed");
            return IdempotencyOutcome::FirstRequestFailed { detail };
        }
    };
    info!(event_id = %first, "First request accepted");

    tokio::time::sleep(config.duplicate_delay()).await;

    let second = match accepted_id(&submit_event(executor, config, &request, &key).await) {
        Ok(id) => id,
        Err(detail) => {
            warn!(idempotency_key = %key, %detail, "Duplicate idempotency request failed");
            return IdempotencyOutcome::DuplicateRequestFailed { first, detail };
        }
    };

    if first == second {
        info!(event_id = %first, "Duplicate resolved to the same event");
        IdempotencyOutcome::Passed { event_id: first }
    } else {
        warn!(first = %first, second = %second, "Duplicate created a second event");
        IdempotencyOutcome::Mismatch { first, second }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HttpResponse, ResponseBody};
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn test_accepted_id_requires_202_and_id() {
        let accepted = Outcome::Response(HttpResponse {
            status: StatusCode::ACCEPTED,
            body: ResponseBody::Json(json!({"id": "evt-1"})),
        });
        assert_eq!(accepted_id(&accepted), Ok(EventId::new("evt-1")));

        let created = Outcome::Response(HttpResponse {
            status: StatusCode::CREATED,
            body: ResponseBody::Json(json!({"id": "evt-1"})),
        });
        assert!(accepted_id(&created).unwrap_err().contains("status 201"));

        let no_id = Outcome::Response(HttpResponse {
            status: StatusCode::ACCEPTED,
            body: ResponseBody::Text("queued".to_string()),
        });
        assert!(accepted_id(&no_id).unwrap_err().contains("without an event id"));
    }

    #[test]
    fn test_outcome_reporting() {
        let mismatch = IdempotencyOutcome::Mismatch {
            first: EventId::new("a"),
            second: EventId::new("b"),
        };
        assert!(!mismatch.is_passed());
        assert_eq!(mismatch.first_event_id(), Some(&EventId::new("a")));
        assert_eq!(mismatch.to_string(), "Idempotency failed! Different IDs: a vs b");

        let passed = IdempotencyOutcome::Passed { event_id: EventId::new("a") };
        assert!(passed.is_passed());

        let failed = IdempotencyOutcome::FirstRequestFailed { detail: "x".to_string() };
        assert_eq!(failed.first_event_id(), None);
    }
}
