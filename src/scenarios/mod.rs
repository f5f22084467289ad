// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Verification scenarios.
//!
//! Each scenario needs only an executor, the configuration and the
//! destination id. Scenarios share no other state and issue their requests
//! strictly in order, awaiting each outcome before sending the next.

pub mod batch;
pub mod burst;
pub mod idempotency;

pub use batch::{duplicate_indices, submit_batch, BatchReport};
pub use burst::{burst_submit, BurstReport};
pub use idempotency::{verify_idempotency, IdempotencyOutcome};

use crate::client::{Outcome, RequestExecutor};
use crate::config::Config;
use crate::models::{EventRequest, IdempotencyKey};
use reqwest::StatusCode;

/// Status the platform answers a queued event with.
pub const EVENT_ACCEPTED: StatusCode = StatusCode::ACCEPTED;

/// `POST /events` with `key` as the `Idempotency-Key` header.
pub(crate) async fn submit_event(
    executor: &RequestExecutor,
    config: &Config,
    request: &EventRequest,
    key: &IdempotencyKey,
) -> Outcome {
    executor
        .post_json(&config.events_url(), &request.to_json(), &[key.header()])
        .await
}
