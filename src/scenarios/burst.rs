// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Burst submission.
//!
//! Sends uniquely keyed events back-to-back and measures how fast they are
//! accepted. The platform queues events and applies the destination rate
//! limit at delivery time, so acceptance should not be throttled. Delivery
//! pacing is checked out of band.

use super::{submit_event, EVENT_ACCEPTED};
use crate::client::RequestExecutor;
use crate::config::Config;
use crate::metrics::{SubmissionFailure, SubmissionMetrics};
use crate::models::{burst_payload, unix_timestamp, DestinationId, EventRequest, IdempotencyKey};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// Result of a burst.
#[derive(Debug, Clone)]
pub struct BurstReport {
    pub attempted: usize,
    pub accepted: usize,
    pub elapsed: Duration,
    pub accepted_per_second: f64,
    /// Configured delivery rate limit, for comparison
    pub rate_limit_rps: u32,
    pub failures: Vec<SubmissionFailure>,
}

impl std::fmt::Display for BurstReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Sent {}/{} events in {:.2}s ({:.1} accepted/s)",
            self.accepted,
            self.attempted,
            self.elapsed.as_secs_f64(),
            self.accepted_per_second
        )?;
        writeln!(
            f,
            "   Note: Events are queued immediately, rate limiting happens during delivery"
        )?;
        write!(
            f,
            "   Check logs to verify delivery rate is ~{} req/sec",
            self.rate_limit_rps
        )
    }
}

/// Submit `burst_size` events as fast as the executor allows.
///
/// Each failed submission is written to `out` as soon as its outcome is known.
pub async fn burst_submit<W: Write>(
    executor: &RequestExecutor,
    config: &Config,
    destination: &DestinationId,
    burst_size: usize,
    out: &mut W,
) -> std::io::Result<BurstReport> {
    info!(
        burst_size,
        rate_limit_rps = config.destination.rate_limit_rps,
        "Testing rate limiting"
    );

    let mut metrics = SubmissionMetrics::new();
    metrics.start();

    for index in 0..burst_size {
        let request = EventRequest::new(destination, burst_payload(index, unix_timestamp()));
        let key = IdempotencyKey::fresh("burst");

        let outcome = submit_event(executor, config, &request, &key).await;
        debug!(index, status = ?outcome.status(), idempotency_key = %key, "Burst event submitted");
        if let Some(failure) = metrics.record(index, &outcome, EVENT_ACCEPTED) {
            writeln!(out, "   ❌ {failure}")?;
        }
    }

    metrics.finish();

    let report = BurstReport {
        attempted: burst_size,
        accepted: metrics.accepted(),
        elapsed: metrics.elapsed(),
        accepted_per_second: metrics.accepted_per_second(),
        rate_limit_rps: config.destination.rate_limit_rps,
        failures: metrics.into_failures(),
    };
    info!(
        accepted = report.accepted,
        attempted = report.attempted,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Burst complete"
    );
    Ok(report)
}
