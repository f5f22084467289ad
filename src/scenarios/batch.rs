// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mixed batch of unique and duplicate submissions.
//!
//! Every `duplicate_every`-th index (excluding 0) uses a fixed key and is
//! sent twice: a duplicate pre-submission, then the primary submission under
//! the same key and payload. All other indices use a fresh key.
//!
//! Progress marks and failed submissions are written as they happen, so a
//! slow service is visible while the batch is still running.

use super::{submit_event, EVENT_ACCEPTED};
use crate::client::RequestExecutor;
use crate::config::Config;
use crate::metrics::{SubmissionFailure, SubmissionMetrics};
use crate::models::{batch_payload, unix_timestamp, DestinationId, EventRequest, IdempotencyKey};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// True if batch index `index` reuses a fixed key.
pub fn is_duplicate_index(index: usize, every: usize) -> bool {
    every > 0 && index > 0 && index % every == 0
}

/// Indices of `0..count` that send a duplicate pre-submission.
pub fn duplicate_indices(count: usize, every: usize) -> Vec<usize> {
    (0..count).filter(|&i| is_duplicate_index(i, every)).collect()
}

/// Result of a mixed batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub count: usize,
    /// Primary submissions accepted
    pub accepted: usize,
    /// Duplicate pre-submissions accepted
    pub duplicates: usize,
    pub elapsed: Duration,
    pub failures: Vec<SubmissionFailure>,
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Completed: {}/{} events sent in {:.2}s",
            self.accepted,
            self.count,
            self.elapsed.as_secs_f64()
        )?;
        write!(f, "   Duplicates sent: {}", self.duplicates)
    }
}

/// Submit `count` events, interleaving fixed-key duplicates with unique keys.
///
/// A duplicate pre-submission that is not accepted is only left out of the
/// duplicate count; the primary submission for that index is still sent.
/// Accepted primaries at every `progress_every`-th index write a progress
/// mark to `out`; rejected primaries write their failure.
pub async fn submit_batch<W: Write>(
    executor: &RequestExecutor,
    config: &Config,
    destination: &DestinationId,
    count: usize,
    out: &mut W,
) -> std::io::Result<BatchReport> {
    let every = config.scenarios.duplicate_every;
    let progress_every = config.scenarios.progress_every.max(1);
    info!(count, duplicate_every = every, "Sending mixed batch");

    let mut metrics = SubmissionMetrics::new();
    let mut duplicates = 0;
    metrics.start();

    for index in 0..count {
        let request = EventRequest::new(destination, batch_payload(index, unix_timestamp()));

        let key = if is_duplicate_index(index, every) {
            let key = IdempotencyKey::repeated(index);
            let outcome = submit_event(executor, config, &request, &key).await;
            if outcome.expect_status(EVENT_ACCEPTED).is_some() {
                duplicates += 1;
            } else {
                debug!(index, %outcome, "Duplicate pre-submission not accepted");
            }
            key
        } else {
            IdempotencyKey::fresh("unique")
        };

        let outcome = submit_event(executor, config, &request, &key).await;
        if let Some(failure) = metrics.record(index, &outcome, EVENT_ACCEPTED) {
            writeln!(out, "   ❌ {failure}")?;
        } else if index % progress_every == 0 {
            info!(index, count, "Batch progress");
            writeln!(out, "   Progress: {index}/{count} events sent...")?;
        }
    }

    metrics.finish();

    let report = BatchReport {
        count,
        accepted: metrics.accepted(),
        duplicates,
        elapsed: metrics.elapsed(),
        failures: metrics.into_failures(),
    };
    info!(
        accepted = report.accepted,
        count,
        duplicates,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Batch complete"
    );
    Ok(report)
}
