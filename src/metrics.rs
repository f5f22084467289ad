// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Counters and wall-clock timing for a sequence of event submissions.

use crate::client::Outcome;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Classification of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionOutcome {
    /// The expected status came back
    Accepted,
    /// The service answered with another status
    Rejected(StatusCode),
    /// No response (timeout, connection failure, ...)
    NoResponse,
}

impl SubmissionOutcome {
    /// Classify `outcome` against the status a successful submission returns.
    pub fn classify(outcome: &Outcome, expected: StatusCode) -> Self {
        match outcome.status() {
            Some(status) if status == expected => Self::Accepted,
            Some(status) => Self::Rejected(status),
            None => Self::NoResponse,
        }
    }
}

/// A submission that was not accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionFailure {
    pub index: usize,
    pub outcome: SubmissionOutcome,
    /// Status and body, or the transport error
    pub detail: String,
}

impl std::fmt::Display for SubmissionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event {} failed: {}", self.index, self.detail)
    }
}

/// Collects outcomes while a scenario runs.
#[derive(Debug, Default)]
pub struct SubmissionMetrics {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    outcomes: HashMap<SubmissionOutcome, usize>,
    failures: Vec<SubmissionFailure>,
}

impl SubmissionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of the submission sequence.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.end_time = None;
    }

    /// Mark the end of the submission sequence.
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Record submission `index`; returns the failure if it was not accepted.
    pub fn record(
        &mut self,
        index: usize,
        outcome: &Outcome,
        expected: StatusCode,
    ) -> Option<&SubmissionFailure> {
        let class = SubmissionOutcome::classify(outcome, expected);
        *self.outcomes.entry(class).or_insert(0) += 1;

        if class == SubmissionOutcome::Accepted {
            return None;
        }
        self.failures.push(SubmissionFailure {
            index,
            outcome: class,
            detail: outcome.to_string(),
        });
        self.failures.last()
    }

    pub fn count(&self, outcome: SubmissionOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn accepted(&self) -> usize {
        self.count(SubmissionOutcome::Accepted)
    }

    pub fn into_failures(self) -> Vec<SubmissionFailure> {
        self.failures
    }

    /// Wall-clock time between `start` and `finish` (or now, if unfinished).
    pub fn elapsed(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Accepted submissions per second of wall-clock time.
    pub fn accepted_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.accepted() as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HttpResponse, ResponseBody};
    use crate::error::{FailureKind, TransportFailure};
    use serde_json::json;

    fn response(status: StatusCode) -> Outcome {
        Outcome::Response(HttpResponse {
            status,
            body: ResponseBody::Json(json!({"id": 1})),
        })
    }

    fn no_response() -> Outcome {
        Outcome::TransportError(TransportFailure {
            endpoint: "http://localhost:8080/api/events".to_string(),
            kind: FailureKind::Timeout,
            message: "operation timed out".to_string(),
        })
    }

    #[test]
    fn test_metrics_collection() {
        let mut metrics = SubmissionMetrics::new();
        metrics.start();

        assert!(metrics.record(0, &response(StatusCode::ACCEPTED), StatusCode::ACCEPTED).is_none());
        assert!(metrics.record(1, &response(StatusCode::ACCEPTED), StatusCode::ACCEPTED).is_none());

        let rejected = metrics
            .record(2, &response(StatusCode::TOO_MANY_REQUESTS), StatusCode::ACCEPTED)
            .cloned()
            .unwrap();
        assert!(rejected.to_string().starts_with("Event 2 failed: status 429"));

        let unanswered = metrics
            .record(3, &no_response(), StatusCode::ACCEPTED)
            .cloned()
            .unwrap();
        assert_eq!(unanswered.outcome, SubmissionOutcome::NoResponse);

        metrics.finish();

        assert_eq!(metrics.accepted(), 2);
        assert_eq!(metrics.count(SubmissionOutcome::NoResponse), 1);
        assert_eq!(
            metrics.count(SubmissionOutcome::Rejected(StatusCode::TOO_MANY_REQUESTS)),
            1
        );

        let indices: Vec<usize> = metrics.into_failures().iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![2, 3]);
    }

    #[test]
    fn test_elapsed_without_start_is_zero() {
        let metrics = SubmissionMetrics::new();
        assert_eq!(metrics.elapsed(), Duration::ZERO);
        assert_eq!(metrics.accepted_per_second(), 0.0);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let mut metrics = SubmissionMetrics::new();
        let before = Instant::now();
        metrics.start();
        std::thread::sleep(Duration::from_millis(5));
        metrics.finish();
        let outer = before.elapsed();

        assert!(metrics.elapsed() >= Duration::from_millis(5));
        assert!(metrics.elapsed() <= outer);
    }
}
