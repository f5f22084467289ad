// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Event Delivery Load Test
//!
//! This crate drives HTTP traffic against the event delivery platform API and
//! checks three behaviours of the service from the outside:
//!
//! - Idempotent event creation (same `Idempotency-Key`, same event id)
//! - Accept-path throughput under a burst, independent of the delivery rate limit
//! - Interleaved duplicate and unique submissions in one batch
//!
//! Requests are issued one at a time. Delivery itself is not observed; the run
//! ends with a checklist of where an operator should look to confirm it.

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod provision;
pub mod runner;
pub mod scenarios;

pub use client::{HttpResponse, Outcome, RequestExecutor, ResponseBody};
pub use config::Config;
pub use error::{HarnessError, ProvisionError, TransportFailure};
pub use runner::{Harness, RunEnd, RunSummary, Scenario};
