// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Run orchestration: provisioning, scenarios, and the operator checklist.
//!
//! Human-readable results are written to the caller's writer. Diagnostics go
//! through `tracing`.

use crate::client::{Outcome, RequestExecutor};
use crate::config::Config;
use crate::error::{HarnessError, ProvisionError, Result};
use crate::models::{EventId, EventRecord, EventStatus};
use crate::provision::{provision, ProvisionedDestination};
use crate::scenarios::{
    burst_submit, submit_batch, verify_idempotency, BatchReport, BurstReport, IdempotencyOutcome,
};
use reqwest::StatusCode;
use std::io::{BufRead, Write};
use tracing::{info, warn};

const RULE_WIDTH: usize = 60;

/// A verification scenario, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum Scenario {
    Idempotency,
    Burst,
    Batch,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Idempotency, Scenario::Burst, Scenario::Batch];
}

/// Everything a run observed.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub destination: ProvisionedDestination,
    pub idempotency: Option<IdempotencyOutcome>,
    pub burst: Option<BurstReport>,
    pub batch: Option<BatchReport>,
    /// Status of the idempotency event when read back
    pub event_status: Option<EventStatus>,
}

impl RunSummary {
    /// False only when an assertive check failed. Burst and batch are
    /// observational and never fail a run.
    pub fn all_passed(&self) -> bool {
        self.idempotency
            .as_ref()
            .map_or(true, IdempotencyOutcome::is_passed)
    }
}

/// How a run ended, for the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The operator declined to continue with the placeholder webhook
    Declined,
    /// The destination could not be created
    ProvisionFailed,
    /// Every selected scenario ran
    Completed { passed: bool },
}

impl RunEnd {
    /// Classify a run result. Errors other than provisioning (a failing
    /// writer, for instance) are passed through.
    pub fn from_run(result: Result<RunSummary>) -> Result<Self> {
        match result {
            Ok(summary) => Ok(Self::Completed {
                passed: summary.all_passed(),
            }),
            Err(HarnessError::Provision(_)) => Ok(Self::ProvisionFailed),
            Err(err) => Err(err),
        }
    }

    /// Provisioning is the only hard failure. With `strict`, a failed
    /// idempotency check exits with 2.
    pub fn exit_code(self, strict: bool) -> u8 {
        match self {
            Self::Declined => 0,
            Self::ProvisionFailed => 1,
            Self::Completed { passed: false } if strict => 2,
            Self::Completed { .. } => 0,
        }
    }
}

/// Sequences provisioning and the selected scenarios against one service.
pub struct Harness {
    config: Config,
    executor: RequestExecutor,
    scenarios: Vec<Scenario>,
}

impl Harness {
    /// Validate `config` and build the HTTP executor. All scenarios selected.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let executor = RequestExecutor::new(config.request_timeout())?;
        Ok(Self {
            config,
            executor,
            scenarios: Scenario::ALL.to_vec(),
        })
    }

    /// Restrict the run to `scenarios`. They still run in the fixed order.
    pub fn with_scenarios(mut self, scenarios: &[Scenario]) -> Self {
        let mut selected = scenarios.to_vec();
        selected.sort();
        selected.dedup();
        self.scenarios = selected;
        self
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Execute the run. Only a provisioning failure (or a failing writer)
    /// returns an error; scenario failures are reported in the summary.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let config = &self.config;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(out, "{rule}")?;
        writeln!(out, "🚀 Event Delivery Platform - Load Test")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "Target: {}", config.base_url)?;
        writeln!(out, "Webhook: {}", config.webhook_url)?;

        let name = config.destination_name(chrono::Utc::now().timestamp());
        writeln!(
            out,
            "\n📍 Creating destination '{}' with {} RPS limit...",
            name, config.destination.rate_limit_rps
        )?;

        let destination = match provision(&self.executor, config, &name).await {
            Ok(destination) => destination,
            Err(err) => {
                warn!(error = %err, "Provisioning failed, aborting run");
                write_provision_failure(out, config, &err)?;
                return Err(err.into());
            }
        };
        writeln!(out, "✅ {destination}")?;

        let mut summary = RunSummary {
            destination,
            idempotency: None,
            burst: None,
            batch: None,
            event_status: None,
        };
        let destination_id = summary.destination.id.clone();

        for scenario in &self.scenarios {
            match scenario {
                Scenario::Idempotency => {
                    writeln!(out, "\n🔄 Testing idempotency...")?;
                    let outcome = verify_idempotency(&self.executor, config, &destination_id).await;
                    write_idempotency(out, &outcome)?;
                    summary.idempotency = Some(outcome);
                }
                Scenario::Burst => {
                    let size = config.scenarios.burst_size;
                    writeln!(out, "\n⚡ Testing rate limiting (sending {size} events rapidly)...")?;
                    writeln!(
                        out,
                        "   Expected: ~{} events/sec throughput",
                        config.destination.rate_limit_rps
                    )?;
                    let report =
                        burst_submit(&self.executor, config, &destination_id, size, out).await?;
                    writeln!(out, "✅ {report}")?;
                    summary.burst = Some(report);
                }
                Scenario::Batch => {
                    let count = config.scenarios.batch_size;
                    writeln!(
                        out,
                        "\n📤 Sending {count} events (with some duplicates for idempotency testing)..."
                    )?;
                    let report =
                        submit_batch(&self.executor, config, &destination_id, count, out).await?;
                    writeln!(out, "✅ {report}")?;
                    summary.batch = Some(report);
                }
            }
        }

        if config.scenarios.verify_event_state {
            let event_id = summary
                .idempotency
                .as_ref()
                .and_then(IdempotencyOutcome::first_event_id)
                .cloned();
            if let Some(event_id) = event_id {
                writeln!(out, "\n🔎 Reading back event {event_id}...")?;
                match read_event_status(&self.executor, config, &event_id).await {
                    Ok(status) => {
                        writeln!(out, "✅ Event {event_id} status: {status}")?;
                        summary.event_status = Some(status);
                    }
                    Err(detail) => writeln!(out, "❌ Could not read event {event_id}: {detail}")?,
                }
            }
        }

        write_checklist(out, config)?;
        info!(
            destination_id = %summary.destination.id,
            passed = summary.all_passed(),
            "Load test completed"
        );
        Ok(summary)
    }
}

/// Fetch `GET /events/{id}` and extract the event status.
pub async fn read_event_status(
    executor: &RequestExecutor,
    config: &Config,
    event_id: &EventId,
) -> std::result::Result<EventStatus, String> {
    let outcome = executor.get(&config.event_url(event_id.as_str())).await;
    let response = match &outcome {
        Outcome::Response(response) if response.status == StatusCode::OK => response,
        other => return Err(other.to_string()),
    };
    let json = response
        .body
        .as_json()
        .ok_or_else(|| format!("not JSON: {}", response.body))?;
    serde_json::from_value::<EventRecord>(json.clone())
        .map(|record| record.status)
        .map_err(|e| format!("unexpected event body ({e}): {json}"))
}

/// Ask whether to continue with the placeholder webhook URL.
///
/// Only `y` or `Y` continues; anything else, including end of input, declines.
pub fn confirm_placeholder<R: BufRead, W: Write>(mut input: R, out: &mut W) -> std::io::Result<bool> {
    writeln!(out, "\n⚠️  WARNING: Using placeholder webhook URL")?;
    writeln!(
        out,
        "   For real testing, replace the webhook URL with a valid webhook.site URL"
    )?;
    writeln!(
        out,
        "   Example: https://webhook.site/12345678-1234-1234-1234-123456789abc"
    )?;
    write!(out, "\n   Continue anyway? (y/n): ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn write_provision_failure<W: Write>(
    out: &mut W,
    config: &Config,
    err: &ProvisionError,
) -> std::io::Result<()> {
    writeln!(out, "❌ Failed to create destination:")?;
    match err {
        ProvisionError::Transport(failure) => {
            writeln!(out, "   {failure}")?;
            writeln!(out, "   Make sure the application is running at {}", config.base_url)
        }
        ProvisionError::UnexpectedStatus { status, body } => {
            writeln!(out, "   Status: {}", status.as_u16())?;
            writeln!(out, "   Body: {body}")
        }
        ProvisionError::MissingId { body } => {
            writeln!(out, "   Status: 200")?;
            writeln!(out, "   Body: {body}")
        }
        ProvisionError::Encode(reason) => writeln!(out, "   {reason}"),
    }
}

fn write_idempotency<W: Write>(out: &mut W, outcome: &IdempotencyOutcome) -> std::io::Result<()> {
    if let Some(first) = outcome.first_event_id() {
        writeln!(out, "✅ First request accepted (Event ID: {first})")?;
    }
    let marker = if outcome.is_passed() { "✅" } else { "❌" };
    writeln!(out, "{marker} {outcome}")
}

fn write_checklist<W: Write>(out: &mut W, config: &Config) -> std::io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}")?;
    writeln!(out, "✅ Load test completed!")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "\n📊 What to check:")?;
    writeln!(out, "   1. Application logs - look for:")?;
    writeln!(out, "      • 'Duplicate request detected' messages (idempotency)")?;
    writeln!(out, "      • 'Rate limit exceeded' warnings")?;
    writeln!(out, "      • Event delivery success/failure logs")?;
    writeln!(out, "   2. Webhook endpoint ({}):", config.webhook_url)?;
    writeln!(
        out,
        "      • Events arriving at ~{} per second",
        config.destination.rate_limit_rps
    )?;
    writeln!(out, "      • 'X-Edp-Signature' header present")?;
    writeln!(out, "      • Payload matches sent data")?;
    writeln!(out, "   3. Database - verify:")?;
    writeln!(out, "      • Events table has all events")?;
    writeln!(out, "      • Delivery attempts recorded")?;
    writeln!(out, "      • Event statuses (RECEIVED → PROCESSING → DELIVERED)")?;
    writeln!(out, "\n💡 Tip: Run 'docker-compose logs -f' to watch real-time logs")?;
    writeln!(out, "{rule}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_confirm_accepts_only_y() {
        let mut out = Vec::new();
        assert!(confirm_placeholder("y\n".as_bytes(), &mut out).unwrap());
        assert!(confirm_placeholder("Y\n".as_bytes(), &mut out).unwrap());
        assert!(!confirm_placeholder("yes\n".as_bytes(), &mut out).unwrap());
        assert!(!confirm_placeholder("n\n".as_bytes(), &mut out).unwrap());
        assert!(!confirm_placeholder("".as_bytes(), &mut out).unwrap());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Continue anyway? (y/n):"));
    }

    #[test]
    fn test_with_scenarios_keeps_run_order() {
        let harness = Harness::new(Config::default())
            .unwrap()
            .with_scenarios(&[Scenario::Batch, Scenario::Idempotency, Scenario::Batch]);
        assert_eq!(harness.scenarios(), &[Scenario::Idempotency, Scenario::Batch]);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = Config {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(Harness::new(config).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunEnd::Declined.exit_code(false), 0);
        assert_eq!(RunEnd::Declined.exit_code(true), 0);
        assert_eq!(RunEnd::ProvisionFailed.exit_code(false), 1);
        assert_eq!(RunEnd::ProvisionFailed.exit_code(true), 1);
        assert_eq!(RunEnd::Completed { passed: true }.exit_code(true), 0);
        assert_eq!(RunEnd::Completed { passed: false }.exit_code(false), 0);
        assert_eq!(RunEnd::Completed { passed: false }.exit_code(true), 2);
    }

    #[test]
    fn test_run_end_from_errors() {
        let provision: Result<RunSummary> = Err(ProvisionError::MissingId {
            body: "{}".to_string(),
        }
        .into());
        assert_eq!(RunEnd::from_run(provision).ok(), Some(RunEnd::ProvisionFailed));

        let config: Result<RunSummary> = Err(ConfigError::Zero("batch_size").into());
        assert!(matches!(
            RunEnd::from_run(config),
            Err(HarnessError::Config(ConfigError::Zero("batch_size")))
        ));
    }

    #[test]
    fn test_run_end_from_summary() {
        let mut summary = RunSummary {
            destination: ProvisionedDestination {
                id: crate::models::DestinationId::new("dest-123"),
            },
            idempotency: None,
            burst: None,
            batch: None,
            event_status: None,
        };
        let completed = RunEnd::from_run(Ok(summary.clone())).ok();
        assert_eq!(completed, Some(RunEnd::Completed { passed: true }));

        summary.idempotency = Some(IdempotencyOutcome::Mismatch {
            first: EventId::new("1"),
            second: EventId::new("2"),
        });
        let failed = RunEnd::from_run(Ok(summary)).ok();
        assert_eq!(failed, Some(RunEnd::Completed { passed: false }));
    }
}
