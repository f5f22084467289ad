// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Event Delivery Platform Load Test
//!
//! Creates a rate-limited destination on a running platform instance, then
//! exercises idempotent event creation, burst acceptance and a mixed batch of
//! unique and duplicate submissions.
//!
//! ## Configuration
//!
//! Every setting has a flag and an environment variable (a `.env` file is
//! honoured):
//!
//! - `EDP_BASE_URL`: API base URL (default: http://localhost:8080/api)
//! - `EDP_WEBHOOK_URL`: Delivery target (default: webhook.site placeholder)
//! - `EDP_RATE_LIMIT_RPS`: Destination rate limit (default: 5)
//! - `EDP_BURST_SIZE`: Burst scenario size (default: 15)
//! - `EDP_BATCH_SIZE`: Batch scenario size (default: 20)
//! - `EDP_PROGRESS_EVERY`: Batch progress mark interval (default: 10)
//! - `EDP_TIMEOUT_SECS`: Per-request timeout (default: 10)
//!
//! ## Exit status
//!
//! 1 if the destination cannot be created, 0 otherwise. With `--strict`, a
//! failed idempotency check exits with 2.

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use event_delivery_loadtest::{
    config::Config,
    runner::{confirm_placeholder, Harness, RunEnd, Scenario},
};

#[derive(Parser)]
#[command(
    name = "event-delivery-loadtest",
    about = "Idempotency and rate-limit load test for the event delivery platform"
)]
struct Args {
    /// API base URL, including the /api prefix
    #[arg(long, env = "EDP_BASE_URL")]
    base_url: Option<String>,

    /// Webhook receiver the test destination delivers to
    #[arg(long, env = "EDP_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Destination name prefix (creation time is appended)
    #[arg(long, env = "EDP_NAME_PREFIX")]
    name_prefix: Option<String>,

    /// HTTP method used for deliveries
    #[arg(long, env = "EDP_HTTP_METHOD")]
    http_method: Option<String>,

    /// Destination delivery rate limit (requests per second)
    #[arg(long, env = "EDP_RATE_LIMIT_RPS")]
    rate_limit_rps: Option<u32>,

    /// Secret the platform signs deliveries with
    #[arg(long, env = "EDP_SIGNING_SECRET")]
    signing_secret: Option<String>,

    /// Number of events in the burst scenario
    #[arg(long, env = "EDP_BURST_SIZE")]
    burst_size: Option<usize>,

    /// Number of events in the mixed batch scenario
    #[arg(long, env = "EDP_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Every Nth batch event reuses a fixed idempotency key
    #[arg(long, env = "EDP_DUPLICATE_EVERY")]
    duplicate_every: Option<usize>,

    /// Print a batch progress mark every N events
    #[arg(long, env = "EDP_PROGRESS_EVERY")]
    progress_every: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, env = "EDP_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Delay between the idempotency probe and its duplicate, in milliseconds
    #[arg(long, env = "EDP_DUPLICATE_DELAY_MS")]
    duplicate_delay_ms: Option<u64>,

    /// Scenario to run (repeatable; default: all)
    #[arg(long = "scenario", value_enum)]
    scenarios: Vec<Scenario>,

    /// Read the idempotency event back and report its status
    #[arg(long)]
    verify_event_state: bool,

    /// Continue with the placeholder webhook URL without asking
    #[arg(long, short = 'y')]
    yes: bool,

    /// Exit with status 2 when the idempotency check fails
    #[arg(long)]
    strict: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.log_json);

    let config = load_config(&args);
    info!(
        base_url = %config.base_url,
        webhook_url = %config.webhook_url,
        rate_limit_rps = config.destination.rate_limit_rps,
        burst_size = config.scenarios.burst_size,
        batch_size = config.scenarios.batch_size,
        "Starting load test"
    );

    let mut out = std::io::stdout();

    if config.has_placeholder_webhook()
        && !args.yes
        && !confirm_placeholder(std::io::stdin().lock(), &mut out)?
    {
        writeln!(out, "Exiting...")?;
        return Ok(ExitCode::from(RunEnd::Declined.exit_code(args.strict)));
    }

    let scenarios = if args.scenarios.is_empty() {
        Scenario::ALL.to_vec()
    } else {
        args.scenarios.clone()
    };
    let harness = Harness::new(config)?.with_scenarios(&scenarios);

    let end = RunEnd::from_run(harness.run(&mut out).await)?;
    Ok(ExitCode::from(end.exit_code(args.strict)))
}

/// Logs go to stderr so they never interleave with the report on stdout.
fn init_tracing(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

/// Apply flag and environment overrides to the defaults.
fn load_config(args: &Args) -> Config {
    let mut config = Config::default();

    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(webhook_url) = &args.webhook_url {
        config.webhook_url = webhook_url.clone();
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.request_timeout_secs = timeout_secs;
    }

    let destination = &mut config.destination;
    if let Some(prefix) = &args.name_prefix {
        destination.name_prefix = prefix.clone();
    }
    if let Some(method) = &args.http_method {
        destination.http_method = method.clone();
    }
    if let Some(rps) = args.rate_limit_rps {
        destination.rate_limit_rps = rps;
    }
    if let Some(secret) = &args.signing_secret {
        destination.signing_secret = secret.clone();
    }

    let scenarios = &mut config.scenarios;
    if let Some(size) = args.burst_size {
        scenarios.burst_size = size;
    }
    if let Some(size) = args.batch_size {
        scenarios.batch_size = size;
    }
    if let Some(every) = args.duplicate_every {
        scenarios.duplicate_every = every;
    }
    if let Some(every) = args.progress_every {
        scenarios.progress_every = every;
    }
    if let Some(delay) = args.duplicate_delay_ms {
        scenarios.duplicate_delay_ms = delay;
    }
    scenarios.verify_event_state = args.verify_event_state;

    config
}
