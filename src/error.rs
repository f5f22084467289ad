// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the load test harness

use reqwest::StatusCode;
use thiserror::Error;

/// Why a request produced no usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request timeout elapsed
    Timeout,
    /// Connection refused, DNS failure or similar
    Connect,
    /// The request could not be built (bad URL, method or body)
    InvalidRequest,
    /// The response body could not be read
    Body,
    /// Anything else reported by the HTTP client
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "Timeout"),
            Self::Connect => write!(f, "Connection error"),
            Self::InvalidRequest => write!(f, "Invalid request"),
            Self::Body => write!(f, "Unreadable response"),
            Self::Other => write!(f, "Unexpected error"),
        }
    }
}

/// A request whose result could not be determined.
#[derive(Debug, Clone, Error)]
#[error("{kind} calling {endpoint}: {message}")]
pub struct TransportFailure {
    pub endpoint: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Destination provisioning failures. Every variant aborts the run.
#[derive(Debug, Clone, Error)]
pub enum ProvisionError {
    #[error("{0}")]
    Transport(#[from] TransportFailure),

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("Response has no destination id: {body}")]
    MissingId { body: String },

    #[error("Could not encode destination request: {0}")]
    Encode(String),
}

/// Configuration errors.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Invalid URL for {field}: {url} ({reason})")]
    InvalidUrl {
        field: &'static str,
        url: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Harness error types
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create destination: {0}")]
    Provision(#[from] ProvisionError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, HarnessError>;
