// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Destination provisioning.
//!
//! The destination is created once, before any scenario runs. There is no
//! retry: without a destination every later submission is meaningless.

use crate::client::{Outcome, RequestExecutor};
use crate::config::Config;
use crate::error::ProvisionError;
use crate::models::{DestinationId, DestinationRequest};
use reqwest::StatusCode;
use tracing::{info, warn};

/// A destination created for this run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionedDestination {
    pub id: DestinationId,
}

impl std::fmt::Display for ProvisionedDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Destination created successfully (ID: {})", self.id)
    }
}

/// Build the creation body for a destination named `name`.
pub fn destination_request(config: &Config, name: &str) -> DestinationRequest {
    DestinationRequest {
        name: name.to_string(),
        url: config.webhook_url.clone(),
        http_method: config.destination.http_method.clone(),
        rate_limit_rps: config.destination.rate_limit_rps,
        signing_secret: config.destination.signing_secret.clone(),
    }
}

/// Create the destination. Requires `200 OK` with an `id` in the body.
pub async fn provision(
    executor: &RequestExecutor,
    config: &Config,
    name: &str,
) -> Result<ProvisionedDestination, ProvisionError> {
    let request = destination_request(config, name);
    let body = serde_json::to_value(&request)
        .map_err(|e| ProvisionError::Encode(e.to_string()))?;

    info!(
        name = %request.name,
        rate_limit_rps = request.rate_limit_rps,
        "Creating destination"
    );

    let response = match executor.post_json(&config.destinations_url(), &body, &[]).await {
        Outcome::Response(response) => response,
        Outcome::TransportError(failure) => return Err(failure.into()),
    };

    if response.status != StatusCode::OK {
        warn!(status = response.status.as_u16(), "Destination creation rejected");
        return Err(ProvisionError::UnexpectedStatus {
            status: response.status,
            body: response.body.to_string(),
        });
    }

    let id = response.body.id().ok_or_else(|| ProvisionError::MissingId {
        body: response.body.to_string(),
    })?;

    info!(destination_id = %id, "Destination created");
    Ok(ProvisionedDestination {
        id: DestinationId::new(id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_built_from_config() {
        let config = Config {
            webhook_url: "https://webhook.site/abc".to_string(),
            ..Default::default()
        };
        let request = destination_request(&config, "LoadTest-42");
        assert_eq!(request.name, "LoadTest-42");
        assert_eq!(request.url, "https://webhook.site/abc");
        assert_eq!(request.http_method, "POST");
        assert_eq!(request.rate_limit_rps, 5);
        assert_eq!(request.signing_secret, "test-secret-key-123");
    }

    #[test]
    fn test_display_names_id() {
        let destination = ProvisionedDestination {
            id: DestinationId::new("dest-123"),
        };
        assert_eq!(
            destination.to_string(),
            "Destination created successfully (ID: dest-123)"
        );
    }
}
