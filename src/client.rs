// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP request executor.
//!
//! Every call ends in exactly one [`Outcome`]: a received response (any
//! status, 2xx through 5xx) or a transport failure. Error statuses are not
//! failures of the executor; callers inspect them like any other response.

use crate::error::{FailureKind, TransportFailure};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Response body, parsed as JSON when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    /// Body that is not valid JSON, kept verbatim
    Text(String),
}

impl ResponseBody {
    /// Parse `text` as JSON, falling back to the raw text.
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }

    /// The `id` field of a JSON object body, as a string.
    ///
    /// The platform returns UUIDs, but numeric ids are accepted too.
    pub fn id(&self) -> Option<String> {
        match self {
            Self::Json(Value::Object(map)) => match map.get("id")? {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// A response received from the service.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

/// Normalized result of one request.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The service answered, with whatever status
    Response(HttpResponse),
    /// No usable response; the result of the call is unknown
    TransportError(TransportFailure),
}

impl Outcome {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Response(response) => Some(response.status),
            Self::TransportError(_) => None,
        }
    }

    /// The response, if one arrived with exactly `status`.
    pub fn expect_status(&self, status: StatusCode) -> Option<&HttpResponse> {
        match self {
            Self::Response(response) if response.status == status => Some(response),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Response(response) => {
                write!(f, "status {} body {}", response.status.as_u16(), response.body)
            }
            Self::TransportError(failure) => write!(f, "no response ({failure})"),
        }
    }
}

/// Issues single JSON requests with a fixed timeout.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
}

impl RequestExecutor {
    /// Create an executor whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Send one request and normalize the result.
    ///
    /// A JSON `body` is serialized and sent with `Content-Type:
    /// application/json` unless `headers` already carries a content type.
    pub async fn execute(
        &self,
        method: &str,
        url: &str,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Outcome {
        match self.send(method, url, body, headers).await {
            Ok(response) => {
                debug!(
                    endpoint = %url,
                    status = response.status.as_u16(),
                    "Response received"
                );
                Outcome::Response(response)
            }
            Err(failure) => {
                warn!(
                    endpoint = %failure.endpoint,
                    kind = %failure.kind,
                    error = %failure.message,
                    "Request produced no response; is the service running at this address?"
                );
                Outcome::TransportError(failure)
            }
        }
    }

    /// POST a JSON body.
    pub async fn post_json(&self, url: &str, body: &Value, headers: &[(&str, &str)]) -> Outcome {
        self.execute("POST", url, Some(body), headers).await
    }

    pub async fn get(&self, url: &str) -> Outcome {
        self.execute("GET", url, None, &[]).await
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportFailure> {
        let invalid = |message: String| TransportFailure {
            endpoint: url.to_string(),
            kind: FailureKind::InvalidRequest,
            message,
        };

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| invalid(format!("bad method {method:?}: {e}")))?;
        let target = Url::parse(url).map_err(|e| invalid(format!("bad URL: {e}")))?;

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| invalid(format!("bad header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| invalid(format!("bad value for header {}: {e}", name.as_str())))?;
            header_map.append(name, value);
        }

        let mut request = self.client.request(method, target);
        if let Some(body) = body {
            let encoded =
                serde_json::to_vec(body).map_err(|e| invalid(format!("body encoding: {e}")))?;
            if !header_map.contains_key(CONTENT_TYPE) {
                header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            request = request.body(encoded);
        }

        let response = request
            .headers(header_map)
            .send()
            .await
            .map_err(|e| transport_failure(url, &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_failure(url, &e))?;

        Ok(HttpResponse {
            status,
            body: ResponseBody::parse(text),
        })
    }
}

fn transport_failure(endpoint: &str, err: &reqwest::Error) -> TransportFailure {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() {
        FailureKind::Connect
    } else if err.is_builder() {
        FailureKind::InvalidRequest
    } else if err.is_body() || err.is_decode() {
        FailureKind::Body
    } else {
        FailureKind::Other
    };

    TransportFailure {
        endpoint: endpoint.to_string(),
        kind,
        message: error_chain(err),
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
