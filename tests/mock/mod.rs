// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-process stand-in for the event delivery platform API.
//!
//! Destinations are created with the fixed id `dest-123`. Events get a
//! monotonically increasing numeric id, shared by all requests carrying the
//! same `Idempotency-Key` (unless the mode says otherwise).

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How `POST /api/destinations` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationMode {
    Create,
    Fail,
    MissingId,
}

/// How `POST /api/events` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventMode {
    /// Same key, same id
    Dedup,
    /// Every request creates a new event
    AlwaysNew,
    /// Every request is rejected with 503
    Reject,
    /// First request for each `repeated-key-*` key is rejected, then dedup
    FlakyRepeated,
    /// First request for each key is accepted, repeats get 409
    RejectRepeats,
}

/// One received `POST /api/events`.
#[derive(Debug, Clone)]
pub struct SubmittedEvent {
    pub key: Option<String>,
    pub destination_id: Value,
    pub status: u16,
}

pub struct MockState {
    destination_mode: DestinationMode,
    event_mode: EventMode,
    next_id: Mutex<u64>,
    ids_by_key: Mutex<HashMap<String, u64>>,
    submissions: Mutex<Vec<SubmittedEvent>>,
    destination_bodies: Mutex<Vec<Value>>,
}

impl MockState {
    pub fn submissions(&self) -> Vec<SubmittedEvent> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn destination_bodies(&self) -> Vec<Value> {
        self.destination_bodies.lock().unwrap().clone()
    }

    fn allocate_id(&self) -> u64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    fn event_id(&self, key: Option<&str>) -> Result<u64, StatusCode> {
        match (self.event_mode, key) {
            (EventMode::Reject, _) => Err(StatusCode::SERVICE_UNAVAILABLE),
            (EventMode::AlwaysNew, _) | (_, None) => Ok(self.allocate_id()),
            (EventMode::FlakyRepeated, Some(key)) if key.starts_with("repeated-key-") => {
                if self.seen(key) {
                    Ok(self.dedup(key))
                } else {
                    Err(StatusCode::SERVICE_UNAVAILABLE)
                }
            }
            (EventMode::RejectRepeats, Some(key)) if self.seen(key) => Err(StatusCode::CONFLICT),
            (_, Some(key)) => Ok(self.dedup(key)),
        }
    }

    fn seen(&self, key: &str) -> bool {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.key.as_deref() == Some(key))
    }

    fn dedup(&self, key: &str) -> u64 {
        let mut ids = self.ids_by_key.lock().unwrap();
        if let Some(id) = ids.get(key) {
            return *id;
        }
        let id = self.allocate_id();
        ids.insert(key.to_string(), id);
        id
    }
}

/// Start the mock on an ephemeral port; returns its address and shared state.
pub async fn start_mock_service(
    destination_mode: DestinationMode,
    event_mode: EventMode,
) -> anyhow::Result<(SocketAddr, Arc<MockState>)> {
    let state = Arc::new(MockState {
        destination_mode,
        event_mode,
        next_id: Mutex::new(0),
        ids_by_key: Mutex::new(HashMap::new()),
        submissions: Mutex::new(Vec::new()),
        destination_bodies: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/destinations", post(create_destination))
        .route("/api/events", post(create_event))
        .route("/api/events/:id", get(get_event))
        .route("/api/slow", get(slow))
        .route("/api/malformed", get(malformed))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok((addr, state))
}

/// An address nothing listens on.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn create_destination(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.destination_bodies.lock().unwrap().push(body.clone());

    match state.destination_mode {
        DestinationMode::Create => (
            StatusCode::OK,
            Json(json!({
                "id": "dest-123",
                "name": body["name"],
                "rateLimitRps": body["rateLimitRps"],
            })),
        ),
        DestinationMode::Fail => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "database unavailable"})),
        ),
        DestinationMode::MissingId => (StatusCode::OK, Json(json!({"name": body["name"]}))),
    }
}

async fn create_event(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let result = state.event_id(key.as_deref());
    let status = match result {
        Ok(_) => StatusCode::ACCEPTED,
        Err(status) => status,
    };
    state.submissions.lock().unwrap().push(SubmittedEvent {
        key: key.clone(),
        destination_id: body["destinationId"].clone(),
        status: status.as_u16(),
    });

    match result {
        Ok(id) => (
            StatusCode::ACCEPTED,
            Json(json!({
                "id": id,
                "status": "RECEIVED",
                "payload": body["payload"],
                "idempotencyKey": key,
            })),
        ),
        Err(status) if status == StatusCode::CONFLICT => (
            status,
            Json(json!({"error": "duplicate idempotency key"})),
        ),
        Err(status) => (status, Json(json!({"error": "queue unavailable"}))),
    }
}

async fn get_event(
    State(state): State<Arc<MockState>>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    let known = *state.next_id.lock().unwrap() >= id && id > 0;
    if known {
        (StatusCode::OK, Json(json!({"id": id, "status": "RECEIVED"})))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})))
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "too late"
}

async fn malformed() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "<html>upstream {broken")
}

/// Writer that notes how many events the mock had received when each line
/// was completed.
pub struct LineRecorder {
    state: Arc<MockState>,
    current: Vec<u8>,
    lines: Vec<(String, usize)>,
}

impl LineRecorder {
    pub fn new(state: Arc<MockState>) -> Self {
        Self {
            state,
            current: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Completed lines with the submission count at the time they were written.
    pub fn lines(&self) -> &[(String, usize)] {
        &self.lines
    }

    /// Submission count when the first line containing `needle` was written.
    pub fn written_after(&self, needle: &str) -> Option<usize> {
        self.lines
            .iter()
            .find(|(line, _)| line.contains(needle))
            .map(|(_, submitted)| *submitted)
    }
}

impl std::io::Write for LineRecorder {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        for &byte in buf {
            if byte == b'\n' {
                let line = String::from_utf8_lossy(&self.current).into_owned();
                self.current.clear();
                self.lines.push((line, self.state.submissions.lock().unwrap().len()));
            } else {
                self.current.push(byte);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
