//! A stub Prometheus `query_range` endpoint for client and end-to-end tests.
//!
//! The server binds an ephemeral port on localhost, records every request it
//! receives and tracks how many requests it is serving at once.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How the stub answers.
#[derive(Debug, Clone)]
pub struct StubBehavior {
    /// Status returned for ordinary queries
    pub status: u16,
    /// Time spent before answering
    pub delay: Duration,
    /// Queries containing this text get a 500 instead
    pub fail_marker: Option<String>,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            status: 200,
            delay: Duration::ZERO,
            fail_marker: None,
        }
    }
}

impl StubBehavior {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub api_version: String,
    pub params: HashMap<String, String>,
}

struct StubState {
    behavior: StubBehavior,
    requests: Mutex<Vec<RecordedRequest>>,
    live: AtomicUsize,
    peak: AtomicUsize,
}

/// Running stub server; stops when dropped.
pub struct StubPrometheus {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubPrometheus {
    /// Start a stub on an ephemeral localhost port.
    pub async fn start(behavior: StubBehavior) -> Self {
        let state = Arc::new(StubState {
            behavior,
            requests: Mutex::new(Vec::new()),
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/:version/query_range", get(query_range))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Stub server has no address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL including the `http://` scheme.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Host and port without a scheme.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    /// Highest number of requests served simultaneously.
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }
}

impl Drop for StubPrometheus {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn query_range(
    State(state): State<Arc<StubState>>,
    Path(version): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let now = state.live.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak.fetch_max(now, Ordering::SeqCst);

    let failing = match (&state.behavior.fail_marker, params.get("query")) {
        (Some(marker), Some(query)) => query.contains(marker.as_str()),
        _ => false,
    };

    if let Ok(mut requests) = state.requests.lock() {
        requests.push(RecordedRequest {
            api_version: version,
            params,
        });
    }

    if !state.behavior.delay.is_zero() {
        tokio::time::sleep(state.behavior.delay).await;
    }
    state.live.fetch_sub(1, Ordering::SeqCst);

    let status = if failing {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::from_u16(state.behavior.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    };

    let body = if status == StatusCode::OK {
        json!({"status": "success", "data": {"resultType": "matrix", "result": []}})
    } else {
        json!({"status": "error", "errorType": "internal", "error": "stub failure"})
    };

    (status, Json(body))
}
