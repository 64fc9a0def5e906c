use authprobe_client::{RequestSpec, Transport, TransportError};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;

/// Outcome of one probe, immutable once produced.
///
/// A `status` of 0 means no HTTP response was obtained: either a guard
/// refused the call before dispatch or the transport failed outright.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    /// HTTP status code, or 0 when no response exists.
    pub status: u16,
    /// Response body, or a synthesized `{"error": …}` object.
    pub body: Value,
    /// Wall-clock time the call took.
    pub latency_ms: u64,
}

impl CallResult {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Default)]
struct CallState {
    in_flight: bool,
    result: Option<CallResult>,
    started_at: Option<DateTime<Utc>>,
}

/// Keyed registry of independent, user-triggered endpoint probes.
///
/// Each key names one logical test action. Invoking a key marks it in-flight,
/// dispatches the request on the runtime, and stores the outcome when it
/// completes; other keys are untouched throughout. Re-invoking an in-flight
/// key starts a second independent call and whichever finishes last wins;
/// the operator provides pacing, so the race is accepted.
///
/// Nothing is ever raised to the caller: guard refusals, transport failures
/// and provider errors are all stored as [`CallResult`] data.
#[derive(Clone)]
pub struct Tracker {
    transport: Arc<dyn Transport>,
    calls: Arc<Mutex<HashMap<String, CallState>>>,
}

impl Tracker {
    /// Create a tracker dispatching through `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fire a probe under `key`.
    ///
    /// Returns the join handle of the spawned call so callers that care
    /// (tests, sequential scripts) can await completion; UI callers drop it.
    pub fn invoke(&self, key: impl Into<String>, spec: RequestSpec) -> JoinHandle<()> {
        self.dispatch(key.into(), spec)
    }

    /// Fire a probe under `key` after checking a synchronous precondition.
    ///
    /// When the guard refuses, a synthetic zero-status result is stored
    /// immediately and no network access occurs.
    pub fn invoke_guarded<F>(
        &self,
        key: impl Into<String>,
        spec: RequestSpec,
        guard: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce() -> Result<(), String>,
    {
        let key = key.into();
        if let Err(reason) = guard() {
            log::debug!("probe {key} refused by guard: {reason}");
            self.store(
                &key,
                CallResult {
                    status: 0,
                    body: json!({ "error": reason }),
                    latency_ms: 0,
                },
            );
            return tokio::spawn(async {});
        }
        self.dispatch(key, spec)
    }

    fn dispatch(&self, key: String, spec: RequestSpec) -> JoinHandle<()> {
        {
            let mut calls = self.calls.lock().expect("tracker lock poisoned");
            let state = calls.entry(key.clone()).or_default();
            state.in_flight = true;
            state.started_at = Some(Utc::now());
        }
        log::debug!("probe {key}: {} {}", spec.method, spec.path);

        let transport = Arc::clone(&self.transport);
        let calls = Arc::clone(&self.calls);
        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = transport.execute(&spec).await;
            let latency_ms = started.elapsed().as_millis() as u64;
            let result = normalize(outcome, latency_ms);
            log::debug!("probe {key}: status {} in {}ms", result.status, latency_ms);

            let mut calls = calls.lock().expect("tracker lock poisoned");
            let state = calls.entry(key).or_default();
            state.result = Some(result);
            state.in_flight = false;
        })
    }

    fn store(&self, key: &str, result: CallResult) {
        let mut calls = self.calls.lock().expect("tracker lock poisoned");
        let state = calls.entry(key.to_string()).or_default();
        state.result = Some(result);
        state.in_flight = false;
    }

    /// Whether a call under `key` is currently in flight.
    pub fn is_loading(&self, key: &str) -> bool {
        self.calls
            .lock()
            .expect("tracker lock poisoned")
            .get(key)
            .is_some_and(|s| s.in_flight)
    }

    /// The last stored result for `key`, if any.
    pub fn result_of(&self, key: &str) -> Option<CallResult> {
        self.calls
            .lock()
            .expect("tracker lock poisoned")
            .get(key)
            .and_then(|s| s.result.clone())
    }

    /// When the most recent call under `key` was dispatched.
    pub fn started_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.calls
            .lock()
            .expect("tracker lock poisoned")
            .get(key)
            .and_then(|s| s.started_at)
    }

    /// Drop the stored result for `key`. Idempotent; an in-flight call is
    /// not cancelled and will still store its outcome when it completes.
    pub fn clear(&self, key: &str) {
        let mut calls = self.calls.lock().expect("tracker lock poisoned");
        if let Some(state) = calls.get_mut(key) {
            state.result = None;
        }
    }
}

/// Normalize a transport outcome into result data.
///
/// Errors that carry a response status/body keep them verbatim; bare
/// failures become `status 0` with a message-derived body.
fn normalize(outcome: Result<authprobe_client::RawResponse, TransportError>, latency_ms: u64) -> CallResult {
    match outcome {
        Ok(resp) => CallResult {
            status: resp.status,
            body: resp.body,
            latency_ms,
        },
        Err(err) => CallResult {
            status: err.status.unwrap_or(0),
            body: err
                .body
                .unwrap_or_else(|| json!({ "error": err.message })),
            latency_ms,
        },
    }
}
