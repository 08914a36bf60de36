use metrics::{counter, describe_counter};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Where a transport endpoint is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Nothing in flight
    Idle,
    /// Opening a connection
    Connecting,
    /// Connected and writing or reading
    Connected,
    /// The last operation failed
    Failed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "Idle"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Failed => write!(f, "Failed"),
        }
    }
}

/// Counters for a sender or receiver.
///
/// Clones share the same counters. Every update is mirrored to the `metrics` facade
/// under the `waypath_transport_*` names.
#[derive(Debug, Clone)]
pub struct ConnectionMetrics {
    bytes_sent: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
    missions_sent: Arc<AtomicU64>,
    missions_received: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
    retries: Arc<AtomicU64>,
    last_activity: Arc<RwLock<Option<SystemTime>>>,
}

impl Default for ConnectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMetrics {
    pub fn new() -> Self {
        describe_counter!("waypath_transport_bytes_sent_total", "Payload bytes written");
        describe_counter!(
            "waypath_transport_bytes_received_total",
            "Payload bytes read"
        );
        describe_counter!("waypath_transport_missions_sent_total", "Missions delivered");
        describe_counter!(
            "waypath_transport_missions_received_total",
            "Missions accepted by the receiver"
        );
        describe_counter!("waypath_transport_errors_total", "Transport failures");
        describe_counter!("waypath_transport_retries_total", "Connection retries");

        Self {
            bytes_sent: Arc::new(AtomicU64::new(0)),
            bytes_received: Arc::new(AtomicU64::new(0)),
            missions_sent: Arc::new(AtomicU64::new(0)),
            missions_received: Arc::new(AtomicU64::new(0)),
            errors: Arc::new(AtomicU64::new(0)),
            retries: Arc::new(AtomicU64::new(0)),
            last_activity: Arc::new(RwLock::new(None)),
        }
    }

    pub fn record_bytes_sent(&self, bytes: u64) {
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
        counter!("waypath_transport_bytes_sent_total").increment(bytes);
        self.touch();
    }

    pub fn record_bytes_received(&self, bytes: u64) {
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
        counter!("waypath_transport_bytes_received_total").increment(bytes);
        self.touch();
    }

    pub fn record_mission_sent(&self) {
        self.missions_sent.fetch_add(1, Ordering::Relaxed);
        counter!("waypath_transport_missions_sent_total").increment(1);
    }

    pub fn record_mission_received(&self) {
        self.missions_received.fetch_add(1, Ordering::Relaxed);
        counter!("waypath_transport_missions_received_total").increment(1);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        counter!("waypath_transport_errors_total").increment(1);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
        counter!("waypath_transport_retries_total").increment(1);
    }

    fn touch(&self) {
        *self.last_activity.write() = Some(SystemTime::now());
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    pub fn missions_sent(&self) -> u64 {
        self.missions_sent.load(Ordering::Relaxed)
    }

    pub fn missions_received(&self) -> u64 {
        self.missions_received.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    pub fn last_activity(&self) -> Option<SystemTime> {
        *self.last_activity.read()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_sent: self.bytes_sent(),
            bytes_received: self.bytes_received(),
            missions_sent: self.missions_sent(),
            missions_received: self.missions_received(),
            errors: self.errors(),
            retries: self.retries(),
            last_activity: self.last_activity(),
        }
    }
}

/// Point-in-time copy of [`ConnectionMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub missions_sent: u64,
    pub missions_received: u64,
    pub errors: u64,
    pub retries: u64,
    pub last_activity: Option<SystemTime>,
}

impl MetricsSnapshot {
    /// Errors per mission handled.
    pub fn error_rate(&self) -> f64 {
        let total = self.missions_sent + self.missions_received;
        if total > 0 {
            self.errors as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Combined state, metrics and last error, shared between a transport and its owner.
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    state: Arc<RwLock<ConnectionState>>,
    metrics: ConnectionMetrics,
    error_message: Arc<RwLock<Option<String>>>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ConnectionState::Idle)),
            metrics: ConnectionMetrics::new(),
            error_message: Arc::new(RwLock::new(None)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    pub fn metrics(&self) -> &ConnectionMetrics {
        &self.metrics
    }

    /// Records a failure for the operator and counts it.
    pub fn set_error(&self, error: String) {
        *self.error_message.write() = Some(error);
        self.metrics.record_error();
        self.set_state(ConnectionState::Failed);
    }

    pub fn clear_error(&self) {
        *self.error_message.write() = None;
    }

    pub fn error_message(&self) -> Option<String> {
        self.error_message.read().clone()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state(), ConnectionState::Failed)
    }
}
