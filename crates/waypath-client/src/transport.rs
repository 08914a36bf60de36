use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use waypath_core::config::ExportConfig;
use waypath_mission::{MissionDocument, MissionPayload};

/// Retry behaviour for connection attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total connection attempts, including the first (1 = no retry)
    pub max_attempts: u32,
    /// Backoff before the first retry
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier (for exponential backoff)
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

/// Settings for a mission sender.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Receiver address (`host:port`)
    pub address: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Bound on writing the whole payload
    pub write_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for SenderConfig {
    fn from(config: &ExportConfig) -> Self {
        Self {
            address: config.address(),
            connect_timeout: config.connect_timeout(),
            write_timeout: config.write_timeout(),
            retry: RetryPolicy {
                max_attempts: config.max_attempts.max(1),
                initial_backoff: Duration::from_millis(config.initial_backoff_ms),
                max_backoff: Duration::from_millis(config.max_backoff_ms),
                backoff_multiplier: 2.0,
            },
        }
    }
}

/// What a successful send did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub address: String,
    /// Bytes written, including the trailing newline
    pub bytes: usize,
    /// Connection attempts it took
    pub attempts: u32,
}

/// Failures specific to the mission wire protocol.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The mission has no waypoints
    #[error("Mission has no waypoints, nothing to send")]
    EmptyMission,

    /// A peer sent more than the frame limit without a newline
    #[error("Frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },

    /// The payload is not valid UTF-8
    #[error("Payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Delivers canonical mission payloads to a downstream consumer.
///
/// Failures are reported to the caller only; the mission the payload came from is never
/// touched by a transport.
#[async_trait]
pub trait MissionTransport: Send + Sync {
    /// Sends one payload.
    ///
    /// # Returns
    /// * `Ok(SendReport)` once the full line has been written and flushed
    /// * `Err` with [`TransportError::EmptyMission`] for a payload without waypoints,
    ///   or the connection/timeout failure otherwise
    async fn send_payload(&self, payload: &MissionPayload) -> Result<SendReport>;

    /// Serializes `document` and sends it.
    async fn send_document(&self, document: &MissionDocument) -> Result<SendReport> {
        self.send_payload(&document.to_canonical_payload()).await
    }
}

/// Helper function to calculate exponential backoff duration
pub fn calculate_backoff(attempt: u32, policy: &RetryPolicy) -> Duration {
    let backoff_secs =
        policy.initial_backoff.as_secs_f64() * policy.backoff_multiplier.powi(attempt as i32);
    let capped_secs = backoff_secs.min(policy.max_backoff.as_secs_f64());
    Duration::from_secs_f64(capped_secs)
}
