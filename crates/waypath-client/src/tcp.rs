//! Newline-delimited JSON over TCP.
//!
//! One connection carries one mission: the sender connects, writes the payload line,
//! flushes and closes its write half.

use crate::state::{ConnectionState, ConnectionStatus};
use crate::transport::{calculate_backoff, MissionTransport, SendReport, SenderConfig, TransportError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};
use waypath_core::error::TimeoutError;
use waypath_mission::MissionPayload;

/// Frame delimiter for newline-delimited protocol
pub const NEWLINE_DELIMITER: u8 = b'\n';

/// Maximum frame size (1MB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Sends missions to a TCP receiver, one connection per mission.
#[derive(Debug, Clone)]
pub struct TcpMissionSender {
    config: SenderConfig,
    status: ConnectionStatus,
}

impl TcpMissionSender {
    pub fn new(config: SenderConfig) -> Self {
        Self {
            config,
            status: ConnectionStatus::new(),
        }
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// State, counters and the last failure, for reporting to the operator.
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    async fn establish_connection(&self) -> Result<TcpStream> {
        self.status.set_state(ConnectionState::Connecting);
        debug!(addr = %self.config.address, "Connecting");

        let stream = timeout(
            self.config.connect_timeout,
            TcpStream::connect(&self.config.address),
        )
        .await
        .map_err(|_| TimeoutError::ConnectTimeout {
            timeout_secs: self.config.connect_timeout.as_secs(),
        })?
        .with_context(|| format!("Failed to connect to {}", self.config.address))?;

        stream.set_nodelay(true).context("Failed to set TCP_NODELAY")?;
        self.status.set_state(ConnectionState::Connected);
        Ok(stream)
    }

    /// Connects, retrying with exponential backoff up to the configured attempt count.
    /// Returns the stream and the number of attempts used.
    async fn connect_with_retry(&self) -> Result<(TcpStream, u32)> {
        let policy = &self.config.retry;
        let mut attempt = 0u32;

        loop {
            match self.establish_connection().await {
                Ok(stream) => {
                    attempt += 1;
                    if attempt > 1 {
                        info!(attempt, "Connected after {} attempts", attempt);
                    }
                    return Ok((stream, attempt));
                }
                Err(e) => {
                    attempt += 1;

                    if attempt >= policy.max_attempts {
                        if policy.max_attempts > 1 {
                            error!(attempt, error = %e, "Max connection attempts reached");
                        }
                        return Err(e);
                    }

                    let backoff = calculate_backoff(attempt - 1, policy);
                    warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Connection attempt failed, retrying after backoff"
                    );
                    self.status.metrics().record_retry();
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    async fn write_line(&self, stream: &mut TcpStream, line: &[u8]) -> Result<()> {
        let write = async {
            stream.write_all(line).await?;
            stream.flush().await?;
            stream.shutdown().await
        };

        timeout(self.config.write_timeout, write)
            .await
            .map_err(|_| TimeoutError::WriteTimeout {
                timeout_secs: self.config.write_timeout.as_secs(),
            })?
            .context("Write error")?;

        self.status.metrics().record_bytes_sent(line.len() as u64);
        Ok(())
    }

    async fn deliver(&self, line: &[u8]) -> Result<u32> {
        let (mut stream, attempts) = self.connect_with_retry().await?;
        self.write_line(&mut stream, line).await?;
        Ok(attempts)
    }
}

#[async_trait]
impl MissionTransport for TcpMissionSender {
    #[instrument(skip(self, payload), fields(addr = %self.config.address))]
    async fn send_payload(&self, payload: &MissionPayload) -> Result<SendReport> {
        if payload.is_empty() {
            return Err(TransportError::EmptyMission.into());
        }

        let line = payload
            .to_json_line()
            .context("Failed to serialize mission payload")?;

        match self.deliver(line.as_bytes()).await {
            Ok(attempts) => {
                self.status.clear_error();
                self.status.set_state(ConnectionState::Idle);
                self.status.metrics().record_mission_sent();
                info!(
                    waypoints = payload.nav_waypoints.len(),
                    bytes = line.len(),
                    "Mission sent"
                );
                Ok(SendReport {
                    address: self.config.address.clone(),
                    bytes: line.len(),
                    attempts,
                })
            }
            Err(e) => {
                error!(error = %e, "Mission send failed");
                self.status.set_error(format!("{e:#}"));
                Err(e)
            }
        }
    }
}

/// Reads one newline-terminated frame, without the delimiter.
///
/// End of stream also ends a frame, so a peer that writes a payload and closes without
/// a trailing newline is still read. Returns `None` when the stream ends with nothing
/// buffered.
pub async fn read_newline_frame<R>(
    stream: &mut R,
    buffer: &mut BytesMut,
    read_timeout: Duration,
) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    loop {
        if let Some(pos) = buffer.iter().position(|&b| b == NEWLINE_DELIMITER) {
            let mut frame = buffer.split_to(pos + 1).freeze();
            frame.truncate(pos);
            return Ok(Some(frame));
        }

        if buffer.len() >= MAX_FRAME_SIZE {
            return Err(TransportError::FrameTooLarge {
                limit: MAX_FRAME_SIZE,
            }
            .into());
        }

        let read = timeout(read_timeout, stream.read_buf(buffer))
            .await
            .map_err(|_| TimeoutError::ReadTimeout {
                timeout_secs: read_timeout.as_secs(),
            })?
            .context("Read error")?;

        if read == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            return Ok(Some(buffer.split().freeze()));
        }
    }
}
