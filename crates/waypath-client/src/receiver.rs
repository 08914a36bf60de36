//! Mission receiver: the other end of the export transport.
//!
//! Accepts connections, reads one payload line per connection and hands parsed
//! missions to the owner over a channel. Used to check what a rover-side consumer
//! would see.

use crate::state::{ConnectionState, ConnectionStatus};
use crate::tcp::read_newline_frame;
use crate::transport::TransportError;
use anyhow::{Context, Result};
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use waypath_core::config::ReceiverConfig;
use waypath_mission::MissionPayload;

/// A mission as it arrived at the receiver.
#[derive(Debug, Clone)]
pub struct ReceivedMission {
    pub payload: MissionPayload,
    pub peer: SocketAddr,
    pub received_at: DateTime<Utc>,
}

/// Listening socket for incoming missions.
#[derive(Debug)]
pub struct MissionReceiver {
    listener: TcpListener,
    read_timeout: Duration,
    status: ConnectionStatus,
}

impl MissionReceiver {
    pub async fn bind<A: ToSocketAddrs>(addr: A, read_timeout: Duration) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .context("Failed to bind mission receiver")?;

        Ok(Self {
            listener,
            read_timeout,
            status: ConnectionStatus::new(),
        })
    }

    pub async fn from_config(config: &ReceiverConfig) -> Result<Self> {
        Self::bind(config.bind_address(), config.read_timeout()).await
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read receiver address")
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// Accepts connections until `shutdown` fires or `tx` is closed.
    #[instrument(skip_all)]
    pub async fn serve(
        self,
        tx: mpsc::Sender<ReceivedMission>,
        mut shutdown: mpsc::Receiver<()>,
    ) -> Result<()> {
        info!(addr = ?self.listener.local_addr().ok(), "Mission receiver listening");
        self.status.set_state(ConnectionState::Connected);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    debug!("Mission receiver shutting down");
                    break;
                }
                _ = tx.closed() => {
                    debug!("Mission channel closed");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let tx = tx.clone();
                            let status = self.status.clone();
                            let read_timeout = self.read_timeout;
                            tokio::spawn(async move {
                                handle_connection(stream, peer, read_timeout, status, tx).await;
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                            self.status.metrics().record_error();
                        }
                    }
                }
            }
        }

        self.status.set_state(ConnectionState::Idle);
        Ok(())
    }

    /// Runs [`serve`](Self::serve) on a background task.
    pub fn spawn(self, buffer: usize) -> ReceiverHandle {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let status = self.status.clone();
        let task = tokio::spawn(self.serve(tx, shutdown_rx));

        ReceiverHandle {
            missions: rx,
            shutdown_tx,
            status,
            task,
        }
    }
}

/// Owner side of a spawned receiver.
#[derive(Debug)]
pub struct ReceiverHandle {
    missions: mpsc::Receiver<ReceivedMission>,
    shutdown_tx: mpsc::Sender<()>,
    status: ConnectionStatus,
    task: JoinHandle<Result<()>>,
}

impl ReceiverHandle {
    /// Waits for the next mission. `None` once the receiver has stopped.
    pub async fn next(&mut self) -> Option<ReceivedMission> {
        self.missions.recv().await
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// Stops accepting connections and waits for the accept loop to finish.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(()).await;
        self.task.await.context("Mission receiver task panicked")?
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    read_timeout: Duration,
    status: ConnectionStatus,
    tx: mpsc::Sender<ReceivedMission>,
) {
    debug!(%peer, "Connection accepted");
    let mut buffer = BytesMut::with_capacity(4096);

    let frame = match read_newline_frame(&mut stream, &mut buffer, read_timeout).await {
        Ok(Some(frame)) => frame,
        Ok(None) => {
            debug!(%peer, "Connection closed without data");
            return;
        }
        Err(e) => {
            warn!(%peer, error = %e, "Failed to read mission");
            status.metrics().record_error();
            return;
        }
    };
    status.metrics().record_bytes_received(frame.len() as u64);

    let payload = match parse_payload(&frame) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(%peer, error = %e, "Dropping malformed mission");
            status.metrics().record_error();
            return;
        }
    };

    if payload.object_kind().is_none() || payload.pattern_kind().is_none() {
        warn!(
            %peer,
            search_object = payload.search_object,
            search_pattern = payload.search_pattern,
            "Mission uses unknown search ordinals"
        );
    }

    if payload.is_empty() {
        warn!(%peer, "Received mission with no waypoints");
    } else {
        info!(
            %peer,
            waypoints = payload.nav_waypoints.len(),
            search_object = payload.search_object,
            search_pattern = payload.search_pattern,
            "Received mission"
        );
    }
    status.metrics().record_mission_received();

    let mission = ReceivedMission {
        payload,
        peer,
        received_at: Utc::now(),
    };
    if tx.send(mission).await.is_err() {
        debug!(%peer, "Mission channel closed, discarding");
    }
}

fn parse_payload(frame: &[u8]) -> Result<MissionPayload> {
    let text = std::str::from_utf8(frame).map_err(|_| TransportError::InvalidUtf8)?;
    Ok(MissionPayload::from_json(text)?)
}
