//! # waypath-client
//!
//! Mission export transport for the Waypath planner.
//!
//! - **Sender**: writes the canonical payload as one line of UTF-8 JSON over TCP, with
//!   connect and write timeouts and optional retry with exponential backoff
//! - **Receiver**: accepts missions the same way a rover-side bridge does, for testing
//!   the wire contract end to end
//! - Connection state and counters, mirrored to the `metrics` facade
//!
//! Transport failures are reported to the caller and never touch the mission they
//! were sending.
//!
//! ## Example
//!
//! ```rust,no_run
//! use waypath_client::{MissionTransport, SenderConfig, TcpMissionSender};
//! use waypath_core::GeoPoint;
//! use waypath_mission::MissionDocument;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut document = MissionDocument::new();
//!     document.append(GeoPoint::new(38.4063, -110.7918)?);
//!
//!     let config = SenderConfig {
//!         address: "127.0.0.1:5005".to_string(),
//!         ..SenderConfig::default()
//!     };
//!     let sender = TcpMissionSender::new(config);
//!     let report = sender.send_document(&document).await?;
//!     println!("sent {} bytes", report.bytes);
//!     Ok(())
//! }
//! ```

pub mod receiver;
pub mod state;
pub mod tcp;
pub mod transport;

// Re-export commonly used types
pub use receiver::{MissionReceiver, ReceivedMission, ReceiverHandle};
pub use state::{ConnectionMetrics, ConnectionState, ConnectionStatus, MetricsSnapshot};
pub use tcp::TcpMissionSender;
pub use transport::{
    calculate_backoff, MissionTransport, RetryPolicy, SendReport, SenderConfig, TransportError,
};
