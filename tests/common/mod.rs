//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use waypath_client::{MissionReceiver, ReceiverHandle};
use waypath_core::config::{AppConfig, ExportConfig};
use waypath_geo::LocalFrame;
use waypath_mission::{MissionDocument, MissionFile};

/// Get the path to test fixtures
pub fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir).join("tests").join("fixtures")
}

/// Get the path to the sample configuration shipped with the repository
pub fn sample_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("waypath.yaml")
}

/// Load the three-waypoint mission fixture
pub fn load_mission_fixture() -> MissionDocument {
    MissionFile::from_path(fixtures_dir().join("mission.yaml"))
        .and_then(MissionFile::into_document)
        .unwrap_or_else(|e| panic!("Failed to load mission fixture: {e}"))
}

/// Frame built from the default configuration
pub fn default_frame() -> LocalFrame {
    LocalFrame::from_config(&AppConfig::default().frame).expect("Default frame should be valid")
}

/// Start a receiver on an ephemeral loopback port
pub async fn spawn_receiver() -> (SocketAddr, ReceiverHandle) {
    let receiver = MissionReceiver::bind("127.0.0.1:0", Duration::from_secs(2))
        .await
        .expect("Failed to bind receiver");
    let addr = receiver.local_addr().expect("Receiver has no address");
    (addr, receiver.spawn(8))
}

/// Export settings pointing at `addr`
pub fn export_to(addr: SocketAddr) -> ExportConfig {
    ExportConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        connect_timeout_secs: 2,
        write_timeout_secs: 2,
        ..ExportConfig::default()
    }
}
