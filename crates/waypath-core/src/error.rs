//! Error types for the Waypath mission planner.
//!
//! Every failure in the core is recoverable: operations return one of these values
//! and leave the mission untouched, so the caller can retry with corrected input.
//! All errors are serializable for logging and operator-facing reports.

use crate::types::WaypointId;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias using WaypathError as the error type.
pub type Result<T> = std::result::Result<T, WaypathError>;

/// Top-level error type for all Waypath operations.
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum WaypathError {
    /// Waypoint path editing errors
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    /// Geodetic validation errors
    #[error("Geo error: {0}")]
    Geo(#[from] GeoError),

    /// Parsing and deserialization errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(#[from] TimeoutError),
}

/// Errors raised by the waypoint path model.
///
/// Neither variant mutates the path.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PathError {
    /// Insertion index outside `[0, len]`
    #[error("Index {index} out of range for path of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The referenced waypoint is no longer in the path
    #[error("Waypoint {id} not found")]
    NotFound { id: WaypointId },
}

impl PathError {
    /// Creates an index out of range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Creates a not found error.
    pub fn not_found(id: WaypointId) -> Self {
        Self::NotFound { id }
    }
}

/// Errors raised when validating geodetic input.
///
/// The projection functions never raise these; they are produced by the validating
/// constructors before coordinates reach the path.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum GeoError {
    /// Latitude is non-finite or outside the Web-Mercator domain
    #[error("Invalid latitude: {value}")]
    InvalidLatitude { value: f64 },

    /// Longitude is non-finite or outside [-180, 180]
    #[error("Invalid longitude: {value}")]
    InvalidLongitude { value: f64 },

    /// Zoom level beyond what the tile scheme supports
    #[error("Invalid zoom level: {zoom}")]
    InvalidZoom { zoom: u8 },

    /// Planar unit scale must be finite and strictly positive
    #[error("Invalid unit scale: {value}")]
    InvalidUnitScale { value: f64 },
}

/// Errors related to parsing mission data.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ParseError {
    /// Failed to parse JSON data
    #[error("JSON parse error at line {line}, column {column}: {message}")]
    JsonError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Failed to parse YAML data
    #[error("YAML parse error: {message}")]
    YamlError { message: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ParseError {
    /// Creates a JSON parse error.
    pub fn json(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::JsonError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::json(err.line(), err.column(), err.to_string())
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError {
            message: err.to_string(),
        }
    }
}

/// Errors related to configuration.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Wrapper for I/O errors to make them serializable.
#[derive(Debug, Error, Serialize, Deserialize)]
#[error("I/O error: {kind:?}: {message}")]
pub struct IoError {
    pub kind: IoErrorKind,
    pub message: String,
}

impl From<io::Error> for IoError {
    fn from(err: io::Error) -> Self {
        Self {
            kind: err.kind().into(),
            message: err.to_string(),
        }
    }
}

impl From<io::Error> for WaypathError {
    fn from(err: io::Error) -> Self {
        WaypathError::Io(err.into())
    }
}

/// Serializable version of std::io::ErrorKind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoErrorKind {
    NotFound,
    PermissionDenied,
    ConnectionRefused,
    ConnectionReset,
    ConnectionAborted,
    NotConnected,
    AddrInUse,
    AddrNotAvailable,
    BrokenPipe,
    InvalidData,
    TimedOut,
    UnexpectedEof,
    Other,
}

impl From<io::ErrorKind> for IoErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => IoErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => IoErrorKind::PermissionDenied,
            io::ErrorKind::ConnectionRefused => IoErrorKind::ConnectionRefused,
            io::ErrorKind::ConnectionReset => IoErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted => IoErrorKind::ConnectionAborted,
            io::ErrorKind::NotConnected => IoErrorKind::NotConnected,
            io::ErrorKind::AddrInUse => IoErrorKind::AddrInUse,
            io::ErrorKind::AddrNotAvailable => IoErrorKind::AddrNotAvailable,
            io::ErrorKind::BrokenPipe => IoErrorKind::BrokenPipe,
            io::ErrorKind::InvalidData => IoErrorKind::InvalidData,
            io::ErrorKind::TimedOut => IoErrorKind::TimedOut,
            io::ErrorKind::UnexpectedEof => IoErrorKind::UnexpectedEof,
            _ => IoErrorKind::Other,
        }
    }
}

/// Timeout errors for transport operations.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum TimeoutError {
    /// Connection timeout
    #[error("Connection timeout after {timeout_secs}s")]
    ConnectTimeout { timeout_secs: u64 },

    /// Write operation timed out
    #[error("Write timeout after {timeout_secs}s")]
    WriteTimeout { timeout_secs: u64 },

    /// Read operation timed out
    #[error("Read timeout after {timeout_secs}s")]
    ReadTimeout { timeout_secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_error_display() {
        let err = PathError::out_of_range(5, 3);
        assert_eq!(err.to_string(), "Index 5 out of range for path of length 3");

        let id = WaypointId::new();
        let err = PathError::not_found(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_serialization() {
        let err = WaypathError::Geo(GeoError::InvalidLatitude { value: 91.0 });
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("Geo"));
        assert!(json.contains("InvalidLatitude"));
    }

    #[test]
    fn test_path_error_conversion() {
        let err: WaypathError = PathError::out_of_range(1, 0).into();
        assert!(matches!(
            err,
            WaypathError::Path(PathError::IndexOutOfRange { index: 1, len: 0 })
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err: WaypathError = io_err.into();
        match err {
            WaypathError::Io(inner) => assert_eq!(inner.kind, IoErrorKind::ConnectionRefused),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_from_json() {
        let err: ParseError = serde_json::from_str::<serde_json::Value>("{\n  \"a\": }")
            .unwrap_err()
            .into();
        match err {
            ParseError::JsonError { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
