//! # Waypath Core
//!
//! Core types, error handling, and configuration for the Waypath mission planner.
//!
//! - **Types**: `GeoPoint`, `PlanarPoint` and `WaypointId`, the values every other crate
//!   passes around.
//! - **Errors**: typed errors using `thiserror` for path editing, geodetic validation,
//!   configuration and I/O failures.
//! - **Configuration**: YAML configuration with environment variable overrides and validation.
//!
//! ## Example
//!
//! ```
//! use waypath_core::types::GeoPoint;
//!
//! let point = GeoPoint::new(38.4063, -110.7918).unwrap();
//! assert!(point.validate().is_ok());
//!
//! // The poles are outside the Web-Mercator domain.
//! assert!(GeoPoint::new(90.0, 0.0).is_err());
//! ```

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{GeoError, ParseError, PathError, Result, WaypathError};
pub use types::{GeoPoint, PlanarPoint, WaypointId};
