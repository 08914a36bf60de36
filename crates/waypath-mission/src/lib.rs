//! # Waypath Mission
//!
//! The editable part of the planner: an ordered waypoint path, the search configuration
//! that travels with it, the canonical payload handed to the export transport, and the
//! pointer-driven state machine that edits the path.
//!
//! ## Example
//!
//! ```
//! use waypath_core::{GeoPoint, PlanarPoint};
//! use waypath_geo::LocalFrame;
//! use waypath_mission::{InteractionController, MissionDocument, PickTolerance, PointerEvent};
//!
//! let frame = LocalFrame::new(GeoPoint::new(38.4063, -110.7918).unwrap(), 18, 10.0).unwrap();
//! let mut document = MissionDocument::new();
//! let mut controller = InteractionController::new();
//!
//! let press = PointerEvent::PrimaryPress {
//!     probe: PlanarPoint::new(4.0, 2.0),
//!     tolerance: PickTolerance::new(0.5, 0.3),
//! };
//! controller.handle(&mut document, &frame, press).unwrap();
//!
//! let line = document.to_canonical_payload().to_json_line().unwrap();
//! assert!(line.starts_with("{\"search_object\":0,\"search_pattern\":0,\"nav_waypoints\":["));
//! ```

pub mod controller;
pub mod document;
pub mod file;
pub mod path;
pub mod script;
pub mod search;

pub use controller::{
    transition, InteractionController, InteractionState, PickTolerance, PointerEvent, Transition,
};
pub use document::{MissionDocument, MissionPayload, NavWaypoint};
pub use file::MissionFile;
pub use path::{PathChange, PathCommand, Waypoint, WaypointPath};
pub use script::{EventScript, ReplaySummary, ScriptEvent};
pub use search::{
    LawnmowerParams, PatternKind, SearchConfig, SearchObject, SearchPattern, SpiralParams,
};
