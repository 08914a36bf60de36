//! Mission document and its canonical wire payload.

use crate::path::{PathChange, PathCommand, Waypoint, WaypointPath};
use crate::search::{PatternKind, SearchConfig, SearchObject};
use serde::{Deserialize, Serialize};
use waypath_core::error::ParseError;
use waypath_core::{GeoPoint, PathError, WaypointId};

/// One entry of `nav_waypoints`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavWaypoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl From<GeoPoint> for NavWaypoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// Canonical payload sent to the rover.
///
/// Field declaration order is the wire order. Missing fields read as zero or empty,
/// matching what the rover bridge assumes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MissionPayload {
    #[serde(default)]
    pub search_object: u8,
    #[serde(default)]
    pub search_pattern: u8,
    #[serde(default)]
    pub nav_waypoints: Vec<NavWaypoint>,
}

impl MissionPayload {
    pub fn is_empty(&self) -> bool {
        self.nav_waypoints.is_empty()
    }

    /// Decoded `search_object`, or `None` for an ordinal this build does not know.
    pub fn object_kind(&self) -> Option<SearchObject> {
        SearchObject::from_ordinal(self.search_object)
    }

    /// Decoded `search_pattern`, or `None` for an ordinal this build does not know.
    pub fn pattern_kind(&self) -> Option<PatternKind> {
        PatternKind::from_ordinal(self.search_pattern)
    }

    /// Compact JSON text.
    pub fn to_json(&self) -> Result<String, ParseError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Compact JSON text terminated by `\n`, as written to the transport.
    pub fn to_json_line(&self) -> Result<String, ParseError> {
        let mut line = self.to_json()?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_json(text: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(text.trim())?)
    }
}

/// A waypoint path plus its search configuration.
///
/// The document is the single owner of the path; every mutation goes through it.
#[derive(Debug, Clone, Default)]
pub struct MissionDocument {
    path: WaypointPath,
    search: SearchConfig,
}

impl MissionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(search: SearchConfig) -> Self {
        Self {
            path: WaypointPath::new(),
            search,
        }
    }

    pub fn path(&self) -> &WaypointPath {
        &self.path
    }

    pub fn search(&self) -> &SearchConfig {
        &self.search
    }

    pub fn set_search(&mut self, search: SearchConfig) {
        self.search = search;
    }

    pub fn append(&mut self, point: GeoPoint) -> WaypointId {
        self.path.append(point)
    }

    pub fn insert_before(&mut self, index: usize, point: GeoPoint) -> Result<WaypointId, PathError> {
        self.path.insert_before(index, point)
    }

    pub fn move_to(&mut self, id: WaypointId, point: GeoPoint) -> Result<usize, PathError> {
        self.path.move_to(id, point)
    }

    pub fn remove_by_id(&mut self, id: WaypointId) -> Result<Waypoint, PathError> {
        self.path.remove_by_id(id)
    }

    pub fn apply(&mut self, command: PathCommand) -> Result<PathChange, PathError> {
        self.path.apply(command)
    }

    pub fn drain_changes(&mut self) -> Vec<PathChange> {
        self.path.drain_changes()
    }

    /// True when there are no waypoints, in which case there is nothing to export.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Builds the wire payload, keeping waypoints in path order.
    pub fn to_canonical_payload(&self) -> MissionPayload {
        MissionPayload {
            search_object: self.search.target_object.ordinal(),
            search_pattern: self.search.pattern.ordinal(),
            nav_waypoints: self.path.iter().map(|wp| wp.point.into()).collect(),
        }
    }
}
