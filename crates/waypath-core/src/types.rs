//! Core value types for the Waypath mission planner.
//!
//! GPS coordinates, local planar coordinates and waypoint identifiers. All of them are
//! small `Copy` values; ownership of waypoint data lives in the path model.

use crate::error::GeoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use uuid::Uuid;

/// Largest latitude representable in Web-Mercator, `atan(sinh(π))` in degrees.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Unique identifier for a waypoint.
///
/// Wraps a UUID v4. The id only correlates a waypoint with whatever a renderer keeps
/// for it; it carries no meaning of its own and never appears in the exported payload.
///
/// # Examples
///
/// ```
/// use waypath_core::types::WaypointId;
///
/// let a = WaypointId::new();
/// let b = WaypointId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaypointId(Uuid);

impl WaypointId {
    /// Creates a new random waypoint identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WaypointId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for WaypointId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A GPS coordinate in decimal degrees.
///
/// Field construction is allowed so that projection output and deserialized data can
/// be represented as-is; use [`GeoPoint::new`] or [`GeoPoint::validate`] before the
/// value is allowed into a mission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a validated point.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidLatitude`] for non-finite latitudes or latitudes beyond
    /// the Mercator limit, and [`GeoError::InvalidLongitude`] for non-finite longitudes or
    /// longitudes outside [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Checks that the point lies inside the Web-Mercator domain.
    pub fn validate(&self) -> Result<(), GeoError> {
        if !self.latitude.is_finite() || self.latitude.abs() > MAX_MERCATOR_LATITUDE {
            return Err(GeoError::InvalidLatitude {
                value: self.latitude,
            });
        }

        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(GeoError::InvalidLongitude {
                value: self.longitude,
            });
        }

        Ok(())
    }

    /// Returns true when both coordinates are within `tolerance` degrees of `other`.
    pub fn approx_eq(&self, other: &GeoPoint, tolerance: f64) -> bool {
        (self.latitude - other.latitude).abs() <= tolerance
            && (self.longitude - other.longitude).abs() <= tolerance
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7})", self.latitude, self.longitude)
    }
}

/// A point in a local planar frame, east-positive and north-positive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    /// The frame origin.
    pub const ORIGIN: PlanarPoint = PlanarPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: PlanarPoint) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: PlanarPoint) -> f64 {
        (self - other).length()
    }

    /// Distance from `self` to the closed segment `a`-`b`.
    ///
    /// The projection parameter is clamped to `[0, 1]`; a degenerate segment
    /// (`a == b`) measures the distance to `a`.
    pub fn distance_to_segment(self, a: PlanarPoint, b: PlanarPoint) -> f64 {
        let ab = b - a;
        let len_sq = ab.dot(ab);
        if len_sq == 0.0 {
            return self.distance(a);
        }
        let t = ((self - a).dot(ab) / len_sq).clamp(0.0, 1.0);
        let closest = a + ab * t;
        self.distance(closest)
    }
}

impl Add for PlanarPoint {
    type Output = PlanarPoint;

    fn add(self, rhs: PlanarPoint) -> PlanarPoint {
        PlanarPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PlanarPoint {
    type Output = PlanarPoint;

    fn sub(self, rhs: PlanarPoint) -> PlanarPoint {
        PlanarPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for PlanarPoint {
    type Output = PlanarPoint;

    fn mul(self, rhs: f64) -> PlanarPoint {
        PlanarPoint::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for PlanarPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}]", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(0.0, 0.0).is_ok());
        assert!(GeoPoint::new(85.0, 180.0).is_ok());
        assert!(GeoPoint::new(-85.0, -180.0).is_ok());

        assert_eq!(
            GeoPoint::new(90.0, 0.0),
            Err(GeoError::InvalidLatitude { value: 90.0 })
        );
        assert!(matches!(
            GeoPoint::new(f64::NAN, 0.0),
            Err(GeoError::InvalidLatitude { .. })
        ));
        assert_eq!(
            GeoPoint::new(10.0, 180.5),
            Err(GeoError::InvalidLongitude { value: 180.5 })
        );
        assert!(matches!(
            GeoPoint::new(10.0, f64::INFINITY),
            Err(GeoError::InvalidLongitude { .. })
        ));
    }

    #[test]
    fn test_geo_point_serde_shape() {
        let point = GeoPoint::new(38.5, -110.25).unwrap();
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"latitude":38.5,"longitude":-110.25}"#);
    }

    #[test]
    fn test_distance_to_segment_interior() {
        let a = PlanarPoint::new(0.0, 0.0);
        let b = PlanarPoint::new(10.0, 0.0);
        let probe = PlanarPoint::new(4.0, 3.0);
        assert!((probe.distance_to_segment(a, b) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_to_segment_clamps_to_endpoints() {
        let a = PlanarPoint::new(0.0, 0.0);
        let b = PlanarPoint::new(10.0, 0.0);

        let before = PlanarPoint::new(-3.0, 4.0);
        assert!((before.distance_to_segment(a, b) - 5.0).abs() < 1e-12);

        let after = PlanarPoint::new(13.0, -4.0);
        assert!((after.distance_to_segment(a, b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        let a = PlanarPoint::new(1.0, 1.0);
        let probe = PlanarPoint::new(4.0, 5.0);
        assert!((probe.distance_to_segment(a, a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_waypoint_id_display_round_trip() {
        let id = WaypointId::new();
        let parsed: Uuid = id.to_string().parse().unwrap();
        assert_eq!(WaypointId::from(parsed), id);
    }
}
