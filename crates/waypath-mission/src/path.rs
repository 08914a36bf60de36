//! Ordered waypoint path with segment-aware editing.
//!
//! Index 0 is the start of the mission and the last index is the end; the model
//! attaches no other meaning to position. Every successful mutation queues a
//! [`PathChange`] so a renderer can update incrementally instead of diffing the
//! whole path each frame. Failed operations leave both the path and the queue untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;
use waypath_core::{GeoPoint, PathError, PlanarPoint, WaypointId};
use waypath_geo::LocalFrame;

/// One GPS point in the mission path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub point: GeoPoint,
}

/// Notification emitted for each successful path mutation.
///
/// `index` is the waypoint's position right after the change (for `Removed`, the
/// position it was removed from).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum PathChange {
    Added { id: WaypointId, index: usize },
    Removed { id: WaypointId, index: usize },
    Moved { id: WaypointId, index: usize },
}

impl PathChange {
    pub fn id(&self) -> WaypointId {
        match *self {
            PathChange::Added { id, .. }
            | PathChange::Removed { id, .. }
            | PathChange::Moved { id, .. } => id,
        }
    }

    pub fn index(&self) -> usize {
        match *self {
            PathChange::Added { index, .. }
            | PathChange::Removed { index, .. }
            | PathChange::Moved { index, .. } => index,
        }
    }
}

/// A single path mutation, as produced by the interaction state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    Append { point: GeoPoint },
    InsertBefore { index: usize, point: GeoPoint },
    MoveTo { id: WaypointId, point: GeoPoint },
    Remove { id: WaypointId },
}

/// Ordered, mutable sequence of waypoints with unique ids.
#[derive(Debug, Clone, Default)]
pub struct WaypointPath {
    waypoints: Vec<Waypoint>,
    changes: Vec<PathChange>,
}

impl WaypointPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a path from points in order.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut path = Self::new();
        for point in points {
            path.append(point);
        }
        path
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn start(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    pub fn end(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    pub fn index_of(&self, id: WaypointId) -> Option<usize> {
        self.waypoints.iter().position(|wp| wp.id == id)
    }

    /// Adds a waypoint at the end of the path.
    pub fn append(&mut self, point: GeoPoint) -> WaypointId {
        let id = WaypointId::new();
        let index = self.waypoints.len();
        self.waypoints.push(Waypoint { id, point });
        self.changes.push(PathChange::Added { id, index });
        debug!(waypoint_id = %id, index, %point, "Appended waypoint");
        id
    }

    /// Inserts a waypoint so that it ends up at `index`.
    ///
    /// # Errors
    ///
    /// [`PathError::IndexOutOfRange`] unless `index` is in `[0, len]`.
    pub fn insert_before(&mut self, index: usize, point: GeoPoint) -> Result<WaypointId, PathError> {
        if index > self.waypoints.len() {
            return Err(PathError::out_of_range(index, self.waypoints.len()));
        }

        let id = WaypointId::new();
        self.waypoints.insert(index, Waypoint { id, point });
        self.changes.push(PathChange::Added { id, index });
        debug!(waypoint_id = %id, index, %point, "Inserted waypoint");
        Ok(id)
    }

    /// Replaces the point of waypoint `id`, keeping its identity and position.
    ///
    /// Returns the waypoint's index.
    pub fn move_to(&mut self, id: WaypointId, point: GeoPoint) -> Result<usize, PathError> {
        let index = self.index_of(id).ok_or(PathError::not_found(id))?;
        self.waypoints[index].point = point;
        self.changes.push(PathChange::Moved { id, index });
        debug!(waypoint_id = %id, index, %point, "Moved waypoint");
        Ok(index)
    }

    /// Removes waypoint `id`; later waypoints shift down by one.
    pub fn remove_by_id(&mut self, id: WaypointId) -> Result<Waypoint, PathError> {
        let index = self.index_of(id).ok_or(PathError::not_found(id))?;
        let removed = self.waypoints.remove(index);
        self.changes.push(PathChange::Removed { id, index });
        debug!(waypoint_id = %id, index, "Removed waypoint");
        Ok(removed)
    }

    /// Applies one command, returning the change it produced.
    pub fn apply(&mut self, command: PathCommand) -> Result<PathChange, PathError> {
        match command {
            PathCommand::Append { point } => {
                let id = self.append(point);
                Ok(PathChange::Added {
                    id,
                    index: self.len() - 1,
                })
            }
            PathCommand::InsertBefore { index, point } => {
                let id = self.insert_before(index, point)?;
                Ok(PathChange::Added { id, index })
            }
            PathCommand::MoveTo { id, point } => {
                let index = self.move_to(id, point)?;
                Ok(PathChange::Moved { id, index })
            }
            PathCommand::Remove { id } => {
                let index = self.index_of(id).ok_or(PathError::not_found(id))?;
                self.remove_by_id(id)?;
                Ok(PathChange::Removed { id, index })
            }
        }
    }

    /// Takes every change queued since the last call, oldest first.
    pub fn drain_changes(&mut self) -> Vec<PathChange> {
        std::mem::take(&mut self.changes)
    }

    /// Waypoints projected into `frame`, in path order.
    pub fn planar_points(&self, frame: &LocalFrame) -> Vec<PlanarPoint> {
        self.waypoints
            .iter()
            .map(|wp| frame.to_planar(wp.point))
            .collect()
    }

    /// Finds the segment closest to `probe` and returns the index a waypoint would be
    /// inserted at to split it.
    ///
    /// Segment `i` joins waypoints `i` and `i + 1`, so the result is `i + 1`. Returns
    /// `None` with fewer than two waypoints or when the closest segment is not strictly
    /// nearer than `threshold`. On exact ties the lowest segment index wins.
    pub fn nearest_segment(
        &self,
        probe: PlanarPoint,
        frame: &LocalFrame,
        threshold: f64,
    ) -> Option<usize> {
        if self.waypoints.len() < 2 {
            return None;
        }

        let points = self.planar_points(frame);
        let mut best: Option<(usize, f64)> = None;
        for (i, pair) in points.windows(2).enumerate() {
            let distance = probe.distance_to_segment(pair[0], pair[1]);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((i, distance)),
            }
        }

        best.filter(|&(_, distance)| distance < threshold)
            .map(|(i, _)| i + 1)
    }

    /// Finds the waypoint closest to `probe` within `radius` (strictly), returning its id
    /// and index. On exact ties the lowest index wins.
    pub fn pick(
        &self,
        probe: PlanarPoint,
        frame: &LocalFrame,
        radius: f64,
    ) -> Option<(WaypointId, usize)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, wp) in self.waypoints.iter().enumerate() {
            let distance = probe.distance(frame.to_planar(wp.point));
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((i, distance)),
            }
        }

        best.filter(|&(_, distance)| distance < radius)
            .map(|(i, _)| (self.waypoints[i].id, i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> LocalFrame {
        LocalFrame::new(GeoPoint::new(0.0, 0.0).unwrap(), 10, 100.0).unwrap()
    }

    fn geo_at(frame: &LocalFrame, x: f64, y: f64) -> GeoPoint {
        frame.to_geo(PlanarPoint::new(x, y))
    }

    #[test]
    fn test_append_and_order() {
        let mut path = WaypointPath::new();
        let a = path.append(GeoPoint::new(1.0, 1.0).unwrap());
        let b = path.append(GeoPoint::new(2.0, 2.0).unwrap());

        assert_eq!(path.len(), 2);
        assert_eq!(path.start().unwrap().id, a);
        assert_eq!(path.end().unwrap().id, b);
        assert_eq!(
            path.drain_changes(),
            vec![
                PathChange::Added { id: a, index: 0 },
                PathChange::Added { id: b, index: 1 },
            ]
        );
        assert!(path.drain_changes().is_empty());
    }

    #[test]
    fn test_insert_before_bounds() {
        let mut path = WaypointPath::from_points([GeoPoint::new(1.0, 1.0).unwrap()]);
        path.drain_changes();

        let end = path.insert_before(1, GeoPoint::new(2.0, 2.0).unwrap()).unwrap();
        assert_eq!(path.index_of(end), Some(1));

        let front = path.insert_before(0, GeoPoint::new(0.5, 0.5).unwrap()).unwrap();
        assert_eq!(path.index_of(front), Some(0));

        let err = path.insert_before(4, GeoPoint::new(3.0, 3.0).unwrap()).unwrap_err();
        assert_eq!(err, PathError::IndexOutOfRange { index: 4, len: 3 });
        assert_eq!(path.len(), 3);
        assert_eq!(path.drain_changes().len(), 2);
    }

    #[test]
    fn test_move_preserves_identity_and_position() {
        let mut path = WaypointPath::from_points([
            GeoPoint::new(1.0, 1.0).unwrap(),
            GeoPoint::new(2.0, 2.0).unwrap(),
            GeoPoint::new(3.0, 3.0).unwrap(),
        ]);
        let id = path.get(1).unwrap().id;
        let target = GeoPoint::new(5.0, -5.0).unwrap();

        assert_eq!(path.move_to(id, target), Ok(1));
        assert_eq!(path.len(), 3);
        assert_eq!(path.get(1).unwrap().id, id);
        assert_eq!(path.get(1).unwrap().point, target);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut path = WaypointPath::from_points([GeoPoint::new(1.0, 1.0).unwrap()]);
        path.drain_changes();
        let stranger = WaypointId::new();

        assert_eq!(
            path.move_to(stranger, GeoPoint::new(0.0, 0.0).unwrap()),
            Err(PathError::NotFound { id: stranger })
        );
        assert_eq!(
            path.remove_by_id(stranger),
            Err(PathError::NotFound { id: stranger })
        );
        assert_eq!(path.len(), 1);
        assert!(path.drain_changes().is_empty());
    }

    #[test]
    fn test_remove_shifts_indices() {
        let mut path = WaypointPath::from_points([
            GeoPoint::new(1.0, 1.0).unwrap(),
            GeoPoint::new(2.0, 2.0).unwrap(),
            GeoPoint::new(3.0, 3.0).unwrap(),
        ]);
        let ids: Vec<_> = path.iter().map(|wp| wp.id).collect();
        path.drain_changes();

        let removed = path.remove_by_id(ids[1]).unwrap();
        assert_eq!(removed.id, ids[1]);
        assert_eq!(path.index_of(ids[2]), Some(1));
        assert_eq!(
            path.drain_changes(),
            vec![PathChange::Removed { id: ids[1], index: 1 }]
        );
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut path = WaypointPath::new();
        let added = path
            .apply(PathCommand::Append {
                point: GeoPoint::new(1.0, 1.0).unwrap(),
            })
            .unwrap();
        assert_eq!(added.index(), 0);

        let inserted = path
            .apply(PathCommand::InsertBefore {
                index: 0,
                point: GeoPoint::new(2.0, 2.0).unwrap(),
            })
            .unwrap();
        assert!(matches!(inserted, PathChange::Added { index: 0, .. }));

        let removed = path.apply(PathCommand::Remove { id: added.id() }).unwrap();
        assert_eq!(removed, PathChange::Removed { id: added.id(), index: 1 });
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_nearest_segment_needs_two_points() {
        let frame = frame();
        let mut path = WaypointPath::new();
        assert_eq!(path.nearest_segment(PlanarPoint::ORIGIN, &frame, 10.0), None);

        path.append(geo_at(&frame, 0.0, 0.0));
        assert_eq!(path.nearest_segment(PlanarPoint::ORIGIN, &frame, 10.0), None);
    }

    #[test]
    fn test_nearest_segment_picks_closest() {
        let frame = frame();
        let path = WaypointPath::from_points([
            geo_at(&frame, 0.0, 0.0),
            geo_at(&frame, 10.0, 0.0),
            geo_at(&frame, 10.0, 10.0),
        ]);

        assert_eq!(
            path.nearest_segment(PlanarPoint::new(5.0, 0.5), &frame, 1.0),
            Some(1)
        );
        assert_eq!(
            path.nearest_segment(PlanarPoint::new(9.5, 6.0), &frame, 1.0),
            Some(2)
        );
        // Beyond the threshold.
        assert_eq!(
            path.nearest_segment(PlanarPoint::new(5.0, 3.0), &frame, 1.0),
            None
        );
    }

    #[test]
    fn test_pick_within_radius() {
        let frame = frame();
        let path = WaypointPath::from_points([
            geo_at(&frame, 0.0, 0.0),
            geo_at(&frame, 10.0, 0.0),
        ]);
        let second = path.get(1).unwrap().id;

        assert_eq!(
            path.pick(PlanarPoint::new(9.8, 0.1), &frame, 0.5),
            Some((second, 1))
        );
        assert_eq!(path.pick(PlanarPoint::new(5.0, 0.0), &frame, 0.5), None);
        assert_eq!(WaypointPath::new().pick(PlanarPoint::ORIGIN, &frame, 1.0), None);
    }
}
