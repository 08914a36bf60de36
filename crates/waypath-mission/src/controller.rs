//! Pointer-driven editing of a mission path.
//!
//! [`transition`] is a pure function from the current state and one pointer event to
//! the next state plus the path commands to run. [`InteractionController`] keeps the
//! state between events and applies the commands to a [`MissionDocument`].

use crate::document::MissionDocument;
use crate::path::{PathChange, PathCommand, WaypointPath};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use waypath_core::{PathError, PlanarPoint, Result, WaypathError, WaypointId};
use waypath_geo::LocalFrame;

/// Pick radius and segment-insert threshold, in planar units at the current view
/// magnification. The caller computes both per event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickTolerance {
    pub pick_radius: f64,
    pub insert_threshold: f64,
}

impl PickTolerance {
    pub fn new(pick_radius: f64, insert_threshold: f64) -> Self {
        Self {
            pick_radius,
            insert_threshold,
        }
    }
}

/// Abstract pointer input, already mapped into the local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    PrimaryPress {
        probe: PlanarPoint,
        tolerance: PickTolerance,
    },
    PrimaryDragMove {
        probe: PlanarPoint,
    },
    PrimaryRelease,
    SecondaryPress {
        probe: PlanarPoint,
        pick_radius: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging { id: WaypointId, index: usize },
}

impl InteractionState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::Dragging { .. })
    }
}

/// Result of one step of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: InteractionState,
    pub commands: Vec<PathCommand>,
}

impl Transition {
    fn stay(state: InteractionState) -> Self {
        Self {
            state,
            commands: Vec::new(),
        }
    }

    fn idle_with(command: PathCommand) -> Self {
        Self {
            state: InteractionState::Idle,
            commands: vec![command],
        }
    }
}

/// Computes the next state and the commands for `event`. Does not touch the path.
///
/// A primary press on an existing waypoint starts a drag and adds nothing. Otherwise it
/// splits the nearest segment within the insert threshold, or appends. A press that
/// arrives mid-drag is handled as a fresh press from `Idle`.
///
/// # Errors
///
/// Fails with a geodetic error when a probe maps outside the valid GPS range, and with
/// [`PathError::NotFound`] when a drag refers to a waypoint that has been removed.
pub fn transition(
    state: InteractionState,
    event: &PointerEvent,
    path: &WaypointPath,
    frame: &LocalFrame,
) -> Result<Transition> {
    match *event {
        PointerEvent::PrimaryPress { probe, tolerance } => {
            if let Some((id, index)) = path.pick(probe, frame, tolerance.pick_radius) {
                return Ok(Transition::stay(InteractionState::Dragging { id, index }));
            }

            let point = frame.to_geo(probe);
            point.validate()?;
            let command = match path.nearest_segment(probe, frame, tolerance.insert_threshold) {
                Some(index) => PathCommand::InsertBefore { index, point },
                None => PathCommand::Append { point },
            };
            Ok(Transition::idle_with(command))
        }
        PointerEvent::PrimaryDragMove { probe } => match state {
            InteractionState::Idle => Ok(Transition::stay(state)),
            InteractionState::Dragging { id, .. } => {
                let index = path.index_of(id).ok_or(PathError::not_found(id))?;
                let point = frame.to_geo(probe);
                point.validate()?;
                Ok(Transition {
                    state: InteractionState::Dragging { id, index },
                    commands: vec![PathCommand::MoveTo { id, point }],
                })
            }
        },
        PointerEvent::PrimaryRelease => Ok(Transition::stay(InteractionState::Idle)),
        PointerEvent::SecondaryPress { probe, pick_radius } => {
            let commands = path
                .pick(probe, frame, pick_radius)
                .map(|(id, _)| PathCommand::Remove { id })
                .into_iter()
                .collect();
            Ok(Transition { state, commands })
        }
    }
}

/// Holds the interaction state between pointer events.
///
/// Only the id of the dragged waypoint is kept; waypoint data always lives in the
/// document.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Runs one event against `document` and drains its change queue.
    ///
    /// The returned changes include edits made directly on the document since the last
    /// drain, followed by the ones this event caused.
    ///
    /// On error nothing is applied. A drag whose waypoint has disappeared also drops
    /// back to `Idle` so later events are not stuck on it.
    pub fn handle(
        &mut self,
        document: &mut MissionDocument,
        frame: &LocalFrame,
        event: PointerEvent,
    ) -> Result<Vec<PathChange>> {
        let step = match transition(self.state, &event, document.path(), frame) {
            Ok(step) => step,
            Err(e) => {
                if matches!(e, WaypathError::Path(PathError::NotFound { .. })) {
                    debug!(state = ?self.state, "Dragged waypoint is gone, returning to idle");
                    self.state = InteractionState::Idle;
                }
                return Err(e);
            }
        };

        trace!(from = ?self.state, to = ?step.state, commands = step.commands.len(), "Pointer event");

        for command in step.commands {
            document.apply(command)?;
        }
        self.state = step.state;
        Ok(document.drain_changes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypath_core::GeoPoint;

    const TOLERANCE: PickTolerance = PickTolerance {
        pick_radius: 0.5,
        insert_threshold: 0.3,
    };

    fn frame() -> LocalFrame {
        LocalFrame::new(GeoPoint::new(38.4063, -110.7918).unwrap(), 18, 10.0).unwrap()
    }

    fn document_with(frame: &LocalFrame, points: &[(f64, f64)]) -> MissionDocument {
        let mut doc = MissionDocument::new();
        for &(x, y) in points {
            doc.append(frame.to_geo(PlanarPoint::new(x, y)));
        }
        doc.drain_changes();
        doc
    }

    fn press(x: f64, y: f64) -> PointerEvent {
        PointerEvent::PrimaryPress {
            probe: PlanarPoint::new(x, y),
            tolerance: TOLERANCE,
        }
    }

    #[test]
    fn test_press_on_empty_path_appends() {
        let frame = frame();
        let mut doc = MissionDocument::new();
        let mut controller = InteractionController::new();

        let changes = controller.handle(&mut doc, &frame, press(1.0, 1.0)).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], PathChange::Added { index: 0, .. }));
        assert_eq!(controller.state(), InteractionState::Idle);
    }

    #[test]
    fn test_press_on_waypoint_starts_drag_without_adding() {
        let frame = frame();
        let mut doc = document_with(&frame, &[(0.0, 0.0), (10.0, 0.0)]);
        let target = doc.path().get(1).unwrap().id;
        let mut controller = InteractionController::new();

        let changes = controller.handle(&mut doc, &frame, press(10.1, 0.1)).unwrap();
        assert!(changes.is_empty());
        assert_eq!(doc.path().len(), 2);
        assert_eq!(
            controller.state(),
            InteractionState::Dragging { id: target, index: 1 }
        );
    }

    #[test]
    fn test_pick_takes_priority_over_insert() {
        let frame = frame();
        // Probe sits on the segment and within pick radius of its end point.
        let doc = document_with(&frame, &[(0.0, 0.0), (1.0, 0.0)]);
        let step = transition(
            InteractionState::Idle,
            &press(0.9, 0.0),
            doc.path(),
            &frame,
        )
        .unwrap();
        assert!(step.state.is_dragging());
        assert!(step.commands.is_empty());
    }

    #[test]
    fn test_drag_cycle() {
        let frame = frame();
        let mut doc = document_with(&frame, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let id = doc.path().get(1).unwrap().id;
        let mut controller = InteractionController::new();

        controller.handle(&mut doc, &frame, press(10.0, 0.0)).unwrap();
        let changes = controller
            .handle(
                &mut doc,
                &frame,
                PointerEvent::PrimaryDragMove {
                    probe: PlanarPoint::new(12.0, 5.0),
                },
            )
            .unwrap();
        assert_eq!(changes, vec![PathChange::Moved { id, index: 1 }]);

        controller
            .handle(&mut doc, &frame, PointerEvent::PrimaryRelease)
            .unwrap();
        assert_eq!(controller.state(), InteractionState::Idle);

        let moved = frame.to_planar(doc.path().get(1).unwrap().point);
        assert!(moved.distance(PlanarPoint::new(12.0, 5.0)) < 1e-6);
    }

    #[test]
    fn test_drag_move_while_idle_is_noop() {
        let frame = frame();
        let doc = document_with(&frame, &[(0.0, 0.0)]);
        let step = transition(
            InteractionState::Idle,
            &PointerEvent::PrimaryDragMove {
                probe: PlanarPoint::new(3.0, 3.0),
            },
            doc.path(),
            &frame,
        )
        .unwrap();
        assert_eq!(step, Transition::stay(InteractionState::Idle));
    }

    #[test]
    fn test_stale_drag_returns_to_idle() {
        let frame = frame();
        let mut doc = document_with(&frame, &[(0.0, 0.0), (10.0, 0.0)]);
        let id = doc.path().get(0).unwrap().id;
        let mut controller = InteractionController::new();

        controller.handle(&mut doc, &frame, press(0.0, 0.0)).unwrap();
        doc.remove_by_id(id).unwrap();

        let err = controller
            .handle(
                &mut doc,
                &frame,
                PointerEvent::PrimaryDragMove {
                    probe: PlanarPoint::new(1.0, 1.0),
                },
            )
            .unwrap_err();
        assert!(matches!(err, WaypathError::Path(PathError::NotFound { .. })));
        assert_eq!(controller.state(), InteractionState::Idle);
        assert_eq!(doc.path().len(), 1);
    }

    #[test]
    fn test_secondary_press_removes_picked_waypoint() {
        let frame = frame();
        let mut doc = document_with(&frame, &[(0.0, 0.0), (10.0, 0.0)]);
        let id = doc.path().get(0).unwrap().id;
        let mut controller = InteractionController::new();

        let changes = controller
            .handle(
                &mut doc,
                &frame,
                PointerEvent::SecondaryPress {
                    probe: PlanarPoint::new(0.2, 0.0),
                    pick_radius: 0.5,
                },
            )
            .unwrap();
        assert_eq!(changes, vec![PathChange::Removed { id, index: 0 }]);

        // Nothing under the pointer.
        let changes = controller
            .handle(
                &mut doc,
                &frame,
                PointerEvent::SecondaryPress {
                    probe: PlanarPoint::new(5.0, 5.0),
                    pick_radius: 0.5,
                },
            )
            .unwrap();
        assert!(changes.is_empty());
        assert_eq!(doc.path().len(), 1);
    }

    #[test]
    fn test_handle_keeps_pending_direct_edits() {
        let frame = frame();
        let mut doc = MissionDocument::new();
        let mut controller = InteractionController::new();

        let id = doc.append(frame.to_geo(PlanarPoint::new(0.0, 0.0)));
        let changes = controller
            .handle(&mut doc, &frame, PointerEvent::PrimaryRelease)
            .unwrap();
        assert_eq!(changes, vec![PathChange::Added { id, index: 0 }]);

        let second = doc.append(frame.to_geo(PlanarPoint::new(10.0, 0.0)));
        let changes = controller.handle(&mut doc, &frame, press(20.0, 0.0)).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], PathChange::Added { id: second, index: 1 });
        assert!(matches!(changes[1], PathChange::Added { index: 2, .. }));
        assert!(doc.drain_changes().is_empty());
    }

    #[test]
    fn test_probe_outside_mercator_domain_is_rejected() {
        let frame = frame();
        let mut doc = MissionDocument::new();
        let mut controller = InteractionController::new();

        let err = controller
            .handle(&mut doc, &frame, press(0.0, 1.0e9))
            .unwrap_err();
        assert!(matches!(err, WaypathError::Geo(_)));
        assert!(doc.is_empty());
    }
}
