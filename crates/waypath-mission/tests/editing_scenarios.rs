//! End-to-end editing scenarios driven through the interaction controller.

use waypath_core::{GeoPoint, PlanarPoint, WaypointId};
use waypath_geo::LocalFrame;
use waypath_mission::{
    InteractionController, InteractionState, MissionDocument, PathChange, PickTolerance,
    PointerEvent, SearchConfig, SearchObject, SearchPattern, WaypointPath,
};

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

fn ids(doc: &MissionDocument) -> Vec<WaypointId> {
    doc.path().iter().map(|wp| wp.id).collect()
}

fn press(x: f64, y: f64) -> PointerEvent {
    PointerEvent::PrimaryPress {
        probe: PlanarPoint::new(x, y),
        tolerance: TOLERANCE,
    }
}

#[test]
fn test_press_near_midpoint_inserts_between() {
    let frame = frame();
    let mut doc = document_with(&frame, &[(0.0, 0.0), (10.0, 0.0)]);
    let before = ids(&doc);
    let mut controller = InteractionController::new();

    let changes = controller.handle(&mut doc, &frame, press(5.0, 0.1)).unwrap();

    let after = ids(&doc);
    assert_eq!(after.len(), 3);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[1]);
    assert_eq!(changes, vec![PathChange::Added { id: after[1], index: 1 }]);

    let inserted = frame.to_planar(doc.path().get(1).unwrap().point);
    assert!(inserted.distance(PlanarPoint::new(5.0, 0.1)) < 1e-6);
}

#[test]
fn test_press_far_from_path_appends() {
    let frame = frame();
    let mut doc = document_with(&frame, &[(0.0, 0.0), (10.0, 0.0)]);
    let before = ids(&doc);
    let mut controller = InteractionController::new();

    controller.handle(&mut doc, &frame, press(5.0, 8.0)).unwrap();

    let after = ids(&doc);
    assert_eq!(after.len(), 3);
    assert_eq!(&after[..2], &before[..]);
    assert_eq!(controller.state(), InteractionState::Idle);
}

#[test]
fn test_drag_preserves_identity_and_length() {
    let frame = frame();
    let mut doc = document_with(&frame, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
    let before = ids(&doc);
    let mut controller = InteractionController::new();

    controller.handle(&mut doc, &frame, press(10.0, 0.0)).unwrap();
    for step in 1..=5 {
        controller
            .handle(
                &mut doc,
                &frame,
                PointerEvent::PrimaryDragMove {
                    probe: PlanarPoint::new(10.0, step as f64),
                },
            )
            .unwrap();
    }
    controller
        .handle(&mut doc, &frame, PointerEvent::PrimaryRelease)
        .unwrap();

    assert_eq!(ids(&doc), before);
    let moved = frame.to_planar(doc.path().get(1).unwrap().point);
    assert!(moved.distance(PlanarPoint::new(10.0, 5.0)) < 1e-6);
}

#[test]
fn test_delete_removes_exactly_one() {
    let frame = frame();
    let mut doc = document_with(
        &frame,
        &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)],
    );
    let before = ids(&doc);
    let mut controller = InteractionController::new();

    controller
        .handle(
            &mut doc,
            &frame,
            PointerEvent::SecondaryPress {
                probe: PlanarPoint::new(20.0, 0.2),
                pick_radius: TOLERANCE.pick_radius,
            },
        )
        .unwrap();

    let mut expected = before.clone();
    expected.remove(2);
    assert_eq!(ids(&doc), expected);
}

#[test]
fn test_equidistant_segments_pick_lowest_index() {
    let (frame, path) = exact_path();

    assert_eq!(path.planar_points(&frame)[0], PlanarPoint::new(-4.0, 0.0));
    assert_eq!(
        path.nearest_segment(PlanarPoint::new(0.0, 1.0), &frame, 2.0),
        Some(1)
    );
}

/// At the equator with zoom 2 and scale 4 these project to exactly (-4,0), (0,0), (4,0).
fn exact_path() -> (LocalFrame, WaypointPath) {
    let frame = LocalFrame::new(GeoPoint::new(0.0, 0.0).unwrap(), 2, 4.0).unwrap();
    let path = WaypointPath::from_points([
        GeoPoint::new(0.0, -90.0).unwrap(),
        GeoPoint::new(0.0, 0.0).unwrap(),
        GeoPoint::new(0.0, 90.0).unwrap(),
    ]);
    (frame, path)
}

#[test]
fn test_segment_at_exact_threshold_is_not_near() {
    let (frame, path) = exact_path();
    let probe = PlanarPoint::new(2.0, 1.0);

    assert_eq!(path.nearest_segment(probe, &frame, 1.0), None);
    assert_eq!(path.nearest_segment(probe, &frame, 1.0 + 1e-9), Some(2));
}

#[test]
fn test_equidistant_waypoints_pick_lowest_index() {
    let (frame, path) = exact_path();
    let probe = PlanarPoint::new(-2.0, 0.0);
    let first = path.get(0).unwrap().id;

    assert_eq!(path.pick(probe, &frame, 3.0), Some((first, 0)));
    // Exactly on the radius does not count.
    assert_eq!(path.pick(probe, &frame, 2.0), None);
}

#[test]
fn test_payload_is_deterministic() {
    let frame = frame();
    let mut doc = document_with(&frame, &[(0.0, 0.0), (10.0, 0.0), (20.0, 5.0)]);
    doc.set_search(SearchConfig::new(SearchObject::Mallet, SearchPattern::None));

    let first = doc.to_canonical_payload().to_json_line().unwrap();
    let second = doc.to_canonical_payload().to_json_line().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_reordering_changes_only_waypoint_order() {
    let frame = frame();
    let points = [(0.0, 0.0), (10.0, 0.0)];
    let forward = document_with(&frame, &points);
    let reversed = document_with(&frame, &[points[1], points[0]]);

    let a: serde_json::Value =
        serde_json::from_str(&forward.to_canonical_payload().to_json().unwrap()).unwrap();
    let b: serde_json::Value =
        serde_json::from_str(&reversed.to_canonical_payload().to_json().unwrap()).unwrap();

    assert_eq!(a["search_object"], b["search_object"]);
    assert_eq!(a["search_pattern"], b["search_pattern"]);
    assert_eq!(a["nav_waypoints"][0], b["nav_waypoints"][1]);
    assert_eq!(a["nav_waypoints"][1], b["nav_waypoints"][0]);

    let keys = |v: &serde_json::Value| -> Vec<String> {
        v.as_object().unwrap().keys().cloned().collect()
    };
    assert_eq!(keys(&a), keys(&b));
}

#[test]
fn test_empty_until_first_append() {
    let mut doc = MissionDocument::new();
    assert!(doc.is_empty());
    doc.append(GeoPoint::new(38.4063, -110.7918).unwrap());
    assert!(!doc.is_empty());
}
