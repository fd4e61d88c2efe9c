use super::*;
use crate::geometry::AngleKind;

const EPSILON: f64 = 1e-6;

fn session() -> AngleSession {
    AngleSession::default()
}

/// Place a right angle with its vertex at `origin` via clicks.
fn place_right_angle(session: &mut AngleSession, origin: Point, time: f64) {
    session.begin_placement();
    for p in [
        Point::new(origin.x + 50.0, origin.y),
        origin,
        Point::new(origin.x, origin.y + 50.0),
    ] {
        session.pointer_down(p, time);
        session.pointer_up().unwrap();
        session.click(p, time);
    }
}

fn save_right_angle(session: &mut AngleSession, origin: Point, time: f64) -> AnnotationId {
    place_right_angle(session, origin, time);
    session.save_angle(time).unwrap()
}

#[test]
fn test_place_three_points_then_save() {
    let mut s = session();
    s.begin_placement();

    assert_eq!(
        s.place_point(Point::new(50.0, 0.0)),
        PlacementProgress::Placed { count: 1 }
    );
    assert_eq!(
        s.place_point(Point::new(0.0, 0.0)),
        PlacementProgress::Placed { count: 2 }
    );
    let PlacementProgress::Complete { measure } = s.place_point(Point::new(0.0, 50.0)) else {
        panic!("third point should complete the angle");
    };
    assert!((measure.unwrap().inner - 90.0).abs() < EPSILON);

    let id = s.save_angle(1.0).unwrap();
    assert_eq!(s.state(), &EditState::Idle);
    let ann = s.store().find_by_id(id).unwrap();
    assert_eq!(ann.time, 1.0);
    assert!((ann.angle - 90.0).abs() < EPSILON);
    assert!(s.pending_points().is_empty());
}

#[test]
fn test_fourth_point_drops_oldest() {
    let mut s = session();
    s.begin_placement();
    for p in [
        Point::new(50.0, 0.0),
        Point::new(0.0, 0.0),
        Point::new(0.0, 50.0),
    ] {
        s.click(p, 0.0);
    }

    let outcome = s.click(Point::new(-50.0, 0.0), 0.0);
    let ClickOutcome::Placed(PlacementProgress::Complete { measure }) = outcome else {
        panic!("fourth click should complete a new triple, got {outcome:?}");
    };
    assert_eq!(
        s.pending_points(),
        &[
            Point::new(0.0, 0.0),
            Point::new(0.0, 50.0),
            Point::new(-50.0, 0.0)
        ]
    );
    // Vertex is now (0, 50)
    assert!((measure.unwrap().inner - 45.0).abs() < EPSILON);
    assert_eq!(s.pending_points().len(), 3);
}

#[test]
fn test_place_point_ignored_when_not_placing() {
    let mut s = session();
    assert_eq!(
        s.place_point(Point::new(1.0, 1.0)),
        PlacementProgress::Ignored
    );
}

#[test]
fn test_save_incomplete_keeps_points() {
    let mut s = session();
    s.begin_placement();
    s.place_point(Point::new(50.0, 0.0));
    s.place_point(Point::new(0.0, 0.0));

    assert_eq!(
        s.save_angle(0.0),
        Err(SessionError::Geometry(GeometryError::Incomplete { found: 2 }))
    );
    assert_eq!(s.pending_points().len(), 2);
    assert!(s.store().is_empty());
    assert!(s.results().measurements.is_empty());
}

#[test]
fn test_save_degenerate_refused() {
    let mut s = session();
    s.begin_placement();
    s.place_point(Point::new(0.0, 0.0));
    s.place_point(Point::new(0.0, 0.0));
    let PlacementProgress::Complete { measure } = s.place_point(Point::new(5.0, 5.0)) else {
        panic!("third point should complete the angle");
    };
    assert_eq!(measure, Err(GeometryError::Degenerate));

    assert_eq!(
        s.save_angle(0.0),
        Err(SessionError::Geometry(GeometryError::Degenerate))
    );
    assert!(s.store().is_empty());
    assert!(!s.can_undo());
}

#[test]
fn test_outer_kind_applies_to_new_angles() {
    let mut s = session();
    assert_eq!(s.toggle_angle_kind(), AngleKind::Outer);
    let id = save_right_angle(&mut s, Point::new(100.0, 100.0), 0.0);

    let ann = s.store().find_by_id(id).unwrap();
    assert_eq!(ann.kind, AngleKind::Outer);
    assert!((ann.angle - 270.0).abs() < EPSILON);
    assert_eq!(s.annotation_arc(ann).unwrap().label, "270.0°");
}

#[test]
fn test_pending_arc_uses_settings() {
    let mut s = session();
    place_right_angle(&mut s, Point::new(100.0, 100.0), 0.0);

    let arc = s.pending_arc().unwrap();
    assert_eq!(arc.center, Point::new(100.0, 100.0));
    assert_eq!(arc.radius, s.settings().arc_radius);
    assert_eq!(arc.label, "90.0°");
    let d = arc.label_position.distance_to(&arc.center);
    assert!((d - s.settings().label_distance()).abs() < EPSILON);
}

#[test]
fn test_measurements_numbered_and_labeled() {
    let mut s = session();
    s.add_checkpoint(75.1);

    save_right_angle(&mut s, Point::new(0.0, 0.0), 75.0);
    save_right_angle(&mut s, Point::new(200.0, 0.0), 80.0);

    let rows = &s.results().measurements;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].frame_number, 1);
    assert_eq!(rows[0].frame_checkpoint, "1:15");
    assert!((rows[0].frame_angle_measurement - 90.0).abs() < EPSILON);
    assert_eq!(rows[1].frame_number, 2);
    assert!(rows[1].frame_checkpoint.is_empty());
}

#[test]
fn test_drag_remeasures_on_release_only() {
    let mut s = session();
    let id = save_right_angle(&mut s, Point::new(0.0, 0.0), 1.0);

    // Grab the first arm point at (50, 0)
    assert!(s.pointer_down(Point::new(52.0, 1.0), 1.05));
    assert_eq!(s.selected(), Some(id));

    assert!(s.pointer_move(Point::new(-30.0, 0.0), 1.05));
    assert!(s.pointer_move(Point::new(-50.0, 0.0), 1.05));
    let ann = s.store().find_by_id(id).unwrap();
    assert_eq!(ann.points.get(0), Some(Point::new(-50.0, 0.0)));
    assert!((ann.angle - 90.0).abs() < EPSILON);

    assert_eq!(s.pointer_up(), Ok(Some(id)));
    assert_eq!(s.state(), &EditState::Saved(id));
    let ann = s.store().find_by_id(id).unwrap();
    assert!((ann.angle - 90.0).abs() < EPSILON);
    assert_eq!(ann.time, 1.0);

    // Straighten the angle
    assert!(s.pointer_down(Point::new(0.0, 50.0), 1.0));
    s.pointer_move(Point::new(50.0, 0.0), 1.0);
    s.pointer_up().unwrap();
    assert!((s.store().find_by_id(id).unwrap().angle - 180.0).abs() < EPSILON);
}

#[test]
fn test_drag_onto_vertex_reverts() {
    let mut s = session();
    let id = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    let original = s.store().find_by_id(id).unwrap().points;

    assert!(s.pointer_down(Point::new(50.0, 0.0), 0.0));
    s.pointer_move(Point::new(0.0, 0.0), 0.0);
    assert_eq!(
        s.pointer_up(),
        Err(SessionError::Store(StoreError::Geometry {
            id,
            source: GeometryError::Degenerate
        }))
    );

    let ann = s.store().find_by_id(id).unwrap();
    assert_eq!(ann.points, original);
    assert!((ann.angle - 90.0).abs() < EPSILON);
}

#[test]
fn test_undo_redo_move() {
    let mut s = session();
    let id = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);

    s.pointer_down(Point::new(0.0, 50.0), 0.0);
    s.pointer_move(Point::new(50.0, 0.0), 0.0);
    s.pointer_move(Point::new(-50.0, 0.0), 0.0);
    s.pointer_up().unwrap();
    assert!((s.store().find_by_id(id).unwrap().angle - 180.0).abs() < EPSILON);

    assert_eq!(s.undo().as_deref(), Some("Move angle point"));
    let ann = s.store().find_by_id(id).unwrap();
    assert_eq!(ann.points.get(2), Some(Point::new(0.0, 50.0)));
    assert!((ann.angle - 90.0).abs() < EPSILON);

    assert_eq!(s.redo().as_deref(), Some("Move angle point"));
    assert!((s.store().find_by_id(id).unwrap().angle - 180.0).abs() < EPSILON);
}

#[test]
fn test_press_without_move_records_nothing() {
    let mut s = session();
    let id = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    assert_eq!(s.undo().as_deref(), Some("Save angle"));
    assert_eq!(s.redo().as_deref(), Some("Save angle"));

    assert!(s.pointer_down(Point::new(0.0, 0.0), 0.0));
    assert_eq!(s.pointer_up(), Ok(Some(id)));
    assert_eq!(s.undo().as_deref(), Some("Save angle"));
    assert!(!s.can_undo());
}

#[test]
fn test_drag_pending_point() {
    let mut s = session();
    s.begin_placement();
    s.place_point(Point::new(50.0, 0.0));
    s.place_point(Point::new(0.0, 0.0));

    assert!(s.pointer_down(Point::new(49.0, 2.0), 0.0));
    assert!(s.selected().is_none());
    s.pointer_move(Point::new(0.0, -50.0), 0.0);
    assert_eq!(s.pending_points()[0], Point::new(0.0, -50.0));
    assert_eq!(s.pointer_up(), Ok(None));

    // The click that follows the release does not add a point
    assert_eq!(s.click(Point::new(0.0, -50.0), 0.0), ClickOutcome::Ignored);
    assert_eq!(s.pending_points().len(), 2);
    assert!(matches!(s.state(), EditState::Placing { .. }));

    assert_eq!(
        s.click(Point::new(-50.0, 0.0), 0.0),
        ClickOutcome::Placed(PlacementProgress::Complete {
            measure: compute_angle_from_slice(&[
                Point::new(0.0, -50.0),
                Point::new(0.0, 0.0),
                Point::new(-50.0, 0.0),
            ])
        })
    );
}

#[test]
fn test_hover_and_select_respect_time_window() {
    let mut s = session();
    let id = save_right_angle(&mut s, Point::new(0.0, 0.0), 2.0);
    let near = Point::new(3.0, 4.0);

    assert!(s.pointer_move(near, 2.1));
    assert_eq!(s.hovered(), Some(id));
    assert_eq!(s.highlight(id), Highlight::Hovered);
    assert!(!s.pointer_move(near, 2.1));

    // Just past the window the angle is hidden
    assert!(s.pointer_move(near, 2.2 + EPSILON));
    assert_eq!(s.hovered(), None);

    assert_eq!(s.click(near, 5.0), ClickOutcome::Deselected);
    assert_eq!(s.click(near, 2.0), ClickOutcome::Selected(id));
    assert_eq!(s.highlight(id), Highlight::Selected);
    assert_eq!(s.click(Point::new(300.0, 300.0), 2.0), ClickOutcome::Deselected);
    assert_eq!(s.selected(), None);
}

#[test]
fn test_first_saved_angle_wins() {
    let mut s = session();
    let first = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    let second = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    assert_ne!(first, second);

    assert_eq!(s.click(Point::new(1.0, 1.0), 0.0), ClickOutcome::Selected(first));
    assert_eq!(s.visible_annotations(0.0).count(), 2);
    assert_eq!(s.visible_annotations(0.5).count(), 0);
}

#[test]
fn test_delete_then_undo_restores_same_id() {
    let mut s = session();
    let keep = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    let id = save_right_angle(&mut s, Point::new(200.0, 0.0), 0.0);

    s.pointer_move(Point::new(200.0, 0.0), 0.0);
    s.click(Point::new(200.0, 0.0), 0.0);
    assert_eq!(s.selected(), Some(id));
    assert_eq!(s.hovered(), Some(id));

    let removed = s.delete_selected().unwrap();
    assert_eq!(removed.id, id);
    assert_eq!(s.selected(), None);
    assert_eq!(s.hovered(), None);
    assert!(s.delete_selected().is_none());

    assert_eq!(s.undo().as_deref(), Some("Delete angle"));
    let ids: Vec<_> = s.store().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![keep, id]);
}

#[test]
fn test_undo_save_clears_selection() {
    let mut s = session();
    let id = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    s.click(Point::new(0.0, 0.0), 0.0);
    assert_eq!(s.selected(), Some(id));

    assert_eq!(s.undo().as_deref(), Some("Save angle"));
    assert!(s.store().is_empty());
    assert_eq!(s.state(), &EditState::Idle);
}

#[test]
fn test_undo_refused_mid_drag() {
    let mut s = session();
    save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    assert!(s.pointer_down(Point::new(0.0, 0.0), 0.0));
    assert!(s.undo().is_none());
    assert!(s.can_undo());
}

#[test]
fn test_cancel_reverts_drag() {
    let mut s = session();
    let id = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    let original = s.store().find_by_id(id).unwrap().points;

    s.pointer_down(Point::new(50.0, 0.0), 0.0);
    s.pointer_move(Point::new(80.0, 80.0), 0.0);
    s.cancel();

    assert_eq!(s.state(), &EditState::Idle);
    assert_eq!(s.store().find_by_id(id).unwrap().points, original);
}

#[test]
fn test_from_config_uses_preferences() {
    let mut config = AppConfig::new();
    config.preferences.default_angle_kind = AngleKind::Outer;
    config.interaction.hit_radius = 3.0;

    let mut s = AngleSession::from_config(&config);
    assert_eq!(s.angle_kind(), AngleKind::Outer);
    let id = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    assert_eq!(s.click(Point::new(4.0, 0.0), 0.0), ClickOutcome::Deselected);
    assert_eq!(s.click(Point::new(2.0, 0.0), 0.0), ClickOutcome::Selected(id));
}

#[test]
fn test_undo_save_drops_measurement_row() {
    let mut s = session();
    save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);

    assert_eq!(s.undo().as_deref(), Some("Save angle"));
    assert!(s.store().is_empty());
    assert!(s.results().measurements.is_empty());

    assert_eq!(s.redo().as_deref(), Some("Save angle"));
    assert_eq!(s.results().measurements.len(), 1);
    assert_eq!(s.results().measurements[0].frame_number, 1);

    s.undo();
    save_right_angle(&mut s, Point::new(100.0, 0.0), 1.0);
    assert_eq!(s.results().measurements.len(), s.store().len());
    assert_eq!(s.results().measurements[0].frame_number, 1);
}

#[test]
fn test_clear_annotations_is_one_undo_step() {
    let mut s = session();
    let a = save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    let b = save_right_angle(&mut s, Point::new(200.0, 0.0), 0.0);
    s.click(Point::new(0.0, 0.0), 0.0);

    assert_eq!(s.clear_annotations(), 2);
    assert!(s.store().is_empty());
    assert_eq!(s.selected(), None);
    assert_eq!(s.results().measurements.len(), 2);
    assert_eq!(s.undo_description().as_deref(), Some("Clear 2 angles"));
    assert_eq!(s.clear_annotations(), 0);

    assert_eq!(s.undo().as_deref(), Some("Clear 2 angles"));
    let ids: Vec<_> = s.store().iter().map(|ann| ann.id).collect();
    assert_eq!(ids, vec![a, b]);
    assert_eq!(s.redo_description().as_deref(), Some("Clear 2 angles"));
}

#[test]
fn test_load_annotations_resets_history() {
    let mut s = session();
    save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    s.undo();
    assert!(s.can_redo());

    let mut loaded = AnnotationStore::new();
    let id = loaded
        .add(
            3.0,
            AnglePointTriple::new(
                Point::new(10.0, 0.0),
                Point::new(0.0, 0.0),
                Point::new(0.0, 10.0),
            ),
            AngleKind::Inner,
        )
        .unwrap();
    s.load_annotations(loaded);

    assert!(!s.can_undo());
    assert!(!s.can_redo());
    assert_eq!(s.state(), &EditState::Idle);
    assert_eq!(s.click(Point::new(1.0, 1.0), 3.0), ClickOutcome::Selected(id));
}

#[test]
fn test_from_config_limits_undo_history() {
    let mut config = AppConfig::new();
    config.preferences.undo_history = 1;

    let mut s = AngleSession::from_config(&config);
    save_right_angle(&mut s, Point::new(0.0, 0.0), 0.0);
    save_right_angle(&mut s, Point::new(200.0, 0.0), 0.0);

    assert!(s.undo().is_some());
    assert!(!s.can_undo());
    assert_eq!(s.store().len(), 1);
}
