use super::*;

const PARENT: Point = Point::new(30.0, 40.0);

fn at_parent(x: f64, y: f64) -> Point {
    Point::new(PARENT.x + x, PARENT.y + y)
}

#[test]
fn drag_commits_once_with_final_position() {
    let listeners = PointerListeners::new();
    let mut drag = DragController::new(&listeners, Point::new(50.0, 50.0));

    assert_eq!(drag.pointer_down(at_parent(60.0, 55.0), PARENT), DragEvent::Pressed);
    assert!(drag.is_dragging());
    assert_eq!(listeners.attached_count(), 2);

    let mut commits = Vec::new();
    for (x, y) in [(70.0, 60.0), (100.0, 70.0), (130.0, 85.0)] {
        match drag.pointer_move(at_parent(x, y), PARENT) {
            Some(DragEvent::Moved(_)) => {}
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(drag.position(), Point::new(120.0, 80.0));

    if let Some(DragEvent::Committed(p)) = drag.pointer_up() {
        commits.push(p);
    }
    assert_eq!(drag.pointer_up(), None);
    assert_eq!(commits, vec![Point::new(120.0, 80.0)]);
    assert_eq!(listeners.attached_count(), 0);
}

#[test]
fn moves_without_press_are_ignored() {
    let listeners = PointerListeners::new();
    let mut drag = DragController::new(&listeners, Point::new(10.0, 10.0));
    assert_eq!(drag.pointer_move(at_parent(99.0, 99.0), PARENT), None);
    assert_eq!(drag.position(), Point::new(10.0, 10.0));
    assert_eq!(listeners.attached_count(), 0);
}

#[test]
fn moving_parent_frame_is_accounted_for() {
    let listeners = PointerListeners::new();
    let mut drag = DragController::new(&listeners, Point::new(0.0, 0.0));
    drag.pointer_down(Point::new(110.0, 110.0), Point::new(100.0, 100.0));

    // Parent scrolled by 20px while the pointer stayed still in parent space.
    let ev = drag.pointer_move(Point::new(90.0, 110.0), Point::new(80.0, 100.0));
    assert_eq!(ev, Some(DragEvent::Moved(Point::new(0.0, 0.0))));
}

#[test]
fn external_sync_ignored_while_dragging() {
    let listeners = PointerListeners::new();
    let mut drag = DragController::new(&listeners, Point::new(50.0, 50.0));
    drag.pointer_down(at_parent(50.0, 50.0), PARENT);
    drag.pointer_move(at_parent(60.0, 50.0), PARENT);

    assert!(!drag.set_position(Point::new(0.0, 0.0)));
    assert_eq!(drag.position(), Point::new(60.0, 50.0));

    drag.pointer_up();
    assert!(drag.set_position(Point::new(5.0, 5.0)));
    assert_eq!(drag.position(), Point::new(5.0, 5.0));
}

#[test]
fn dropping_mid_drag_releases_listeners() {
    let listeners = PointerListeners::new();
    let mut drag = DragController::new(&listeners, Point::ORIGIN);
    drag.pointer_down(at_parent(1.0, 1.0), PARENT);
    assert_eq!(listeners.attached_count(), 2);
    drop(drag);
    assert_eq!(listeners.attached_count(), 0);
}

#[test]
fn cancel_restores_start_without_commit() {
    let listeners = PointerListeners::new();
    let mut drag = DragController::new(&listeners, Point::new(5.0, 5.0));
    drag.pointer_down(at_parent(5.0, 5.0), PARENT);
    drag.pointer_move(at_parent(25.0, 5.0), PARENT);
    drag.cancel();
    assert_eq!(drag.position(), Point::new(5.0, 5.0));
    assert_eq!(drag.pointer_up(), None);
    assert_eq!(listeners.attached_count(), 0);
}
