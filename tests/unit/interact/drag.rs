use super::*;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::layer::kind::LayerKind;
use crate::layer::model::LayerSpec;
use crate::layer::store::InsertAt;
use crate::source::{SourceFrame, StillImage};

const HS: f64 = 24.0;

fn add_box(store: &mut LayerStore, g: Geometry) -> LayerId {
    let frame = SourceFrame::solid(1, 1, Rgba8Premul::opaque(1, 2, 3)).unwrap();
    store
        .insert(
            LayerSpec::source(LayerKind::Image, StillImage::loaded(frame)).at(g),
            InsertAt::Top,
            Canvas::default(),
        )
        .unwrap()
}

fn geometry(store: &LayerStore, id: LayerId) -> Geometry {
    store.find(id).unwrap().geometry()
}

#[test]
fn body_drag_moves_incrementally() {
    let mut store = LayerStore::new();
    let a = add_box(&mut store, Geometry::new(0.0, 0.0, 100.0, 100.0));
    let mut sel = Selection::new();
    let mut drag = DragController::new();

    let hit = drag
        .pointer_down(&store, &mut sel, Point::new(10.0, 10.0), HS)
        .unwrap();
    assert_eq!(hit.region, HitRegion::Body);
    assert_eq!(sel.resolve(&store), Some(a));

    drag.pointer_move(&mut store, Point::new(15.0, 10.0), MIN_LAYER_SIZE);
    drag.pointer_move(&mut store, Point::new(30.0, 22.0), MIN_LAYER_SIZE);
    assert_eq!(geometry(&store, a), Geometry::new(20.0, 12.0, 100.0, 100.0));

    assert!(drag.pointer_up());
    assert!(!drag.is_dragging());
    assert_eq!(geometry(&store, a), Geometry::new(20.0, 12.0, 100.0, 100.0));
}

#[test]
fn handle_drag_resizes_with_floor() {
    let mut store = LayerStore::new();
    let a = add_box(&mut store, Geometry::new(0.0, 0.0, 100.0, 100.0));
    let mut sel = Selection::new();
    let mut drag = DragController::new();

    drag.pointer_down(&store, &mut sel, Point::new(95.0, 95.0), HS);
    assert!(matches!(
        drag.state(),
        DragState::Dragging {
            mode: DragMode::Resize,
            ..
        }
    ));

    drag.pointer_move(&mut store, Point::new(105.0, 115.0), MIN_LAYER_SIZE);
    assert_eq!(geometry(&store, a), Geometry::new(0.0, 0.0, 110.0, 120.0));

    drag.pointer_move(&mut store, Point::new(-200.0, 5.0), MIN_LAYER_SIZE);
    let g = geometry(&store, a);
    assert_eq!((g.w, g.h), (50.0, 50.0));
    assert_eq!((g.x, g.y), (0.0, 0.0));
}

#[test]
fn zero_delta_leaves_geometry_bit_identical() {
    let mut store = LayerStore::new();
    let start = Geometry::new(-0.0, 0.1 + 0.2, 33.3, 77.7);
    let a = add_box(&mut store, start);
    let mut sel = Selection::new();
    let mut drag = DragController::new();

    assert!(
        drag.pointer_down(&store, &mut sel, Point::new(5.0, 10.0), HS)
            .is_some()
    );
    assert_eq!(
        drag.pointer_move(&mut store, Point::new(5.0, 10.0), MIN_LAYER_SIZE),
        None
    );
    drag.pointer_up();

    let g = geometry(&store, a);
    assert_eq!(g.x.to_bits(), start.x.to_bits());
    assert_eq!(g.y.to_bits(), start.y.to_bits());
    assert_eq!(g.w.to_bits(), start.w.to_bits());
    assert_eq!(g.h.to_bits(), start.h.to_bits());
}

#[test]
fn miss_clears_selection_and_stays_idle() {
    let mut store = LayerStore::new();
    let a = add_box(&mut store, Geometry::new(0.0, 0.0, 100.0, 100.0));
    let mut sel = Selection::new();
    assert!(sel.select(&store, a));
    let mut drag = DragController::new();

    assert_eq!(
        drag.pointer_down(&store, &mut sel, Point::new(500.0, 500.0), HS),
        None
    );
    assert_eq!(sel.resolve(&store), None);
    assert_eq!(drag.state(), DragState::Idle);
}

#[test]
fn moves_while_idle_are_ignored() {
    let mut store = LayerStore::new();
    let a = add_box(&mut store, Geometry::new(0.0, 0.0, 100.0, 100.0));
    let mut drag = DragController::new();
    assert_eq!(
        drag.pointer_move(&mut store, Point::new(40.0, 40.0), MIN_LAYER_SIZE),
        None
    );
    assert_eq!(geometry(&store, a), Geometry::new(0.0, 0.0, 100.0, 100.0));
    assert!(!drag.pointer_up());
}

#[test]
fn removed_target_ends_session() {
    let mut store = LayerStore::new();
    let a = add_box(&mut store, Geometry::new(0.0, 0.0, 100.0, 100.0));
    let mut sel = Selection::new();
    let mut drag = DragController::new();

    drag.pointer_down(&store, &mut sel, Point::new(10.0, 10.0), HS);
    store.remove(a);
    assert_eq!(
        drag.pointer_move(&mut store, Point::new(20.0, 20.0), MIN_LAYER_SIZE),
        None
    );
    assert_eq!(drag.state(), DragState::Idle);
    assert_eq!(sel.resolve(&store), None);
}

#[test]
fn hidden_target_ends_session_without_edit() {
    let mut store = LayerStore::new();
    let g = Geometry::new(0.0, 0.0, 100.0, 100.0);
    let a = add_box(&mut store, g);
    let mut sel = Selection::new();
    let mut drag = DragController::new();

    drag.pointer_down(&store, &mut sel, Point::new(10.0, 10.0), HS);
    store.find_mut(a).unwrap().set_visible(false);
    assert_eq!(
        drag.pointer_move(&mut store, Point::new(40.0, 40.0), MIN_LAYER_SIZE),
        None
    );
    assert_eq!(drag.state(), DragState::Idle);
    assert_eq!(geometry(&store, a), g);

    store.find_mut(a).unwrap().set_visible(true);
    assert_eq!(
        drag.pointer_move(&mut store, Point::new(60.0, 60.0), MIN_LAYER_SIZE),
        None
    );
    assert_eq!(geometry(&store, a), g);
}

#[test]
fn selection_forget_and_stale_select() {
    let mut store = LayerStore::new();
    let a = add_box(&mut store, Geometry::new(0.0, 0.0, 10.0, 10.0));
    let b = add_box(&mut store, Geometry::new(0.0, 0.0, 10.0, 10.0));
    let mut sel = Selection::new();
    sel.select(&store, a);
    sel.forget(b);
    assert_eq!(sel.resolve(&store), Some(a));
    sel.forget(a);
    assert_eq!(sel.resolve(&store), None);

    store.remove(b);
    assert!(!sel.select(&store, b));
}

#[test]
fn cancel_and_forget_drop_session() {
    let mut store = LayerStore::new();
    let a = add_box(&mut store, Geometry::new(0.0, 0.0, 100.0, 100.0));
    let mut sel = Selection::new();
    let mut drag = DragController::new();

    drag.pointer_down(&store, &mut sel, Point::new(10.0, 10.0), HS);
    assert_eq!(drag.target(), Some(a));
    assert!(drag.cancel());
    assert_eq!(drag.target(), None);

    drag.pointer_down(&store, &mut sel, Point::new(10.0, 10.0), HS);
    drag.forget(a);
    assert!(!drag.is_dragging());
}
