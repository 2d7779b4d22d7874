use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::foundation::core::Rgba8Premul;
use crate::layer::kind::LayerKind;
use crate::layer::model::{Geometry, TextStyle};
use crate::source::{SourceFrame, StillImage};

fn canvas() -> Canvas {
    Canvas {
        width: 640,
        height: 360,
    }
}

fn image_spec(x: f64) -> LayerSpec {
    let frame = SourceFrame::solid(1, 1, Rgba8Premul::opaque(1, 2, 3)).unwrap();
    LayerSpec::source(LayerKind::Image, StillImage::loaded(frame))
        .at(Geometry::new(x, 0.0, 10.0, 10.0))
}

fn store_with(n: usize) -> (LayerStore, Vec<LayerId>) {
    let mut store = LayerStore::new();
    let ids = (0..n)
        .map(|i| {
            store
                .insert(image_spec(i as f64), InsertAt::Top, canvas())
                .unwrap()
        })
        .collect();
    (store, ids)
}

#[test]
fn insert_appends_on_top_and_preserves_order() {
    let (store, ids) = store_with(3);
    assert_eq!(store.ids(), ids.as_slice());
    assert_eq!(store.len(), 3);
    let xs: Vec<f64> = store.iter().map(|l| l.geometry().x).collect();
    assert_eq!(xs, vec![0.0, 1.0, 2.0]);
}

#[test]
fn ids_are_unique_and_never_reused() {
    let (mut store, ids) = store_with(2);
    assert!(store.remove(ids[1]));
    let next = store.insert(image_spec(9.0), InsertAt::Top, canvas()).unwrap();
    assert!(!ids.contains(&next));
}

#[test]
fn bottom_and_index_insertion() {
    let (mut store, ids) = store_with(2);
    let bg = store.insert(image_spec(0.0), InsertAt::Bottom, canvas()).unwrap();
    assert_eq!(store.position(bg), Some(0));
    let mid = store.insert(image_spec(0.0), InsertAt::Index(2), canvas()).unwrap();
    assert_eq!(store.ids(), &[bg, ids[0], mid, ids[1]]);
    let far = store.insert(image_spec(0.0), InsertAt::Index(99), canvas()).unwrap();
    assert_eq!(store.position(far), Some(4));
}

#[test]
fn missing_geometry_uses_kind_default() {
    let mut store = LayerStore::new();
    let id = store
        .insert(LayerSpec::text(TextStyle::new("LIVE")), InsertAt::Top, canvas())
        .unwrap();
    assert_eq!(store.find(id).unwrap().geometry(), Geometry::anchor(320.0, 180.0));

    let (slot, _feed) = crate::source::FrameSlot::new();
    let cam = store
        .insert(LayerSpec::source(LayerKind::Webcam, slot), InsertAt::Top, canvas())
        .unwrap();
    assert_eq!(
        store.find(cam).unwrap().geometry(),
        Geometry::new(0.0, 0.0, 320.0, 180.0)
    );
}

#[test]
fn invalid_spec_is_rejected_without_consuming_a_slot() {
    let mut store = LayerStore::new();
    let bad = LayerSpec::text(TextStyle::new("x")).at(Geometry::new(0.0, 0.0, -5.0, 1.0));
    assert!(store.insert(bad, InsertAt::Top, canvas()).is_err());
    assert!(store.is_empty());
}

#[test]
fn remove_of_unknown_id_is_a_no_op() {
    let (mut store, ids) = store_with(1);
    assert!(store.remove(ids[0]));
    assert!(!store.remove(ids[0]));
    assert!(!store.contains(ids[0]));
    assert!(store.is_empty());
}

#[test]
fn remove_releases_binding_synchronously() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let frame = SourceFrame::solid(1, 1, Rgba8Premul::opaque(0, 0, 0)).unwrap();
    let binding = StillImage::loaded(frame).with_release_hook(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });
    let mut store = LayerStore::new();
    let id = store
        .insert(LayerSpec::source(LayerKind::Image, binding), InsertAt::Top, canvas())
        .unwrap();
    store.remove(id);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn moves_clamp_at_both_ends() {
    let (mut store, ids) = store_with(3);
    assert!(!store.move_toward_top(ids[2], 1));
    assert!(!store.move_toward_bottom(ids[0], 5));

    assert!(store.move_toward_top(ids[0], 10));
    assert_eq!(store.ids(), &[ids[1], ids[2], ids[0]]);

    assert!(store.move_toward_bottom(ids[0], 1));
    assert_eq!(store.ids(), &[ids[1], ids[0], ids[2]]);

    let gone = LayerId(999);
    assert!(!store.move_toward_top(gone, 1));
    assert!(!store.move_toward_bottom(gone, 1));
}

#[test]
fn reordering_never_touches_geometry_or_opacity() {
    let (mut store, ids) = store_with(3);
    let before: Vec<(Geometry, f32)> = ids
        .iter()
        .map(|id| {
            let l = store.find(*id).unwrap();
            (l.geometry(), l.opacity())
        })
        .collect();
    store.move_toward_top(ids[0], 2);
    store.move_toward_bottom(ids[2], 1);
    for (id, (g, o)) in ids.iter().zip(before) {
        let l = store.find(*id).unwrap();
        assert_eq!(l.geometry(), g);
        assert_eq!(l.opacity(), o);
    }
}

#[test]
fn clear_releases_everything() {
    let (mut store, _ids) = store_with(4);
    assert_eq!(store.clear(), 4);
    assert!(store.is_empty());
    let mut seen = 0;
    store.for_each_back_to_front(|_| seen += 1);
    assert_eq!(seen, 0);
}
