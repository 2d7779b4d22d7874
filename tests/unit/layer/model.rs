use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::source::{SourceFrame, StillImage};

fn still() -> StillImage {
    StillImage::loaded(SourceFrame::solid(2, 2, Rgba8Premul::opaque(0, 0, 255)).unwrap())
}

#[test]
fn geometry_contains_is_inclusive() {
    let g = Geometry::new(10.0, 10.0, 20.0, 20.0);
    assert!(g.contains(Point::new(10.0, 10.0)));
    assert!(g.contains(Point::new(30.0, 30.0)));
    assert!(!g.contains(Point::new(30.1, 20.0)));
    assert!(!g.contains(Point::new(9.9, 20.0)));
}

#[test]
fn geometry_resize_floors_both_dimensions() {
    let g = Geometry::new(0.0, 0.0, 100.0, 80.0).resized(Vec2::new(-90.0, -10.0), 50.0);
    assert_eq!(g, Geometry::new(0.0, 0.0, 50.0, 70.0));
}

#[test]
fn geometry_validation_rejects_nan_and_negative() {
    assert!(Geometry::new(f64::NAN, 0.0, 1.0, 1.0).validate().is_err());
    assert!(Geometry::new(0.0, 0.0, -1.0, 1.0).validate().is_err());
    assert!(Geometry::anchor(5.0, 5.0).validate().is_ok());
}

#[test]
fn spec_rejects_mismatched_kind_and_content() {
    let spec = LayerSpec::source(LayerKind::Text, still());
    assert!(matches!(spec.validate(), Err(MixdeckError::Config(_))));

    let spec = LayerSpec::with_content(
        LayerKind::Image,
        LayerContent::Timer(Timer::countdown(10)),
    );
    assert!(matches!(spec.validate(), Err(MixdeckError::Config(_))));

    assert!(LayerSpec::source(LayerKind::Logo, still()).validate().is_ok());
    assert!(
        LayerSpec::text(TextStyle::new("hi").with_size(0.0))
            .validate()
            .is_err()
    );
}

#[test]
fn layer_opacity_is_clamped_and_nan_ignored() {
    let spec = LayerSpec::source(LayerKind::Image, still()).with_opacity(3.0);
    let mut layer = Layer::from_spec(LayerId(1), spec, Geometry::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(layer.opacity(), 1.0);
    layer.set_opacity(-0.5);
    assert_eq!(layer.opacity(), 0.0);
    layer.set_opacity(f32::NAN);
    assert_eq!(layer.opacity(), 0.0);
}

#[test]
fn default_opacity_comes_from_kind() {
    let spec = LayerSpec::source(LayerKind::Logo, still());
    let layer = Layer::from_spec(LayerId(7), spec, Geometry::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(layer.opacity(), 0.8);
    assert_eq!(layer.id().to_string(), "L7");
    assert!(layer.has_box());
    assert!(layer.binding().is_some());
}

#[test]
fn dropping_a_layer_releases_its_binding_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let binding = still().with_release_hook(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });
    let mut layer = Layer::from_spec(
        LayerId(1),
        LayerSpec::source(LayerKind::Image, binding),
        Geometry::new(0.0, 0.0, 1.0, 1.0),
    );
    layer.release_source();
    drop(layer);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
