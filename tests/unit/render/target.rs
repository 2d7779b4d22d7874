use super::*;

#[test]
fn solid_pattern_emits_one_rect_per_edge() {
    let segs = dash_segments(Geometry::new(0.0, 0.0, 10.0, 4.0), 2.0, [0.0, 0.0]);
    assert_eq!(segs.len(), 4);
    assert_eq!(segs[0], Geometry::new(0.0, -1.0, 10.0, 2.0));
    assert_eq!(segs[1], Geometry::new(9.0, 0.0, 2.0, 4.0));
    assert_eq!(segs[2], Geometry::new(0.0, 3.0, 10.0, 2.0));
    assert_eq!(segs[3], Geometry::new(-1.0, 0.0, 2.0, 4.0));
}

#[test]
fn dashes_alternate_along_edges() {
    // 12 wide, 6 on / 6 off: top edge gets exactly one dash covering [0, 6].
    let segs = dash_segments(Geometry::new(0.0, 0.0, 12.0, 12.0), 2.0, [6.0, 6.0]);
    assert_eq!(segs[0], Geometry::new(0.0, -1.0, 6.0, 2.0));
    // Phase is continuous: right edge starts "on" again after 12 units.
    assert_eq!(segs[1], Geometry::new(11.0, 0.0, 2.0, 6.0));
    assert_eq!(segs.len(), 4);
}

#[test]
fn dash_coverage_is_half_the_perimeter_for_even_patterns() {
    let rect = Geometry::new(5.0, 5.0, 120.0, 60.0);
    let segs = dash_segments(rect, 3.0, [6.0, 6.0]);
    let covered: f64 = segs.iter().map(|g| g.w.max(g.h)).sum();
    assert!((covered - 180.0).abs() < 1e-9, "{covered}");
}

#[test]
fn degenerate_inputs_emit_nothing() {
    assert!(dash_segments(Geometry::new(0.0, 0.0, 0.0, 10.0), 2.0, [6.0, 6.0]).is_empty());
    assert!(dash_segments(Geometry::new(0.0, 0.0, 10.0, 10.0), 0.0, [6.0, 6.0]).is_empty());
}
