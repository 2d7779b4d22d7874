use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn frame_pixel_bounds() {
    let f = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(f.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.pixel(0, 1), None);
}

#[test]
fn to_straight_unpremultiplies_partial_alpha() {
    let f = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 128, 128],
        premultiplied: true,
    };
    let s = f.to_straight();
    assert!(!s.premultiplied);
    assert_eq!(s.data, vec![128, 0, 255, 128]);
}

#[test]
fn surface_dims_rejects_oversized_canvas() {
    assert!(CpuSurface::new(canvas(70_000, 4), CpuSurfaceOpts::default()).is_err());
}

#[test]
fn bad_font_bytes_are_a_config_error() {
    let err = CpuSurface::new(
        canvas(4, 4),
        CpuSurfaceOpts::default().with_font_bytes(vec![0u8; 16]),
    )
    .unwrap_err();
    assert!(matches!(err, MixdeckError::Config(_)));
}

#[test]
fn clear_fills_every_pixel() {
    let mut s = CpuSurface::new(canvas(8, 4), CpuSurfaceOpts::default()).unwrap();
    s.begin_frame(canvas(8, 4), Rgba8Premul::opaque(10, 20, 30))
        .unwrap();
    s.end_frame().unwrap();
    let f = s.frame();
    assert_eq!((f.width, f.height), (8, 4));
    assert!(f.data.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
}

#[test]
fn begin_frame_resizes_to_new_canvas() {
    let mut s = CpuSurface::new(canvas(8, 4), CpuSurfaceOpts::default()).unwrap();
    s.begin_frame(canvas(3, 5), Rgba8Premul::opaque(0, 0, 0))
        .unwrap();
    s.end_frame().unwrap();
    assert_eq!(s.size(), (3, 5));
    assert_eq!(s.pixels().len(), 3 * 5 * 4);
}

#[test]
fn text_without_font_is_skipped() {
    let mut s = CpuSurface::new(canvas(8, 8), CpuSurfaceOpts::default()).unwrap();
    assert!(!s.has_font());
    s.begin_frame(canvas(8, 8), Rgba8Premul::opaque(0, 0, 0))
        .unwrap();
    s.draw_text("hi", Point::new(4.0, 4.0), 12.0, Rgba8Premul::opaque(255, 255, 255))
        .unwrap();
    s.end_frame().unwrap();
    assert!(s.pixels().chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn unbalanced_opacity_is_closed_at_end_frame() {
    let mut s = CpuSurface::new(canvas(4, 4), CpuSurfaceOpts::default()).unwrap();
    s.begin_frame(canvas(4, 4), Rgba8Premul::opaque(0, 0, 0))
        .unwrap();
    s.push_opacity(0.5);
    s.end_frame().unwrap();
    assert!(s.opacity_stack.is_empty());
}

#[test]
fn color_to_cpu_round_trips_opaque() {
    let c = color_to_cpu(Rgba8Premul::opaque(1, 2, 3)).to_rgba8();
    assert_eq!((c.r, c.g, c.b, c.a), (1, 2, 3, 255));
}
