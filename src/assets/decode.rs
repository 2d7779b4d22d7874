use std::sync::Arc;

use anyhow::Context;

use crate::{
    foundation::error::{MixdeckError, MixdeckResult},
    source::SourceFrame,
};

const MAX_SVG_DIM: u32 = 16_384;

/// Decode encoded image bytes (PNG, JPEG, ...) into a premultiplied RGBA8 frame.
pub fn decode_image(bytes: &[u8]) -> MixdeckResult<SourceFrame> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    SourceFrame::new(width, height, Arc::new(rgba8_premul))
}

/// Parse SVG bytes and rasterize them at `scale` times their intrinsic size.
///
/// Logos are frequently shipped as SVG; rasterizing once up front keeps the per-frame path free of
/// vector work.
pub fn rasterize_svg(bytes: &[u8], scale: f32) -> MixdeckResult<SourceFrame> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(MixdeckError::validation("svg scale must be finite and > 0"));
    }
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let w = (size.width() * scale).ceil();
    let h = (size.height() * scale).ceil();
    if !w.is_finite() || !h.is_finite() || w < 1.0 || h < 1.0 {
        return Err(MixdeckError::validation("svg has invalid width/height"));
    }
    let (w, h) = (w as u32, h as u32);
    if w > MAX_SVG_DIM || h > MAX_SVG_DIM {
        return Err(MixdeckError::validation(format!(
            "svg raster size too large: {w}x{h} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| MixdeckError::render("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(
        (w as f32) / size.width(),
        (h as f32) / size.height(),
    );
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    SourceFrame::new(w, h, Arc::new(pixmap.data().to_vec()))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
