use crate::foundation::core::{Canvas, Point, Rgba8Premul, Vec2};
use crate::foundation::error::MixdeckResult;
use crate::layer::model::Geometry;
use crate::source::SourceFrame;

/// The output surface the compositor paints into.
///
/// Only the compositor drives a target. Opacity is a stack: every `push_opacity` is matched by a
/// `pop_opacity` before the next layer starts, so alpha never leaks between layers.
pub trait PaintTarget {
    /// Resize to `canvas` if needed and fill every pixel with the opaque `clear` color.
    fn begin_frame(&mut self, canvas: Canvas, clear: Rgba8Premul) -> MixdeckResult<()>;

    /// Multiply subsequent paints by `opacity` until the matching `pop_opacity`.
    fn push_opacity(&mut self, opacity: f32);

    /// Restore the alpha in effect before the last `push_opacity`.
    fn pop_opacity(&mut self);

    /// Draw `frame` scaled into `dest`.
    fn draw_frame(&mut self, frame: &SourceFrame, dest: Geometry) -> MixdeckResult<()>;

    /// Draw a single line of text centred on `anchor`.
    fn draw_text(
        &mut self,
        text: &str,
        anchor: Point,
        size_px: f32,
        color: Rgba8Premul,
    ) -> MixdeckResult<()>;

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Geometry, color: Rgba8Premul) -> MixdeckResult<()>;

    /// Stroke the outline of `rect` with an on/off dash pattern.
    fn stroke_dashed_rect(
        &mut self,
        rect: Geometry,
        color: Rgba8Premul,
        line_width: f64,
        dash: [f64; 2],
    ) -> MixdeckResult<()> {
        for seg in dash_segments(rect, line_width, dash) {
            self.fill_rect(seg, color)?;
        }
        Ok(())
    }

    /// Finish the frame; the surface now holds the composited pixels.
    fn end_frame(&mut self) -> MixdeckResult<()>;
}

/// Break the outline of `rect` into filled dash rectangles centred on its edges.
///
/// The pattern phase runs continuously around the perimeter, clockwise from the top-left corner.
/// A non-positive "on" length or a non-finite pattern strokes solid edges.
pub fn dash_segments(rect: Geometry, line_width: f64, dash: [f64; 2]) -> Vec<Geometry> {
    let [on, off] = dash;
    let solid = !(on.is_finite() && off.is_finite()) || on <= 0.0 || off <= 0.0;
    let half = line_width.max(0.0) / 2.0;
    if half == 0.0 || rect.w <= 0.0 || rect.h <= 0.0 {
        return Vec::new();
    }

    let tl = rect.origin();
    let br = rect.bottom_right();
    let edges = [
        (tl, Vec2::new(1.0, 0.0), rect.w),
        (Point::new(br.x, tl.y), Vec2::new(0.0, 1.0), rect.h),
        (br, Vec2::new(-1.0, 0.0), rect.w),
        (Point::new(tl.x, br.y), Vec2::new(0.0, -1.0), rect.h),
    ];

    let mut out = Vec::new();
    let period = on + off;
    let mut phase = 0.0f64;
    for (start, dir, len) in edges {
        if solid {
            out.push(edge_rect(start, dir, 0.0, len, half));
            continue;
        }
        let mut t = 0.0f64;
        while t < len {
            let in_on = phase < on;
            let remain = if in_on { on - phase } else { period - phase };
            let step = remain.min(len - t);
            if in_on {
                out.push(edge_rect(start, dir, t, t + step, half));
            }
            t += step;
            phase = (phase + step) % period;
        }
    }
    out
}

fn edge_rect(start: Point, dir: Vec2, t0: f64, t1: f64, half: f64) -> Geometry {
    let a = start + dir * t0;
    let b = start + dir * t1;
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
    if dir.x != 0.0 {
        Geometry::new(x0, y0 - half, x1 - x0, 2.0 * half)
    } else {
        Geometry::new(x0 - half, y0, 2.0 * half, y1 - y0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/target.rs"]
mod tests;
