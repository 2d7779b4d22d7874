use std::time::Duration;

use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::MixdeckResult;
use crate::layer::model::{Geometry, Layer, LayerContent, LayerId};
use crate::layer::store::LayerStore;
use crate::render::target::PaintTarget;

/// Side of the square resize handle at a layer's bottom-right corner, in logical pixels.
///
/// The same square is drawn as the selection affordance and used as the hit region.
pub const DEFAULT_HANDLE_SIZE: f64 = 24.0;

/// Styling for the compositor's fixed decorations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositorStyle {
    /// Opaque color every frame starts from.
    pub clear: Rgba8Premul,
    /// Selection outline and handle color.
    pub selection: Rgba8Premul,
    /// Selection outline width.
    pub outline_width: f64,
    /// Selection outline on/off dash lengths.
    pub outline_dash: [f64; 2],
    /// Resize handle side.
    pub handle_size: f64,
    /// Timer font size.
    pub timer_size_px: f32,
    /// Timer color.
    pub timer_color: Rgba8Premul,
}

impl Default for CompositorStyle {
    fn default() -> Self {
        let accent = Rgba8Premul::opaque(0xff, 0x95, 0x00);
        Self {
            clear: Rgba8Premul::opaque(0x03, 0x10, 0x23),
            selection: accent,
            outline_width: 3.0,
            outline_dash: [6.0, 6.0],
            handle_size: DEFAULT_HANDLE_SIZE,
            timer_size_px: 68.0,
            timer_color: accent,
        }
    }
}

/// Per-frame counters, mostly for hosts that display diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Layers that produced paint calls.
    pub painted: usize,
    /// Layers skipped because they are hidden.
    pub hidden: usize,
    /// Source-backed layers skipped because no frame was ready.
    pub not_ready: usize,
    /// Whether the selection overlay was drawn.
    pub selection_drawn: bool,
}

/// Stateless per-frame compositor.
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    style: CompositorStyle,
}

impl Compositor {
    /// Compositor with the given styling.
    pub fn new(style: CompositorStyle) -> Self {
        Self { style }
    }

    /// Current styling.
    pub fn style(&self) -> &CompositorStyle {
        &self.style
    }

    /// Paint one frame of `store` into `target`, back to front, then the selection overlay.
    ///
    /// `now` is the host clock reading used to derive timer values.
    #[tracing::instrument(level = "trace", skip_all, fields(layers = store.len()))]
    pub fn render_frame<T: PaintTarget + ?Sized>(
        &self,
        target: &mut T,
        canvas: Canvas,
        store: &LayerStore,
        selection: Option<LayerId>,
        now: Duration,
    ) -> MixdeckResult<FrameStats> {
        let mut stats = FrameStats::default();
        target.begin_frame(canvas, self.style.clear)?;

        for layer in store.iter() {
            if !layer.is_visible() {
                stats.hidden += 1;
                continue;
            }
            target.push_opacity(layer.opacity());
            let painted = self.paint_layer(target, layer, now);
            target.pop_opacity();
            if painted? {
                stats.painted += 1;
            } else {
                stats.not_ready += 1;
            }
        }

        if let Some(layer) = selection
            .and_then(|id| store.find(id))
            .filter(|l| l.is_visible() && l.has_box())
        {
            self.paint_selection(target, layer)?;
            stats.selection_drawn = true;
        }

        target.end_frame()?;
        Ok(stats)
    }

    /// Returns `Ok(false)` when the layer's source had nothing to show this frame.
    fn paint_layer<T: PaintTarget + ?Sized>(
        &self,
        target: &mut T,
        layer: &Layer,
        now: Duration,
    ) -> MixdeckResult<bool> {
        let geometry = layer.geometry();
        match layer.content() {
            LayerContent::Source(binding) => {
                if !binding.is_frame_ready() {
                    return Ok(false);
                }
                let Some(frame) = binding.current_frame() else {
                    return Ok(false);
                };
                target.draw_frame(&frame, geometry)?;
                Ok(true)
            }
            LayerContent::Text(style) => {
                target.draw_text(&style.text, geometry.origin(), style.size_px, style.color)?;
                Ok(true)
            }
            LayerContent::Timer(timer) => {
                target.draw_text(
                    &timer.label(now),
                    geometry.origin(),
                    self.style.timer_size_px,
                    self.style.timer_color,
                )?;
                Ok(true)
            }
        }
    }

    fn paint_selection<T: PaintTarget + ?Sized>(
        &self,
        target: &mut T,
        layer: &Layer,
    ) -> MixdeckResult<()> {
        let g = layer.geometry();
        target.stroke_dashed_rect(
            g,
            self.style.selection,
            self.style.outline_width,
            self.style.outline_dash,
        )?;
        let hs = self.style.handle_size;
        let handle = Geometry::new(g.x + g.w - hs, g.y + g.h - hs, hs, hs);
        target.fill_rect(handle, self.style.selection)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
