use crate::foundation::core::{Canvas, Point, Rgba8Premul};
use crate::foundation::error::MixdeckResult;
use crate::layer::model::Geometry;
use crate::render::target::PaintTarget;
use crate::source::SourceFrame;

/// One recorded paint operation, tagged with the effective alpha at the time of the call.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintCall {
    /// `begin_frame`.
    Begin {
        /// Canvas size.
        canvas: Canvas,
        /// Clear color.
        clear: Rgba8Premul,
    },
    /// `draw_frame`.
    Frame {
        /// Destination box.
        dest: Geometry,
        /// Source size in pixels.
        size: (u32, u32),
        /// Effective alpha.
        alpha: f32,
    },
    /// `draw_text`.
    Text {
        /// Drawn string.
        text: String,
        /// Centre anchor.
        anchor: Point,
        /// Font size.
        size_px: f32,
        /// Fill color.
        color: Rgba8Premul,
        /// Effective alpha.
        alpha: f32,
    },
    /// `fill_rect`.
    Rect {
        /// Filled box.
        rect: Geometry,
        /// Fill color.
        color: Rgba8Premul,
        /// Effective alpha.
        alpha: f32,
    },
    /// `stroke_dashed_rect`.
    DashedOutline {
        /// Outlined box.
        rect: Geometry,
        /// Stroke color.
        color: Rgba8Premul,
        /// Effective alpha.
        alpha: f32,
    },
    /// `end_frame`.
    End,
}

/// Headless [`PaintTarget`] that records calls instead of rasterizing.
///
/// Useful for hosts that want to assert on composition without pixels, and for tests.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    calls: Vec<PaintCall>,
    alpha_stack: Vec<f32>,
}

impl RecordingTarget {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded since the last `begin_frame`.
    pub fn calls(&self) -> &[PaintCall] {
        &self.calls
    }

    /// Current opacity stack depth; zero between layers.
    pub fn opacity_depth(&self) -> usize {
        self.alpha_stack.len()
    }

    fn alpha(&self) -> f32 {
        self.alpha_stack.last().copied().unwrap_or(1.0)
    }
}

impl PaintTarget for RecordingTarget {
    fn begin_frame(&mut self, canvas: Canvas, clear: Rgba8Premul) -> MixdeckResult<()> {
        self.calls.clear();
        self.alpha_stack.clear();
        self.calls.push(PaintCall::Begin { canvas, clear });
        Ok(())
    }

    fn push_opacity(&mut self, opacity: f32) {
        let next = self.alpha() * opacity.clamp(0.0, 1.0);
        self.alpha_stack.push(next);
    }

    fn pop_opacity(&mut self) {
        self.alpha_stack.pop();
    }

    fn draw_frame(&mut self, frame: &SourceFrame, dest: Geometry) -> MixdeckResult<()> {
        self.calls.push(PaintCall::Frame {
            dest,
            size: (frame.width(), frame.height()),
            alpha: self.alpha(),
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        anchor: Point,
        size_px: f32,
        color: Rgba8Premul,
    ) -> MixdeckResult<()> {
        self.calls.push(PaintCall::Text {
            text: text.to_owned(),
            anchor,
            size_px,
            color,
            alpha: self.alpha(),
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Geometry, color: Rgba8Premul) -> MixdeckResult<()> {
        self.calls.push(PaintCall::Rect {
            rect,
            color,
            alpha: self.alpha(),
        });
        Ok(())
    }

    fn stroke_dashed_rect(
        &mut self,
        rect: Geometry,
        color: Rgba8Premul,
        _line_width: f64,
        _dash: [f64; 2],
    ) -> MixdeckResult<()> {
        self.calls.push(PaintCall::DashedOutline {
            rect,
            color,
            alpha: self.alpha(),
        });
        Ok(())
    }

    fn end_frame(&mut self) -> MixdeckResult<()> {
        self.calls.push(PaintCall::End);
        Ok(())
    }
}
