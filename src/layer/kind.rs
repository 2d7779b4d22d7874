use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Canvas;
use crate::foundation::error::MixdeckError;
use crate::layer::model::Geometry;

const LOGO_MAX_PX: f64 = 200.0;
const LOGO_CANVAS_FRACTION: f64 = 0.15;
const LOGO_MARGIN_PX: f64 = 30.0;
const TIMER_ANCHOR_Y: f64 = 100.0;

/// Closed set of layer kinds. The kind decides which paint rule applies.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Live camera capture.
    Webcam,
    /// Live screen share.
    Screen,
    /// Playing video file.
    Video,
    /// Still image overlay.
    Image,
    /// Computed text.
    Text,
    /// Computed countdown or stopwatch.
    Timer,
    /// Full-canvas backdrop (image or video), inserted at the bottom.
    Background,
    /// Corner logo.
    Logo,
    /// Embedded page rendered by the host into frames.
    EmbeddedFrame,
}

impl LayerKind {
    /// Every kind, in declaration order.
    pub const ALL: [LayerKind; 9] = [
        LayerKind::Webcam,
        LayerKind::Screen,
        LayerKind::Video,
        LayerKind::Image,
        LayerKind::Text,
        LayerKind::Timer,
        LayerKind::Background,
        LayerKind::Logo,
        LayerKind::EmbeddedFrame,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Webcam => "webcam",
            LayerKind::Screen => "screen",
            LayerKind::Video => "video",
            LayerKind::Image => "image",
            LayerKind::Text => "text",
            LayerKind::Timer => "timer",
            LayerKind::Background => "background",
            LayerKind::Logo => "logo",
            LayerKind::EmbeddedFrame => "embedded_frame",
        }
    }

    /// Kinds whose pixels come from a live or decoded stream.
    pub fn is_stream(self) -> bool {
        matches!(
            self,
            LayerKind::Webcam
                | LayerKind::Screen
                | LayerKind::Video
                | LayerKind::Background
                | LayerKind::EmbeddedFrame
        )
    }

    /// Kinds backed by a still image resource.
    pub fn is_still(self) -> bool {
        matches!(self, LayerKind::Image | LayerKind::Logo)
    }

    /// Kinds that need a [`crate::SourceBinding`].
    pub fn is_sourced(self) -> bool {
        self.is_stream() || self.is_still()
    }

    /// Kinds computed at render time. Their geometry is an anchor point, not a box.
    pub fn is_computed(self) -> bool {
        matches!(self, LayerKind::Text | LayerKind::Timer)
    }

    /// Opacity a freshly created layer of this kind starts with.
    pub fn default_opacity(self) -> f32 {
        match self {
            LayerKind::Image => 0.9,
            LayerKind::Logo => 0.8,
            _ => 1.0,
        }
    }

    /// Placement used when the host does not supply initial geometry.
    ///
    /// Webcam, screen and video tile the canvas (top-left quarter, right half, bottom-left
    /// quarter); images get a centred third of the canvas. `natural` is the source's intrinsic
    /// pixel size when known and only shapes logos, which keep their aspect ratio.
    pub fn default_geometry(self, canvas: Canvas, natural: Option<(u32, u32)>) -> Geometry {
        let cw = f64::from(canvas.width);
        let ch = f64::from(canvas.height);
        match self {
            LayerKind::Webcam => Geometry::new(0.0, 0.0, cw / 2.0, ch / 2.0),
            LayerKind::Screen => Geometry::new(cw / 2.0, 0.0, cw / 2.0, ch),
            LayerKind::Video => Geometry::new(0.0, ch / 2.0, cw / 2.0, ch / 2.0),
            LayerKind::Background => Geometry::new(0.0, 0.0, cw, ch),
            LayerKind::Image => {
                let (w, h) = (cw / 3.0, ch / 3.0);
                Geometry::new((cw - w) / 2.0, (ch - h) / 2.0, w, h)
            }
            LayerKind::Logo => {
                let size = LOGO_MAX_PX.min(cw * LOGO_CANVAS_FRACTION);
                let h = match natural {
                    Some((nw, nh)) if nw > 0 => size * (f64::from(nh) / f64::from(nw)),
                    _ => size,
                };
                Geometry::new(cw - size - LOGO_MARGIN_PX, LOGO_MARGIN_PX, size, h)
            }
            LayerKind::EmbeddedFrame => Geometry::new(cw / 4.0, ch / 4.0, cw / 2.0, ch / 2.0),
            LayerKind::Text => Geometry::anchor(cw / 2.0, ch / 2.0),
            LayerKind::Timer => Geometry::anchor(cw / 2.0, TIMER_ANCHOR_Y),
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKind {
    type Err = MixdeckError;

    /// Parse a kind name. Unknown names are a caller bug and fail with a config error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        LayerKind::ALL
            .into_iter()
            .find(|k| k.as_str() == norm)
            .ok_or_else(|| MixdeckError::config(format!("unknown layer kind \"{s}\"")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/kind.rs"]
mod tests;
