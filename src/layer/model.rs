use std::fmt;

use crate::foundation::core::{Point, Rect, Rgba8Premul, Vec2};
use crate::foundation::error::{MixdeckError, MixdeckResult};
use crate::layer::kind::LayerKind;
use crate::layer::timer::Timer;
use crate::source::SourceBinding;

/// Opaque, stable identifier assigned by the store at insertion.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub(crate) u64);

impl LayerId {
    /// Raw numeric value, for binding host UI controls.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Layer placement in canvas-logical pixels.
///
/// For text and timer layers `(x, y)` is the centre anchor and `w`/`h` are ignored.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    /// Left edge (or anchor x).
    pub x: f64,
    /// Top edge (or anchor y).
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Geometry {
    /// A box.
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// An anchor point with no extent.
    pub const fn anchor(x: f64, y: f64) -> Self {
        Self { x, y, w: 0.0, h: 0.0 }
    }

    /// Anchor / top-left corner.
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bottom-right corner.
    pub fn bottom_right(self) -> Point {
        Point::new(self.x + self.w, self.y + self.h)
    }

    /// Bounding box as a kurbo rect.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// Inclusive containment test on all four edges.
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Shift by `delta`.
    pub fn translated(self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..self
        }
    }

    /// Grow (or shrink) the extent by `delta`, flooring both dimensions at `min`.
    pub fn resized(self, delta: Vec2, min: f64) -> Self {
        Self {
            w: (self.w + delta.x).max(min),
            h: (self.h + delta.y).max(min),
            ..self
        }
    }

    /// Scale position and extent per axis.
    pub fn scaled(self, sx: f64, sy: f64) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            w: self.w * sx,
            h: self.h * sy,
        }
    }

    pub(crate) fn validate(self) -> MixdeckResult<()> {
        if ![self.x, self.y, self.w, self.h].iter().all(|v| v.is_finite()) {
            return Err(MixdeckError::validation("geometry must be finite"));
        }
        if self.w < 0.0 || self.h < 0.0 {
            return Err(MixdeckError::validation(
                "geometry width/height must be >= 0",
            ));
        }
        Ok(())
    }
}

/// Text payload for text layers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    /// String drawn at the anchor, single line.
    pub text: String,
    /// Fill color.
    #[serde(with = "crate::assets::color::serde_hex")]
    pub color: Rgba8Premul,
    /// Font size in logical pixels.
    pub size_px: f32,
}

impl TextStyle {
    /// White 48px text, like a freshly added text layer.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Rgba8Premul::opaque(255, 255, 255),
            size_px: 48.0,
        }
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: Rgba8Premul) -> Self {
        self.color = color;
        self
    }

    /// Set the font size.
    pub fn with_size(mut self, size_px: f32) -> Self {
        self.size_px = size_px;
        self
    }

    pub(crate) fn validate(&self) -> MixdeckResult<()> {
        if !self.size_px.is_finite() || self.size_px <= 0.0 {
            return Err(MixdeckError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Kind-specific payload.
pub enum LayerContent {
    /// Pixels supplied by an owned binding.
    Source(Box<dyn SourceBinding>),
    /// Text drawn at the anchor.
    Text(TextStyle),
    /// Timer drawn at the anchor.
    Timer(Timer),
}

impl LayerContent {
    fn variant_name(&self) -> &'static str {
        match self {
            LayerContent::Source(_) => "source",
            LayerContent::Text(_) => "text",
            LayerContent::Timer(_) => "timer",
        }
    }
}

impl fmt::Debug for LayerContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerContent::Source(b) => f
                .debug_struct("Source")
                .field("ready", &b.is_frame_ready())
                .finish(),
            LayerContent::Text(t) => f.debug_tuple("Text").field(t).finish(),
            LayerContent::Timer(t) => f.debug_tuple("Timer").field(t).finish(),
        }
    }
}

/// A request to create a layer. The store assigns the id.
#[derive(Debug)]
pub struct LayerSpec {
    pub(crate) kind: LayerKind,
    pub(crate) geometry: Option<Geometry>,
    pub(crate) opacity: Option<f32>,
    pub(crate) visible: bool,
    pub(crate) content: LayerContent,
}

impl LayerSpec {
    /// A layer of a source-backed kind (webcam, screen, video, image, background, logo, embed).
    pub fn source(kind: LayerKind, binding: impl SourceBinding + 'static) -> Self {
        Self::with_content(kind, LayerContent::Source(Box::new(binding)))
    }

    /// A text layer.
    pub fn text(style: TextStyle) -> Self {
        Self::with_content(LayerKind::Text, LayerContent::Text(style))
    }

    /// A timer layer.
    pub fn timer(timer: Timer) -> Self {
        Self::with_content(LayerKind::Timer, LayerContent::Timer(timer))
    }

    /// Raw constructor; kind/content agreement is checked on insertion.
    pub fn with_content(kind: LayerKind, content: LayerContent) -> Self {
        Self {
            kind,
            geometry: None,
            opacity: None,
            visible: true,
            content,
        }
    }

    /// Initial geometry. Without it the kind's default placement is used.
    pub fn at(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Initial opacity, clamped to `[0, 1]`.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Initial visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Requested kind.
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub(crate) fn validate(&self) -> MixdeckResult<()> {
        let ok = match &self.content {
            LayerContent::Source(_) => self.kind.is_sourced(),
            LayerContent::Text(style) => {
                style.validate()?;
                self.kind == LayerKind::Text
            }
            LayerContent::Timer(_) => self.kind == LayerKind::Timer,
        };
        if !ok {
            return Err(MixdeckError::config(format!(
                "layer kind \"{}\" cannot carry {} content",
                self.kind,
                self.content.variant_name()
            )));
        }
        if let Some(g) = self.geometry {
            g.validate()?;
        }
        if self.opacity.is_some_and(f32::is_nan) {
            return Err(MixdeckError::validation("opacity must not be NaN"));
        }
        Ok(())
    }

    pub(crate) fn natural_size(&self) -> Option<(u32, u32)> {
        match &self.content {
            LayerContent::Source(b) => b.natural_size(),
            _ => None,
        }
    }
}

/// One entry of the layer store.
///
/// Paint order is not stored here: a layer's position in the store is its z-order.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    kind: LayerKind,
    geometry: Geometry,
    visible: bool,
    opacity: f32,
    content: LayerContent,
    released: bool,
}

impl Layer {
    pub(crate) fn from_spec(id: LayerId, spec: LayerSpec, geometry: Geometry) -> Self {
        Self {
            id,
            kind: spec.kind,
            geometry,
            visible: spec.visible,
            opacity: spec
                .opacity
                .unwrap_or_else(|| spec.kind.default_opacity())
                .clamp(0.0, 1.0),
            content: spec.content,
            released: false,
        }
    }

    /// Stable id.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Kind tag.
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Current geometry.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Whether the compositor paints this layer.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Kind-specific payload.
    pub fn content(&self) -> &LayerContent {
        &self.content
    }

    /// Text payload, for text layers.
    pub fn text_style(&self) -> Option<&TextStyle> {
        match &self.content {
            LayerContent::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Timer payload, for timer layers.
    pub fn timer(&self) -> Option<&Timer> {
        match &self.content {
            LayerContent::Timer(t) => Some(t),
            _ => None,
        }
    }

    /// Source binding, for source-backed layers.
    pub fn binding(&self) -> Option<&dyn SourceBinding> {
        match &self.content {
            LayerContent::Source(b) => Some(b.as_ref()),
            _ => None,
        }
    }

    /// Whether this layer has a grabbable box (computed layers only have an anchor).
    pub fn has_box(&self) -> bool {
        !self.kind.is_computed()
    }

    pub(crate) fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Clamp into `[0, 1]`; NaN leaves the opacity unchanged.
    pub(crate) fn set_opacity(&mut self, opacity: f32) {
        if !opacity.is_nan() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub(crate) fn text_style_mut(&mut self) -> Option<&mut TextStyle> {
        match &mut self.content {
            LayerContent::Text(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn timer_mut(&mut self) -> Option<&mut Timer> {
        match &mut self.content {
            LayerContent::Timer(t) => Some(t),
            _ => None,
        }
    }

    /// Release the owned binding. Idempotent.
    pub(crate) fn release_source(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let LayerContent::Source(b) = &mut self.content {
            b.release();
        }
    }
}

impl Drop for Layer {
    fn drop(&mut self) {
        self.release_source();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/model.rs"]
mod tests;
