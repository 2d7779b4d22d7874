use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::assets::color::serde_hex;
use crate::foundation::core::{Canvas, Point, Rgba8Premul};
use crate::foundation::error::{MixdeckError, MixdeckResult};
use crate::interact::drag::{DragController, DragState, MIN_LAYER_SIZE, Selection};
use crate::interact::hit::{Hit, hit_test};
use crate::layer::kind::LayerKind;
use crate::layer::model::{Geometry, LayerId, LayerSpec, TextStyle};
use crate::layer::store::{InsertAt, LayerStore};
use crate::render::compositor::{Compositor, CompositorStyle, DEFAULT_HANDLE_SIZE, FrameStats};
use crate::render::target::PaintTarget;

/// Allowed range for [`StudioOpts::handle_size`].
pub const HANDLE_SIZE_RANGE: std::ops::RangeInclusive<f64> = 16.0..=40.0;

/// Session options, loadable from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioOpts {
    /// Logical output resolution.
    pub canvas: Canvas,
    /// Opaque clear color, `#RRGGBB`.
    #[serde(with = "serde_hex")]
    pub clear_rgba: Rgba8Premul,
    /// Selection outline and handle color.
    #[serde(with = "serde_hex")]
    pub selection_rgba: Rgba8Premul,
    /// Resize handle side, shared by drawing and hit-testing.
    pub handle_size: f64,
    /// Resize floor for both dimensions.
    pub min_size: f64,
    /// Font size for new text layers.
    pub text_font_px: f32,
    /// Timer font size.
    pub timer_font_px: f32,
    /// Timer color.
    #[serde(with = "serde_hex")]
    pub timer_rgba: Rgba8Premul,
}

impl Default for StudioOpts {
    fn default() -> Self {
        let style = CompositorStyle::default();
        Self {
            canvas: Canvas::default(),
            clear_rgba: style.clear,
            selection_rgba: style.selection,
            handle_size: DEFAULT_HANDLE_SIZE,
            min_size: MIN_LAYER_SIZE,
            text_font_px: 48.0,
            timer_font_px: style.timer_size_px,
            timer_rgba: style.timer_color,
        }
    }
}

impl StudioOpts {
    /// Parse and validate options from JSON. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> MixdeckResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| MixdeckError::serde(format!("studio options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> MixdeckResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read studio options '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Set the canvas.
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Set the clear color.
    pub fn with_clear_rgba(mut self, color: Rgba8Premul) -> Self {
        self.clear_rgba = color;
        self
    }

    /// Set the selection color.
    pub fn with_selection_rgba(mut self, color: Rgba8Premul) -> Self {
        self.selection_rgba = color;
        self
    }

    /// Set the handle size.
    pub fn with_handle_size(mut self, size: f64) -> Self {
        self.handle_size = size;
        self
    }

    /// Set the resize floor.
    pub fn with_min_size(mut self, size: f64) -> Self {
        self.min_size = size;
        self
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> MixdeckResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(MixdeckError::config("canvas must be non-empty"));
        }
        if !self.clear_rgba.is_opaque() {
            return Err(MixdeckError::config("clear color must be opaque"));
        }
        if !HANDLE_SIZE_RANGE.contains(&self.handle_size) {
            return Err(MixdeckError::config(format!(
                "handle_size must be in 16..=40, got {}",
                self.handle_size
            )));
        }
        if !self.min_size.is_finite() || self.min_size <= 0.0 {
            return Err(MixdeckError::config("min_size must be finite and > 0"));
        }
        for (name, v) in [
            ("text_font_px", self.text_font_px),
            ("timer_font_px", self.timer_font_px),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(MixdeckError::config(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }

    fn compositor_style(&self) -> CompositorStyle {
        CompositorStyle {
            clear: self.clear_rgba,
            selection: self.selection_rgba,
            handle_size: self.handle_size,
            timer_size_px: self.timer_font_px,
            timer_color: self.timer_rgba,
            ..CompositorStyle::default()
        }
    }
}

/// What happens to existing layer geometry on a resolution change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescalePolicy {
    /// Leave geometry as is.
    #[default]
    Keep,
    /// Scale every geometry and anchor by the per-axis ratio of new to old canvas.
    Scale,
}

/// Snapshot of one layer's presentation state.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneEntry {
    /// Layer the entry applies to.
    pub id: LayerId,
    /// Visibility.
    pub visible: bool,
    /// Opacity.
    pub opacity: f32,
    /// Geometry.
    pub geometry: Geometry,
}

/// One editing session: the layer store plus selection, drag state, styling and scenes.
///
/// Input handling and rendering are expected to run on the same thread, so a frame always sees
/// every edit made before it.
#[derive(Debug)]
pub struct Studio {
    opts: StudioOpts,
    store: LayerStore,
    selection: Selection,
    drag: DragController,
    compositor: Compositor,
    scenes: BTreeMap<String, Vec<SceneEntry>>,
}

impl Studio {
    /// A session with validated `opts` and no layers.
    pub fn new(opts: StudioOpts) -> MixdeckResult<Self> {
        opts.validate()?;
        Ok(Self {
            compositor: Compositor::new(opts.compositor_style()),
            opts,
            store: LayerStore::new(),
            selection: Selection::new(),
            drag: DragController::new(),
            scenes: BTreeMap::new(),
        })
    }

    /// Current options.
    pub fn opts(&self) -> &StudioOpts {
        &self.opts
    }

    /// Logical output resolution.
    pub fn canvas(&self) -> Canvas {
        self.opts.canvas
    }

    /// Read access to the layer store.
    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    /// A text style with the session's default font size.
    pub fn text_style(&self, text: impl Into<String>) -> TextStyle {
        TextStyle::new(text).with_size(self.opts.text_font_px)
    }

    /// Create a layer. Backgrounds go to the bottom, everything else on top.
    #[tracing::instrument(level = "debug", skip_all, fields(kind = %spec.kind()))]
    pub fn create_layer(&mut self, spec: LayerSpec) -> MixdeckResult<LayerId> {
        let at = if spec.kind() == LayerKind::Background {
            InsertAt::Bottom
        } else {
            InsertAt::Top
        };
        self.create_layer_at(spec, at)
    }

    /// Create a layer at an explicit position.
    pub fn create_layer_at(&mut self, spec: LayerSpec, at: InsertAt) -> MixdeckResult<LayerId> {
        let kind = spec.kind();
        let id = self.store.insert(spec, at, self.opts.canvas)?;
        tracing::debug!(%id, %kind, "layer created");
        Ok(id)
    }

    /// Remove a layer, releasing its source and dropping any selection or drag that targets it.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        if !self.store.remove(id) {
            return false;
        }
        self.selection.forget(id);
        self.drag.forget(id);
        tracing::debug!(%id, "layer removed");
        true
    }

    /// Remove every layer. Returns how many were removed.
    pub fn clear_layers(&mut self) -> usize {
        let n = self.store.clear();
        self.selection.clear();
        self.drag.cancel();
        tracing::debug!(removed = n, "cleared all layers");
        n
    }

    /// Move one step toward the top.
    pub fn move_up(&mut self, id: LayerId) -> bool {
        self.store.move_toward_top(id, 1)
    }

    /// Move one step toward the bottom.
    pub fn move_down(&mut self, id: LayerId) -> bool {
        self.store.move_toward_bottom(id, 1)
    }

    /// Show or hide a layer.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        self.store
            .find_mut(id)
            .map(|l| l.set_visible(visible))
            .is_some()
    }

    /// Set opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) -> bool {
        self.store
            .find_mut(id)
            .map(|l| l.set_opacity(opacity))
            .is_some()
    }

    /// Replace a layer's geometry. Returns `Ok(false)` for unknown ids.
    pub fn set_geometry(&mut self, id: LayerId, geometry: Geometry) -> MixdeckResult<bool> {
        geometry.validate()?;
        Ok(self
            .store
            .find_mut(id)
            .map(|l| l.set_geometry(geometry))
            .is_some())
    }

    /// Replace the string of a text layer.
    pub fn set_text(&mut self, id: LayerId, text: impl Into<String>) -> bool {
        self.edit_text(id, |t| t.text = text.into())
    }

    /// Replace the color of a text layer.
    pub fn set_text_color(&mut self, id: LayerId, color: Rgba8Premul) -> bool {
        self.edit_text(id, |t| t.color = color)
    }

    /// Replace the font size of a text layer. Non-positive or non-finite sizes are ignored.
    pub fn set_text_size(&mut self, id: LayerId, size_px: f32) -> bool {
        if !size_px.is_finite() || size_px <= 0.0 {
            return false;
        }
        self.edit_text(id, |t| t.size_px = size_px)
    }

    fn edit_text(&mut self, id: LayerId, f: impl FnOnce(&mut TextStyle)) -> bool {
        self.store
            .find_mut(id)
            .and_then(|l| l.text_style_mut())
            .map(f)
            .is_some()
    }

    /// Start or resume a timer at clock reading `now`.
    pub fn start_timer(&mut self, id: LayerId, now: Duration) -> bool {
        self.store
            .find_mut(id)
            .and_then(|l| l.timer_mut())
            .is_some_and(|t| t.start(now))
    }

    /// Pause a timer, banking its elapsed time.
    pub fn stop_timer(&mut self, id: LayerId, now: Duration) -> bool {
        self.store
            .find_mut(id)
            .and_then(|l| l.timer_mut())
            .is_some_and(|t| t.stop(now))
    }

    /// Reset a timer to its initial, stopped state.
    pub fn reset_timer(&mut self, id: LayerId) -> bool {
        self.store
            .find_mut(id)
            .and_then(|l| l.timer_mut())
            .map(|t| t.reset())
            .is_some()
    }

    /// Selected layer, if it still exists.
    pub fn selected(&self) -> Option<LayerId> {
        self.selection.resolve(&self.store)
    }

    /// Select a layer programmatically (e.g. from a layer list).
    pub fn select(&mut self, id: LayerId) -> bool {
        self.selection.select(&self.store, id)
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Hit-test a surface-logical point.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        hit_test(&self.store, point, self.opts.handle_size)
    }

    /// Current drag state.
    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    /// Pointer pressed at a surface-logical point.
    pub fn pointer_down(&mut self, point: Point) -> Option<Hit> {
        self.drag.pointer_down(
            &self.store,
            &mut self.selection,
            point,
            self.opts.handle_size,
        )
    }

    /// Pointer moved. Returns the edited geometry when a drag applied a delta.
    pub fn pointer_move(&mut self, point: Point) -> Option<Geometry> {
        self.drag
            .pointer_move(&mut self.store, point, self.opts.min_size)
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) -> bool {
        self.drag.pointer_up()
    }

    /// Pointer cancelled or left the surface.
    pub fn pointer_cancel(&mut self) -> bool {
        self.drag.cancel()
    }

    /// Composite the current state into `target`. `now` drives timer layers.
    pub fn render_frame<T: PaintTarget + ?Sized>(
        &self,
        target: &mut T,
        now: Duration,
    ) -> MixdeckResult<FrameStats> {
        self.compositor.render_frame(
            target,
            self.opts.canvas,
            &self.store,
            self.selected(),
            now,
        )
    }

    /// Change the logical output resolution, optionally rescaling existing layers.
    pub fn set_resolution(&mut self, canvas: Canvas, policy: RescalePolicy) -> MixdeckResult<()> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(MixdeckError::validation("canvas must be non-empty"));
        }
        let old = self.opts.canvas;
        if policy == RescalePolicy::Scale && old != canvas {
            let sx = f64::from(canvas.width) / f64::from(old.width);
            let sy = f64::from(canvas.height) / f64::from(old.height);
            for layer in self.store.iter_mut() {
                let g = layer.geometry().scaled(sx, sy);
                layer.set_geometry(g);
            }
        }
        self.opts.canvas = canvas;
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            ?policy,
            "resolution changed"
        );
        Ok(())
    }

    /// Snapshot every layer under `name`, replacing any earlier scene of that name.
    ///
    /// Blank names are ignored. Returns the number of layers captured.
    pub fn save_scene(&mut self, name: &str) -> Option<usize> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let entries: Vec<SceneEntry> = self
            .store
            .iter()
            .map(|l| SceneEntry {
                id: l.id(),
                visible: l.is_visible(),
                opacity: l.opacity(),
                geometry: l.geometry(),
            })
            .collect();
        let n = entries.len();
        self.scenes.insert(name.to_owned(), entries);
        Some(n)
    }

    /// Re-apply a saved scene to the layers that still exist. Returns how many were updated.
    pub fn recall_scene(&mut self, name: &str) -> Option<usize> {
        let entries = self.scenes.get(name.trim())?;
        let mut applied = 0;
        for e in entries {
            if let Some(layer) = self.store.find_mut(e.id) {
                layer.set_visible(e.visible);
                layer.set_opacity(e.opacity);
                layer.set_geometry(e.geometry);
                applied += 1;
            }
        }
        tracing::debug!(scene = name, applied, "scene recalled");
        Some(applied)
    }

    /// Saved scene entries.
    pub fn scene(&self, name: &str) -> Option<&[SceneEntry]> {
        self.scenes.get(name.trim()).map(Vec::as_slice)
    }

    /// Forget a scene.
    pub fn remove_scene(&mut self, name: &str) -> bool {
        self.scenes.remove(name.trim()).is_some()
    }

    /// Scene names in sorted order.
    pub fn scene_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.scenes.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../tests/unit/studio.rs"]
mod tests;
