use crate::foundation::core::{Point, Vec2};
use crate::interact::hit::{Hit, HitRegion, hit_test};
use crate::layer::model::{Geometry, LayerId};
use crate::layer::store::LayerStore;

/// Smallest width/height a resize drag can produce.
pub const MIN_LAYER_SIZE: f64 = 50.0;

/// Current selection, held by id and re-resolved against the store on every read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    id: Option<LayerId>,
}

impl Selection {
    /// Nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id` if it names a live layer. Returns whether the selection was set.
    pub fn select(&mut self, store: &LayerStore, id: LayerId) -> bool {
        if !store.contains(id) {
            return false;
        }
        self.id = Some(id);
        true
    }

    /// Drop the selection.
    pub fn clear(&mut self) {
        self.id = None;
    }

    /// Selected layer, if it still exists.
    pub fn resolve(&self, store: &LayerStore) -> Option<LayerId> {
        self.id.filter(|id| store.contains(*id))
    }

    /// Forget `id` if it is the selected layer. Called when a layer is removed.
    pub fn forget(&mut self, id: LayerId) {
        if self.id == Some(id) {
            self.id = None;
        }
    }
}

/// What a drag session does to its layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    /// Pointer deltas move `(x, y)`.
    Move,
    /// Pointer deltas grow `(w, h)`, floored at the minimum size.
    Resize,
}

/// Drag state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    /// No session.
    #[default]
    Idle,
    /// One active session.
    Dragging {
        /// Layer being edited.
        layer: LayerId,
        /// Move or resize.
        mode: DragMode,
        /// Pointer position the next delta is measured from.
        last: Point,
    },
}

/// Turns a single pointer stream into geometry edits.
#[derive(Clone, Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    /// An idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether a session is active.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Layer targeted by the active session.
    pub fn target(&self) -> Option<LayerId> {
        match self.state {
            DragState::Dragging { layer, .. } => Some(layer),
            DragState::Idle => None,
        }
    }

    /// Hit-test `point`; on a hit select the layer and start a session, on a miss clear the
    /// selection and stay idle. Any previous session is discarded.
    pub fn pointer_down(
        &mut self,
        store: &LayerStore,
        selection: &mut Selection,
        point: Point,
        handle_size: f64,
    ) -> Option<Hit> {
        self.state = DragState::Idle;
        if !point.is_finite() {
            selection.clear();
            return None;
        }
        let Some(hit) = hit_test(store, point, handle_size) else {
            selection.clear();
            return None;
        };

        selection.select(store, hit.layer);
        let mode = match hit.region {
            HitRegion::ResizeHandle => DragMode::Resize,
            HitRegion::Body => DragMode::Move,
        };
        tracing::debug!(layer = %hit.layer, ?mode, "drag begin");
        self.state = DragState::Dragging {
            layer: hit.layer,
            mode,
            last: point,
        };
        Some(hit)
    }

    /// Apply the delta since the last pointer position. Returns the new geometry when an edit
    /// happened.
    ///
    /// Ignored while idle. If the target layer no longer exists or was hidden the session is
    /// dropped.
    pub fn pointer_move(
        &mut self,
        store: &mut LayerStore,
        point: Point,
        min_size: f64,
    ) -> Option<Geometry> {
        let DragState::Dragging { layer, mode, last } = self.state else {
            return None;
        };
        let Some(target) = store.find_mut(layer) else {
            tracing::debug!(%layer, "drag target removed, ending session");
            self.state = DragState::Idle;
            return None;
        };
        if !target.is_visible() {
            tracing::debug!(%layer, "drag target hidden, ending session");
            self.state = DragState::Idle;
            return None;
        }
        if !point.is_finite() {
            return None;
        }

        let delta: Vec2 = point - last;
        self.state = DragState::Dragging {
            layer,
            mode,
            last: point,
        };
        if delta == Vec2::ZERO {
            return None;
        }

        let g = target.geometry();
        let next = match mode {
            DragMode::Move => g.translated(delta),
            DragMode::Resize => g.resized(delta, min_size),
        };
        target.set_geometry(next);
        Some(next)
    }

    /// End the session; the edited geometry persists. Returns whether a session was active.
    pub fn pointer_up(&mut self) -> bool {
        let was = self.is_dragging();
        if let DragState::Dragging { layer, .. } = self.state {
            tracing::debug!(%layer, "drag end");
        }
        self.state = DragState::Idle;
        was
    }

    /// Pointer cancel or leave. Same as [`DragController::pointer_up`].
    pub fn cancel(&mut self) -> bool {
        self.pointer_up()
    }

    /// Drop the session if it targets `id`.
    pub fn forget(&mut self, id: LayerId) {
        if self.target() == Some(id) {
            self.state = DragState::Idle;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/drag.rs"]
mod tests;
