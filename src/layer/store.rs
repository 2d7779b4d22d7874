use std::collections::HashMap;

use crate::foundation::core::Canvas;
use crate::foundation::error::MixdeckResult;
use crate::layer::model::{Layer, LayerId, LayerSpec};

/// Where a new layer lands in paint order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InsertAt {
    /// Above every existing layer.
    #[default]
    Top,
    /// Below every existing layer (backgrounds).
    Bottom,
    /// At a back-to-front index, clamped to the current length.
    Index(usize),
}

/// Ordered collection of layers keyed by id.
///
/// `order` is the single source of truth for z-order: index 0 is painted first (bottom), the last
/// entry is painted last and wins hit-tests. Ids are allocated here and never reused.
#[derive(Debug, Default)]
pub struct LayerStore {
    layers: HashMap<LayerId, Layer>,
    order: Vec<LayerId>,
    next_id: u64,
}

impl LayerStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `spec`, assign an id and insert at `at`.
    ///
    /// `canvas` is only used to resolve default geometry when the spec carries none.
    pub fn insert(&mut self, spec: LayerSpec, at: InsertAt, canvas: Canvas) -> MixdeckResult<LayerId> {
        spec.validate()?;
        let geometry = match spec.geometry {
            Some(g) => g,
            None => spec.kind.default_geometry(canvas, spec.natural_size()),
        };

        self.next_id += 1;
        let id = LayerId(self.next_id);
        let layer = Layer::from_spec(id, spec, geometry);

        let idx = match at {
            InsertAt::Top => self.order.len(),
            InsertAt::Bottom => 0,
            InsertAt::Index(i) => i.min(self.order.len()),
        };
        self.order.insert(idx, id);
        self.layers.insert(id, layer);
        Ok(id)
    }

    /// Remove a layer and synchronously release its binding.
    ///
    /// Unknown ids are a no-op and return `false`.
    pub fn remove(&mut self, id: LayerId) -> bool {
        let Some(mut layer) = self.layers.remove(&id) else {
            return false;
        };
        self.order.retain(|x| *x != id);
        layer.release_source();
        true
    }

    /// Remove every layer, releasing each binding bottom to top. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let ids = std::mem::take(&mut self.order);
        let n = ids.len();
        for id in ids {
            if let Some(mut layer) = self.layers.remove(&id) {
                layer.release_source();
            }
        }
        n
    }

    /// Raise a layer by up to `steps` positions. Returns `true` if its position changed.
    pub fn move_toward_top(&mut self, id: LayerId, steps: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let to = from.saturating_add(steps).min(self.order.len() - 1);
        self.relocate(from, to)
    }

    /// Lower a layer by up to `steps` positions. Returns `true` if its position changed.
    pub fn move_toward_bottom(&mut self, id: LayerId, steps: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        self.relocate(from, from.saturating_sub(steps))
    }

    fn relocate(&mut self, from: usize, to: usize) -> bool {
        if from == to {
            return false;
        }
        let id = self.order.remove(from);
        self.order.insert(to, id);
        true
    }

    /// Look up a layer.
    pub fn find(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub(crate) fn find_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    /// Whether `id` names a live layer.
    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Back-to-front index of a layer.
    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.order.iter().position(|x| *x == id)
    }

    /// Visit every layer in paint order (bottom first).
    pub fn for_each_back_to_front(&self, mut visitor: impl FnMut(&Layer)) {
        for layer in self.iter() {
            visitor(layer);
        }
    }

    /// Layers in paint order (bottom first). Reverse it for topmost-first traversal.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> + '_ {
        self.order.iter().filter_map(|id| self.layers.get(id))
    }

    /// Ids in paint order.
    pub fn ids(&self) -> &[LayerId] {
        &self.order
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> + '_ {
        self.layers.values_mut()
    }

    /// Number of live layers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/store.rs"]
mod tests;
