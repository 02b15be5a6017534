use std::collections::BTreeMap;

use crate::foundation::core::Vec2;
use crate::foundation::error::{LayerframeError, LayerframeResult};
use crate::foundation::ids::{LayerId, LayerIdGen};
use crate::layers::model::{Layer, LayerFrame, LayerKind, MoveDelta};
use crate::layers::order::{LayerOrder, OrderEntry, Reorder};
use crate::layers::patch::LayerPatch;

/// The single active layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub kind: LayerKind,
    pub id: LayerId,
}

/// Restorable copy of the store's scene: every layer, the paint order and the selection.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSnapshot {
    pub layers: Vec<Layer>,
    pub order: LayerOrder,
    pub selection: Option<LayerId>,
}

/// Authoritative owner of all layers and their paint order.
///
/// Every mutation goes through a method on this type, which keeps three invariants: each live
/// layer has exactly one [`LayerOrder`] entry, text geometry stays within `[0, 100]` percent, and
/// the selection (if any) names a live layer.
#[derive(Clone, Debug, Default)]
pub struct LayerStore {
    layers: BTreeMap<LayerId, Layer>,
    order: LayerOrder,
    selection: Option<LayerId>,
    ids: LayerIdGen,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store issuing ids from `ids` (e.g. [`LayerIdGen::starting_at`] in tests).
    pub fn with_id_gen(ids: LayerIdGen) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    /// Empty store continuing this store's id sequence.
    pub(crate) fn fresh(&self) -> Self {
        Self::with_id_gen(self.ids.clone())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Look up a layer or fail with a validation error naming the id.
    pub fn require(&self, id: LayerId) -> LayerframeResult<&Layer> {
        self.layers
            .get(&id)
            .ok_or_else(|| LayerframeError::validation(format!("unknown layer id {id}")))
    }

    /// Layers in id (creation) order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.values()
    }

    pub fn order(&self) -> &LayerOrder {
        &self.order
    }

    /// Layers back to front with their order entry.
    pub fn painted(&self) -> impl Iterator<Item = (OrderEntry, &Layer)> + '_ {
        self.order
            .entries()
            .iter()
            .filter_map(|e| self.layers.get(&e.id).map(|l| (*e, l)))
    }

    pub fn selection(&self) -> Option<Selection> {
        let id = self.selection?;
        let layer = self.layers.get(&id)?;
        Some(Selection {
            kind: layer.kind(),
            id,
        })
    }

    /// Add a layer under a freshly issued id and place it frontmost.
    pub fn add_layer(&mut self, layer: impl Into<Layer>) -> LayerId {
        let mut layer = layer.into();
        let id = self.ids.next_id();
        layer.set_id(id);
        self.insert(layer);
        id
    }

    fn insert(&mut self, layer: Layer) {
        let (kind, id) = (layer.kind(), layer.id());
        self.layers.insert(id, layer);
        self.order.push(kind, id);
    }

    /// Apply a partial update. The layer is left untouched when the patch is rejected.
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> LayerframeResult<()> {
        let mut next = self.require(id)?.clone();
        next.apply_patch(patch)?;
        self.layers.insert(id, next);
        Ok(())
    }

    /// Mutate a layer directly, bypassing patch validation. Callers must keep its id and kind.
    pub(crate) fn modify_in_place(&mut self, id: LayerId, f: impl FnOnce(&mut Layer)) -> bool {
        match self.layers.get_mut(&id) {
            Some(layer) => {
                f(layer);
                true
            }
            None => false,
        }
    }

    /// Replace a layer's geometry in its native space.
    pub fn set_frame(&mut self, id: LayerId, frame: LayerFrame) -> LayerframeResult<()> {
        let layer = self
            .layers
            .get_mut(&id)
            .ok_or_else(|| LayerframeError::validation(format!("unknown layer id {id}")))?;
        if !layer.set_frame(frame) {
            return Err(LayerframeError::validation(format!(
                "frame space does not match {:?} layer {id}",
                layer.kind()
            )));
        }
        Ok(())
    }

    /// Remove the layer and its order entry; clears the selection if it pointed at it.
    pub fn remove_layer(&mut self, id: LayerId) -> LayerframeResult<Layer> {
        let layer = self
            .layers
            .remove(&id)
            .ok_or_else(|| LayerframeError::validation(format!("unknown layer id {id}")))?;
        self.order.remove(id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        Ok(layer)
    }

    /// Move one order entry. `Ok(false)` when it was already at the requested end.
    pub fn reorder(&mut self, id: LayerId, op: Reorder) -> LayerframeResult<bool> {
        self.require(id)?;
        Ok(self.order.reorder(id, op))
    }

    pub fn set_visibility(&mut self, id: LayerId, visible: bool) -> LayerframeResult<()> {
        self.require(id)?;
        self.order.set_visible(id, visible);
        Ok(())
    }

    /// Select one layer (clearing any other selection) or clear with `None`.
    pub fn select_layer(&mut self, id: Option<LayerId>) -> LayerframeResult<()> {
        if let Some(id) = id {
            self.require(id)?;
        }
        self.selection = id;
        Ok(())
    }

    /// Ids moved together with `id`: itself first, then other layers of its group.
    pub fn group_members(&self, id: LayerId) -> LayerframeResult<Vec<LayerId>> {
        let layer = self.require(id)?;
        let mut out = vec![id];
        if let Some(group) = layer.group_id() {
            out.extend(
                self.layers
                    .values()
                    .filter(|l| l.id() != id && l.group_id() == Some(group))
                    .map(Layer::id),
            );
        }
        Ok(out)
    }

    /// Current frames of `id` and its group, used as the fixed origin of a move gesture.
    pub fn move_origins(&self, id: LayerId) -> LayerframeResult<Vec<(LayerId, LayerFrame)>> {
        let members = self.group_members(id)?;
        Ok(members
            .into_iter()
            .filter_map(|m| self.layers.get(&m).map(|l| (m, l.frame())))
            .collect())
    }

    /// Place every origin at `origin + delta`, each clamped independently.
    ///
    /// Origins whose layer has since been removed are skipped.
    pub fn translate_from(&mut self, origins: &[(LayerId, LayerFrame)], delta: MoveDelta) {
        for (id, origin) in origins {
            if let Some(layer) = self.layers.get_mut(id) {
                layer.set_frame(origin.translated(delta));
            }
        }
    }

    /// Move a layer (and its group) by `delta`.
    pub fn move_layer(&mut self, id: LayerId, delta: MoveDelta) -> LayerframeResult<()> {
        let origins = self.move_origins(id)?;
        self.translate_from(&origins, delta);
        Ok(())
    }

    /// Translate every natural-pixel layer (shapes, overlays) by `delta`, unclamped.
    pub fn shift_pixel_layers(&mut self, delta: Vec2) {
        let delta = MoveDelta::Natural(delta);
        for layer in self.layers.values_mut() {
            if layer.kind() != LayerKind::Text {
                let frame = layer.frame().translated(delta);
                layer.set_frame(frame);
            }
        }
    }

    /// Copy a layer under a new id, offset by `offset` and placed frontmost.
    pub fn duplicate(&mut self, id: LayerId, offset: MoveDelta) -> LayerframeResult<LayerId> {
        let mut copy = self.require(id)?.clone();
        let frame = copy.frame().translated(offset);
        copy.set_frame(frame);
        Ok(self.add_layer(copy))
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            layers: self.layers.values().cloned().collect(),
            order: self.order.clone(),
            selection: self.selection,
        }
    }

    /// Replace the scene with `snapshot`. The order is resynchronized against the restored
    /// layers so a stale snapshot can never break the one-entry-per-layer invariant.
    pub fn restore(&mut self, snapshot: &SceneSnapshot) {
        self.layers = snapshot
            .layers
            .iter()
            .map(|l| (l.id(), l.clone()))
            .collect();
        for id in self.layers.keys() {
            self.ids.observe(*id);
        }
        self.order = snapshot.order.clone();
        self.order
            .resync(self.layers.values().map(|l| (l.kind(), l.id())));
        self.selection = snapshot.selection.filter(|id| self.layers.contains_key(id));
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.order = LayerOrder::new();
        self.selection = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/store.rs"]
mod tests;
