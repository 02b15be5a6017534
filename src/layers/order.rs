use crate::foundation::ids::LayerId;
use crate::layers::model::LayerKind;

/// One paint-order slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderEntry {
    pub kind: LayerKind,
    pub id: LayerId,
    pub visible: bool,
}

/// Reorder request for a single entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reorder {
    /// One step toward the front.
    Up,
    /// One step toward the back.
    Down,
    ToTop,
    ToBottom,
}

/// Unified paint order across all layer kinds.
///
/// Index `0` is painted first (backmost); the last entry is frontmost. Each live layer id appears
/// exactly once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerOrder {
    entries: Vec<OrderEntry>,
}

impl LayerOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries back to front.
    pub fn entries(&self) -> &[OrderEntry] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn get(&self, id: LayerId) -> Option<&OrderEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// 1-based paint index as exported downstream.
    pub fn z_index(&self, id: LayerId) -> Option<usize> {
        self.position(id).map(|i| i + 1)
    }

    /// Append a visible entry at the front. Existing ids are left where they are.
    pub(crate) fn push(&mut self, kind: LayerKind, id: LayerId) -> bool {
        if self.position(id).is_some() {
            return false;
        }
        self.entries.push(OrderEntry {
            kind,
            id,
            visible: true,
        });
        true
    }

    pub(crate) fn remove(&mut self, id: LayerId) -> Option<OrderEntry> {
        let idx = self.position(id)?;
        Some(self.entries.remove(idx))
    }

    /// Move one entry. Returns `false` when the id is unknown or already at the requested end.
    pub(crate) fn reorder(&mut self, id: LayerId, op: Reorder) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let last = self.entries.len() - 1;
        match op {
            Reorder::Up => {
                if idx == last {
                    return false;
                }
                self.entries.swap(idx, idx + 1);
            }
            Reorder::Down => {
                if idx == 0 {
                    return false;
                }
                self.entries.swap(idx, idx - 1);
            }
            Reorder::ToTop => {
                if idx == last {
                    return false;
                }
                let e = self.entries.remove(idx);
                self.entries.push(e);
            }
            Reorder::ToBottom => {
                if idx == 0 {
                    return false;
                }
                let e = self.entries.remove(idx);
                self.entries.insert(0, e);
            }
        }
        true
    }

    pub(crate) fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(e) => {
                e.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Bring the order in line with the live layer set.
    ///
    /// Entries whose id is no longer live are dropped, surviving entries keep their relative
    /// order, and live ids without an entry are appended at the front in the given order.
    pub(crate) fn resync<I>(&mut self, live: I)
    where
        I: IntoIterator<Item = (LayerKind, LayerId)>,
    {
        let live: Vec<(LayerKind, LayerId)> = live.into_iter().collect();
        self.entries
            .retain(|e| live.iter().any(|(kind, id)| *id == e.id && *kind == e.kind));
        for (kind, id) in live {
            self.push(kind, id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/order.rs"]
mod tests;
