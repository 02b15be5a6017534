use crate::foundation::core::{Point, Rect};
use crate::foundation::ids::LayerId;
use crate::geometry::transform::CoordinateTransform;
use crate::layers::model::Layer;
use crate::layers::store::LayerStore;

/// One visible layer as the renderer draws it.
#[derive(Clone, Copy, Debug)]
pub struct PaintItem<'a> {
    pub layer: &'a Layer,
    /// Display-pixel extent.
    pub rect: Rect,
    /// 1-based paint position; unique across the scene.
    pub z_index: usize,
    pub selected: bool,
}

impl PaintItem<'_> {
    pub fn id(&self) -> LayerId {
        self.layer.id()
    }
}

/// Visible layers back to front, with display-space geometry.
pub fn paint_list<'a>(store: &'a LayerStore, transform: &CoordinateTransform) -> Vec<PaintItem<'a>> {
    let selected = store.selection().map(|s| s.id);
    store
        .painted()
        .enumerate()
        .filter(|(_, (entry, _))| entry.visible)
        .map(|(i, (entry, layer))| PaintItem {
            layer,
            rect: layer.display_rect(transform),
            z_index: i + 1,
            selected: selected == Some(entry.id),
        })
        .collect()
}

/// Topmost visible layer whose display extent contains `point`.
pub fn hit_test(store: &LayerStore, transform: &CoordinateTransform, point: Point) -> Option<LayerId> {
    store
        .painted()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .find(|(entry, layer)| entry.visible && layer.display_rect(transform).contains(point))
        .map(|(entry, _)| entry.id)
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
