use crate::foundation::core::Point;
use crate::foundation::ids::LayerId;
use crate::geometry::transform::CoordinateTransform;
use crate::interaction::handles::{ResizeHandle, handles_for, hit_handle};
use crate::layers::store::LayerStore;
use crate::render::paint::hit_test;

/// What a pointer press landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTarget {
    /// A resize handle of the selected layer.
    Handle(LayerId, ResizeHandle),
    /// The body of a layer.
    Body(LayerId),
    /// Empty canvas.
    Canvas,
}

/// Resolve a press. Handles of the selected (visible) layer win over any layer body.
pub fn resolve_pointer_target(
    store: &LayerStore,
    transform: &CoordinateTransform,
    point: Point,
    handle_radius: f64,
) -> PointerTarget {
    if let Some(sel) = store.selection() {
        let visible = store.order().get(sel.id).is_some_and(|e| e.visible);
        if visible && let Some(layer) = store.get(sel.id) {
            let rect = layer.display_rect(transform);
            if let Some(h) = hit_handle(handles_for(sel.kind), rect, point, handle_radius) {
                return PointerTarget::Handle(sel.id, h);
            }
        }
    }
    match hit_test(store, transform, point) {
        Some(id) => PointerTarget::Body(id),
        None => PointerTarget::Canvas,
    }
}
