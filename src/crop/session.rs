use crate::foundation::core::{Point, Rect, Size, finite_or, rect_xywh};
use crate::foundation::ids::LayerId;
use crate::interaction::handles::{ResizeHandle, hit_handle};

/// What a crop session cuts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropTarget {
    BaseImage,
    /// An overlay layer's image.
    Overlay(LayerId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropShape {
    /// Free rectangle.
    #[default]
    Square,
    /// Inscribed circle of a square box.
    Circle,
}

/// How the crop box is being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropDragMode {
    Move,
    Resize(ResizeHandle),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CropDrag {
    mode: CropDragMode,
    origin: Point,
    start_rect: Rect,
}

/// Transient crop state, in display pixels. Exists only between start and apply/cancel.
#[derive(Clone, Debug, PartialEq)]
pub struct CropSession {
    target: CropTarget,
    bounds: Rect,
    rect: Rect,
    shape: CropShape,
    min_size: f64,
    drag: Option<CropDrag>,
}

impl CropSession {
    /// Start a session over `bounds` with an initial `seed` rectangle.
    pub fn new(target: CropTarget, bounds: Rect, seed: Rect, min_size: f64) -> Self {
        let bounds = sanitize_bounds(bounds);
        let min_size = if min_size.is_finite() {
            min_size.max(0.0)
        } else {
            0.0
        };
        let mut session = Self {
            target,
            bounds,
            rect: bounds,
            shape: CropShape::Square,
            min_size,
            drag: None,
        };
        session.update_crop_rect(seed, None);
        session
    }

    /// Base-image session seeded with a centered box spanning `fraction` of each side.
    pub fn for_base_image(image_bounds: Rect, fraction: f64, min_size: f64) -> Self {
        let b = sanitize_bounds(image_bounds);
        let f = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let (w, h) = (b.width() * f, b.height() * f);
        let seed = rect_xywh(
            b.x0 + (b.width() - w) * 0.5,
            b.y0 + (b.height() - h) * 0.5,
            w,
            h,
        );
        Self::new(CropTarget::BaseImage, b, seed, min_size)
    }

    /// Overlay session seeded with the layer's full display extent.
    pub fn for_overlay(id: LayerId, layer_display_rect: Rect, min_size: f64) -> Self {
        Self::new(
            CropTarget::Overlay(id),
            layer_display_rect,
            layer_display_rect,
            min_size,
        )
    }

    pub fn target(&self) -> CropTarget {
        self.target
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn shape(&self) -> CropShape {
        self.shape
    }

    pub fn drag_mode(&self) -> Option<CropDragMode> {
        self.drag.map(|d| d.mode)
    }

    /// Switch shape. Entering `Circle` re-derives the largest inscribed square around the center
    /// (or around the anchored edges while a drag is in progress).
    pub fn set_shape(&mut self, shape: CropShape) {
        self.shape = shape;
        let mode = self.drag_mode();
        self.update_crop_rect(self.rect, mode);
    }

    /// Clamp `candidate` into the target bounds and apply the shape constraint.
    ///
    /// The result is always inside [`Self::bounds`] and at least `min_size` on each side (or the
    /// whole bound when the bound itself is smaller).
    pub fn update_crop_rect(&mut self, candidate: Rect, mode: Option<CropDragMode>) -> Rect {
        let clamped = clamp_to_bounds(candidate, self.bounds, self.min_size, mode);
        self.rect = match self.shape {
            CropShape::Square => clamped,
            CropShape::Circle => shift_inside(inscribed_square(clamped, mode), self.bounds),
        };
        self.rect
    }

    /// Which part of the crop box is under `point`, if any.
    pub fn hit(&self, point: Point, handle_radius: f64) -> Option<CropDragMode> {
        if let Some(h) = hit_handle(&ResizeHandle::ALL, self.rect, point, handle_radius) {
            return Some(CropDragMode::Resize(h));
        }
        self.rect.contains(point).then_some(CropDragMode::Move)
    }

    pub fn begin_drag(&mut self, mode: CropDragMode, origin: Point) {
        self.drag = Some(CropDrag {
            mode,
            origin,
            start_rect: self.rect,
        });
    }

    /// Follow the pointer during a drag. No-op without an active drag.
    pub fn drag_to(&mut self, point: Point) -> Rect {
        let Some(drag) = self.drag else {
            return self.rect;
        };
        let delta = point - drag.origin;
        let candidate = match drag.mode {
            CropDragMode::Move => drag.start_rect + delta,
            CropDragMode::Resize(h) => {
                // Min size and bounds are enforced by `update_crop_rect`.
                h.apply(drag.start_rect, delta, Size::ZERO, None)
            }
        };
        self.update_crop_rect(candidate, Some(drag.mode))
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}

fn sanitize_bounds(b: Rect) -> Rect {
    Rect::new(
        finite_or(b.x0, 0.0),
        finite_or(b.y0, 0.0),
        finite_or(b.x1, 0.0),
        finite_or(b.y1, 0.0),
    )
    .abs()
}

/// Clamp a candidate rectangle into `bounds`.
///
/// Moves (and mode-less updates) keep the candidate's size and slide it inside. Resizes clamp each
/// edge independently and, when the box gets too small, push the dragged edge back out.
pub(crate) fn clamp_to_bounds(
    candidate: Rect,
    bounds: Rect,
    min_size: f64,
    mode: Option<CropDragMode>,
) -> Rect {
    let min_w = min_size.min(bounds.width());
    let min_h = min_size.min(bounds.height());
    let c = Rect::new(
        finite_or(candidate.x0, bounds.x0),
        finite_or(candidate.y0, bounds.y0),
        finite_or(candidate.x1, bounds.x1),
        finite_or(candidate.y1, bounds.y1),
    )
    .abs();

    match mode {
        None | Some(CropDragMode::Move) => {
            let w = c.width().clamp(min_w, bounds.width());
            let h = c.height().clamp(min_h, bounds.height());
            let x = c.x0.clamp(bounds.x0, bounds.x1 - w);
            let y = c.y0.clamp(bounds.y0, bounds.y1 - h);
            rect_xywh(x, y, w, h)
        }
        Some(CropDragMode::Resize(handle)) => {
            let (x0, x1) = clamp_span(
                c.x0,
                c.x1,
                bounds.x0,
                bounds.x1,
                min_w,
                handle.moves_left(),
            );
            let (y0, y1) = clamp_span(
                c.y0,
                c.y1,
                bounds.y0,
                bounds.y1,
                min_h,
                handle.moves_top(),
            );
            Rect::new(x0, y0, x1, y1)
        }
    }
}

fn clamp_span(a: f64, b: f64, lo: f64, hi: f64, min: f64, low_edge_dragged: bool) -> (f64, f64) {
    let mut a = a.clamp(lo, hi);
    let mut b = b.clamp(lo, hi);
    if b - a < min {
        if low_edge_dragged {
            a = b - min;
        } else {
            b = a + min;
        }
        if a < lo {
            a = lo;
            b = lo + min;
        }
        if b > hi {
            b = hi;
            a = hi - min;
        }
    }
    (a, b)
}

/// Largest square inside `r`, anchored per drag mode.
///
/// Whole-box moves (and no drag) keep the center; a dragged edge keeps its opposite edge fixed
/// and centers the other axis; a dragged corner keeps the opposite corner fixed.
pub(crate) fn inscribed_square(r: Rect, mode: Option<CropDragMode>) -> Rect {
    let side = r.width().min(r.height());
    let center = r.center();
    let (left_dragged, right_dragged, top_dragged, bottom_dragged) = match mode {
        Some(CropDragMode::Resize(h)) => (
            h.moves_left(),
            h.moves_right(),
            h.moves_top(),
            h.moves_bottom(),
        ),
        None | Some(CropDragMode::Move) => (false, false, false, false),
    };

    let x0 = if left_dragged {
        r.x1 - side
    } else if right_dragged {
        r.x0
    } else {
        center.x - side * 0.5
    };
    let y0 = if top_dragged {
        r.y1 - side
    } else if bottom_dragged {
        r.y0
    } else {
        center.y - side * 0.5
    };
    rect_xywh(x0, y0, side, side)
}

/// Translate `r` into `bounds` without resizing (assumes it fits).
fn shift_inside(r: Rect, bounds: Rect) -> Rect {
    let w = r.width().min(bounds.width());
    let h = r.height().min(bounds.height());
    let x = r.x0.clamp(bounds.x0, bounds.x1 - w);
    let y = r.y0.clamp(bounds.y0, bounds.y1 - h);
    rect_xywh(x, y, w, h)
}

#[cfg(test)]
#[path = "../../tests/unit/crop/session.rs"]
mod tests;
