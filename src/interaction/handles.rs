use crate::foundation::core::{Point, Rect, Size, Vec2, finite_or};
use crate::layers::model::LayerKind;

/// Compass-direction resize handle on a layer or crop box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    /// Corners first so they win hit tests against the adjacent edge handles.
    pub const ALL: [Self; 8] = [
        Self::NW,
        Self::NE,
        Self::SE,
        Self::SW,
        Self::N,
        Self::E,
        Self::S,
        Self::W,
    ];

    pub const CORNERS: [Self; 4] = [Self::NW, Self::NE, Self::SE, Self::SW];

    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }

    /// Only one edge moves.
    pub fn is_edge(self) -> bool {
        matches!(self, Self::N | Self::S | Self::E | Self::W)
    }

    /// Where the handle is drawn on `rect`.
    pub fn position(self, rect: Rect) -> Point {
        let x = if self.moves_left() {
            rect.x0
        } else if self.moves_right() {
            rect.x1
        } else {
            (rect.x0 + rect.x1) * 0.5
        };
        let y = if self.moves_top() {
            rect.y0
        } else if self.moves_bottom() {
            rect.y1
        } else {
            (rect.y0 + rect.y1) * 0.5
        };
        Point::new(x, y)
    }

    /// Resize `start` by dragging this handle `delta` display pixels.
    ///
    /// Only the edges the handle owns move. Each moved edge stops at `min_size` from its opposite
    /// edge and, when `bounds` is given, at the bounds.
    pub fn apply(self, start: Rect, delta: Vec2, min_size: Size, bounds: Option<Rect>) -> Rect {
        let dx = finite_or(delta.x, 0.0);
        let dy = finite_or(delta.y, 0.0);
        let Rect {
            mut x0,
            mut y0,
            mut x1,
            mut y1,
        } = start.abs();

        if self.moves_left() {
            x0 += dx;
            if let Some(b) = bounds {
                x0 = x0.max(b.x0);
            }
            x0 = x0.min(x1 - min_size.width);
        }
        if self.moves_right() {
            x1 += dx;
            if let Some(b) = bounds {
                x1 = x1.min(b.x1);
            }
            x1 = x1.max(x0 + min_size.width);
        }
        if self.moves_top() {
            y0 += dy;
            if let Some(b) = bounds {
                y0 = y0.max(b.y0);
            }
            y0 = y0.min(y1 - min_size.height);
        }
        if self.moves_bottom() {
            y1 += dy;
            if let Some(b) = bounds {
                y1 = y1.min(b.y1);
            }
            y1 = y1.max(y0 + min_size.height);
        }

        Rect::new(x0, y0, x1, y1)
    }
}

/// Handles a layer kind exposes.
pub fn handles_for(kind: LayerKind) -> &'static [ResizeHandle] {
    match kind {
        LayerKind::Text | LayerKind::Shape => &ResizeHandle::ALL,
        // Overlays scale from the corners only.
        LayerKind::Overlay => &ResizeHandle::CORNERS,
    }
}

/// First handle of `handles` within `radius` of `point`.
pub fn hit_handle(
    handles: &[ResizeHandle],
    rect: Rect,
    point: Point,
    radius: f64,
) -> Option<ResizeHandle> {
    handles
        .iter()
        .copied()
        .find(|h| h.position(rect).distance(point) <= radius)
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/handles.rs"]
mod tests;
