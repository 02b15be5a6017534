use crate::foundation::core::{PercentRect, Rect, rect_xywh};
use crate::geometry::transform::{CoordinateTransform, safe_div};

/// Default threshold separating normalized (`0..1`) boxes from absolute pixel boxes.
///
/// Slightly above `1.0` to tolerate floating overshoot in producers of normalized boxes.
pub const NORMALIZED_BOX_THRESHOLD: f64 = 1.05;

/// Bounding box as it appears in a frame document, in an unknown coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Coordinate space a [`BoundingBox`] was resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxSpace {
    /// Fractions of the canvas, `0..1`.
    Normalized,
    /// Natural pixels of the canvas.
    Absolute,
}

/// Result of classifying a [`BoundingBox`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxInterpretation {
    pub space: BoxSpace,
    /// The largest component fell in `(1.0, threshold]`: classified as normalized only because of
    /// the overshoot tolerance.
    pub ambiguous: bool,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Largest absolute component; non-finite components count as infinitely large.
    pub fn max_abs_component(&self) -> f64 {
        [self.x, self.y, self.width, self.height]
            .iter()
            .map(|v| if v.is_finite() { v.abs() } else { f64::INFINITY })
            .fold(0.0, f64::max)
    }

    /// Decide whether the box is normalized or absolute.
    ///
    /// Best effort: an absolute box whose every component is at most `threshold` pixels is
    /// indistinguishable from a normalized one and is read as normalized.
    pub fn classify(&self, threshold: f64) -> BoxInterpretation {
        let max = self.max_abs_component();
        if max <= threshold {
            BoxInterpretation {
                space: BoxSpace::Normalized,
                ambiguous: max > 1.0,
            }
        } else {
            BoxInterpretation {
                space: BoxSpace::Absolute,
                ambiguous: false,
            }
        }
    }
}

impl CoordinateTransform {
    /// Resolve a document box to natural pixels of the canvas.
    pub fn box_to_natural(&self, bb: BoundingBox, threshold: f64) -> (Rect, BoxInterpretation) {
        let interp = bb.classify(threshold);
        note_ambiguous(&bb, interp);
        let rect = match interp.space {
            BoxSpace::Normalized => {
                let n = self.natural_size();
                rect_xywh(
                    bb.x * n.width,
                    bb.y * n.height,
                    bb.width * n.width,
                    bb.height * n.height,
                )
            }
            BoxSpace::Absolute => rect_xywh(bb.x, bb.y, bb.width, bb.height),
        };
        (rect, interp)
    }

    /// Resolve a document box to percent of canvas (clamped).
    pub fn box_to_percent(
        &self,
        bb: BoundingBox,
        threshold: f64,
    ) -> (PercentRect, BoxInterpretation) {
        let interp = bb.classify(threshold);
        note_ambiguous(&bb, interp);
        let pr = match interp.space {
            BoxSpace::Normalized => {
                PercentRect::new(bb.x * 100.0, bb.y * 100.0, bb.width * 100.0, bb.height * 100.0)
            }
            BoxSpace::Absolute => {
                self.natural_rect_to_percent(rect_xywh(bb.x, bb.y, bb.width, bb.height))
            }
        };
        (pr, interp)
    }

    /// Normalized document box for a natural-pixel rectangle.
    pub fn natural_to_box(&self, r: Rect) -> BoundingBox {
        let n = self.natural_size();
        BoundingBox::new(
            safe_div(r.x0, n.width),
            safe_div(r.y0, n.height),
            safe_div(r.width(), n.width),
            safe_div(r.height(), n.height),
        )
    }

    /// Document box for a natural-pixel rectangle that reads back to the same rectangle.
    ///
    /// Normalized while every component stays within `[-1, 1]`; a frame reaching past that (off
    /// the canvas or larger than it) is written in absolute pixels, which any threshold `>= 1`
    /// classifies as absolute.
    pub fn natural_to_document_box(&self, r: Rect) -> BoundingBox {
        let normalized = self.natural_to_box(r);
        if normalized.max_abs_component() <= 1.0 {
            return normalized;
        }
        tracing::debug!(
            x = r.x0,
            y = r.y0,
            width = r.width(),
            height = r.height(),
            "frame exceeds the canvas; exporting an absolute pixel box"
        );
        BoundingBox::new(r.x0, r.y0, r.width(), r.height())
    }
}

impl From<PercentRect> for BoundingBox {
    /// Normalized box for a percent rectangle.
    fn from(r: PercentRect) -> Self {
        BoundingBox::new(r.x / 100.0, r.y / 100.0, r.width / 100.0, r.height / 100.0)
    }
}

fn note_ambiguous(bb: &BoundingBox, interp: BoxInterpretation) {
    if interp.ambiguous {
        tracing::warn!(
            x = bb.x,
            y = bb.y,
            width = bb.width,
            height = bb.height,
            "bounding box read as normalized inside the overshoot tolerance; it may be a tiny pixel box"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/bbox.rs"]
mod tests;
