use crate::foundation::error::{LayerframeError, LayerframeResult};

pub use kurbo::{Point, Rect, Size, Vec2};

/// Upper bound of the percent-of-canvas coordinate space.
pub const PERCENT_MAX: f64 = 100.0;

/// Canvas axis selector for one-dimensional conversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Horizontal axis (widths, x positions).
    X,
    /// Vertical axis (heights, y positions).
    Y,
}

/// Clamp a percent value into `[0, 100]`.
///
/// Non-finite inputs collapse to `0`.
pub fn clamp_percent(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    v.clamp(0.0, PERCENT_MAX)
}

/// Rectangle in percent-of-canvas units, used by text layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PercentRect {
    /// Left edge, percent of canvas width.
    pub x: f64,
    /// Top edge, percent of canvas height.
    pub y: f64,
    /// Width, percent of canvas width.
    pub width: f64,
    /// Height, percent of canvas height.
    pub height: f64,
}

impl PercentRect {
    /// Build a rectangle with every component clamped into `[0, 100]`.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
        .clamped()
    }

    /// Build a rectangle, rejecting non-finite or negative extents instead of clamping.
    pub fn try_new(x: f64, y: f64, width: f64, height: f64) -> LayerframeResult<Self> {
        let all_finite = [x, y, width, height].iter().all(|v| v.is_finite());
        if !all_finite {
            return Err(LayerframeError::geometry(
                "percent rect components must be finite",
            ));
        }
        if width < 0.0 || height < 0.0 {
            return Err(LayerframeError::geometry(
                "percent rect width/height must be >= 0",
            ));
        }
        Ok(Self::new(x, y, width, height))
    }

    /// Clamp every component into `[0, 100]`.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_percent(self.x),
            y: clamp_percent(self.y),
            width: clamp_percent(self.width),
            height: clamp_percent(self.height),
        }
    }

    /// Translate by a percent delta, keeping the rectangle inside the canvas.
    ///
    /// The position is clamped to `[0, 100 - size]` on each axis.
    pub fn translated_within_canvas(self, delta: Vec2) -> Self {
        let max_x = (PERCENT_MAX - self.width).max(0.0);
        let max_y = (PERCENT_MAX - self.height).max(0.0);
        let x = finite_or(self.x + delta.x, self.x).clamp(0.0, max_x);
        let y = finite_or(self.y + delta.y, self.y).clamp(0.0, max_y);
        Self { x, y, ..self }.clamped()
    }

    /// Right edge in percent.
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge in percent.
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// Return `true` when every component is inside `[0, 100]`.
    pub fn is_within_bounds(self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| (0.0..=PERCENT_MAX).contains(v))
    }
}

/// Return `v` when finite, otherwise `fallback`.
pub(crate) fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

/// Build an origin/size rectangle, normalizing negative extents.
pub fn rect_xywh(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::new(x, y, x + width, y + height).abs()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
