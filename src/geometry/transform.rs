use crate::foundation::core::{
    Axis, PERCENT_MAX, PercentRect, Point, Rect, Size, Vec2, clamp_percent, rect_xywh,
};

/// Converts between display pixels, natural image pixels and percent-of-canvas units.
///
/// The canvas is the base image: its natural size defines natural-pixel space and its rendered
/// size defines display-pixel space. Percent space is resolution independent; `50.0` on the x
/// axis is the horizontal middle of the canvas in either pixel space.
///
/// This type is the only place that performs axis-scaling arithmetic. Degenerate sizes (zero,
/// negative or non-finite) never produce NaN; conversions against them yield `0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateTransform {
    display: Size,
    natural: Size,
}

impl CoordinateTransform {
    /// Create a transform for a canvas rendered at `display` whose source is `natural` pixels.
    pub fn new(display: Size, natural: Size) -> Self {
        Self { display, natural }
    }

    /// Transform where display and natural pixels coincide.
    pub fn identity(size: Size) -> Self {
        Self::new(size, size)
    }

    /// Current rendered size.
    pub fn display_size(&self) -> Size {
        self.display
    }

    /// Natural (source) size of the base image.
    pub fn natural_size(&self) -> Size {
        self.natural
    }

    /// Replace the rendered size, e.g. after the viewport resized.
    pub fn set_display_size(&mut self, display: Size) {
        self.display = display;
    }

    /// Replace the natural size, e.g. after a new base image decoded.
    pub fn set_natural_size(&mut self, natural: Size) {
        self.natural = natural;
    }

    /// Display pixels per natural pixel along x.
    pub fn scale_x(&self) -> f64 {
        safe_div(self.display.width, self.natural.width)
    }

    /// Display pixels per natural pixel along y.
    pub fn scale_y(&self) -> f64 {
        safe_div(self.display.height, self.natural.height)
    }

    /// Canvas rectangle in display pixels.
    pub fn canvas_display_rect(&self) -> Rect {
        rect_xywh(0.0, 0.0, self.display.width, self.display.height)
    }

    /// Canvas rectangle in natural pixels.
    pub fn canvas_natural_rect(&self) -> Rect {
        rect_xywh(0.0, 0.0, self.natural.width, self.natural.height)
    }

    fn display_extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.display.width,
            Axis::Y => self.display.height,
        }
    }

    fn natural_extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.natural.width,
            Axis::Y => self.natural.height,
        }
    }

    /// Display pixels to percent of canvas. Not clamped; see [`clamp_percent`].
    pub fn to_percent(&self, pixel: f64, axis: Axis) -> f64 {
        safe_div(pixel, self.display_extent(axis)) * PERCENT_MAX
    }

    /// Percent of canvas to display pixels.
    pub fn to_pixel(&self, percent: f64, axis: Axis) -> f64 {
        let extent = self.display_extent(axis);
        if !extent.is_finite() || extent <= 0.0 || !percent.is_finite() {
            return 0.0;
        }
        percent / PERCENT_MAX * extent
    }

    /// Display-pixel delta to percent delta.
    pub fn delta_to_percent(&self, delta: Vec2) -> Vec2 {
        Vec2::new(
            self.to_percent(delta.x, Axis::X),
            self.to_percent(delta.y, Axis::Y),
        )
    }

    /// Percent delta to display-pixel delta.
    pub fn percent_delta_to_pixel(&self, delta: Vec2) -> Vec2 {
        Vec2::new(
            self.to_pixel(delta.x, Axis::X),
            self.to_pixel(delta.y, Axis::Y),
        )
    }

    /// Percent rectangle to display pixels.
    pub fn percent_rect_to_display(&self, r: PercentRect) -> Rect {
        rect_xywh(
            self.to_pixel(r.x, Axis::X),
            self.to_pixel(r.y, Axis::Y),
            self.to_pixel(r.width, Axis::X),
            self.to_pixel(r.height, Axis::Y),
        )
    }

    /// Display rectangle to percent, clamped into `[0, 100]` for storage.
    pub fn display_rect_to_percent(&self, r: Rect) -> PercentRect {
        PercentRect::new(
            self.to_percent(r.x0, Axis::X),
            self.to_percent(r.y0, Axis::Y),
            self.to_percent(r.width(), Axis::X),
            self.to_percent(r.height(), Axis::Y),
        )
    }

    /// Smallest percent size equal to `px` display pixels on each axis.
    pub fn min_percent_size(&self, px: f64) -> Vec2 {
        Vec2::new(
            clamp_percent(self.to_percent(px, Axis::X)),
            clamp_percent(self.to_percent(px, Axis::Y)),
        )
    }

    /// Natural-pixel point to display pixels.
    pub fn natural_to_display_point(&self, p: Point) -> Point {
        Point::new(p.x * self.scale_x(), p.y * self.scale_y())
    }

    /// Display-pixel point to natural pixels.
    pub fn display_to_natural_point(&self, p: Point) -> Point {
        Point::new(
            safe_div(p.x, self.scale_x()),
            safe_div(p.y, self.scale_y()),
        )
    }

    /// Natural-pixel delta to display pixels.
    pub fn natural_delta_to_display(&self, d: Vec2) -> Vec2 {
        Vec2::new(d.x * self.scale_x(), d.y * self.scale_y())
    }

    /// Display-pixel delta to natural pixels.
    pub fn display_delta_to_natural(&self, d: Vec2) -> Vec2 {
        Vec2::new(
            safe_div(d.x, self.scale_x()),
            safe_div(d.y, self.scale_y()),
        )
    }

    /// Natural-pixel rectangle to display pixels.
    pub fn natural_to_display_rect(&self, r: Rect) -> Rect {
        Rect::from_points(
            self.natural_to_display_point(r.origin()),
            self.natural_to_display_point(Point::new(r.x1, r.y1)),
        )
    }

    /// Display-pixel rectangle to natural pixels.
    pub fn display_to_natural_rect(&self, r: Rect) -> Rect {
        Rect::from_points(
            self.display_to_natural_point(r.origin()),
            self.display_to_natural_point(Point::new(r.x1, r.y1)),
        )
    }

    /// Percent rectangle to natural pixels of the canvas.
    pub fn percent_rect_to_natural(&self, r: PercentRect) -> Rect {
        let sx = self.natural_extent(Axis::X) / PERCENT_MAX;
        let sy = self.natural_extent(Axis::Y) / PERCENT_MAX;
        rect_xywh(r.x * sx, r.y * sy, r.width * sx, r.height * sy)
    }

    /// Natural-pixel rectangle to percent of canvas, clamped for storage.
    pub fn natural_rect_to_percent(&self, r: Rect) -> PercentRect {
        let nx = self.natural_extent(Axis::X);
        let ny = self.natural_extent(Axis::Y);
        PercentRect::new(
            safe_div(r.x0, nx) * PERCENT_MAX,
            safe_div(r.y0, ny) * PERCENT_MAX,
            safe_div(r.width(), nx) * PERCENT_MAX,
            safe_div(r.height(), ny) * PERCENT_MAX,
        )
    }

    /// Map a rectangle expressed in `from` space into `to` space, where both describe the same
    /// region at different resolutions (e.g. a layer's display extent and its bitmap pixels).
    pub fn map_between(r: Rect, from: Rect, to: Rect) -> Rect {
        let sx = safe_div(to.width(), from.width());
        let sy = safe_div(to.height(), from.height());
        Rect::new(
            to.x0 + (r.x0 - from.x0) * sx,
            to.y0 + (r.y0 - from.y0) * sy,
            to.x0 + (r.x1 - from.x0) * sx,
            to.y0 + (r.y1 - from.y0) * sy,
        )
    }
}

pub(crate) fn safe_div(num: f64, den: f64) -> f64 {
    if !den.is_finite() || den <= 0.0 || !num.is_finite() {
        return 0.0;
    }
    num / den
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/transform.rs"]
mod tests;
