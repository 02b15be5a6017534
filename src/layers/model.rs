use std::sync::Arc;

use crate::foundation::core::{PercentRect, Rect, Vec2, finite_or};
use crate::foundation::ids::LayerId;
use crate::geometry::transform::CoordinateTransform;

/// Discriminant of [`Layer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Text,
    Shape,
    Overlay,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    /// Parse a document alignment string; unknown values fall back to `Left`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" | "middle" => Self::Center,
            "right" | "end" => Self::Right,
            "justify" | "justified" => Self::Justify,
            _ => Self::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

/// Drop shadow behind text, offsets in display pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextShadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: String,
}

/// Style tags layered on top of the base text style.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextEffects {
    pub shadow: Option<TextShadow>,
    /// Glow color.
    pub glow: Option<String>,
    /// Word-art preset name.
    pub word_art: Option<String>,
}

/// Text block positioned in percent-of-canvas units.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayer {
    pub id: LayerId,
    pub frame: PercentRect,
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub font_style: FontStyle,
    pub color: String,
    pub alignment: TextAlign,
    pub decoration: TextDecoration,
    pub effects: TextEffects,
    /// Layers sharing a group id move together.
    pub group_id: Option<String>,
}

impl TextLayer {
    pub fn new(content: impl Into<String>, frame: PercentRect) -> Self {
        Self {
            id: LayerId::default(),
            frame: frame.clamped(),
            content: content.into(),
            font_family: "Arial".to_owned(),
            font_size: 32.0,
            font_weight: "normal".to_owned(),
            font_style: FontStyle::Normal,
            color: "#ffffff".to_owned(),
            alignment: TextAlign::Left,
            decoration: TextDecoration::None,
            effects: TextEffects::default(),
            group_id: None,
        }
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Square,
    Circle,
    Triangle,
    Line,
    Curve,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Border {
    pub color: String,
    pub width: f64,
    pub style: BorderStyle,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            color: "#000000".to_owned(),
            width: 0.0,
            style: BorderStyle::Solid,
        }
    }
}

/// Vector shape positioned in natural image pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeLayer {
    pub id: LayerId,
    pub frame: Rect,
    pub kind: ShapeKind,
    pub fill: String,
    pub border: Border,
    pub corner_radius: f64,
    pub rotation_deg: f64,
    /// `0..=1`.
    pub opacity: f64,
    /// Hosted raster of the vector description. Filled asynchronously; required for export.
    pub raster_url: Option<String>,
    /// `raster_url` is the shape's only appearance (imported from a document file). It scales
    /// with the frame and is never regenerated from the vector fields.
    pub hosted_raster: bool,
}

impl ShapeLayer {
    pub fn new(kind: ShapeKind, frame: Rect) -> Self {
        Self {
            id: LayerId::default(),
            frame: sanitize_pixel_rect(frame),
            kind,
            fill: "#3b82f6".to_owned(),
            border: Border::default(),
            corner_radius: 0.0,
            rotation_deg: 0.0,
            opacity: 1.0,
            raster_url: None,
            hosted_raster: false,
        }
    }

    /// Shape whose appearance is an already hosted raster at `url`.
    pub fn from_hosted_raster(url: impl Into<String>, frame: Rect) -> Self {
        Self {
            raster_url: Some(url.into()),
            hosted_raster: true,
            ..Self::new(ShapeKind::Rectangle, frame)
        }
    }
}

/// Load state of an image reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageStatus {
    /// Decode not finished yet.
    #[default]
    Pending,
    Ready,
    /// Decode failed; kept so the user can retry or delete.
    Broken,
}

/// Remote and/or decoded image reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageSource {
    pub url: Option<String>,
    pub bitmap: Option<Arc<image::RgbaImage>>,
    pub status: ImageStatus,
}

impl ImageSource {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            bitmap: None,
            status: ImageStatus::Pending,
        }
    }

    pub fn from_bitmap(bitmap: image::RgbaImage) -> Self {
        Self {
            url: None,
            bitmap: Some(Arc::new(bitmap)),
            status: ImageStatus::Ready,
        }
    }

    /// Pixel size of the decoded bitmap, if any.
    pub fn bitmap_size(&self) -> Option<(u32, u32)> {
        self.bitmap.as_ref().map(|b| b.dimensions())
    }
}

/// Raster image overlay positioned in natural image pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayLayer {
    pub id: LayerId,
    pub frame: Rect,
    pub source: ImageSource,
    pub background_removed: bool,
    /// Source before background removal, kept so the removal can be reverted.
    pub pre_removal: Option<ImageSource>,
}

impl OverlayLayer {
    pub fn new(source: ImageSource, frame: Rect) -> Self {
        Self {
            id: LayerId::default(),
            frame: sanitize_pixel_rect(frame),
            source,
            background_removed: false,
            pre_removal: None,
        }
    }
}

/// One addressable visual element of the composition.
#[derive(Clone, Debug, PartialEq)]
pub enum Layer {
    Text(TextLayer),
    Shape(ShapeLayer),
    Overlay(OverlayLayer),
}

impl From<TextLayer> for Layer {
    fn from(l: TextLayer) -> Self {
        Self::Text(l)
    }
}

impl From<ShapeLayer> for Layer {
    fn from(l: ShapeLayer) -> Self {
        Self::Shape(l)
    }
}

impl From<OverlayLayer> for Layer {
    fn from(l: OverlayLayer) -> Self {
        Self::Overlay(l)
    }
}

/// Geometry of a layer in its native coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerFrame {
    /// Percent of canvas (text).
    Percent(PercentRect),
    /// Natural pixels (shape, overlay).
    Natural(Rect),
}

/// Translation in a layer's native coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveDelta {
    Percent(Vec2),
    Natural(Vec2),
}

impl MoveDelta {
    /// Express a display-pixel delta in the native space of `kind`.
    pub fn from_display(kind: LayerKind, delta: Vec2, transform: &CoordinateTransform) -> Self {
        match kind {
            LayerKind::Text => Self::Percent(transform.delta_to_percent(delta)),
            LayerKind::Shape | LayerKind::Overlay => {
                Self::Natural(transform.display_delta_to_natural(delta))
            }
        }
    }
}

impl LayerFrame {
    /// Frame in display pixels.
    pub fn to_display(self, transform: &CoordinateTransform) -> Rect {
        match self {
            Self::Percent(p) => transform.percent_rect_to_display(p),
            Self::Natural(r) => transform.natural_to_display_rect(r),
        }
    }

    /// Frame of the same kind described by a display-pixel rectangle.
    pub fn from_display(kind: LayerKind, r: Rect, transform: &CoordinateTransform) -> Self {
        match kind {
            LayerKind::Text => Self::Percent(transform.display_rect_to_percent(r)),
            LayerKind::Shape | LayerKind::Overlay => {
                Self::Natural(sanitize_pixel_rect(transform.display_to_natural_rect(r)))
            }
        }
    }

    /// Apply a translation. Percent frames stay inside the canvas; mismatched deltas are ignored.
    pub fn translated(self, delta: MoveDelta) -> Self {
        match (self, delta) {
            (Self::Percent(p), MoveDelta::Percent(d)) => {
                Self::Percent(p.translated_within_canvas(d))
            }
            (Self::Natural(r), MoveDelta::Natural(d)) => {
                let d = Vec2::new(finite_or(d.x, 0.0), finite_or(d.y, 0.0));
                Self::Natural(r + d)
            }
            (frame, _) => frame,
        }
    }
}

impl Layer {
    pub fn id(&self) -> LayerId {
        match self {
            Self::Text(l) => l.id,
            Self::Shape(l) => l.id,
            Self::Overlay(l) => l.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: LayerId) {
        match self {
            Self::Text(l) => l.id = id,
            Self::Shape(l) => l.id = id,
            Self::Overlay(l) => l.id = id,
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Text(_) => LayerKind::Text,
            Self::Shape(_) => LayerKind::Shape,
            Self::Overlay(_) => LayerKind::Overlay,
        }
    }

    pub fn frame(&self) -> LayerFrame {
        match self {
            Self::Text(l) => LayerFrame::Percent(l.frame),
            Self::Shape(l) => LayerFrame::Natural(l.frame),
            Self::Overlay(l) => LayerFrame::Natural(l.frame),
        }
    }

    /// Replace the frame. Percent frames are clamped, pixel frames sanitized; a frame of the wrong
    /// space is rejected and `false` returned.
    pub(crate) fn set_frame(&mut self, frame: LayerFrame) -> bool {
        match (self, frame) {
            (Self::Text(l), LayerFrame::Percent(p)) => {
                l.frame = p.clamped();
                true
            }
            (Self::Shape(l), LayerFrame::Natural(r)) => {
                let r = sanitize_pixel_rect(r);
                if r.size() != l.frame.size() && !l.hosted_raster {
                    l.raster_url = None;
                }
                l.frame = r;
                true
            }
            (Self::Overlay(l), LayerFrame::Natural(r)) => {
                l.frame = sanitize_pixel_rect(r);
                true
            }
            _ => false,
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        match self {
            Self::Text(l) => l.group_id.as_deref(),
            Self::Shape(_) | Self::Overlay(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextLayer> {
        match self {
            Self::Text(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeLayer> {
        match self {
            Self::Shape(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_overlay(&self) -> Option<&OverlayLayer> {
        match self {
            Self::Overlay(l) => Some(l),
            _ => None,
        }
    }

    /// Frame in display pixels.
    pub fn display_rect(&self, transform: &CoordinateTransform) -> Rect {
        self.frame().to_display(transform)
    }
}

/// Replace non-finite components with zero and normalize negative extents.
pub(crate) fn sanitize_pixel_rect(r: Rect) -> Rect {
    Rect::new(
        finite_or(r.x0, 0.0),
        finite_or(r.y0, 0.0),
        finite_or(r.x1, 0.0),
        finite_or(r.y1, 0.0),
    )
    .abs()
}
