use crate::foundation::core::{PercentRect, Rect};
use crate::foundation::error::{LayerframeError, LayerframeResult};
use crate::layers::model::{
    Border, FontStyle, ImageSource, Layer, ShapeKind, TextAlign, TextDecoration, TextEffects,
    sanitize_pixel_rect,
};

/// Partial update of a text layer. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextPatch {
    pub frame: Option<PercentRect>,
    pub content: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<String>,
    pub font_style: Option<FontStyle>,
    pub color: Option<String>,
    pub alignment: Option<TextAlign>,
    pub decoration: Option<TextDecoration>,
    pub effects: Option<TextEffects>,
    pub group_id: Option<Option<String>>,
}

/// Partial update of a shape layer.
///
/// Any change that alters the rasterized appearance drops the stale `raster_url` unless the
/// patch sets a new one. Shapes with a hosted raster only accept frame and raster changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePatch {
    pub frame: Option<Rect>,
    pub kind: Option<ShapeKind>,
    pub fill: Option<String>,
    pub border: Option<Border>,
    pub corner_radius: Option<f64>,
    pub rotation_deg: Option<f64>,
    pub opacity: Option<f64>,
    pub raster_url: Option<Option<String>>,
}

impl ShapePatch {
    /// Whether the patch edits the vector description (anything but frame and raster).
    pub fn touches_vector(&self) -> bool {
        self.kind.is_some()
            || self.fill.is_some()
            || self.border.is_some()
            || self.corner_radius.is_some()
            || self.rotation_deg.is_some()
            || self.opacity.is_some()
    }
}

/// Partial update of an overlay layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayPatch {
    pub frame: Option<Rect>,
    pub source: Option<ImageSource>,
    pub background_removed: Option<bool>,
    pub pre_removal: Option<Option<ImageSource>>,
}

/// Partial update addressed to one layer; the variant must match the layer's kind.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerPatch {
    Text(TextPatch),
    Shape(ShapePatch),
    Overlay(OverlayPatch),
}

impl Layer {
    /// Apply `patch` in place, enforcing value ranges on every written field.
    pub(crate) fn apply_patch(&mut self, patch: LayerPatch) -> LayerframeResult<()> {
        match (self, patch) {
            (Layer::Text(l), LayerPatch::Text(p)) => {
                if let Some(v) = p.font_size
                    && (!v.is_finite() || v <= 0.0)
                {
                    return Err(LayerframeError::validation(
                        "font_size must be finite and > 0",
                    ));
                }
                if let Some(frame) = p.frame {
                    l.frame = frame.clamped();
                }
                if let Some(v) = p.content {
                    l.content = v;
                }
                if let Some(v) = p.font_family {
                    l.font_family = v;
                }
                if let Some(v) = p.font_size {
                    l.font_size = v;
                }
                if let Some(v) = p.font_weight {
                    l.font_weight = v;
                }
                if let Some(v) = p.font_style {
                    l.font_style = v;
                }
                if let Some(v) = p.color {
                    l.color = v;
                }
                if let Some(v) = p.alignment {
                    l.alignment = v;
                }
                if let Some(v) = p.decoration {
                    l.decoration = v;
                }
                if let Some(v) = p.effects {
                    l.effects = v;
                }
                if let Some(v) = p.group_id {
                    l.group_id = v;
                }
                Ok(())
            }
            (Layer::Shape(l), LayerPatch::Shape(p)) => {
                if l.hosted_raster && p.touches_vector() {
                    return Err(LayerframeError::validation(format!(
                        "shape {} is drawn from a hosted raster; only its frame can change",
                        l.id
                    )));
                }
                let mut appearance_changed = false;
                if let Some(frame) = p.frame {
                    let frame = sanitize_pixel_rect(frame);
                    appearance_changed |= frame.size() != l.frame.size() && !l.hosted_raster;
                    l.frame = frame;
                }
                if let Some(v) = p.kind {
                    appearance_changed |= v != l.kind;
                    l.kind = v;
                }
                if let Some(v) = p.fill {
                    appearance_changed |= v != l.fill;
                    l.fill = v;
                }
                if let Some(v) = p.border {
                    appearance_changed |= v != l.border;
                    l.border = v;
                }
                if let Some(v) = p.corner_radius {
                    let v = if v.is_finite() { v.max(0.0) } else { 0.0 };
                    appearance_changed |= v != l.corner_radius;
                    l.corner_radius = v;
                }
                if let Some(v) = p.rotation_deg {
                    let v = if v.is_finite() { v.rem_euclid(360.0) } else { 0.0 };
                    appearance_changed |= v != l.rotation_deg;
                    l.rotation_deg = v;
                }
                if let Some(v) = p.opacity {
                    let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 };
                    appearance_changed |= v != l.opacity;
                    l.opacity = v;
                }
                match p.raster_url {
                    Some(url) => l.raster_url = url,
                    None if appearance_changed => l.raster_url = None,
                    None => {}
                }
                Ok(())
            }
            (Layer::Overlay(l), LayerPatch::Overlay(p)) => {
                if let Some(frame) = p.frame {
                    l.frame = sanitize_pixel_rect(frame);
                }
                if let Some(v) = p.source {
                    l.source = v;
                }
                if let Some(v) = p.background_removed {
                    l.background_removed = v;
                }
                if let Some(v) = p.pre_removal {
                    l.pre_removal = v;
                }
                Ok(())
            }
            (layer, _) => Err(LayerframeError::validation(format!(
                "patch kind does not match {:?} layer {}",
                layer.kind(),
                layer.id()
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/patch.rs"]
mod tests;
