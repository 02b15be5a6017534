use crate::foundation::error::{LayerframeError, LayerframeResult};
use crate::geometry::bbox::BoundingBox;

/// Serialized description of one composed frame, exchanged with the surrounding application.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameDocument {
    pub image_url: String,
    pub image_dimensions: ImageDimensions,
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
    #[serde(default)]
    pub overlay_elements: Vec<OverlayElement>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageDimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(rename = "zIndex", default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
}

/// CSS-style font weight: producers write either `"bold"` or `700`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum FontWeightValue {
    Number(f64),
    Name(String),
}

impl FontWeightValue {
    pub fn to_css(&self) -> String {
        match self {
            Self::Number(n) if n.fract() == 0.0 => format!("{n:.0}"),
            Self::Number(n) => n.to_string(),
            Self::Name(s) => s.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DocTextShadow {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "offsetX", default)]
    pub offset_x: f64,
    #[serde(rename = "offsetY", default)]
    pub offset_y: f64,
    #[serde(default)]
    pub blur: f64,
    #[serde(default)]
    pub color: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DocTextEffects {
    #[serde(rename = "textShadow", default, skip_serializing_if = "Option::is_none")]
    pub text_shadow: Option<DocTextShadow>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextElement {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "fontSize", default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(rename = "fontFamily", default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(rename = "fontWeight", default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeightValue>,
    #[serde(default)]
    pub layout: ElementLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<DocTextEffects>,
    #[serde(rename = "groupId", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayImageRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Raster overlay or rasterized shape; which one is decided by [`OverlayElement::classify`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayElement {
    pub bounding_box: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_image: Option<OverlayImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default)]
    pub layout: ElementLayout,
}

/// What an overlay element turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayElementKind<'a> {
    /// Rasterized shape hosted at the URL.
    Shape(&'a str),
    /// Raster image overlay hosted at the URL.
    Image(&'a str),
}

impl OverlayElement {
    /// A direct `file_url` marks a shape; otherwise `overlay_image.image_url` marks an image.
    pub fn classify(&self) -> LayerframeResult<OverlayElementKind<'_>> {
        if let Some(url) = non_empty(self.file_url.as_deref()) {
            return Ok(OverlayElementKind::Shape(url));
        }
        let image_url = self
            .overlay_image
            .as_ref()
            .and_then(|o| non_empty(o.image_url.as_deref()));
        match image_url {
            Some(url) => Ok(OverlayElementKind::Image(url)),
            None => Err(LayerframeError::import_parse(
                "overlay element has neither file_url nor overlay_image.image_url",
            )),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

impl FrameDocument {
    /// Parse a document; malformed JSON is an import error, not a serialization error.
    pub fn from_json(s: &str) -> LayerframeResult<Self> {
        serde_json::from_str(s).map_err(|e| LayerframeError::import_parse(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> LayerframeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/frame.rs"]
mod tests;
