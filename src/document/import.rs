use crate::document::frame::{FrameDocument, OverlayElement, OverlayElementKind, TextElement};
use crate::foundation::core::Size;
use crate::foundation::error::{LayerframeError, LayerframeResult};
use crate::geometry::transform::CoordinateTransform;
use crate::layers::model::{
    ImageSource, Layer, OverlayLayer, ShapeLayer, TextAlign, TextLayer, TextShadow,
};
use crate::layers::store::LayerStore;

/// Scene rebuilt from a [`FrameDocument`], ready to replace the editor's scene in one step.
#[derive(Clone, Debug)]
pub struct ImportedFrame {
    pub image_url: String,
    pub natural_size: Size,
    pub store: LayerStore,
}

/// Document element resolved to a layer, still carrying its ordering key.
struct Pending {
    z_index: Option<i64>,
    layer: Layer,
}

/// Build a scene from `doc` into `store` (which must be empty).
///
/// All-or-nothing: any malformed element rejects the whole document. Elements are painted in
/// ascending `layout.zIndex`; elements without one keep document order after the indexed ones
/// (text elements before overlay elements).
#[tracing::instrument(skip(doc, store), fields(
    texts = doc.text_elements.len(),
    overlays = doc.overlay_elements.len()
))]
pub fn import_document(
    doc: &FrameDocument,
    mut store: LayerStore,
    box_threshold: f64,
) -> LayerframeResult<ImportedFrame> {
    let dims = doc.image_dimensions;
    if !(dims.width.is_finite() && dims.height.is_finite() && dims.width > 0.0 && dims.height > 0.0)
    {
        return Err(LayerframeError::import_parse(format!(
            "image_dimensions must be positive, got {}x{}",
            dims.width, dims.height
        )));
    }
    let natural_size = Size::new(dims.width, dims.height);
    let transform = CoordinateTransform::identity(natural_size);

    let mut pending = Vec::with_capacity(doc.text_elements.len() + doc.overlay_elements.len());
    for (i, el) in doc.text_elements.iter().enumerate() {
        let layer = text_layer(el, &transform, box_threshold)
            .map_err(|e| element_error("text_elements", i, e))?;
        pending.push(Pending {
            z_index: el.layout.z_index,
            layer,
        });
    }
    for (i, el) in doc.overlay_elements.iter().enumerate() {
        let layer = overlay_layer(el, &transform, box_threshold)
            .map_err(|e| element_error("overlay_elements", i, e))?;
        pending.push(Pending {
            z_index: el.layout.z_index,
            layer,
        });
    }

    // Stable: equal keys keep document order.
    pending.sort_by_key(|p| match p.z_index {
        Some(z) => (0, z),
        None => (1, 0),
    });

    for p in pending {
        store.add_layer(p.layer);
    }
    tracing::debug!(layers = store.len(), "frame document imported");

    Ok(ImportedFrame {
        image_url: doc.image_url.clone(),
        natural_size,
        store,
    })
}

fn element_error(list: &str, index: usize, err: LayerframeError) -> LayerframeError {
    match err {
        LayerframeError::ImportParse(msg) => {
            LayerframeError::import_parse(format!("{list}[{index}]: {msg}"))
        }
        other => LayerframeError::import_parse(format!("{list}[{index}]: {other}")),
    }
}

fn text_layer(
    el: &TextElement,
    transform: &CoordinateTransform,
    threshold: f64,
) -> LayerframeResult<Layer> {
    let (frame, _) = transform.box_to_percent(el.bounding_box, threshold);
    let mut layer = TextLayer::new(el.text.clone(), frame);
    if let Some(size) = el.font_size {
        if !(size.is_finite() && size > 0.0) {
            return Err(LayerframeError::import_parse(format!(
                "fontSize must be positive, got {size}"
            )));
        }
        layer.font_size = size;
    }
    if let Some(family) = &el.font_family {
        layer.font_family = family.clone();
    }
    if let Some(fill) = &el.fill {
        layer.color = fill.clone();
    }
    if let Some(weight) = &el.font_weight {
        layer.font_weight = weight.to_css();
    }
    if let Some(alignment) = &el.layout.alignment {
        layer.alignment = TextAlign::parse_lenient(alignment);
    }
    layer.effects.shadow = el
        .effects
        .as_ref()
        .and_then(|e| e.text_shadow.as_ref())
        .filter(|s| s.enabled)
        .map(|s| TextShadow {
            offset_x: s.offset_x,
            offset_y: s.offset_y,
            blur: s.blur.max(0.0),
            color: s.color.clone(),
        });
    layer.group_id = el.group_id.clone();
    Ok(layer.into())
}

fn overlay_layer(
    el: &OverlayElement,
    transform: &CoordinateTransform,
    threshold: f64,
) -> LayerframeResult<Layer> {
    let (frame, _) = transform.box_to_natural(el.bounding_box, threshold);
    Ok(match el.classify()? {
        OverlayElementKind::Shape(url) => ShapeLayer::from_hosted_raster(url, frame).into(),
        OverlayElementKind::Image(url) => {
            OverlayLayer::new(ImageSource::from_url(url), frame).into()
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/document/import.rs"]
mod tests;
