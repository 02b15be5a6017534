use crate::document::frame::{
    DocTextEffects, DocTextShadow, ElementLayout, FontWeightValue, FrameDocument, ImageDimensions,
    OverlayElement, OverlayImageRef, TextElement,
};
use crate::foundation::core::Size;
use crate::foundation::error::{LayerframeError, LayerframeResult};
use crate::geometry::bbox::BoundingBox;
use crate::geometry::transform::CoordinateTransform;
use crate::layers::model::{Layer, OverlayLayer, ShapeLayer, TextLayer};
use crate::layers::store::LayerStore;

/// Serialize the visible scene over a base image hosted at `image_url`.
///
/// `layout.zIndex` is each layer's 1-based position in the live paint order. Pixel frames are
/// written normalized unless they reach off the canvas, then as absolute pixels. Hidden layers are
/// left out. Fails with a validation error when a visible shape has not been rasterized yet or a
/// visible overlay has no hosted URL.
#[tracing::instrument(skip(store), fields(layers = store.len()))]
pub fn export_document(
    store: &LayerStore,
    image_url: &str,
    natural_size: Size,
) -> LayerframeResult<FrameDocument> {
    let transform = CoordinateTransform::identity(natural_size);
    let mut doc = FrameDocument {
        image_url: image_url.to_owned(),
        image_dimensions: ImageDimensions {
            width: natural_size.width,
            height: natural_size.height,
        },
        ..FrameDocument::default()
    };

    for (entry, layer) in store.painted() {
        if !entry.visible {
            continue;
        }
        let z_index = store
            .order()
            .z_index(entry.id)
            .and_then(|z| i64::try_from(z).ok());
        match layer {
            Layer::Text(t) => doc.text_elements.push(text_element(t, z_index)),
            Layer::Shape(s) => doc
                .overlay_elements
                .push(shape_element(s, &transform, z_index)?),
            Layer::Overlay(o) => doc
                .overlay_elements
                .push(overlay_element(o, &transform, z_index)?),
        }
    }
    tracing::debug!(
        texts = doc.text_elements.len(),
        overlays = doc.overlay_elements.len(),
        "frame document exported"
    );
    Ok(doc)
}

fn text_element(t: &TextLayer, z_index: Option<i64>) -> TextElement {
    let weight = match t.font_weight.parse::<f64>() {
        Ok(n) => FontWeightValue::Number(n),
        Err(_) => FontWeightValue::Name(t.font_weight.clone()),
    };
    TextElement {
        bounding_box: BoundingBox::from(t.frame),
        text: t.content.clone(),
        font_size: Some(t.font_size),
        font_family: Some(t.font_family.clone()),
        fill: Some(t.color.clone()),
        font_weight: Some(weight),
        layout: ElementLayout {
            alignment: Some(t.alignment.as_str().to_owned()),
            z_index,
        },
        effects: t.effects.shadow.as_ref().map(|s| DocTextEffects {
            text_shadow: Some(DocTextShadow {
                enabled: true,
                offset_x: s.offset_x,
                offset_y: s.offset_y,
                blur: s.blur,
                color: s.color.clone(),
            }),
        }),
        group_id: t.group_id.clone(),
    }
}

fn shape_element(
    s: &ShapeLayer,
    transform: &CoordinateTransform,
    z_index: Option<i64>,
) -> LayerframeResult<OverlayElement> {
    let url = s.raster_url.as_deref().ok_or_else(|| {
        LayerframeError::validation(format!("shape {} has not been rasterized yet", s.id))
    })?;
    Ok(OverlayElement {
        bounding_box: transform.natural_to_document_box(s.frame),
        overlay_image: None,
        file_url: Some(url.to_owned()),
        layout: ElementLayout {
            alignment: None,
            z_index,
        },
    })
}

fn overlay_element(
    o: &OverlayLayer,
    transform: &CoordinateTransform,
    z_index: Option<i64>,
) -> LayerframeResult<OverlayElement> {
    let url = o.source.url.as_deref().ok_or_else(|| {
        LayerframeError::validation(format!("overlay {} has no hosted image url", o.id))
    })?;
    Ok(OverlayElement {
        bounding_box: transform.natural_to_document_box(o.frame),
        overlay_image: Some(OverlayImageRef {
            image_url: Some(url.to_owned()),
        }),
        file_url: None,
        layout: ElementLayout {
            alignment: None,
            z_index,
        },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/document/export.rs"]
mod tests;
