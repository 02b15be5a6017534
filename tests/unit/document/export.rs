use super::*;
use crate::document::import::import_document;
use crate::foundation::core::{PercentRect, Rect};
use crate::foundation::ids::LayerIdGen;
use crate::geometry::bbox::NORMALIZED_BOX_THRESHOLD;
use crate::layers::model::{ImageSource, LayerFrame, ShapeKind};
use crate::layers::order::Reorder;

const NATURAL: Size = Size::new(1000.0, 500.0);

fn store() -> LayerStore {
    LayerStore::with_id_gen(LayerIdGen::starting_at(1))
}

fn rasterized_shape(frame: Rect) -> ShapeLayer {
    let mut s = ShapeLayer::new(ShapeKind::Circle, frame);
    s.raster_url = Some("https://cdn/shape.png".to_owned());
    s
}

#[test]
fn z_index_tracks_live_order() {
    let mut st = store();
    let text = st.add_layer(TextLayer::new("a", PercentRect::new(0.0, 0.0, 10.0, 10.0)));
    let shape = st.add_layer(rasterized_shape(Rect::new(0.0, 0.0, 100.0, 100.0)));
    st.reorder(text, Reorder::ToTop).unwrap();

    let doc = export_document(&st, "https://cdn/base.jpg", NATURAL).unwrap();
    assert_eq!(doc.text_elements[0].layout.z_index, Some(2));
    assert_eq!(doc.overlay_elements[0].layout.z_index, Some(1));
    assert_eq!(st.order().z_index(shape), Some(1));
}

#[test]
fn geometry_is_normalized() {
    let mut st = store();
    st.add_layer(TextLayer::new("a", PercentRect::new(10.0, 20.0, 30.0, 40.0)));
    st.add_layer(OverlayLayer::new(
        ImageSource::from_url("https://cdn/o.png"),
        Rect::new(100.0, 50.0, 300.0, 150.0),
    ));
    let doc = export_document(&st, "u", NATURAL).unwrap();

    let t = doc.text_elements[0].bounding_box;
    assert!((t.x - 0.1).abs() < 1e-12 && (t.height - 0.4).abs() < 1e-12);
    let o = &doc.overlay_elements[0];
    assert_eq!(o.bounding_box, BoundingBox::new(0.1, 0.1, 0.2, 0.2));
    assert_eq!(
        o.overlay_image.as_ref().and_then(|i| i.image_url.as_deref()),
        Some("https://cdn/o.png")
    );
    assert!(o.file_url.is_none());
}

#[test]
fn hidden_layers_are_skipped() {
    let mut st = store();
    let a = st.add_layer(TextLayer::new("a", PercentRect::new(0.0, 0.0, 10.0, 10.0)));
    st.add_layer(TextLayer::new("b", PercentRect::new(0.0, 0.0, 10.0, 10.0)));
    st.set_visibility(a, false).unwrap();
    let doc = export_document(&st, "u", NATURAL).unwrap();
    assert_eq!(doc.text_elements.len(), 1);
    assert_eq!(doc.text_elements[0].text, "b");
    assert_eq!(doc.text_elements[0].layout.z_index, Some(2));
}

#[test]
fn unrasterized_shape_blocks_export() {
    let mut st = store();
    st.add_layer(ShapeLayer::new(ShapeKind::Triangle, Rect::new(0.0, 0.0, 10.0, 10.0)));
    assert!(matches!(
        export_document(&st, "u", NATURAL),
        Err(LayerframeError::Validation(_))
    ));
}

#[test]
fn overlay_without_url_blocks_export() {
    let mut st = store();
    st.add_layer(OverlayLayer::new(
        ImageSource::from_bitmap(image::RgbaImage::new(2, 2)),
        Rect::new(0.0, 0.0, 10.0, 10.0),
    ));
    assert!(matches!(
        export_document(&st, "u", NATURAL),
        Err(LayerframeError::Validation(_))
    ));
}

#[test]
fn export_then_import_preserves_scene() {
    let mut st = store();
    let mut t = TextLayer::new("Hello", PercentRect::new(5.0, 5.0, 50.0, 10.0));
    t.font_weight = "700".to_owned();
    t.group_id = Some("g".to_owned());
    st.add_layer(t);
    st.add_layer(rasterized_shape(Rect::new(200.0, 100.0, 400.0, 300.0)));

    let doc = export_document(&st, "https://cdn/base.jpg", NATURAL).unwrap();
    let json = doc.to_json_pretty().unwrap();
    let back = crate::document::frame::FrameDocument::from_json(&json).unwrap();
    assert_eq!(back, doc);

    let imported = import_document(&back, store(), NORMALIZED_BOX_THRESHOLD).unwrap();
    let layers: Vec<_> = imported.store.painted().map(|(_, l)| l.clone()).collect();
    let text = layers[0].as_text().unwrap();
    assert_eq!(text.content, "Hello");
    assert_eq!(text.font_weight, "700");
    assert_eq!(text.group_id.as_deref(), Some("g"));
    let shape = layers[1].as_shape().unwrap();
    let expected = Rect::new(200.0, 100.0, 400.0, 300.0);
    for (got, want) in [
        (shape.frame.x0, expected.x0),
        (shape.frame.y0, expected.y0),
        (shape.frame.x1, expected.x1),
        (shape.frame.y1, expected.y1),
    ] {
        assert!((got - want).abs() < 1e-9, "{got} vs {want}");
    }
    assert_eq!(imported.natural_size, NATURAL);
}

#[test]
fn off_canvas_frames_survive_reimport() {
    let mut st = store();
    st.add_layer(rasterized_shape(Rect::new(1150.0, 50.0, 1350.0, 150.0)));
    st.add_layer(OverlayLayer::new(
        ImageSource::from_url("https://cdn/o.png"),
        Rect::new(-40.0, 0.0, 1200.0, 100.0),
    ));
    let doc = export_document(&st, "u", NATURAL).unwrap();
    assert_eq!(
        doc.overlay_elements[0].bounding_box,
        BoundingBox::new(1150.0, 50.0, 200.0, 100.0)
    );

    let back = import_document(&doc, store(), NORMALIZED_BOX_THRESHOLD).unwrap();
    let frames: Vec<_> = back.store.painted().map(|(_, l)| l.frame()).collect();
    assert_eq!(
        frames,
        vec![
            LayerFrame::Natural(Rect::new(1150.0, 50.0, 1350.0, 150.0)),
            LayerFrame::Natural(Rect::new(-40.0, 0.0, 1200.0, 100.0)),
        ]
    );
}
