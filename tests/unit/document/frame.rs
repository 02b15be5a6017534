use super::*;

#[test]
fn parses_mixed_field_casing() {
    let doc = FrameDocument::from_json(
        r##"{
            "image_url": "https://cdn/base.jpg",
            "image_dimensions": {"width": 800, "height": 600},
            "text_elements": [{
                "bounding_box": {"x": 0.1, "y": 0.2, "width": 0.3, "height": 0.1},
                "text": "Hello",
                "fontSize": 24,
                "fontFamily": "Inter",
                "fill": "#ff0000",
                "fontWeight": 700,
                "layout": {"alignment": "center", "zIndex": 2},
                "effects": {"textShadow": {"enabled": true, "offsetX": 2, "offsetY": 3, "blur": 4, "color": "#000"}}
            }],
            "overlay_elements": [{
                "bounding_box": {"x": 0.5, "y": 0.5, "width": 0.2, "height": 0.2},
                "overlay_image": {"image_url": "https://cdn/sticker.png"},
                "layout": {"zIndex": 1}
            }]
        }"##,
    )
    .unwrap();

    assert_eq!(doc.image_dimensions.width, 800.0);
    let t = &doc.text_elements[0];
    assert_eq!(t.font_size, Some(24.0));
    assert_eq!(t.font_weight.as_ref().map(FontWeightValue::to_css).as_deref(), Some("700"));
    assert_eq!(t.layout.z_index, Some(2));
    let shadow = t.effects.as_ref().and_then(|e| e.text_shadow.as_ref()).unwrap();
    assert!(shadow.enabled);
    assert_eq!(shadow.offset_y, 3.0);
    assert_eq!(
        doc.overlay_elements[0].classify().unwrap(),
        OverlayElementKind::Image("https://cdn/sticker.png")
    );
}

#[test]
fn file_url_wins_classification() {
    let el = OverlayElement {
        file_url: Some("https://cdn/shape.png".to_owned()),
        overlay_image: Some(OverlayImageRef {
            image_url: Some("https://cdn/other.png".to_owned()),
        }),
        ..OverlayElement::default()
    };
    assert_eq!(
        el.classify().unwrap(),
        OverlayElementKind::Shape("https://cdn/shape.png")
    );
}

#[test]
fn element_without_urls_is_rejected() {
    let el = OverlayElement {
        file_url: Some("   ".to_owned()),
        ..OverlayElement::default()
    };
    assert!(matches!(el.classify(), Err(LayerframeError::ImportParse(_))));
}

#[test]
fn malformed_json_is_an_import_error() {
    assert!(matches!(
        FrameDocument::from_json("{\"image_url\": 3}"),
        Err(LayerframeError::ImportParse(_))
    ));
}

#[test]
fn font_weight_accepts_names() {
    let w: FontWeightValue = serde_json::from_str("\"bold\"").unwrap();
    assert_eq!(w.to_css(), "bold");
}

#[test]
fn serialization_omits_absent_fields() {
    let el = OverlayElement {
        file_url: Some("u".to_owned()),
        layout: ElementLayout {
            alignment: None,
            z_index: Some(3),
        },
        ..OverlayElement::default()
    };
    let v = serde_json::to_value(&el).unwrap();
    assert!(v.get("overlay_image").is_none());
    assert_eq!(v["layout"]["zIndex"], 3);
    assert!(v["layout"].get("alignment").is_none());
}
