use super::*;
use crate::assets::pipeline::InMemoryAssetPipeline;
use crate::editor::opts::EditorOpts;
use crate::foundation::core::{PercentRect, Point};
use crate::foundation::ids::LayerIdGen;
use crate::interaction::handles::ResizeHandle;
use crate::interaction::hit::PointerTarget;
use crate::layers::model::{OverlayLayer, ShapeKind, TextLayer};
use crate::layers::patch::{LayerPatch, ShapePatch};
use crate::layers::store::LayerStore;

/// Pixel `(x, y)` holds `[x, y, 0, 255]`.
fn gradient(w: u32, h: u32) -> image::RgbaImage {
    image::RgbaImage::from_fn(w, h, |x, y| image::Rgba([x as u8, y as u8, 0, 255]))
}

fn editor() -> EditorState {
    EditorState::with_store(
        EditorOpts::default(),
        LayerStore::with_id_gen(LayerIdGen::starting_at(1)),
    )
}

/// Base 400x200 shown at 800x400 with a decoded 100x100 overlay at natural (100, 50).
fn editor_with_overlay() -> (EditorState, LayerId) {
    let mut ed = editor();
    ed.set_natural_size(Size::new(400.0, 200.0));
    ed.set_display_size(Size::new(800.0, 400.0));
    let mut source = ImageSource::from_bitmap(gradient(100, 100));
    source.url = Some("https://cdn/sticker.png".to_owned());
    let id = ed.add_layer(OverlayLayer::new(
        source,
        Rect::new(100.0, 50.0, 200.0, 150.0),
    ));
    (ed, id)
}

fn overlay(ed: &EditorState, id: LayerId) -> &crate::layers::model::OverlayLayer {
    ed.layer(id).unwrap().as_overlay().unwrap()
}

#[test]
fn base_crop_replaces_image_and_is_undoable() {
    let mut ed = editor();
    ed.load_base_bitmap(Some("https://cdn/base.png".to_owned()), gradient(400, 200));
    ed.start_crop(CropTarget::BaseImage).unwrap();
    assert_eq!(
        ed.crop_session().unwrap().rect(),
        Rect::new(80.0, 40.0, 320.0, 160.0),
        "seeded at 60% of each side"
    );

    ed.update_crop_rect(Rect::new(50.0, 20.0, 150.0, 120.0), None)
        .unwrap();
    let mut pipeline = InMemoryAssetPipeline::new();
    assert!(ed.apply_crop_with(&mut pipeline).unwrap());

    assert!(ed.crop_session().is_none());
    assert_eq!(ed.base_image().natural_size, Size::new(100.0, 100.0));
    let bitmap = ed.base_image().source.bitmap.clone().unwrap();
    assert_eq!(bitmap.dimensions(), (100, 100));
    assert_eq!(bitmap.get_pixel(0, 0).0, [50, 20, 0, 255]);
    assert_eq!(ed.base_image().source.url.as_deref(), Some("mem://asset/1"));
    assert_eq!(
        ed.history().entries().last().map(|e| e.kind),
        Some(MutationKind::CropApply)
    );

    assert!(ed.undo());
    assert_eq!(ed.base_image().natural_size, Size::new(400.0, 200.0));
    assert_eq!(ed.transform().natural_size(), Size::new(400.0, 200.0));
}

#[test]
fn base_crop_moves_pixel_layers_with_the_photo() {
    let mut ed = editor();
    ed.load_base_bitmap(Some("https://cdn/base.png".to_owned()), gradient(400, 200));
    let shape = ed.add_layer(ShapeLayer::new(
        ShapeKind::Rectangle,
        Rect::new(100.0, 60.0, 140.0, 100.0),
    ));
    let text = ed.add_layer(TextLayer::new("Hi", PercentRect::new(10.0, 10.0, 20.0, 10.0)));
    let text_before = ed.layer(text).unwrap().as_text().unwrap().frame;

    ed.start_crop(CropTarget::BaseImage).unwrap();
    ed.update_crop_rect(Rect::new(50.0, 20.0, 150.0, 120.0), None)
        .unwrap();
    let mut pipeline = InMemoryAssetPipeline::new();
    assert!(ed.apply_crop_with(&mut pipeline).unwrap());

    let shape_frame = |ed: &EditorState| ed.layer(shape).unwrap().as_shape().unwrap().frame;
    assert_eq!(shape_frame(&ed), Rect::new(50.0, 40.0, 90.0, 80.0));
    assert_eq!(ed.layer(text).unwrap().as_text().unwrap().frame, text_before);

    // One undo step reverts the image and the layer positions together.
    assert!(ed.undo());
    assert_eq!(ed.base_image().natural_size, Size::new(400.0, 200.0));
    assert_eq!(shape_frame(&ed), Rect::new(100.0, 60.0, 140.0, 100.0));
    assert!(ed.redo());
    assert_eq!(ed.base_image().natural_size, Size::new(100.0, 100.0));
    assert_eq!(shape_frame(&ed), Rect::new(50.0, 40.0, 90.0, 80.0));
}

#[test]
fn failed_upload_keeps_session_for_retry() {
    let mut ed = editor();
    ed.load_base_bitmap(None, gradient(400, 200));
    ed.start_crop(CropTarget::BaseImage).unwrap();
    let before = ed.base_image().clone();

    let mut pipeline = InMemoryAssetPipeline::new().fail_uploads(true);
    let err = ed.apply_crop_with(&mut pipeline).unwrap_err();
    assert!(matches!(err, LayerframeError::Upload(_)));
    assert!(err.is_notice());
    assert!(ed.crop_session().is_some());
    assert_eq!(ed.base_image(), &before);
    assert_eq!(ed.history().len(), 1);

    pipeline.set_fail_uploads(false);
    assert!(ed.apply_crop_with(&mut pipeline).unwrap());
    assert_eq!(ed.base_image().natural_size, Size::new(240.0, 120.0));
}

#[test]
fn cancel_crop_leaves_image_untouched() {
    let mut ed = editor();
    ed.load_base_bitmap(None, gradient(400, 200));
    let before = ed.base_image().clone();
    ed.start_crop(CropTarget::BaseImage).unwrap();
    ed.update_crop_rect(Rect::new(0.0, 0.0, 50.0, 50.0), None)
        .unwrap();
    let job = ed.begin_apply_crop().unwrap();

    assert!(ed.cancel_crop().is_some());
    assert_eq!(ed.pending_count(), 0);
    assert!(
        !ed.complete_crop(
            job.ticket,
            Ok(UploadResponse {
                url: "mem://late".to_owned()
            })
        )
        .unwrap()
    );
    assert_eq!(ed.base_image(), &before);
    assert!(ed.cancel_crop().is_none());
}

#[test]
fn circle_crop_of_wide_box_is_centered_square() {
    let mut ed = editor();
    ed.load_base_bitmap(None, gradient(200, 100));
    ed.start_crop(CropTarget::BaseImage).unwrap();
    ed.update_crop_rect(Rect::new(0.0, 0.0, 200.0, 100.0), None)
        .unwrap();
    let rect = ed.set_crop_shape(CropShape::Circle).unwrap();
    assert_eq!(rect, Rect::new(50.0, 0.0, 150.0, 100.0));

    let mut pipeline = InMemoryAssetPipeline::new();
    assert!(ed.apply_crop_with(&mut pipeline).unwrap());
    let bitmap = ed.base_image().source.bitmap.clone().unwrap();
    assert_eq!(bitmap.dimensions(), (100, 100));
    assert_eq!(bitmap.get_pixel(0, 0).0[3], 0, "outside the circle");
    assert_eq!(bitmap.get_pixel(50, 50).0, [100, 50, 0, 255]);
}

#[test]
fn overlay_crop_narrows_frame_and_bitmap() {
    let (mut ed, id) = editor_with_overlay();
    ed.start_crop(CropTarget::Overlay(id)).unwrap();
    assert_eq!(
        ed.crop_session().unwrap().rect(),
        Rect::new(200.0, 100.0, 400.0, 300.0)
    );

    // Dragging the north-east corner far outside stops at the overlay's own display extent.
    let kept = ed
        .update_crop_rect(
            Rect::new(300.0, 0.0, 900.0, 200.0),
            Some(CropDragMode::Resize(ResizeHandle::NE)),
        )
        .unwrap();
    assert_eq!(kept, Rect::new(300.0, 100.0, 400.0, 200.0));

    let mut pipeline = InMemoryAssetPipeline::new();
    assert!(ed.apply_crop_with(&mut pipeline).unwrap());
    let o = overlay(&ed, id);
    assert_eq!(o.frame, Rect::new(150.0, 50.0, 200.0, 100.0));
    let bitmap = o.source.bitmap.clone().unwrap();
    assert_eq!(bitmap.dimensions(), (50, 50));
    assert_eq!(bitmap.get_pixel(0, 0).0, [50, 0, 0, 255]);
    assert_eq!(o.source.status, ImageStatus::Ready);

    assert!(ed.undo());
    assert_eq!(overlay(&ed, id).frame, Rect::new(100.0, 50.0, 200.0, 150.0));
}

#[test]
fn crop_requires_decoded_target() {
    let mut ed = editor();
    assert!(matches!(
        ed.start_crop(CropTarget::BaseImage),
        Err(LayerframeError::Validation(_))
    ));
    assert!(ed.update_crop_rect(Rect::ZERO, None).is_err());
    assert!(ed.begin_apply_crop().is_err());

    let id = ed.add_layer(OverlayLayer::new(
        ImageSource::from_url("https://cdn/x.png"),
        Rect::new(0.0, 0.0, 10.0, 10.0),
    ));
    assert!(ed.start_crop(CropTarget::Overlay(id)).is_err());
}

#[test]
fn deleting_layer_drops_its_pending_crop() {
    let (mut ed, id) = editor_with_overlay();
    ed.start_crop(CropTarget::Overlay(id)).unwrap();
    let job = ed.begin_apply_crop().unwrap();

    ed.remove_layer(id).unwrap();
    assert!(ed.crop_session().is_none());
    let applied = ed
        .complete_crop(
            job.ticket,
            Ok(UploadResponse {
                url: "mem://late".to_owned(),
            }),
        )
        .unwrap();
    assert!(!applied);
    assert!(!ed.store().contains(id), "stale result never resurrects");
}

#[test]
fn later_request_on_same_layer_supersedes_crop() {
    let (mut ed, id) = editor_with_overlay();
    ed.start_crop(CropTarget::Overlay(id)).unwrap();
    let crop = ed.begin_apply_crop().unwrap();
    let removal = ed.begin_remove_background(id).unwrap();
    assert_eq!(removal.url, "https://cdn/sticker.png");

    let applied = ed
        .complete_crop(
            crop.ticket,
            Ok(UploadResponse {
                url: "mem://crop".to_owned(),
            }),
        )
        .unwrap();
    assert!(!applied);
    assert_eq!(overlay(&ed, id).frame, Rect::new(100.0, 50.0, 200.0, 150.0));

    assert!(
        ed.complete_remove_background(
            removal.ticket,
            Ok(UploadResponse {
                url: "mem://cut".to_owned(),
            })
        )
        .unwrap()
    );
    assert_eq!(overlay(&ed, id).source.url.as_deref(), Some("mem://cut"));
}

#[test]
fn background_removal_round_trip() {
    let mut pipeline = InMemoryAssetPipeline::new();
    let mut img = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
    img.put_pixel(4, 4, image::Rgba([200, 0, 0, 255]));
    let original = pipeline.upload(&encode_png(&img).unwrap()).unwrap();

    let mut ed = editor();
    let id = ed.add_layer(OverlayLayer::new(
        ImageSource::from_url(original.url.clone()),
        Rect::new(0.0, 0.0, 8.0, 8.0),
    ));
    assert!(ed.remove_background_with(id, &mut pipeline).unwrap());

    let o = overlay(&ed, id);
    assert!(o.background_removed);
    assert_ne!(o.source.url, Some(original.url.clone()));
    assert_eq!(o.source.status, ImageStatus::Ready);
    let cut = o.source.bitmap.clone().unwrap();
    assert_eq!(cut.get_pixel(0, 0).0[3], 0);
    assert_eq!(
        o.pre_removal.as_ref().and_then(|s| s.url.clone()),
        Some(original.url.clone())
    );
    assert_eq!(ed.history().len(), 2, "decoding adds no entry");

    assert!(ed.restore_background(id).unwrap());
    let o = overlay(&ed, id);
    assert!(!o.background_removed);
    assert_eq!(o.source.url, Some(original.url.clone()));
    assert!(o.pre_removal.is_none());
    assert!(!ed.restore_background(id).unwrap());

    assert!(ed.undo());
    assert!(overlay(&ed, id).background_removed);
    assert!(
        overlay(&ed, id).source.bitmap.is_some(),
        "decoded bitmap was backfilled into history"
    );
}

#[test]
fn background_removal_failure_keeps_original() {
    let mut pipeline = InMemoryAssetPipeline::new().fail_background_removal(true);
    let (mut ed, id) = editor_with_overlay();
    let before = overlay(&ed, id).clone();

    let err = ed.remove_background_with(id, &mut pipeline).unwrap_err();
    assert!(matches!(err, LayerframeError::BackgroundRemoval(_)));
    assert!(err.is_notice());
    assert_eq!(overlay(&ed, id), &before);
    assert_eq!(ed.history().len(), 1);
    assert_eq!(ed.pending_count(), 0);
}

#[test]
fn shape_raster_url_is_backfilled_without_history() {
    let mut ed = editor();
    let id = ed.add_layer(ShapeLayer::new(
        ShapeKind::Circle,
        Rect::new(0.0, 0.0, 32.0, 32.0),
    ));
    let mut pipeline = InMemoryAssetPipeline::new();
    assert!(ed.rasterize_shape_with(id, &mut pipeline).unwrap());

    let url = ed.layer(id).unwrap().as_shape().unwrap().raster_url.clone();
    assert!(url.as_deref().is_some_and(|u| u.starts_with("mem://asset/")));
    assert_eq!(ed.history().len(), 1);

    assert!(ed.undo());
    assert!(ed.redo());
    assert_eq!(ed.layer(id).unwrap().as_shape().unwrap().raster_url, url);
}

#[test]
fn shape_edited_while_rasterizing_drops_result() {
    let mut ed = editor();
    let id = ed.add_layer(ShapeLayer::new(
        ShapeKind::Rectangle,
        Rect::new(0.0, 0.0, 16.0, 16.0),
    ));
    let job = ed.begin_rasterize_shape(id).unwrap();
    assert!(!job.bytes.is_empty());

    ed.update_layer(
        id,
        LayerPatch::Shape(ShapePatch {
            fill: Some("#ff0000".to_owned()),
            ..ShapePatch::default()
        }),
    )
    .unwrap();
    let applied = ed
        .complete_rasterize_shape(
            job.ticket,
            Ok(UploadResponse {
                url: "mem://old".to_owned(),
            }),
        )
        .unwrap();
    assert!(!applied);
    assert!(ed.layer(id).unwrap().as_shape().unwrap().raster_url.is_none());
}

#[test]
fn undecodable_overlay_is_kept_broken() {
    let mut ed = editor();
    let id = ed.add_layer(OverlayLayer::new(
        ImageSource::from_url("mem://missing"),
        Rect::new(0.0, 0.0, 10.0, 10.0),
    ));
    let mut pipeline = InMemoryAssetPipeline::new();
    let err = ed.load_layer_image_with(id, &mut pipeline).unwrap_err();
    assert!(matches!(err, LayerframeError::Decode(_)));
    assert!(ed.store().contains(id));
    assert_eq!(overlay(&ed, id).source.status, ImageStatus::Broken);
}

#[test]
fn base_image_load_sets_natural_size() {
    let mut pipeline = InMemoryAssetPipeline::new();
    let url = pipeline
        .upload(&encode_png(&gradient(40, 20)).unwrap())
        .unwrap()
        .url;
    let mut ed = editor();
    assert!(ed.load_base_image_with(url.clone(), &mut pipeline).unwrap());
    assert_eq!(ed.base_image().natural_size, Size::new(40.0, 20.0));
    assert_eq!(ed.transform().display_size(), Size::new(40.0, 20.0));
    assert_eq!(ed.base_image().source.url, Some(url));
    assert_eq!(
        ed.history().entries().last().map(|e| e.kind),
        Some(MutationKind::ImageLoad)
    );
}

#[test]
fn superseded_image_load_is_ignored() {
    let mut ed = editor();
    let first = ed.begin_load_base_image("mem://a");
    let second = ed.begin_load_base_image("mem://b");
    let bytes = encode_png(&gradient(4, 4)).unwrap();

    assert!(!ed.complete_load_image(first.ticket, Ok(bytes.clone())).unwrap());
    assert!(ed.complete_load_image(second.ticket, Ok(bytes)).unwrap());
    assert_eq!(ed.base_image().source.url.as_deref(), Some("mem://b"));
}

const DOC: &str = r##"{
    "image_url": "https://cdn/base.jpg",
    "image_dimensions": {"width": 1000, "height": 500},
    "text_elements": [{
        "bounding_box": {"x": 0.1, "y": 0.2, "width": 0.3, "height": 0.1},
        "text": "Sale",
        "fontSize": 24,
        "layout": {"zIndex": 2}
    }],
    "overlay_elements": [{
        "bounding_box": {"x": 0.5, "y": 0.5, "width": 0.2, "height": 0.2},
        "file_url": "https://cdn/shape.png",
        "layout": {"zIndex": 1}
    }]
}"##;

#[test]
fn import_replaces_scene_and_clears_history() {
    let (mut ed, old) = editor_with_overlay();
    let doc = FrameDocument::from_json(DOC).unwrap();
    ed.import_frame(&doc).unwrap();

    assert!(!ed.store().contains(old));
    assert_eq!(ed.store().len(), 2);
    assert!(ed.history().is_empty());
    assert_eq!(ed.base_image().natural_size, Size::new(1000.0, 500.0));
    assert_eq!(ed.transform().natural_size(), Size::new(1000.0, 500.0));
    assert_eq!(ed.base_image().source.status, ImageStatus::Pending);

    let kinds: Vec<_> = ed.store().painted().map(|(e, _)| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            crate::layers::model::LayerKind::Shape,
            crate::layers::model::LayerKind::Text
        ]
    );

    let out = ed.export_frame().unwrap();
    assert_eq!(out.image_url, "https://cdn/base.jpg");
    assert_eq!(out.overlay_elements[0].layout.z_index, Some(1));
    assert_eq!(out.text_elements[0].layout.z_index, Some(2));
}

#[test]
fn failed_import_changes_nothing() {
    let (mut ed, id) = editor_with_overlay();
    let bad = DOC.replace("\"height\": 500", "\"height\": 0");
    let doc = FrameDocument::from_json(&bad).unwrap();
    assert!(matches!(
        ed.import_frame(&doc),
        Err(LayerframeError::ImportParse(_))
    ));
    assert!(ed.store().contains(id));
    assert_eq!(ed.history().len(), 1);
}

#[test]
fn export_needs_hosted_base_image() {
    let (ed, _) = editor_with_overlay();
    assert!(matches!(
        ed.export_frame(),
        Err(LayerframeError::Validation(_))
    ));
}

#[test]
fn imported_shape_keeps_its_raster_through_resize() {
    let mut ed = editor();
    ed.import_frame(&FrameDocument::from_json(DOC).unwrap())
        .unwrap();
    let id = ed
        .store()
        .layers()
        .find_map(|l| l.as_shape())
        .map(|s| s.id)
        .unwrap();
    let shape = |ed: &EditorState| ed.layer(id).unwrap().as_shape().unwrap().clone();
    assert!(shape(&ed).hosted_raster);

    // Shape spans display (500, 250)..(700, 350); pull its south-east corner out by 40 px.
    ed.select(Some(id)).unwrap();
    assert!(matches!(
        ed.pointer_down(Point::new(700.0, 350.0)),
        PointerTarget::Handle(h, ResizeHandle::SE) if h == id
    ));
    ed.pointer_move(Point::new(740.0, 390.0), true);
    ed.pointer_up(Point::new(740.0, 390.0));

    let resized = shape(&ed);
    assert_eq!(resized.frame, Rect::new(500.0, 250.0, 740.0, 390.0));
    assert_eq!(resized.raster_url.as_deref(), Some("https://cdn/shape.png"));

    let out = ed.export_frame().unwrap();
    assert_eq!(
        out.overlay_elements[0].file_url.as_deref(),
        Some("https://cdn/shape.png")
    );
    assert!((out.overlay_elements[0].bounding_box.width - 0.24).abs() < 1e-9);
}

#[test]
fn imported_shape_is_never_redrawn_from_vector_fields() {
    let mut ed = editor();
    ed.import_frame(&FrameDocument::from_json(DOC).unwrap())
        .unwrap();
    let id = ed
        .store()
        .layers()
        .find_map(|l| l.as_shape())
        .map(|s| s.id)
        .unwrap();

    let mut pipeline = InMemoryAssetPipeline::new();
    assert!(matches!(
        ed.rasterize_shape_with(id, &mut pipeline),
        Err(LayerframeError::Validation(_))
    ));
    assert!(matches!(
        ed.update_layer(
            id,
            LayerPatch::Shape(ShapePatch {
                fill: Some("#000000".to_owned()),
                ..ShapePatch::default()
            }),
        ),
        Err(LayerframeError::Validation(_))
    ));
    let shape = ed.layer(id).unwrap().as_shape().unwrap();
    assert_eq!(shape.raster_url.as_deref(), Some("https://cdn/shape.png"));
    assert!(ed.history().is_empty());
}
