use super::*;

fn png(img: &image::RgbaImage) -> Vec<u8> {
    encode_png(img).unwrap()
}

#[test]
fn upload_issues_distinct_urls() {
    let mut p = InMemoryAssetPipeline::new();
    let a = p.upload(b"one").unwrap();
    let b = p.upload(b"two").unwrap();
    assert_ne!(a.url, b.url);
    assert!(a.url.starts_with("mem://asset/"));
    assert_eq!(p.get(&b.url), Some(&b"two"[..]));
    assert_eq!(p.len(), 2);
}

#[test]
fn empty_payload_is_an_upload_error() {
    let mut p = InMemoryAssetPipeline::new();
    assert!(matches!(p.upload(&[]), Err(LayerframeError::Upload(_))));
    assert!(p.is_empty());
}

#[test]
fn configured_failures_surface_typed_errors() {
    let mut p = InMemoryAssetPipeline::new()
        .fail_uploads(true)
        .fail_background_removal(true);
    assert!(matches!(p.upload(b"x"), Err(LayerframeError::Upload(_))));
    assert!(matches!(
        p.remove_background("mem://asset/1"),
        Err(LayerframeError::BackgroundRemoval(_))
    ));
}

#[test]
fn background_removal_keys_out_corner_color_and_keeps_original() {
    let mut img = image::RgbaImage::from_pixel(4, 4, image::Rgba([250, 250, 250, 255]));
    img.put_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
    let mut p = InMemoryAssetPipeline::new();
    let original = p.upload(&png(&img)).unwrap();

    let removed = p.remove_background(&original.url).unwrap();
    assert_ne!(removed.url, original.url);

    let out = decode_image(p.get(&removed.url).unwrap()).unwrap();
    assert_eq!(out.get_pixel(0, 0).0[3], 0);
    assert_eq!(out.get_pixel(2, 2).0, [10, 20, 30, 255]);
    assert_eq!(
        decode_image(p.get(&original.url).unwrap()).unwrap(),
        img,
        "source asset untouched"
    );
}

#[test]
fn unknown_url_is_a_background_removal_error() {
    let mut p = InMemoryAssetPipeline::new();
    assert!(matches!(
        p.remove_background("https://elsewhere/x.png"),
        Err(LayerframeError::BackgroundRemoval(_))
    ));
}

#[test]
fn fetch_returns_stored_bytes_or_decode_error() {
    let mut p = InMemoryAssetPipeline::new();
    let up = p.upload(b"abc").unwrap();
    assert_eq!(p.fetch(&up.url).unwrap(), b"abc".to_vec());
    assert!(matches!(p.fetch("mem://asset/999"), Err(LayerframeError::Decode(_))));
}
