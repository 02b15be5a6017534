use anyhow::Context;

use crate::foundation::error::{LayerframeError, LayerframeResult};

/// Decode an encoded raster (PNG, JPEG, ...) into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> LayerframeResult<image::RgbaImage> {
    if bytes.is_empty() {
        return Err(LayerframeError::decode("image payload is empty"));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| LayerframeError::decode(format!("decode image from memory: {e}")))?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return Err(LayerframeError::decode("decoded image has zero size"));
    }
    Ok(rgba)
}

pub fn parse_svg(bytes: &[u8]) -> LayerframeResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Convert premultiplied RGBA8 (as produced by `tiny_skia`) back to straight alpha in place.
pub(crate) fn demultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
