use std::io::Cursor;

use anyhow::Context;

use crate::crop::session::CropShape;
use crate::foundation::core::Rect;
use crate::foundation::error::{LayerframeError, LayerframeResult};

/// Integer pixel region of a source bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    /// Round a fractional rectangle outward-to-nearest and clip it to a `width x height` source.
    pub fn from_rect(r: Rect, width: u32, height: u32) -> LayerframeResult<Self> {
        let r = r.abs();
        if ![r.x0, r.y0, r.x1, r.y1].iter().all(|v| v.is_finite()) {
            return Err(LayerframeError::geometry("crop region must be finite"));
        }
        let x0 = r.x0.round().clamp(0.0, f64::from(width)) as u32;
        let y0 = r.y0.round().clamp(0.0, f64::from(height)) as u32;
        let x1 = r.x1.round().clamp(0.0, f64::from(width)) as u32;
        let y1 = r.y1.round().clamp(0.0, f64::from(height)) as u32;
        if x1 <= x0 || y1 <= y0 {
            return Err(LayerframeError::geometry(format!(
                "crop region {r:?} is empty inside a {width}x{height} source"
            )));
        }
        Ok(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Copy `region` out of `source`, masking everything outside the inscribed ellipse for circles.
pub fn rasterize_crop(
    source: &image::RgbaImage,
    region: PixelRegion,
    shape: CropShape,
) -> image::RgbaImage {
    let mut out =
        image::imageops::crop_imm(source, region.x, region.y, region.width, region.height)
            .to_image();
    if shape == CropShape::Circle {
        apply_circle_mask(&mut out);
    }
    out
}

fn apply_circle_mask(img: &mut image::RgbaImage) {
    let (w, h) = img.dimensions();
    let rx = f64::from(w) * 0.5;
    let ry = f64::from(h) * 0.5;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let dx = (f64::from(x) + 0.5 - rx) / rx;
        let dy = (f64::from(y) + 0.5 - ry) / ry;
        if dx * dx + dy * dy > 1.0 {
            px.0 = [0, 0, 0, 0];
        }
    }
}

/// Encode an RGBA bitmap as PNG bytes.
pub fn encode_png(img: &image::RgbaImage) -> LayerframeResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/crop/raster.rs"]
mod tests;
