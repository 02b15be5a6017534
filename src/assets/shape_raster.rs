use std::fmt::Write as _;

use crate::assets::decode::{demultiply_rgba8_in_place, parse_svg};
use crate::crop::raster::encode_png;
use crate::foundation::core::finite_or;
use crate::foundation::error::{LayerframeError, LayerframeResult};
use crate::layers::model::{BorderStyle, ShapeKind, ShapeLayer};

const MAX_DIM: u32 = 16_384;

/// Raster size for `shape`: its natural frame grown to the bounding box of the rotated frame.
pub fn raster_size(shape: &ShapeLayer) -> LayerframeResult<(u32, u32)> {
    let (w, h) = (shape.frame.width(), shape.frame.height());
    let (bw, bh) = rotated_extent(w, h, shape.rotation_deg);
    let to_px = |v: f64| -> LayerframeResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(LayerframeError::geometry("shape has an empty frame"));
        }
        let px = v.ceil().max(1.0);
        if px > f64::from(MAX_DIM) {
            return Err(LayerframeError::geometry(format!(
                "shape raster too large: {v} px (max {MAX_DIM})"
            )));
        }
        Ok(px as u32)
    };
    Ok((to_px(bw)?, to_px(bh)?))
}

fn rotated_extent(w: f64, h: f64, deg: f64) -> (f64, f64) {
    let rad = finite_or(deg, 0.0).to_radians();
    let (s, c) = (rad.sin().abs(), rad.cos().abs());
    (w * c + h * s, w * s + h * c)
}

/// SVG document describing `shape` at natural-pixel scale.
pub fn shape_svg(shape: &ShapeLayer) -> LayerframeResult<String> {
    let (cw, ch) = raster_size(shape)?;
    let (w, h) = (shape.frame.width(), shape.frame.height());
    let stroke_w = finite_or(shape.border.width, 0.0).max(0.0);
    let inset = stroke_w * 0.5;
    let fill = xml_attr(&shape.fill);
    let stroke = if stroke_w > 0.0 {
        let mut s = format!(
            r#" stroke="{}" stroke-width="{stroke_w:.3}""#,
            xml_attr(&shape.border.color)
        );
        match shape.border.style {
            BorderStyle::Solid => {}
            BorderStyle::Dashed => {
                let _ = write!(
                    s,
                    r#" stroke-dasharray="{:.3} {:.3}""#,
                    stroke_w * 3.0,
                    stroke_w * 2.0
                );
            }
            BorderStyle::Dotted => {
                let _ = write!(
                    s,
                    r#" stroke-dasharray="{stroke_w:.3} {stroke_w:.3}""#
                );
            }
        }
        s
    } else {
        String::new()
    };

    let body = match shape.kind {
        ShapeKind::Rectangle | ShapeKind::Square => {
            let (sw, sh) = if shape.kind == ShapeKind::Square {
                let side = w.min(h);
                (side, side)
            } else {
                (w, h)
            };
            let x = (w - sw) * 0.5 + inset;
            let y = (h - sh) * 0.5 + inset;
            let r = finite_or(shape.corner_radius, 0.0).max(0.0);
            format!(
                r#"<rect x="{x:.3}" y="{y:.3}" width="{:.3}" height="{:.3}" rx="{r:.3}" fill="{fill}"{stroke}/>"#,
                (sw - stroke_w).max(0.0),
                (sh - stroke_w).max(0.0),
            )
        }
        ShapeKind::Circle => format!(
            r#"<ellipse cx="{:.3}" cy="{:.3}" rx="{:.3}" ry="{:.3}" fill="{fill}"{stroke}/>"#,
            w * 0.5,
            h * 0.5,
            ((w - stroke_w) * 0.5).max(0.0),
            ((h - stroke_w) * 0.5).max(0.0),
        ),
        ShapeKind::Triangle => format!(
            r#"<polygon points="{:.3},{inset:.3} {:.3},{:.3} {inset:.3},{:.3}" fill="{fill}"{stroke}/>"#,
            w * 0.5,
            w - inset,
            h - inset,
            h - inset,
        ),
        ShapeKind::Line => {
            let lw = if stroke_w > 0.0 { stroke_w } else { h.max(1.0) };
            format!(
                r#"<line x1="0" y1="{y:.3}" x2="{w:.3}" y2="{y:.3}" stroke="{fill}" stroke-width="{lw:.3}"/>"#,
                y = h * 0.5,
            )
        }
        ShapeKind::Curve => {
            let lw = stroke_w.max(2.0);
            let half = lw * 0.5;
            let base = h - half;
            // Quadratic whose apex touches the top edge.
            let ctrl = 2.0 * half - base;
            format!(
                r#"<path d="M {half:.3} {base:.3} Q {:.3} {ctrl:.3} {:.3} {base:.3}" fill="none" stroke="{fill}" stroke-width="{lw:.3}" stroke-linecap="round"/>"#,
                w * 0.5,
                w - half,
            )
        }
    };

    let opacity = finite_or(shape.opacity, 1.0).clamp(0.0, 1.0);
    let rotation = finite_or(shape.rotation_deg, 0.0);
    let dx = (f64::from(cw) - w) * 0.5;
    let dy = (f64::from(ch) - h) * 0.5;
    Ok(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{cw}" height="{ch}" viewBox="0 0 {cw} {ch}"><g opacity="{opacity:.4}" transform="translate({dx:.3} {dy:.3}) rotate({rotation:.3} {:.3} {:.3})">{body}</g></svg>"#,
        w * 0.5,
        h * 0.5,
    ))
}

/// Render `shape` into a straight-alpha RGBA bitmap.
pub fn render_shape(shape: &ShapeLayer) -> LayerframeResult<image::RgbaImage> {
    let svg = shape_svg(shape)?;
    let tree = parse_svg(svg.as_bytes())?;
    let (w, h) = raster_size(shape)?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| LayerframeError::geometry("failed to allocate shape pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    let mut data = pixmap.take();
    demultiply_rgba8_in_place(&mut data);
    image::RgbaImage::from_raw(w, h, data)
        .ok_or_else(|| LayerframeError::geometry("shape pixmap size mismatch"))
}

/// Render `shape` and encode it as PNG, ready for upload.
#[tracing::instrument(skip(shape), fields(id = %shape.id, kind = ?shape.kind))]
pub fn rasterize_shape(shape: &ShapeLayer) -> LayerframeResult<Vec<u8>> {
    encode_png(&render_shape(shape)?)
}

fn xml_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/shape_raster.rs"]
mod tests;
