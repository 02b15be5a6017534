use super::*;
use crate::foundation::core::Size;

fn canvas() -> CoordinateTransform {
    CoordinateTransform::new(Size::new(500.0, 250.0), Size::new(1000.0, 500.0))
}

#[test]
fn classify_normalized_absolute_and_overshoot() {
    let n = BoundingBox::new(0.1, 0.2, 0.5, 0.5).classify(NORMALIZED_BOX_THRESHOLD);
    assert_eq!(n.space, BoxSpace::Normalized);
    assert!(!n.ambiguous);

    let overshoot = BoundingBox::new(0.1, 0.2, 1.02, 0.5).classify(NORMALIZED_BOX_THRESHOLD);
    assert_eq!(overshoot.space, BoxSpace::Normalized);
    assert!(overshoot.ambiguous);

    let abs = BoundingBox::new(10.0, 20.0, 300.0, 40.0).classify(NORMALIZED_BOX_THRESHOLD);
    assert_eq!(abs.space, BoxSpace::Absolute);
}

#[test]
fn non_finite_components_are_absolute() {
    let bb = BoundingBox::new(f64::NAN, 0.0, 0.5, 0.5);
    assert_eq!(bb.classify(NORMALIZED_BOX_THRESHOLD).space, BoxSpace::Absolute);
}

#[test]
fn box_to_natural_scales_normalized_boxes() {
    let (r, interp) = canvas().box_to_natural(
        BoundingBox::new(0.25, 0.5, 0.5, 0.1),
        NORMALIZED_BOX_THRESHOLD,
    );
    assert_eq!(interp.space, BoxSpace::Normalized);
    assert_eq!(r, Rect::new(250.0, 250.0, 750.0, 300.0));

    let (r, _) = canvas().box_to_natural(
        BoundingBox::new(10.0, 20.0, 30.0, 40.0),
        NORMALIZED_BOX_THRESHOLD,
    );
    assert_eq!(r, Rect::new(10.0, 20.0, 40.0, 60.0));
}

#[test]
fn box_to_percent_handles_both_spaces() {
    let (p, _) = canvas().box_to_percent(
        BoundingBox::new(0.1, 0.1, 0.2, 0.1),
        NORMALIZED_BOX_THRESHOLD,
    );
    assert!((p.x - 10.0).abs() < 1e-9);
    assert!((p.width - 20.0).abs() < 1e-9);

    let (p, _) = canvas().box_to_percent(
        BoundingBox::new(100.0, 50.0, 200.0, 100.0),
        NORMALIZED_BOX_THRESHOLD,
    );
    assert!((p.x - 10.0).abs() < 1e-9);
    assert!((p.height - 20.0).abs() < 1e-9);
}

#[test]
fn normalized_box_from_natural_rect() {
    let bb = canvas().natural_to_box(Rect::new(100.0, 50.0, 600.0, 300.0));
    assert_eq!(bb, BoundingBox::new(0.1, 0.1, 0.5, 0.5));
}

#[test]
fn document_box_falls_back_to_pixels_off_canvas() {
    let t = canvas();
    assert_eq!(
        t.natural_to_document_box(Rect::new(0.0, 0.0, 1000.0, 500.0)),
        BoundingBox::new(0.0, 0.0, 1.0, 1.0)
    );
    let bb = t.natural_to_document_box(Rect::new(1020.0, 10.0, 1100.0, 60.0));
    assert_eq!(bb, BoundingBox::new(1020.0, 10.0, 80.0, 50.0));
    assert_eq!(bb.classify(1.0).space, BoxSpace::Absolute);
}
