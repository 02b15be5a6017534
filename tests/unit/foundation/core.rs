use super::*;

#[test]
fn clamp_percent_bounds_and_non_finite() {
    assert_eq!(clamp_percent(-5.0), 0.0);
    assert_eq!(clamp_percent(150.0), 100.0);
    assert_eq!(clamp_percent(42.5), 42.5);
    assert_eq!(clamp_percent(f64::NAN), 0.0);
    assert_eq!(clamp_percent(f64::INFINITY), 0.0);
}

#[test]
fn percent_rect_new_clamps_components() {
    let r = PercentRect::new(-10.0, 120.0, 30.0, 200.0);
    assert_eq!(r, PercentRect::new(0.0, 100.0, 30.0, 100.0));
    assert!(r.is_within_bounds());
}

#[test]
fn percent_rect_try_new_rejects_degenerate_input() {
    assert!(PercentRect::try_new(0.0, 0.0, -1.0, 5.0).is_err());
    assert!(PercentRect::try_new(f64::NAN, 0.0, 1.0, 5.0).is_err());
    assert!(PercentRect::try_new(1.0, 2.0, 3.0, 4.0).is_ok());
}

#[test]
fn translate_clamps_to_canvas_minus_size() {
    let r = PercentRect::new(10.0, 10.0, 20.0, 10.0);
    let moved = r.translated_within_canvas(Vec2::new(90.0, -50.0));
    assert_eq!(moved.x, 80.0);
    assert_eq!(moved.y, 0.0);
    assert_eq!(moved.width, 20.0);

    let in_bounds = r.translated_within_canvas(Vec2::new(50.0, 5.0));
    assert_eq!(in_bounds.x, 60.0);
    assert_eq!(in_bounds.y, 15.0);
}

#[test]
fn rect_xywh_normalizes_negative_extent() {
    let r = rect_xywh(10.0, 10.0, -4.0, 6.0);
    assert_eq!(r.x0, 6.0);
    assert_eq!(r.width(), 4.0);
    assert_eq!(r.height(), 6.0);
}
