use super::*;

const T: OpTarget = OpTarget::Layer(LayerId(7));

#[test]
fn resolve_returns_payload_once() {
    let mut ops = PendingOps::new();
    let t = ops.issue(OpKind::CropUpload, T, "plan");
    assert!(ops.is_current(&t));
    assert_eq!(ops.in_flight(T), Some(OpKind::CropUpload));
    assert_eq!(ops.payload(&t), Some(&"plan"));
    assert_eq!(ops.resolve(&t), Some("plan"));
    assert_eq!(ops.resolve(&t), None);
    assert!(ops.is_empty());
}

#[test]
fn latest_request_per_target_wins() {
    let mut ops = PendingOps::new();
    let crop = ops.issue(OpKind::CropUpload, T, 1);
    let removal = ops.issue(OpKind::BackgroundRemoval, T, 2);
    assert!(!ops.is_current(&crop));
    assert_eq!(ops.resolve(&crop), None, "stale crop result dropped");
    assert_eq!(ops.resolve(&removal), Some(2));
}

#[test]
fn targets_are_independent() {
    let mut ops = PendingOps::new();
    let a = ops.issue(OpKind::ShapeRaster, OpTarget::Layer(LayerId(1)), ());
    let b = ops.issue(OpKind::ImageLoad, OpTarget::BaseImage, ());
    assert_eq!(ops.len(), 2);
    assert!(ops.is_current(&a));
    assert!(ops.is_current(&b));
    assert!(b.generation() > a.generation());
}

#[test]
fn forget_makes_result_stale() {
    let mut ops = PendingOps::new();
    let t = ops.issue(OpKind::BackgroundRemoval, T, ());
    assert_eq!(ops.forget(T), Some(OpKind::BackgroundRemoval));
    assert_eq!(ops.resolve(&t), None);

    // A re-issued request for the same target is not confused with the forgotten one.
    let again = ops.issue(OpKind::BackgroundRemoval, T, ());
    assert_eq!(ops.resolve(&t), None);
    assert!(ops.is_current(&again));
}
