use super::*;

fn order_of(n: u64) -> LayerOrder {
    let mut order = LayerOrder::new();
    for i in 1..=n {
        order.push(LayerKind::Text, LayerId(i));
    }
    order
}

fn ids(order: &LayerOrder) -> Vec<u64> {
    order.ids().map(|id| id.0).collect()
}

#[test]
fn push_appends_frontmost_and_rejects_duplicates() {
    let mut order = order_of(3);
    assert!(!order.push(LayerKind::Shape, LayerId(2)));
    assert_eq!(ids(&order), vec![1, 2, 3]);
    assert_eq!(order.z_index(LayerId(3)), Some(3));
}

#[test]
fn up_down_swap_neighbors() {
    let mut order = order_of(3);
    assert!(order.reorder(LayerId(1), Reorder::Up));
    assert_eq!(ids(&order), vec![2, 1, 3]);
    assert!(order.reorder(LayerId(3), Reorder::Down));
    assert_eq!(ids(&order), vec![2, 3, 1]);
    assert!(!order.reorder(LayerId(1), Reorder::Up));
    assert!(!order.reorder(LayerId(2), Reorder::Down));
}

#[test]
fn to_top_then_to_bottom_returns_to_index_zero() {
    let mut order = order_of(4);
    assert!(order.reorder(LayerId(2), Reorder::ToTop));
    assert_eq!(order.position(LayerId(2)), Some(3));
    assert!(order.reorder(LayerId(2), Reorder::ToBottom));
    assert_eq!(order.position(LayerId(2)), Some(0));

    let mut sorted = ids(&order);
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2, 3, 4]);
}

#[test]
fn every_reorder_is_a_permutation() {
    let mut order = order_of(5);
    let ops = [Reorder::Up, Reorder::Down, Reorder::ToTop, Reorder::ToBottom];
    for step in 0..40u64 {
        let id = LayerId(step % 5 + 1);
        order.reorder(id, ops[(step % 4) as usize]);
        let mut sorted = ids(&order);
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
    }
}

#[test]
fn unknown_id_is_ignored() {
    let mut order = order_of(2);
    assert!(!order.reorder(LayerId(99), Reorder::ToTop));
    assert!(!order.set_visible(LayerId(99), false));
    assert!(order.remove(LayerId(99)).is_none());
}

#[test]
fn resync_keeps_survivors_and_appends_new() {
    let mut order = order_of(4);
    order.reorder(LayerId(1), Reorder::ToTop);
    order.set_visible(LayerId(3), false);
    order.resync(vec![
        (LayerKind::Text, LayerId(1)),
        (LayerKind::Text, LayerId(3)),
        (LayerKind::Overlay, LayerId(9)),
        (LayerKind::Text, LayerId(4)),
    ]);
    assert_eq!(ids(&order), vec![3, 4, 1, 9]);
    assert!(!order.get(LayerId(3)).unwrap().visible);
    assert_eq!(order.get(LayerId(9)).unwrap().kind, LayerKind::Overlay);
}
