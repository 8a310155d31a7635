use super::{prim, text};
use crate::geom::BBox;
use crate::labels::assign_labels;
use crate::merge::{MergeMode, NodeMerger};
use crate::model::ShapeKind;

#[test]
fn empty_input_yields_empty_output() {
    let merger = NodeMerger::new(MergeMode::Overlap, 0.4);
    assert!(merger.merge(&[]).is_empty());
}

#[test]
fn single_detection_becomes_single_node() {
    let merger = NodeMerger::new(MergeMode::Overlap, 0.4);
    let nodes = merger.merge(&[prim("node_1", ShapeKind::Rectangle, 10.0, 20.0, 100.0, 50.0)]);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, "logical_node_1");
    assert_eq!(nodes[0].raw_ids, vec!["node_1".to_string()]);
    assert_eq!(nodes[0].bbox, BBox::new(10.0, 20.0, 100.0, 50.0));
}

#[test]
fn low_iou_boxes_stay_separate() {
    // IoU of these two is ~0.14, below the 0.4 threshold.
    let merger = NodeMerger::new(MergeMode::Overlap, 0.4);
    let nodes = merger.merge(&[
        prim("node_1", ShapeKind::Rectangle, 0.0, 0.0, 100.0, 100.0),
        prim("node_2", ShapeKind::Rectangle, 50.0, 50.0, 100.0, 100.0),
    ]);
    assert_eq!(nodes.len(), 2);
}

#[test]
fn high_iou_boxes_merge_into_union_bbox() {
    // IoU here is 10000/16000 = 0.625.
    let merger = NodeMerger::new(MergeMode::Overlap, 0.4);
    let nodes = merger.merge(&[
        prim("node_1", ShapeKind::Rectangle, 0.0, 0.0, 100.0, 100.0),
        prim("node_2", ShapeKind::Rectangle, 0.0, 0.0, 100.0, 160.0),
    ]);
    assert_eq!(nodes.len(), 1);
    let merged = &nodes[0];
    assert_eq!(merged.bbox, BBox::new(0.0, 0.0, 100.0, 160.0));
    assert_eq!(merged.area, 16000.0);
    assert_eq!(merged.center.x, 50.0);
    assert_eq!(merged.center.y, 80.0);
    assert_eq!(
        merged.raw_ids,
        vec!["node_1".to_string(), "node_2".to_string()]
    );
}

#[test]
fn representative_shape_comes_from_largest_member() {
    let mut big = prim("node_1", ShapeKind::Rectangle, 0.0, 0.0, 100.0, 100.0);
    big.circularity = 0.3;
    big.solidity = 0.9;
    let small = prim("node_2", ShapeKind::Diamond, 10.0, 10.0, 80.0, 80.0);

    let merger = NodeMerger::new(MergeMode::Overlap, 0.4);
    let nodes = merger.merge(&[small.clone(), big.clone()]);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].shape, ShapeKind::Rectangle);
    assert_eq!(nodes[0].circularity, 0.3);
    assert_eq!(nodes[0].solidity, 0.9);
}

#[test]
fn proximity_merge_is_transitive() {
    // Chain: 1-2 and 2-3 are within 45 px, 1-3 is 80 px apart; all three
    // still collapse into one node.
    let merger = NodeMerger::new(MergeMode::Proximity, 45.0);
    let nodes = merger.merge(&[
        prim("node_1", ShapeKind::Rectangle, 5.0, 5.0, 10.0, 10.0),
        prim("node_2", ShapeKind::Rectangle, 45.0, 5.0, 10.0, 10.0),
        prim("node_3", ShapeKind::Rectangle, 85.0, 5.0, 10.0, 10.0),
    ]);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].raw_ids.len(), 3);
    assert_eq!(nodes[0].bbox, BBox::new(5.0, 5.0, 90.0, 10.0));
}

#[test]
fn merge_is_idempotent_on_its_own_output() {
    let merger = NodeMerger::new(MergeMode::Proximity, 50.0);
    let raw = vec![
        prim("node_1", ShapeKind::Rectangle, 0.0, 0.0, 40.0, 40.0),
        prim("node_2", ShapeKind::Rectangle, 10.0, 10.0, 40.0, 40.0),
        prim("node_3", ShapeKind::Oval, 300.0, 300.0, 60.0, 40.0),
    ];
    let first = merger.merge(&raw);
    assert_eq!(first.len(), 2);

    let second = merger.remerge(&first);
    assert_eq!(second.len(), first.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.bbox, b.bbox);
        assert_eq!(a.center, b.center);
    }
}

#[test]
fn remerge_carries_labels_and_raw_ids() {
    let merger = NodeMerger::new(MergeMode::Proximity, 50.0);
    let mut nodes = merger.merge(&[
        prim("node_1", ShapeKind::Rectangle, 0.0, 0.0, 100.0, 60.0),
        prim("node_2", ShapeKind::Oval, 400.0, 0.0, 100.0, 60.0),
    ]);
    assign_labels(&mut nodes, &[text("Validate", 20.0, 20.0, 60.0, 20.0)], 5.0);
    assert_eq!(nodes[0].labels, vec!["Validate".to_string()]);

    let remerged = merger.remerge(&nodes);
    assert_eq!(remerged.len(), 2);
    assert_eq!(remerged[0].labels, vec!["Validate".to_string()]);
    assert_eq!(remerged[0].raw_ids, vec!["logical_node_1".to_string(), "node_1".to_string()]);
}

#[test]
fn deterministic_id_assignment_follows_input_order() {
    let merger = NodeMerger::new(MergeMode::Proximity, 30.0);
    let nodes = merger.merge(&[
        prim("node_a", ShapeKind::Rectangle, 500.0, 0.0, 20.0, 20.0),
        prim("node_b", ShapeKind::Rectangle, 0.0, 0.0, 20.0, 20.0),
        prim("node_c", ShapeKind::Rectangle, 250.0, 0.0, 20.0, 20.0),
    ]);
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["logical_node_1", "logical_node_2", "logical_node_3"]);
    assert_eq!(nodes[0].raw_ids, vec!["node_a".to_string()]);
    assert_eq!(nodes[1].raw_ids, vec!["node_b".to_string()]);
}
