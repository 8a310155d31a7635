use super::{lnode, text};
use crate::labels::assign_labels;
use crate::model::{SemanticClass, ShapeKind};

fn bare_node(id: &str, x: f64, y: f64, w: f64, h: f64) -> crate::model::LogicalNode {
    let mut node = lnode(id, ShapeKind::Rectangle, SemanticClass::Process, &[], x, y, w, h);
    node.semantic_class = None;
    node
}

#[test]
fn labels_sort_in_reading_order() {
    let mut nodes = vec![bare_node("n1", 0.0, 0.0, 200.0, 100.0)];
    let elements = vec![
        text("world", 60.0, 40.0, 40.0, 20.0),
        text("title", 10.0, 5.0, 40.0, 10.0),
        text("hello", 10.0, 38.0, 40.0, 20.0),
    ];
    let leftover = assign_labels(&mut nodes, &elements, 5.0);
    assert!(leftover.is_empty());
    assert_eq!(
        nodes[0].labels,
        vec!["title".to_string(), "hello".to_string(), "world".to_string()]
    );
}

#[test]
fn containment_uses_expanded_margin() {
    let mut nodes = vec![bare_node("n1", 0.0, 0.0, 100.0, 100.0)];
    // Center at (102, 50): outside the box, inside the 5 px margin.
    let inside = text("near", 97.0, 45.0, 10.0, 10.0);
    // Center at (106, 50): outside even the expanded box.
    let outside = text("far", 101.0, 45.0, 10.0, 10.0);

    let leftover = assign_labels(&mut nodes, &[inside, outside], 5.0);
    assert_eq!(nodes[0].labels, vec!["near".to_string()]);
    assert_eq!(leftover.len(), 1);
    assert_eq!(leftover[0].text, "far");
}

#[test]
fn label_is_absorbed_by_at_most_one_node() {
    let mut nodes = vec![
        bare_node("n1", 0.0, 0.0, 100.0, 100.0),
        bare_node("n2", 50.0, 0.0, 100.0, 100.0),
    ];
    let elements = vec![text("shared", 65.0, 40.0, 20.0, 20.0)];
    let leftover = assign_labels(&mut nodes, &elements, 5.0);
    assert!(leftover.is_empty());
    assert_eq!(nodes[0].labels, vec!["shared".to_string()]);
    assert!(nodes[1].labels.is_empty());
}

#[test]
fn duplicate_text_within_a_node_is_skipped() {
    let mut nodes = vec![bare_node("n1", 0.0, 0.0, 200.0, 100.0)];
    let elements = vec![
        text("Yes", 10.0, 10.0, 30.0, 15.0),
        text("Yes", 100.0, 10.0, 30.0, 15.0),
    ];
    let leftover = assign_labels(&mut nodes, &elements, 5.0);
    assert!(leftover.is_empty());
    assert_eq!(nodes[0].labels, vec!["Yes".to_string()]);
}

#[test]
fn unrelated_text_is_returned_as_leftover() {
    let mut nodes = vec![bare_node("n1", 0.0, 0.0, 50.0, 50.0)];
    let elements = vec![text("Yes", 500.0, 500.0, 30.0, 15.0)];
    let leftover = assign_labels(&mut nodes, &elements, 5.0);
    assert!(nodes[0].labels.is_empty());
    assert_eq!(leftover.len(), 1);
    assert_eq!(leftover[0].text, "Yes");
}
