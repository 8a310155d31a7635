//! Label Assigner: attaches recognized text tokens to the node containing
//! them, in reading order.

use rustc_hash::FxHashSet;

use crate::model::{LabelElement, LogicalNode};

/// Assign each label element to the first node whose margin-expanded box
/// contains the label's center; a label is absorbed by at most one node.
/// Returns the elements no node contained, for later edge-label binding.
///
/// Labels within a node are sorted top-to-bottom, then left-to-right; ties
/// beyond that keep input order. Duplicate text within one node is skipped.
pub fn assign_labels(
    nodes: &mut [LogicalNode],
    elements: &[LabelElement],
    margin: f64,
) -> Vec<LabelElement> {
    let mut absorbed = vec![false; elements.len()];

    for node in nodes.iter_mut() {
        let expanded = node.bbox.expand(margin);

        let mut contained: Vec<(usize, &LabelElement)> = elements
            .iter()
            .enumerate()
            .filter(|(idx, element)| {
                !absorbed[*idx] && expanded.contains(element.bbox.center())
            })
            .collect();

        // Reading order; sort is stable so residual ties keep input order.
        contained.sort_by(|(_, a), (_, b)| {
            a.bbox
                .y
                .total_cmp(&b.bbox.y)
                .then_with(|| a.bbox.x.total_cmp(&b.bbox.x))
        });

        let mut seen: FxHashSet<String> = node.labels.iter().cloned().collect();
        for (idx, element) in contained {
            absorbed[idx] = true;
            if seen.insert(element.text.clone()) {
                node.labels.push(element.text.clone());
            }
        }
    }

    elements
        .iter()
        .zip(absorbed)
        .filter(|(_, taken)| !taken)
        .map(|(element, _)| element.clone())
        .collect()
}
