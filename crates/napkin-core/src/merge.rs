//! Node Merger: groups fragmented raw shape detections into logical nodes.
//!
//! Two raw detections are adjacent when their boxes overlap (IoU above
//! threshold) or their centers are close (proximity mode). Connected
//! components of that relation become one `LogicalNode` each, so merging is
//! transitive: A-B and B-C adjacent puts A, B, C in the same node even when
//! A-C are not directly adjacent.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::config::NapkinConfig;
use crate::geom::{BBox, Point};
use crate::model::{LogicalNode, RawPrimitive, ShapeKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Bounding-box IoU above the threshold.
    Overlap,
    /// Euclidean center distance below the threshold (px).
    #[default]
    Proximity,
}

#[derive(Debug, Clone, Copy)]
pub struct NodeMerger {
    mode: MergeMode,
    threshold: f64,
}

/// Common view over raw primitives and already-merged nodes, so the merger
/// can be re-applied to its own output.
struct MergeItem<'a> {
    id: &'a str,
    shape: ShapeKind,
    bbox: BBox,
    center: Point,
    area: f64,
    circularity: f64,
    solidity: f64,
    labels: &'a [String],
    raw_ids: &'a [String],
}

impl NodeMerger {
    pub fn new(mode: MergeMode, threshold: f64) -> Self {
        Self { mode, threshold }
    }

    pub fn from_config(config: &NapkinConfig) -> Self {
        Self::new(config.merge_mode, config.merge_threshold())
    }

    /// Merge raw detections into logical nodes. Empty input yields empty
    /// output; a single detection becomes a single-member node.
    pub fn merge(&self, raw_nodes: &[RawPrimitive]) -> Vec<LogicalNode> {
        let items: Vec<MergeItem<'_>> = raw_nodes
            .iter()
            .map(|n| MergeItem {
                id: &n.id,
                shape: n.shape,
                bbox: n.bbox,
                center: n.center_point(),
                area: n.area,
                circularity: n.circularity,
                solidity: n.solidity,
                labels: &[],
                raw_ids: &[],
            })
            .collect();
        self.merge_items(&items)
    }

    /// Re-apply merging to logical nodes, carrying their labels and member
    /// ids along. `merge` followed by `remerge` with the same threshold is
    /// idempotent: merged boxes are either disjoint enough or far enough
    /// apart to not group again.
    pub fn remerge(&self, nodes: &[LogicalNode]) -> Vec<LogicalNode> {
        let items: Vec<MergeItem<'_>> = nodes
            .iter()
            .map(|n| MergeItem {
                id: &n.id,
                shape: n.shape,
                bbox: n.bbox,
                center: n.center.to_point(),
                area: n.area,
                circularity: n.circularity,
                solidity: n.solidity,
                labels: &n.labels,
                raw_ids: &n.raw_ids,
            })
            .collect();
        self.merge_items(&items)
    }

    fn adjacent(&self, a: &MergeItem<'_>, b: &MergeItem<'_>) -> bool {
        match self.mode {
            MergeMode::Overlap => a.bbox.iou(&b.bbox) > self.threshold,
            MergeMode::Proximity => a.center.distance_to(b.center) < self.threshold,
        }
    }

    fn merge_items(&self, items: &[MergeItem<'_>]) -> Vec<LogicalNode> {
        if items.is_empty() {
            return Vec::new();
        }

        let n = items.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                if self.adjacent(&items[i], &items[j]) {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }

        // Connected components via an explicit stack, in input order so node
        // ids come out deterministic.
        let mut visited = vec![false; n];
        let mut logical_nodes = Vec::new();
        for seed in 0..n {
            if visited[seed] {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![seed];
            visited[seed] = true;
            while let Some(current) = stack.pop() {
                component.push(current);
                for &neighbor in &adjacency[current] {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        stack.push(neighbor);
                    }
                }
            }
            let id = format!("logical_node_{}", logical_nodes.len() + 1);
            logical_nodes.push(consolidate(id, &component, items));
        }
        logical_nodes
    }
}

/// Collapse one component into a `LogicalNode`. The union box defines bbox,
/// center and area; shape descriptors come from the largest-area member,
/// since small fragments are usually noise or partial strokes.
fn consolidate(id: String, component: &[usize], items: &[MergeItem<'_>]) -> LogicalNode {
    let mut union = items[component[0]].bbox;
    for &idx in &component[1..] {
        union = union.union(&items[idx].bbox);
    }

    let mut primary = &items[component[0]];
    for &idx in &component[1..] {
        if items[idx].area > primary.area {
            primary = &items[idx];
        }
    }

    let mut raw_ids: IndexSet<String> = IndexSet::new();
    let mut labels: IndexSet<String> = IndexSet::new();
    for &idx in component {
        let item = &items[idx];
        raw_ids.insert(item.id.to_string());
        for nested in item.raw_ids {
            raw_ids.insert(nested.clone());
        }
        for label in item.labels {
            labels.insert(label.clone());
        }
    }

    let aspect_ratio = if union.h > 0.0 { union.w / union.h } else { 0.0 };

    LogicalNode {
        id,
        raw_ids: raw_ids.into_iter().collect(),
        shape: primary.shape,
        bbox: union,
        center: union.center().into(),
        area: union.area(),
        circularity: primary.circularity,
        solidity: primary.solidity,
        aspect_ratio,
        labels: labels.into_iter().collect(),
        semantic_class: None,
        confidence: 0.0,
    }
}
