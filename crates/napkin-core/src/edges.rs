//! Edge Clusterer: groups raw line segments into logical edges, binds their
//! endpoints to the nearest nodes and attaches leftover text as edge labels.
//!
//! Clustering is greedy and order-dependent on purpose: segments are
//! processed in input order, a segment joins the first cluster whose seed it
//! is close and roughly parallel to, and is never reconsidered. This is a
//! partition, not an optimal one; downstream output depends on the pass
//! order staying exactly like this.

use indexmap::IndexSet;
use tracing::debug;

use crate::config::NapkinConfig;
use crate::geom::{Point, angular_difference};
use crate::model::{LabelElement, LogicalEdge, LogicalNode, RawSegment, default_direction};

#[derive(Debug, Clone, Copy)]
pub struct EdgeClusterer {
    cluster_distance: f64,
    angle_tolerance: f64,
    node_binding_distance: f64,
    label_binding_distance: f64,
}

impl EdgeClusterer {
    pub fn from_config(config: &NapkinConfig) -> Self {
        Self {
            cluster_distance: config.cluster_distance,
            angle_tolerance: config.cluster_angle_tolerance,
            node_binding_distance: config.node_binding_distance,
            label_binding_distance: config.label_binding_distance,
        }
    }

    /// Full clustering pass. Fewer than 2 nodes or no segments yields an
    /// empty list; nothing here errors.
    pub fn cluster(
        &self,
        segments: &[RawSegment],
        nodes: &[LogicalNode],
        leftover_labels: &[LabelElement],
    ) -> Vec<LogicalEdge> {
        if nodes.len() < 2 || segments.is_empty() {
            return Vec::new();
        }

        let clusters = self.cluster_segments(segments);
        debug!(
            segments = segments.len(),
            clusters = clusters.len(),
            "clustered raw segments"
        );

        let mut edges = Vec::new();
        for cluster in &clusters {
            let (a, b) = extreme_endpoints(cluster, segments);
            let source = self.bind_endpoint(nodes, a);
            let target = self.bind_endpoint(nodes, b);
            let (Some(source), Some(target)) = (source, target) else {
                continue;
            };
            if source == target {
                // Both ends resolved to one node: a stray stroke, not a
                // self-loop worth keeping.
                continue;
            }
            edges.push(LogicalEdge {
                source: source.to_string(),
                target: target.to_string(),
                label: String::new(),
                direction: default_direction(),
                confidence: 0.5,
                center: a.lerp(b, 0.5).into(),
            });
        }

        self.bind_labels(&mut edges, leftover_labels);
        dedup_edges(edges)
    }

    /// Greedy single-pass partition: each unused segment seeds a cluster and
    /// absorbs every later unused segment close and parallel to the seed.
    fn cluster_segments(&self, segments: &[RawSegment]) -> Vec<Vec<usize>> {
        let mut used = vec![false; segments.len()];
        let mut clusters = Vec::new();

        for i in 0..segments.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            let seed = &segments[i];
            let seed_angle = seed.angle();
            let mut cluster = vec![i];

            for (j, candidate) in segments.iter().enumerate().skip(i + 1) {
                if used[j] {
                    continue;
                }
                let close = seed.min_endpoint_distance(candidate) < self.cluster_distance;
                let parallel =
                    angular_difference(seed_angle, candidate.angle()) < self.angle_tolerance;
                if close && parallel {
                    used[j] = true;
                    cluster.push(j);
                }
            }
            clusters.push(cluster);
        }
        clusters
    }

    /// Nearest node by point-to-rectangle distance, within the cutoff. Ties
    /// keep the earlier node.
    fn bind_endpoint<'a>(&self, nodes: &'a [LogicalNode], p: Point) -> Option<&'a str> {
        let mut best: Option<(&str, f64)> = None;
        for node in nodes {
            let dist = node.bbox.distance_to(p);
            if dist >= self.node_binding_distance {
                continue;
            }
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((&node.id, dist));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Attach each label no node absorbed to the edge with the nearest
    /// midpoint, within the cutoff. Multiple labels on one edge concatenate
    /// in input order.
    fn bind_labels(&self, edges: &mut [LogicalEdge], leftover_labels: &[LabelElement]) {
        if edges.is_empty() {
            return;
        }
        for element in leftover_labels {
            let center = element.bbox.center();
            let mut best: Option<(usize, f64)> = None;
            for (idx, edge) in edges.iter().enumerate() {
                let dist = edge.center.to_point().distance_to(center);
                if dist >= self.label_binding_distance {
                    continue;
                }
                if best.is_none_or(|(_, d)| dist < d) {
                    best = Some((idx, dist));
                }
            }
            if let Some((idx, _)) = best {
                let label = &mut edges[idx].label;
                if label.is_empty() {
                    label.push_str(&element.text);
                } else {
                    label.push(' ');
                    label.push_str(&element.text);
                }
            }
        }
    }
}

/// The pair of member endpoints with maximum pairwise distance — the
/// diameter of the cluster's point set. Captures the true extremes of a
/// curved or zig-zag run, unlike a bounding-box corner pair.
fn extreme_endpoints(cluster: &[usize], segments: &[RawSegment]) -> (Point, Point) {
    let mut points = Vec::with_capacity(cluster.len() * 2);
    for &idx in cluster {
        let (p, q) = segments[idx].endpoints();
        points.push(p);
        points.push(q);
    }

    let mut best = (points[0], points[0]);
    let mut best_dist = -1.0;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let dist = points[i].distance_to(points[j]);
            if dist > best_dist {
                best_dist = dist;
                best = (points[i], points[j]);
            }
        }
    }
    best
}

/// Collapse edges sharing `(source, target, label)` onto the first
/// occurrence.
fn dedup_edges(edges: Vec<LogicalEdge>) -> Vec<LogicalEdge> {
    let mut seen: IndexSet<(String, String, String)> = IndexSet::new();
    edges
        .into_iter()
        .filter(|e| seen.insert((e.source.clone(), e.target.clone(), e.label.clone())))
        .collect()
}
