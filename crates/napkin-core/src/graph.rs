//! Graph Builder: assembles the directed graph, checks flowchart
//! well-formedness and renders the BFS narrative.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

use crate::geom::BBox;
use crate::model::{LogicalEdge, LogicalNode, SemanticClass, ShapeKind};

/// One vertex of the final graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub semantic: SemanticClass,
    pub shape: ShapeKind,
    pub bbox: BBox,
    pub confidence: f64,
    #[serde(skip)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: String,
    pub direction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphMetadata {
    pub node_count: usize,
    pub edge_count: usize,
    pub node_reduction_pct: f64,
    pub sanity_violations: Vec<String>,
    pub start_nodes: Vec<String>,
    pub end_nodes: Vec<String>,
}

/// The serialized output contract of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct GraphOutput {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: GraphMetadata,
    pub narrative: Vec<String>,
}

/// Directed graph over logical nodes. Insertion order is preserved
/// everywhere so identical inputs produce byte-identical output.
#[derive(Debug, Clone, Default)]
pub struct DiagramGraph {
    nodes: IndexMap<String, GraphNode>,
    edges: Vec<GraphEdge>,
}

impl DiagramGraph {
    /// Build from classified nodes and resolved edges. Edges referencing a
    /// missing vertex are dropped; upstream should prevent them, but a
    /// malformed diagram is expected input, not a fault.
    pub fn build(nodes: &[LogicalNode], edges: &[LogicalEdge]) -> Self {
        let mut graph = DiagramGraph::default();

        for node in nodes {
            graph.nodes.insert(
                node.id.clone(),
                GraphNode {
                    id: node.id.clone(),
                    label: node.label_text(),
                    semantic: node.semantic_class.unwrap_or(SemanticClass::Connector),
                    shape: node.shape,
                    bbox: node.bbox,
                    confidence: node.confidence,
                    labels: node.labels.clone(),
                },
            );
        }

        let mut dropped = 0usize;
        for edge in edges {
            if graph.nodes.contains_key(&edge.source) && graph.nodes.contains_key(&edge.target) {
                graph.edges.push(GraphEdge {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    label: edge.label.clone(),
                    direction: edge.direction.clone(),
                });
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(dropped, "dropped edges referencing missing vertices");
        }

        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.target == id).count()
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.source == id).count()
    }

    /// Vertices with no incoming edge, in insertion order.
    pub fn start_nodes(&self) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|id| self.in_degree(id) == 0)
            .cloned()
            .collect()
    }

    /// Vertices with no outgoing edge, in insertion order.
    pub fn end_nodes(&self) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|id| self.out_degree(id) == 0)
            .cloned()
            .collect()
    }

    /// Successor lists in insertion order.
    pub fn adjacency_list(&self) -> IndexMap<String, Vec<String>> {
        self.nodes
            .keys()
            .map(|id| {
                let successors = self
                    .edges
                    .iter()
                    .filter(|e| &e.source == id)
                    .map(|e| e.target.clone())
                    .collect();
                (id.clone(), successors)
            })
            .collect()
    }

    /// Flowchart well-formedness checks. Violations are reported as data,
    /// never raised: a malformed flowchart is expected input.
    pub fn sanity_violations(&self, decision_min_out_degree: usize) -> Vec<String> {
        let mut violations = Vec::new();
        for (id, node) in &self.nodes {
            match node.semantic {
                SemanticClass::Start => {
                    let incoming = self.in_degree(id);
                    if incoming > 0 {
                        violations.push(format!(
                            "Start node '{id}' has {incoming} incoming edge(s); expected 0"
                        ));
                    }
                }
                SemanticClass::End => {
                    let outgoing = self.out_degree(id);
                    if outgoing > 0 {
                        violations.push(format!(
                            "End node '{id}' has {outgoing} outgoing edge(s); expected 0"
                        ));
                    }
                }
                SemanticClass::Decision => {
                    let outgoing = self.out_degree(id);
                    if outgoing < decision_min_out_degree {
                        violations.push(format!(
                            "Decision node '{id}' has only {outgoing} outgoing edge(s); \
                             expected at least {decision_min_out_degree}"
                        ));
                    }
                }
                _ => {}
            }
        }
        violations
    }

    /// Step-by-step rendering of the control flow: FIFO BFS from every
    /// in-degree-0 vertex (or the first vertex when none exists), one
    /// numbered sentence per visited vertex, plus a branch line per labeled
    /// outgoing edge of a decision.
    pub fn narrative(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.nodes.is_empty() {
            return lines;
        }

        let mut seeds = self.start_nodes();
        if seeds.is_empty() {
            // Cycles only; seed from the first node so the walk still starts.
            if let Some(first) = self.nodes.keys().next() {
                seeds.push(first.clone());
            }
        }

        let mut queue: VecDeque<String> = seeds.into();
        let mut visited: FxHashSet<String> = queue.iter().cloned().collect();
        let mut step = 0usize;

        while let Some(id) = queue.pop_front() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            step += 1;
            lines.push(format!("Step {step}: {}", self.step_sentence(node)));

            if node.semantic == SemanticClass::Decision {
                for edge in self.edges.iter().filter(|e| e.source == id) {
                    if !edge.label.is_empty() {
                        lines.push(format!(
                            "If '{}', proceed to '{}'",
                            edge.label,
                            self.display_text(&edge.target)
                        ));
                    }
                }
            }

            for edge in self.edges.iter().filter(|e| e.source == id) {
                if visited.insert(edge.target.clone()) {
                    queue.push_back(edge.target.clone());
                }
            }
        }
        lines
    }

    fn step_sentence(&self, node: &GraphNode) -> String {
        let text = if node.label.is_empty() {
            format!("Step {}", node.id)
        } else {
            node.label.clone()
        };
        match node.semantic {
            SemanticClass::Start => format!("Start the process: {text}"),
            SemanticClass::End => format!("End of process: {text}"),
            SemanticClass::Decision => format!("Decision point: {text}"),
            _ => format!("Perform action: {text}"),
        }
    }

    fn display_text(&self, id: &str) -> String {
        match self.nodes.get(id) {
            Some(node) if !node.label.is_empty() => node.label.clone(),
            _ => id.to_string(),
        }
    }

    /// Finalize into the output contract. `raw_node_count` feeds the
    /// reduction metric; zero raw nodes report 0% reduction.
    pub fn into_output(self, raw_node_count: usize, decision_min_out_degree: usize) -> GraphOutput {
        let node_count = self.node_count();
        let node_reduction_pct = if raw_node_count > 0 {
            let pct = (raw_node_count - node_count.min(raw_node_count)) as f64
                / raw_node_count as f64
                * 100.0;
            (pct * 10.0).round() / 10.0
        } else {
            0.0
        };

        let metadata = GraphMetadata {
            node_count,
            edge_count: self.edge_count(),
            node_reduction_pct,
            sanity_violations: self.sanity_violations(decision_min_out_degree),
            start_nodes: self.start_nodes(),
            end_nodes: self.end_nodes(),
        };
        let narrative = self.narrative();

        GraphOutput {
            nodes: self.nodes.into_values().collect(),
            edges: self.edges,
            metadata,
            narrative,
        }
    }
}
