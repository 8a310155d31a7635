#![forbid(unsafe_code)]

//! Sketch-to-flowchart core (headless).
//!
//! Takes the noisy, redundant low-level detections extracted from a raster
//! diagram image — shape contours, Hough line segments, OCR text tokens —
//! and deterministically reduces them to a small directed graph of typed
//! flowchart nodes with labeled edges, well-formedness checks and a
//! human-readable narrative.
//!
//! Design goals:
//! - deterministic, testable outputs (id assignment, ordering, narrative)
//! - per-run state only: one `analyze` call never shares mutable state with
//!   another, so concurrent runs stay isolated
//! - malformed diagrams are expected input; they degrade to partial output
//!   with violations recorded as data, never as errors

pub mod classify;
pub mod config;
pub mod edges;
pub mod error;
pub mod geom;
pub mod graph;
pub mod labels;
pub mod merge;
pub mod model;

use serde::Serialize;
use tracing::debug;

pub use classify::{KeywordClassifier, LexiconClassifier, SemanticClassifier, TextClassifier};
pub use config::NapkinConfig;
pub use edges::EdgeClusterer;
pub use error::{Error, Result};
pub use graph::{DiagramGraph, GraphOutput};
pub use merge::{MergeMode, NodeMerger};
pub use model::{
    DetectionInput, LabelElement, LogicalEdge, LogicalNode, RawPrimitive, RawSegment,
    SemanticClass, ShapeKind,
};

/// Result of one full pipeline run: the graph output contract plus
/// raw-vs-logical counts for observability.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub graph: GraphOutput,
    pub raw_node_count: usize,
    pub raw_segment_count: usize,
    pub text_element_count: usize,
    pub logical_node_count: usize,
    pub logical_edge_count: usize,
}

/// Pipeline engine. Holds only read-only configuration and the classifier;
/// every `analyze` call allocates its own working state.
#[derive(Debug)]
pub struct Engine {
    config: NapkinConfig,
    classifier: SemanticClassifier,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_config(NapkinConfig::default())
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NapkinConfig) -> Self {
        let classifier = SemanticClassifier::from_config(&config);
        Self { config, classifier }
    }

    /// Replace the classifier's text fallback with a custom implementation
    /// (e.g. a richer linguistic model).
    pub fn with_text_classifier(mut self, fallback: Box<dyn TextClassifier>) -> Self {
        self.classifier = SemanticClassifier::new(Some(fallback));
        self
    }

    pub fn config(&self) -> &NapkinConfig {
        &self.config
    }

    /// Run the full pipeline: merge raw shapes, absorb labels, classify,
    /// filter noise, cluster segments into edges, build and validate the
    /// graph.
    pub fn analyze(&self, input: &DetectionInput) -> Analysis {
        let raw_node_count = input.raw_node_count.unwrap_or(input.raw_nodes.len());
        let raw_segment_count = input.raw_edge_count.unwrap_or(input.raw_segments.len());

        let merger = NodeMerger::from_config(&self.config);
        let mut nodes = merger.merge(&input.raw_nodes);
        debug!(
            raw = input.raw_nodes.len(),
            logical = nodes.len(),
            "merged raw primitives"
        );

        let leftover_labels =
            labels::assign_labels(&mut nodes, &input.text_elements, self.config.label_margin);
        debug!(
            text_elements = input.text_elements.len(),
            unabsorbed = leftover_labels.len(),
            "assigned labels"
        );

        self.classifier.classify_nodes(&mut nodes);

        // Noise filter: tiny unlabeled blobs are stray strokes, not shapes.
        nodes.retain(|n| n.area > self.config.min_node_area || !n.labels.is_empty());
        debug!(kept = nodes.len(), "filtered noise nodes");

        let clusterer = EdgeClusterer::from_config(&self.config);
        let edges = clusterer.cluster(&input.raw_segments, &nodes, &leftover_labels);
        debug!(edges = edges.len(), "resolved logical edges");

        let logical_node_count = nodes.len();
        let logical_edge_count = edges.len();

        let graph = DiagramGraph::build(&nodes, &edges);
        let output = graph.into_output(raw_node_count, self.config.decision_min_out_degree);

        Analysis {
            graph: output,
            raw_node_count,
            raw_segment_count,
            text_element_count: input.text_elements.len(),
            logical_node_count,
            logical_edge_count,
        }
    }
}

#[cfg(test)]
mod tests;
