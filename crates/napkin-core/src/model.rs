//! Wire-level data model shared by the pipeline stages.
//!
//! Raw detections (`RawPrimitive`, `RawSegment`, `LabelElement`) are produced
//! by external extractors and are read-only here; `LogicalNode` and
//! `LogicalEdge` are the merged entities this crate owns.

use serde::{Deserialize, Serialize};

use crate::geom::{BBox, Coord, Point, angle_mod180};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Oval,
    Rectangle,
    Diamond,
    Triangle,
    Polygon,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticClass {
    Start,
    End,
    Process,
    Decision,
    Data,
    Terminal,
    Connector,
}

/// One shape candidate derived from a single image contour, before merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPrimitive {
    pub id: String,
    #[serde(rename = "type", default)]
    pub shape: ShapeKind,
    pub bbox: BBox,
    #[serde(default)]
    pub center: Option<Coord>,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub perimeter: f64,
    #[serde(default)]
    pub circularity: f64,
    #[serde(default)]
    pub solidity: f64,
    #[serde(default, rename = "vertices")]
    pub vertex_count: usize,
    #[serde(default)]
    pub aspect_ratio: f64,
}

impl RawPrimitive {
    /// Detectors emit an explicit center; tolerate dumps that omit it.
    pub fn center_point(&self) -> Point {
        self.center
            .map(Coord::to_point)
            .unwrap_or_else(|| self.bbox.center())
    }
}

/// One recognized text token with its box, external OCR output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelElement {
    pub text: String,
    pub bbox: BBox,
    #[serde(default)]
    pub confidence: f64,
}

/// One raw line segment from the line extractor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl RawSegment {
    pub fn endpoints(&self) -> (Point, Point) {
        (
            crate::geom::point(self.x1, self.y1),
            crate::geom::point(self.x2, self.y2),
        )
    }

    /// Orientation in degrees, mod 180.
    pub fn angle(&self) -> f64 {
        let (p, q) = self.endpoints();
        angle_mod180(p, q)
    }

    /// Minimum distance over the four endpoint pairings of two segments.
    pub fn min_endpoint_distance(&self, other: &RawSegment) -> f64 {
        let (a1, a2) = self.endpoints();
        let (b1, b2) = other.endpoints();
        a1.distance_to(b1)
            .min(a1.distance_to(b2))
            .min(a2.distance_to(b1))
            .min(a2.distance_to(b2))
    }
}

/// The merged, de-duplicated shape entity representing one diagram element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalNode {
    pub id: String,
    pub raw_ids: Vec<String>,
    pub shape: ShapeKind,
    pub bbox: BBox,
    pub center: Coord,
    pub area: f64,
    pub circularity: f64,
    pub solidity: f64,
    pub aspect_ratio: f64,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub semantic_class: Option<SemanticClass>,
    #[serde(default)]
    pub confidence: f64,
}

impl LogicalNode {
    /// Joined label text in reading order, empty when unlabeled.
    pub fn label_text(&self) -> String {
        self.labels.join(" ")
    }
}

/// A merged, endpoint-resolved connector between two logical nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_direction")]
    pub direction: String,
    #[serde(default = "default_edge_confidence")]
    pub confidence: f64,
    pub center: Coord,
}

pub(crate) fn default_direction() -> String {
    "->".to_string()
}

pub(crate) fn default_edge_confidence() -> f64 {
    0.5
}

/// Everything the external extractors hand to one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionInput {
    #[serde(default)]
    pub raw_nodes: Vec<RawPrimitive>,
    #[serde(default)]
    pub raw_segments: Vec<RawSegment>,
    #[serde(default)]
    pub text_elements: Vec<LabelElement>,
    /// Raw counts for the reduction metric; default to the list lengths.
    #[serde(default)]
    pub raw_node_count: Option<usize>,
    #[serde(default)]
    pub raw_edge_count: Option<usize>,
}

impl DetectionInput {
    pub fn from_json_str(s: &str) -> crate::Result<Self> {
        serde_json::from_str(s).map_err(|e| crate::Error::InvalidInput {
            message: e.to_string(),
        })
    }
}
