//! Pipeline configuration.
//!
//! All thresholds are empirically tuned constants carried over from the
//! reference pipeline; they are exposed as configuration rather than
//! re-derived.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::merge::MergeMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NapkinConfig {
    /// How raw primitives are grouped into logical nodes.
    pub merge_mode: MergeMode,
    /// IoU above which two boxes merge (overlap mode).
    pub iou_threshold: f64,
    /// Center distance in px below which two boxes merge (proximity mode).
    pub proximity_threshold: f64,
    /// Margin in px around a node box when absorbing label centers.
    pub label_margin: f64,
    /// Max endpoint distance in px for two segments to share a cluster.
    pub cluster_distance: f64,
    /// Max mod-180 angle difference in degrees within a segment cluster.
    pub cluster_angle_tolerance: f64,
    /// Max point-to-rectangle distance in px when binding edge endpoints.
    pub node_binding_distance: f64,
    /// Max midpoint distance in px when binding leftover labels to edges.
    pub label_binding_distance: f64,
    /// Minimum out-degree a decision vertex must have.
    pub decision_min_out_degree: usize,
    /// Nodes below this area with no labels are dropped as noise.
    pub min_node_area: f64,
    /// Enable the lexicon-based text fallback when no keyword matches.
    pub use_lexicon_fallback: bool,
}

impl Default for NapkinConfig {
    fn default() -> Self {
        Self {
            merge_mode: MergeMode::Proximity,
            iou_threshold: 0.4,
            proximity_threshold: 50.0,
            label_margin: 5.0,
            cluster_distance: 40.0,
            cluster_angle_tolerance: 15.0,
            node_binding_distance: 150.0,
            label_binding_distance: 150.0,
            decision_min_out_degree: 2,
            min_node_area: 1000.0,
            use_lexicon_fallback: true,
        }
    }
}

impl NapkinConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The merge threshold selected by `merge_mode`.
    pub fn merge_threshold(&self) -> f64 {
        match self.merge_mode {
            MergeMode::Overlap => self.iou_threshold,
            MergeMode::Proximity => self.proximity_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("iou_threshold", self.iou_threshold),
            ("proximity_threshold", self.proximity_threshold),
            ("label_margin", self.label_margin),
            ("cluster_distance", self.cluster_distance),
            ("cluster_angle_tolerance", self.cluster_angle_tolerance),
            ("node_binding_distance", self.node_binding_distance),
            ("label_binding_distance", self.label_binding_distance),
            ("min_node_area", self.min_node_area),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a non-negative finite number, got {value}"),
                });
            }
        }
        if self.iou_threshold > 1.0 {
            return Err(Error::InvalidConfig {
                message: format!("iou_threshold must be <= 1.0, got {}", self.iou_threshold),
            });
        }
        Ok(())
    }
}
