//! Shared fixtures for the pipeline tests.

use crate::geom::BBox;
use crate::model::{LabelElement, LogicalNode, RawPrimitive, RawSegment, SemanticClass, ShapeKind};

mod labels;
mod merge;

pub(crate) fn prim(id: &str, shape: ShapeKind, x: f64, y: f64, w: f64, h: f64) -> RawPrimitive {
    RawPrimitive {
        id: id.to_string(),
        shape,
        bbox: BBox::new(x, y, w, h),
        center: None,
        area: w * h,
        perimeter: 2.0 * (w + h),
        circularity: 0.0,
        solidity: 1.0,
        vertex_count: 4,
        aspect_ratio: if h > 0.0 { w / h } else { 0.0 },
    }
}

pub(crate) fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> RawSegment {
    RawSegment { x1, y1, x2, y2 }
}

pub(crate) fn text(text: &str, x: f64, y: f64, w: f64, h: f64) -> LabelElement {
    LabelElement {
        text: text.to_string(),
        bbox: BBox::new(x, y, w, h),
        confidence: 0.9,
    }
}

pub(crate) fn lnode(
    id: &str,
    shape: ShapeKind,
    class: SemanticClass,
    labels: &[&str],
    x: f64,
    y: f64,
    w: f64,
    h: f64,
) -> LogicalNode {
    let bbox = BBox::new(x, y, w, h);
    LogicalNode {
        id: id.to_string(),
        raw_ids: vec![id.to_string()],
        shape,
        bbox,
        center: bbox.center().into(),
        area: bbox.area(),
        circularity: 0.0,
        solidity: 1.0,
        aspect_ratio: if h > 0.0 { w / h } else { 0.0 },
        labels: labels.iter().map(|s| s.to_string()).collect(),
        semantic_class: Some(class),
        confidence: 0.5,
    }
}
