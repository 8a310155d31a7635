#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

/// Serde-friendly `{x, y}` coordinate as it appears on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn to_point(self) -> Point {
        point(self.x, self.y)
    }
}

impl From<Point> for Coord {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Axis-aligned bounding box in the `{x, y, w, h}` form detectors emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn center(&self) -> Point {
        point(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Intersection over Union. Falls back to 0 when the union is degenerate.
    pub fn iou(&self, other: &BBox) -> f64 {
        let ix = self.x.max(other.x);
        let iy = self.y.max(other.y);
        let ix2 = self.right().min(other.right());
        let iy2 = self.bottom().min(other.bottom());

        let intersection = (ix2 - ix).max(0.0) * (iy2 - iy).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Smallest box covering both operands.
    pub fn union(&self, other: &BBox) -> BBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        BBox::new(x, y, x2 - x, y2 - y)
    }

    pub fn expand(&self, margin: f64) -> BBox {
        BBox::new(
            self.x - margin,
            self.y - margin,
            self.w + 2.0 * margin,
            self.h + 2.0 * margin,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Point-to-rectangle distance: 0 inside the box, otherwise the distance
    /// to the nearest edge.
    pub fn distance_to(&self, p: Point) -> f64 {
        let dx = (self.x - p.x).max(p.x - self.right()).max(0.0);
        let dy = (self.y - p.y).max(p.y - self.bottom()).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Orientation of the segment `p -> q` in degrees, folded into `[0, 180)`.
pub fn angle_mod180(p: Point, q: Point) -> f64 {
    let deg = (q.y - p.y).atan2(q.x - p.x).to_degrees();
    deg.rem_euclid(180.0)
}

/// Absolute angular difference of two mod-180 orientations, taking the wrap
/// into account (175 degrees and 5 degrees are 10 degrees apart).
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 180.0;
    d.min(180.0 - d)
}
