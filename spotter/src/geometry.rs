//! Planar geometry primitives and read-only drawing features.

use serde::{Deserialize, Serialize};

use crate::crs::Crs;

/// Representation of a 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Returns the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Geometry of a drawing feature as delivered by the host's drawing reader.
///
/// Only lines and polygons are supported; anything else is screened out
/// before the features reach the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DrawingGeometry {
    Line { vertices: Vec<Point> },
    Polygon { vertices: Vec<Point> },
}

impl DrawingGeometry {
    /// Ordered vertex list of the geometry.
    pub fn vertices(&self) -> &[Point] {
        match self {
            DrawingGeometry::Line { vertices } | DrawingGeometry::Polygon { vertices } => vertices,
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, DrawingGeometry::Polygon { .. })
    }
}

/// A line or polygon read from a drawing, in its own CRS. Never mutated by
/// vertex extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingFeature {
    pub crs: Crs,
    pub geometry: DrawingGeometry,
}

impl DrawingFeature {
    pub fn vertices(&self) -> &[Point] {
        self.geometry.vertices()
    }

    /// Shifts every vertex by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let vertices = match &mut self.geometry {
            DrawingGeometry::Line { vertices } | DrawingGeometry::Polygon { vertices } => vertices,
        };
        for v in vertices {
            v.x += dx;
            v.y += dy;
        }
    }
}

/// Lower-left corner of the extent covered by a batch of features.
pub fn extent_min(features: &[DrawingFeature]) -> Option<Point> {
    let mut min: Option<Point> = None;
    for f in features {
        for v in f.vertices() {
            min = Some(match min {
                Some(m) => Point::new(m.x.min(v.x), m.y.min(v.y)),
                None => *v,
            });
        }
    }
    min
}

/// Translates a whole batch so the extent minimum lands on `target`.
///
/// This mirrors placing a drawing on the map with a single click: the click
/// becomes the new lower-left corner of the batch.
pub fn place_at(features: &mut [DrawingFeature], target: Point) {
    if let Some(origin) = extent_min(features) {
        let dx = target.x - origin.x;
        let dy = target.y - origin.y;
        for f in features {
            f.translate(dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> DrawingFeature {
        DrawingFeature {
            crs: Crs::web_mercator(),
            geometry: DrawingGeometry::Line {
                vertices: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            },
        }
    }

    #[test]
    fn distance_works() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn place_batch_on_click() {
        let mut batch = vec![line(&[(10.0, 10.0), (20.0, 10.0)]), line(&[(15.0, 30.0), (15.0, 5.0)])];
        place_at(&mut batch, Point::new(100.0, 200.0));
        let min = extent_min(&batch).unwrap();
        assert!((min.x - 100.0).abs() < 1e-9);
        assert!((min.y - 200.0).abs() < 1e-9);
        // relative layout preserved
        assert!((batch[0].vertices()[1].x - batch[0].vertices()[0].x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn place_empty_batch_is_noop() {
        let mut batch: Vec<DrawingFeature> = Vec::new();
        place_at(&mut batch, Point::new(1.0, 1.0));
        assert!(extent_min(&batch).is_none());
    }
}
