//! Cell positions and polygonal footprints.

use field_common::BoundingBox;
use serde::{Deserialize, Serialize};

/// A point in grid coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The polygon a grid cell covers.
///
/// Rectilinear cells are axis-aligned rectangles; curvilinear cells are
/// quadrilaterals through the four surrounding corner points. Vertices are
/// stored in ring order without repeating the first vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFootprint {
    vertices: Vec<Position>,
}

impl CellFootprint {
    pub fn new(vertices: Vec<Position>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle footprint.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(vec![
            Position::new(min_x, min_y),
            Position::new(max_x, min_y),
            Position::new(max_x, max_y),
            Position::new(min_x, max_y),
        ])
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    /// Bounding box of the vertices.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|p| (p.x, p.y)))
            .unwrap_or_else(|| BoundingBox::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN))
    }

    /// Vertex mean.
    pub fn centroid(&self) -> Position {
        let n = self.vertices.len().max(1) as f64;
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Position::new(sx / n, sy / n)
    }

    /// Point-in-polygon test.
    ///
    /// Points on an edge or vertex count as inside so that a point on a
    /// shared edge resolves to one of the neighbouring cells.
    pub fn contains(&self, pos: &Position) -> bool {
        let n = self.vertices.len();
        if n < 3 || !pos.is_finite() {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];

            if on_segment(pos, &a, &b) {
                return true;
            }

            if (a.y > pos.y) != (b.y > pos.y) {
                let x_cross = (b.x - a.x) * (pos.y - a.y) / (b.y - a.y) + a.x;
                if pos.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

fn on_segment(p: &Position, a: &Position, b: &Position) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    let scale = (b.x - a.x).abs().max((b.y - a.y).abs()).max(1.0);
    if cross.abs() > 1e-12 * scale {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}
