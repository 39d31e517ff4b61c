//! Uniform bucket index over cell footprints.
//!
//! Curvilinear grids have no analytic inverse from coordinates to indices.
//! The index divides the grid extent into equal buckets, records every cell
//! whose footprint box overlaps a bucket, and resolves a query by exact
//! point-in-polygon tests against the bucket's candidates.

use crate::footprint::{CellFootprint, Position};
use field_common::BoundingBox;

/// Target average number of cells per bucket.
const CELLS_PER_BUCKET: usize = 4;

/// Upper limit on buckets along one side.
const MAX_BUCKETS_PER_SIDE: usize = 2048;

#[derive(Debug, Clone)]
pub struct BucketIndex {
    bbox: BoundingBox,
    nx: usize,
    ny: usize,
    buckets: Vec<Vec<u32>>,
}

impl BucketIndex {
    /// Build an index over `footprints`, identified by their position in
    /// the slice.
    pub fn build(footprints: &[CellFootprint]) -> Self {
        let bbox = footprints
            .iter()
            .map(|f| f.bbox())
            .filter(|b| b.min_x.is_finite() && b.max_x.is_finite())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0));

        let side = ((footprints.len() / CELLS_PER_BUCKET) as f64).sqrt().ceil() as usize;
        let side = side.clamp(1, MAX_BUCKETS_PER_SIDE);
        let (nx, ny) = (side, side);

        let mut index = Self {
            bbox,
            nx,
            ny,
            buckets: vec![Vec::new(); nx * ny],
        };

        for (cell, footprint) in footprints.iter().enumerate() {
            let fb = footprint.bbox();
            if !fb.min_x.is_finite() || !fb.max_x.is_finite() {
                continue;
            }
            let (bx0, by0) = index.bucket_of(fb.min_x, fb.min_y);
            let (bx1, by1) = index.bucket_of(fb.max_x, fb.max_y);
            for by in by0..=by1 {
                for bx in bx0..=bx1 {
                    index.buckets[by * nx + bx].push(cell as u32);
                }
            }
        }

        tracing::debug!(
            cells = footprints.len(),
            buckets = nx * ny,
            "Built curvilinear bucket index"
        );

        index
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Bucket coordinates for a point, clamped to the index.
    fn bucket_of(&self, x: f64, y: f64) -> (usize, usize) {
        let fx = if self.bbox.width() > 0.0 {
            (x - self.bbox.min_x) / self.bbox.width()
        } else {
            0.0
        };
        let fy = if self.bbox.height() > 0.0 {
            (y - self.bbox.min_y) / self.bbox.height()
        } else {
            0.0
        };
        let bx = ((fx * self.nx as f64).floor().max(0.0) as usize).min(self.nx - 1);
        let by = ((fy * self.ny as f64).floor().max(0.0) as usize).min(self.ny - 1);
        (bx, by)
    }

    /// First cell whose footprint contains `pos`.
    pub fn find(&self, pos: &Position, footprints: &[CellFootprint]) -> Option<usize> {
        if !pos.is_finite() || !self.bbox.contains_point(pos.x, pos.y) {
            return None;
        }
        let (bx, by) = self.bucket_of(pos.x, pos.y);
        self.buckets[by * self.nx + bx]
            .iter()
            .map(|&c| c as usize)
            .find(|&c| footprints[c].contains(pos))
    }
}
