//! Curvilinear grids with explicit per-cell coordinates.
//!
//! Cell centres are given as two `ni x nj` matrices. Corner matrices of size
//! `(ni + 1) x (nj + 1)` are derived once at construction: the centres are
//! extended by one linearly extrapolated ring, then every corner is the mean
//! of the four centres surrounding it. Longitudes are harmonised against
//! their neighbours before each step so cells on the antimeridian stay
//! compact.

use crate::footprint::{CellFootprint, Position};
use crate::index::BucketIndex;
use crate::longitude::{harmonise_longitude, mean_longitude};
use crate::{grid_offset, HorizontalGrid};
use field_common::{BoundingBox, FieldError, FieldResult};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CurvilinearGrid {
    ni: usize,
    nj: usize,
    x_centres: Vec<f64>,
    y_centres: Vec<f64>,
    x_corners: Vec<f64>,
    y_corners: Vec<f64>,
    is_longitude: bool,
    footprints: Vec<CellFootprint>,
    extent: BoundingBox,
    index: BucketIndex,
}

impl CurvilinearGrid {
    /// Build a grid from centre matrices laid out with `j` varying fastest.
    ///
    /// `is_longitude` marks the x coordinates as longitudes in degrees.
    pub fn new(
        ni: usize,
        nj: usize,
        x_centres: Vec<f64>,
        y_centres: Vec<f64>,
        is_longitude: bool,
    ) -> FieldResult<Self> {
        if ni < 2 || nj < 2 {
            return Err(FieldError::domain(format!(
                "curvilinear grid needs at least 2x2 cells, got {}x{}",
                ni, nj
            )));
        }
        let n = ni * nj;
        if x_centres.len() != n || y_centres.len() != n {
            return Err(FieldError::domain(format!(
                "coordinate matrices have {} and {} values, expected {}",
                x_centres.len(),
                y_centres.len(),
                n
            )));
        }
        if x_centres.iter().chain(&y_centres).any(|v| !v.is_finite()) {
            return Err(FieldError::domain(
                "curvilinear coordinates must be finite",
            ));
        }

        let x_corners = corner_matrix(ni, nj, &x_centres, is_longitude);
        let y_corners = corner_matrix(ni, nj, &y_centres, false);

        let mut grid = Self {
            ni,
            nj,
            x_centres,
            y_centres,
            x_corners,
            y_corners,
            is_longitude,
            footprints: Vec::new(),
            extent: BoundingBox::new(0.0, 0.0, 0.0, 0.0),
            index: BucketIndex::build(&[]),
        };

        grid.footprints = (0..ni)
            .flat_map(|i| (0..nj).map(move |j| (i, j)))
            .map(|(i, j)| grid.build_footprint(i, j))
            .collect();
        grid.index = BucketIndex::build(&grid.footprints);
        grid.extent = grid.index.bbox();

        debug!(
            ni = ni,
            nj = nj,
            is_longitude = is_longitude,
            extent = ?grid.extent,
            "Built curvilinear grid"
        );

        Ok(grid)
    }

    pub fn is_longitude(&self) -> bool {
        self.is_longitude
    }

    pub fn x_centres(&self) -> &[f64] {
        &self.x_centres
    }

    pub fn y_centres(&self) -> &[f64] {
        &self.y_centres
    }

    /// Corner `(ci, cj)` with `ci <= ni` and `cj <= nj`.
    pub fn corner(&self, ci: usize, cj: usize) -> FieldResult<Position> {
        FieldError::check_index(ci, self.ni + 1)?;
        FieldError::check_index(cj, self.nj + 1)?;
        let k = grid_offset(ci, cj, self.nj + 1);
        Ok(Position::new(self.x_corners[k], self.y_corners[k]))
    }

    fn corner_at(&self, ci: usize, cj: usize) -> Position {
        let k = grid_offset(ci, cj, self.nj + 1);
        Position::new(self.x_corners[k], self.y_corners[k])
    }

    fn build_footprint(&self, i: usize, j: usize) -> CellFootprint {
        let first = self.corner_at(i, j);
        let mut vertices = vec![
            first,
            self.corner_at(i + 1, j),
            self.corner_at(i + 1, j + 1),
            self.corner_at(i, j + 1),
        ];
        if self.is_longitude {
            for v in vertices.iter_mut().skip(1) {
                v.x = harmonise_longitude(first.x, v.x);
            }
        }
        CellFootprint::new(vertices)
    }

    /// Longitudes equivalent to `x` that fall inside the extent, `x` first.
    fn candidate_xs(&self, x: f64) -> impl Iterator<Item = f64> + '_ {
        let shifts: &[f64] = if self.is_longitude {
            &[0.0, -360.0, 360.0]
        } else {
            &[0.0]
        };
        shifts
            .iter()
            .map(move |s| x + s)
            .filter(move |cx| *cx >= self.extent.min_x && *cx <= self.extent.max_x)
    }
}

impl HorizontalGrid for CurvilinearGrid {
    fn x_size(&self) -> usize {
        self.ni
    }

    fn y_size(&self) -> usize {
        self.nj
    }

    fn transform(&self, i: usize, j: usize) -> FieldResult<Position> {
        let k = self.offset(i, j)?;
        Ok(Position::new(self.x_centres[k], self.y_centres[k]))
    }

    fn find_containing_cell(&self, pos: &Position) -> Option<(usize, usize)> {
        if !pos.is_finite() {
            return None;
        }
        self.candidate_xs(pos.x)
            .find_map(|x| self.index.find(&Position::new(x, pos.y), &self.footprints))
            .map(|k| (k / self.nj, k % self.nj))
    }

    fn extent(&self) -> BoundingBox {
        self.extent
    }

    fn cell_footprint(&self, i: usize, j: usize) -> FieldResult<CellFootprint> {
        let k = self.offset(i, j)?;
        Ok(self.footprints[k].clone())
    }
}

/// Corner matrix of size `(ni + 1) x (nj + 1)` for an `ni x nj` centre
/// matrix, both laid out with the second index varying fastest.
///
/// Requires `ni >= 2` and `nj >= 2`.
pub fn corner_matrix(ni: usize, nj: usize, centres: &[f64], is_longitude: bool) -> Vec<f64> {
    let (pi, pj) = (ni + 2, nj + 2);
    let mut padded = vec![0.0; pi * pj];

    for i in 0..ni {
        for j in 0..nj {
            padded[grid_offset(i + 1, j + 1, pj)] = centres[grid_offset(i, j, nj)];
        }
    }

    // Extrapolate along j for interior rows, then along i for every column
    for p in 1..=ni {
        padded[grid_offset(p, 0, pj)] = extrapolate(
            padded[grid_offset(p, 1, pj)],
            padded[grid_offset(p, 2, pj)],
            is_longitude,
        );
        padded[grid_offset(p, nj + 1, pj)] = extrapolate(
            padded[grid_offset(p, nj, pj)],
            padded[grid_offset(p, nj - 1, pj)],
            is_longitude,
        );
    }
    for q in 0..pj {
        padded[grid_offset(0, q, pj)] = extrapolate(
            padded[grid_offset(1, q, pj)],
            padded[grid_offset(2, q, pj)],
            is_longitude,
        );
        padded[grid_offset(ni + 1, q, pj)] = extrapolate(
            padded[grid_offset(ni, q, pj)],
            padded[grid_offset(ni - 1, q, pj)],
            is_longitude,
        );
    }

    let mut corners = Vec::with_capacity((ni + 1) * (nj + 1));
    for ci in 0..=ni {
        for cj in 0..=nj {
            let quad = [
                padded[grid_offset(ci, cj, pj)],
                padded[grid_offset(ci + 1, cj, pj)],
                padded[grid_offset(ci, cj + 1, pj)],
                padded[grid_offset(ci + 1, cj + 1, pj)],
            ];
            let corner = if is_longitude {
                mean_longitude(&quad)
            } else {
                quad.iter().sum::<f64>() / 4.0
            };
            corners.push(corner);
        }
    }
    corners
}

/// One step beyond `edge`, away from `inner`.
fn extrapolate(edge: f64, inner: f64, is_longitude: bool) -> f64 {
    let inner = if is_longitude {
        harmonise_longitude(edge, inner)
    } else {
        inner
    };
    2.0 * edge - inner
}
