//! Coordinate model for gridded field data.
//!
//! Maps between array indices and real-world coordinates:
//! - One-dimensional axes (regular spacing or explicit values, with
//!   longitude wraparound)
//! - Rectilinear grids built from two axes
//! - Curvilinear grids built from per-cell coordinate matrices
//!
//! Every grid stores values with the second index varying fastest:
//! `offset = i * y_size + j`.

pub mod array;
pub mod axis;
pub mod curvilinear;
pub mod footprint;
pub mod index;
pub mod longitude;
pub mod rectilinear;

pub use array::GridArray;
pub use axis::{Axis, IrregularAxis, RegularAxis};
pub use curvilinear::CurvilinearGrid;
pub use footprint::{CellFootprint, Position};
pub use rectilinear::RectilinearGrid;

use field_common::{BoundingBox, FieldError, FieldResult};

/// Row-major offset with the second index varying fastest.
#[inline]
pub fn grid_offset(i: usize, j: usize, y_size: usize) -> usize {
    i * y_size + j
}

/// A two-dimensional horizontal grid.
///
/// Implementations are immutable after construction and may be shared
/// between concurrent renders.
pub trait HorizontalGrid: Send + Sync {
    /// Number of cells along the first index.
    fn x_size(&self) -> usize;

    /// Number of cells along the second index.
    fn y_size(&self) -> usize;

    /// Centre of cell `(i, j)`.
    fn transform(&self, i: usize, j: usize) -> FieldResult<Position>;

    /// Cell whose footprint contains `pos`, if any.
    fn find_containing_cell(&self, pos: &Position) -> Option<(usize, usize)>;

    /// Bounding box of all cell footprints.
    fn extent(&self) -> BoundingBox;

    /// Polygonal footprint of cell `(i, j)`.
    fn cell_footprint(&self, i: usize, j: usize) -> FieldResult<CellFootprint>;

    /// Total number of cells.
    fn size(&self) -> usize {
        self.x_size() * self.y_size()
    }

    /// Offset of cell `(i, j)` in a value store laid out for this grid.
    fn offset(&self, i: usize, j: usize) -> FieldResult<usize> {
        FieldError::check_index(i, self.x_size())?;
        FieldError::check_index(j, self.y_size())?;
        Ok(grid_offset(i, j, self.y_size()))
    }

    /// Whether any cell contains `pos`.
    fn contains(&self, pos: &Position) -> bool {
        self.find_containing_cell(pos).is_some()
    }
}
