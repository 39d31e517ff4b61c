//! Rectilinear grids composed of two independent axes.

use crate::axis::Axis;
use crate::footprint::{CellFootprint, Position};
use crate::HorizontalGrid;
use field_common::{BoundingBox, FieldResult};
use serde::{Deserialize, Serialize};

/// A grid whose cells are the product of an x axis and a y axis.
///
/// Index `i` runs along the x axis, `j` along the y axis, and values are
/// stored with `j` varying fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectilinearGrid {
    x_axis: Axis,
    y_axis: Axis,
}

impl RectilinearGrid {
    pub fn new(x_axis: impl Into<Axis>, y_axis: impl Into<Axis>) -> Self {
        Self {
            x_axis: x_axis.into(),
            y_axis: y_axis.into(),
        }
    }

    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }
}

impl HorizontalGrid for RectilinearGrid {
    fn x_size(&self) -> usize {
        self.x_axis.size()
    }

    fn y_size(&self) -> usize {
        self.y_axis.size()
    }

    fn transform(&self, i: usize, j: usize) -> FieldResult<Position> {
        Ok(Position::new(
            self.x_axis.coordinate_value(i)?,
            self.y_axis.coordinate_value(j)?,
        ))
    }

    /// Each axis resolves its own index; a miss on either axis means the
    /// position is outside the grid.
    fn find_containing_cell(&self, pos: &Position) -> Option<(usize, usize)> {
        let i = self.x_axis.find_containing_index(pos.x)?;
        let j = self.y_axis.find_containing_index(pos.y)?;
        Some((i, j))
    }

    fn extent(&self) -> BoundingBox {
        let (min_x, max_x) = self.x_axis.extent();
        let (min_y, max_y) = self.y_axis.extent();
        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    fn cell_footprint(&self, i: usize, j: usize) -> FieldResult<CellFootprint> {
        let (min_x, max_x) = self.x_axis.coordinate_bounds(i)?;
        let (min_y, max_y) = self.y_axis.coordinate_bounds(j)?;
        Ok(CellFootprint::rectangle(min_x, min_y, max_x, max_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{IrregularAxis, RegularAxis};
    use field_common::FieldError;

    fn global_grid() -> RectilinearGrid {
        RectilinearGrid::new(
            RegularAxis::new("lon", -180.0, 1.0, 360, true).unwrap(),
            RegularAxis::new("lat", -90.0, 1.0, 181, false).unwrap(),
        )
    }

    #[test]
    fn test_transform_and_offset() {
        let grid = global_grid();
        assert_eq!(grid.size(), 360 * 181);
        assert_eq!(grid.transform(0, 0).unwrap(), Position::new(-180.0, -90.0));
        assert_eq!(grid.transform(180, 90).unwrap(), Position::new(0.0, 0.0));
        assert_eq!(grid.offset(1, 2).unwrap(), 181 + 2);
        assert!(matches!(grid.offset(360, 0), Err(FieldError::Index { .. })));
        assert!(grid.transform(0, 181).is_err());
    }

    #[test]
    fn test_find_containing_cell() {
        let grid = global_grid();
        assert_eq!(grid.find_containing_cell(&Position::new(0.3, -0.2)), Some((180, 90)));
        // Wraps past the antimeridian
        assert_eq!(grid.find_containing_cell(&Position::new(180.2, 0.0)), Some((0, 90)));
        assert_eq!(grid.find_containing_cell(&Position::new(0.0, 91.0)), None);
    }

    #[test]
    fn test_extent_and_footprint() {
        let grid = RectilinearGrid::new(
            RegularAxis::new("x", 0.0, 2.0, 3, false).unwrap(),
            IrregularAxis::new("y", vec![0.0, 1.0, 3.0], false).unwrap(),
        );
        assert_eq!(grid.extent(), BoundingBox::new(-1.0, -0.5, 5.0, 4.0));

        let fp = grid.cell_footprint(1, 2).unwrap();
        assert_eq!(fp.bbox(), BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        assert!(fp.contains(&grid.transform(1, 2).unwrap()));
    }
}
