//! Value store laid out in grid order.

use crate::grid_offset;
use field_common::{FieldError, FieldResult};

/// Values for every cell of an `x_size x y_size` grid.
///
/// Storage order matches [`grid_offset`], so a grid's `offset(i, j)` indexes
/// directly into [`GridArray::as_slice`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridArray<T> {
    x_size: usize,
    y_size: usize,
    values: Vec<T>,
}

impl<T: Clone> GridArray<T> {
    /// Array with every cell set to `fill`.
    pub fn filled(x_size: usize, y_size: usize, fill: T) -> Self {
        Self {
            x_size,
            y_size,
            values: vec![fill; x_size * y_size],
        }
    }
}

impl<T> GridArray<T> {
    /// Wrap existing values, which must already be in grid order.
    pub fn from_vec(x_size: usize, y_size: usize, values: Vec<T>) -> FieldResult<Self> {
        if values.len() != x_size * y_size {
            return Err(FieldError::format(format!(
                "{} values supplied for a {}x{} grid",
                values.len(),
                x_size,
                y_size
            )));
        }
        Ok(Self {
            x_size,
            y_size,
            values,
        })
    }

    /// Build by evaluating `f(i, j)` for every cell.
    pub fn from_fn(x_size: usize, y_size: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut values = Vec::with_capacity(x_size * y_size);
        for i in 0..x_size {
            for j in 0..y_size {
                values.push(f(i, j));
            }
        }
        Self {
            x_size,
            y_size,
            values,
        }
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn y_size(&self) -> usize {
        self.y_size
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn offset(&self, i: usize, j: usize) -> FieldResult<usize> {
        FieldError::check_index(i, self.x_size)?;
        FieldError::check_index(j, self.y_size)?;
        Ok(grid_offset(i, j, self.y_size))
    }

    pub fn get(&self, i: usize, j: usize) -> FieldResult<&T> {
        let k = self.offset(i, j)?;
        Ok(&self.values[k])
    }

    pub fn set(&mut self, i: usize, j: usize, value: T) -> FieldResult<()> {
        let k = self.offset(i, j)?;
        self.values[k] = value;
        Ok(())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}
