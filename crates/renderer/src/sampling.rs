//! Sampling gridded values onto a frame's pixel lattice.

use field_common::{BoundingBox, FieldError, FieldResult};
use field_grid::{GridArray, HorizontalGrid, Position};
use rayon::prelude::*;

/// Nearest-cell samples for every pixel centre of a `width x height` frame
/// covering `bbox`.
///
/// The result is laid out like layer samples: row 0 is the southern edge.
/// Pixels outside the grid, and NaN cells, are `None`.
pub fn sample_grid<G: HorizontalGrid + ?Sized>(
    grid: &G,
    values: &GridArray<f32>,
    bbox: &BoundingBox,
    width: usize,
    height: usize,
) -> FieldResult<Vec<Option<f64>>> {
    if values.x_size() != grid.x_size() || values.y_size() != grid.y_size() {
        return Err(FieldError::format(format!(
            "Value array is {}x{} but grid is {}x{}",
            values.x_size(),
            values.y_size(),
            grid.x_size(),
            grid.y_size()
        )));
    }

    let dx = bbox.width() / width as f64;
    let dy = bbox.height() / height as f64;
    let data = values.as_slice();

    let mut samples = vec![None; width * height];
    samples
        .par_chunks_mut(width.max(1))
        .enumerate()
        .for_each(|(row, out)| {
            let y = bbox.min_y + (row as f64 + 0.5) * dy;
            for (col, sample) in out.iter_mut().enumerate() {
                let pos = Position::new(bbox.min_x + (col as f64 + 0.5) * dx, y);
                *sample = grid
                    .find_containing_cell(&pos)
                    .and_then(|(i, j)| grid.offset(i, j).ok())
                    .map(|k| data[k] as f64)
                    .filter(|v| !v.is_nan());
            }
        });

    Ok(samples)
}

/// Wrap plain `f32` samples, treating NaN as missing.
pub fn samples_from_f32(values: &[f32]) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|&v| if v.is_nan() { None } else { Some(v as f64) })
        .collect()
}
