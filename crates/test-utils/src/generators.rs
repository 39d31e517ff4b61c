//! Synthetic field generators.
//!
//! Sample vectors are laid out the way frame layers expect them: row 0 is
//! the southern edge, columns run west to east. Grid arrays use the grid
//! layout, `offset = i * y_size + j`.

use field_grid::{GridArray, RectilinearGrid, RegularAxis};

/// Creates samples with predictable values.
///
/// Each sample is `col * 1000 + row`, so a misplaced pixel is easy to spot.
///
/// # Example
///
/// ```
/// use test_utils::create_test_samples;
///
/// let samples = create_test_samples(10, 5);
/// assert_eq!(samples.len(), 50);
/// assert_eq!(samples[1], Some(1000.0)); // col=1, row=0
/// assert_eq!(samples[10], Some(1.0));   // col=0, row=1
/// ```
pub fn create_test_samples(width: usize, height: usize) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(Some((col * 1000 + row) as f64));
        }
    }
    data
}

/// Temperature-like samples in Kelvin, 250K in the south-west rising to
/// about 310K in the north-east.
pub fn create_temperature_samples(width: usize, height: usize) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f64 / width.max(1) as f64;
            let y_factor = row as f64 / height.max(1) as f64;
            data.push(Some(250.0 + x_factor * 30.0 + y_factor * 30.0));
        }
    }
    data
}

/// Wind speed in m/s, calm at the centre and up to 50 m/s at the corners.
pub fn create_wind_speed_samples(width: usize, height: usize) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(width * height);
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;
    let max_dist = (center_x * center_x + center_y * center_y).sqrt().max(f64::EPSILON);

    for row in 0..height {
        for col in 0..width {
            let dx = col as f64 - center_x;
            let dy = row as f64 - center_y;
            data.push(Some((dx * dx + dy * dy).sqrt() / max_dist * 50.0));
        }
    }
    data
}

/// Wind direction in degrees counter-clockwise from east, circulating
/// around the centre.
pub fn create_wind_angle_samples(width: usize, height: usize) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(width * height);
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;

    for row in 0..height {
        for col in 0..width {
            let dx = col as f64 + 0.5 - center_x;
            let dy = row as f64 + 0.5 - center_y;
            // Tangent to the radius
            data.push(Some(dy.atan2(dx).to_degrees() + 90.0));
        }
    }
    data
}

/// Deterministic precipitation in mm; most cells are dry.
pub fn create_precipitation_samples(width: usize, height: usize, seed: u32) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            let precip = if hash % 4 == 0 {
                (hash % 5000) as f64 / 100.0
            } else {
                0.0
            };
            data.push(Some(precip));
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

pub fn create_constant_samples(width: usize, height: usize, value: f64) -> Vec<Option<f64>> {
    vec![Some(value); width * height]
}

/// Zeros with missing values at the given `(col, row)` positions.
pub fn create_samples_with_gaps(width: usize, height: usize, gaps: &[(usize, usize)]) -> Vec<Option<f64>> {
    let mut data = vec![Some(0.0); width * height];
    for &(col, row) in gaps {
        if col < width && row < height {
            data[row * width + col] = None;
        }
    }
    data
}

/// A global grid of `nx` by `ny` cell centres covering -180..180 by
/// -90..90.
pub fn create_global_grid(nx: usize, ny: usize) -> RectilinearGrid {
    let dx = 360.0 / nx as f64;
    let dy = 180.0 / ny as f64;
    let x = RegularAxis::new("longitude", -180.0 + dx / 2.0, dx, nx, true);
    let y = RegularAxis::new("latitude", -90.0 + dy / 2.0, dy, ny, false);
    match (x, y) {
        (Ok(x), Ok(y)) => RectilinearGrid::new(x, y),
        _ => panic!("Invalid global grid size {}x{}", nx, ny),
    }
}

/// Grid values equal to the cell's latitude index plus a tenth of the
/// longitude index, NaN on the first longitude column.
pub fn create_grid_values(nx: usize, ny: usize) -> GridArray<f32> {
    GridArray::from_fn(nx, ny, |i, j| {
        if i == 0 {
            f32::NAN
        } else {
            j as f32 + i as f32 / 10.0
        }
    })
}
