//! Longitude wraparound helpers.
//!
//! Longitudes are equivalent modulo 360°. Axis lookups move a query onto the
//! axis' own range; curvilinear corner averaging moves neighbouring values
//! next to a reference so cells straddling the antimeridian stay compact.

/// Smallest longitude equivalent to `lon` that is `>= reference`.
pub fn next_equivalent_longitude(reference: f64, lon: f64) -> f64 {
    if !lon.is_finite() || !reference.is_finite() {
        return lon;
    }
    lon + 360.0 * ((reference - lon) / 360.0).ceil()
}

/// Longitude equivalent to `lon` that is nearest to `reference`.
///
/// The result always lies within 180° of `reference`.
pub fn harmonise_longitude(reference: f64, lon: f64) -> f64 {
    if !lon.is_finite() || !reference.is_finite() {
        return lon;
    }
    lon + 360.0 * ((reference - lon) / 360.0).round()
}

/// Harmonise every value in `lons` against the first one.
pub fn harmonise_all(lons: &mut [f64]) {
    if let Some((first, rest)) = lons.split_first_mut() {
        let reference = *first;
        for lon in rest {
            *lon = harmonise_longitude(reference, *lon);
        }
    }
}

/// Mean of a set of longitudes after harmonising them against the first.
pub fn mean_longitude(lons: &[f64]) -> f64 {
    if lons.is_empty() {
        return f64::NAN;
    }
    let reference = lons[0];
    let sum: f64 = lons.iter().map(|&l| harmonise_longitude(reference, l)).sum();
    sum / lons.len() as f64
}

/// Constrain a longitude to `[-180, 180)`.
pub fn constrain_longitude_180(lon: f64) -> f64 {
    next_equivalent_longitude(-180.0, lon)
}
