//! One-dimensional coordinate axes.
//!
//! An axis maps integer indices to coordinate values. Two representations:
//! - [`RegularAxis`]: `first + index * spacing`, stored compactly
//! - [`IrregularAxis`]: an explicit strictly monotonic value list
//!
//! Each index owns a cell whose bounds sit half-way to the neighbouring
//! values; the outer bounds are extrapolated by half the adjacent spacing.
//!
//! Lookup semantics differ deliberately between the two kinds:
//! `RegularAxis::find_index_of` only matches values that reproduce a grid
//! point exactly, while `IrregularAxis::find_index_of` resolves any value
//! inside a cell's bounds. Both kinds offer `find_containing_index` for
//! cell-containment semantics, which is what grids use.

use crate::longitude::next_equivalent_longitude;
use field_common::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Midpoint between two neighbouring coordinate values.
#[inline]
fn midpoint(a: f64, b: f64) -> f64 {
    a + (b - a) * 0.5
}

/// Order a pair so the lower bound comes first.
#[inline]
fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// An axis with fixed spacing between coordinate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularAxis {
    name: String,
    first: f64,
    spacing: f64,
    count: usize,
    is_longitude: bool,
}

impl RegularAxis {
    /// Create a regular axis.
    ///
    /// Fails with a domain error when `count` is zero, when `first` or
    /// `spacing` is not finite, or when `spacing` is zero.
    pub fn new(
        name: impl Into<String>,
        first: f64,
        spacing: f64,
        count: usize,
        is_longitude: bool,
    ) -> FieldResult<Self> {
        let name = name.into();
        if count == 0 {
            return Err(FieldError::domain(format!("Axis '{}' must have at least one value", name)));
        }
        if !first.is_finite() || !spacing.is_finite() || spacing == 0.0 {
            return Err(FieldError::domain(format!(
                "Axis '{}' needs a finite origin and non-zero spacing (first={}, spacing={})",
                name, first, spacing
            )));
        }

        Ok(Self {
            name,
            first,
            spacing,
            count,
            is_longitude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn first(&self) -> f64 {
        self.first
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn size(&self) -> usize {
        self.count
    }

    pub fn is_ascending(&self) -> bool {
        self.spacing > 0.0
    }

    pub fn is_longitude(&self) -> bool {
        self.is_longitude
    }

    #[inline]
    fn value_at(&self, index: usize) -> f64 {
        self.first + index as f64 * self.spacing
    }

    /// Coordinate value at `index`.
    pub fn coordinate_value(&self, index: usize) -> FieldResult<f64> {
        FieldError::check_index(index, self.count)?;
        Ok(self.value_at(index))
    }

    /// Index whose coordinate is exactly `value`.
    ///
    /// The candidates either side of the fractional index are re-evaluated
    /// and accepted only on exact equality, so values between grid points
    /// return `None`.
    pub fn find_index_of(&self, value: f64) -> Option<usize> {
        let value = self.canonicalise(value);
        if !value.is_finite() {
            return None;
        }

        let exact = (value - self.first) / self.spacing;
        for candidate in [exact.floor(), exact.ceil()] {
            if candidate < 0.0 || candidate >= self.count as f64 {
                continue;
            }
            let index = candidate as usize;
            if self.value_at(index) == value {
                return Some(index);
            }
        }
        None
    }

    /// Index whose cell bounds contain `value`.
    pub fn find_containing_index(&self, value: f64) -> Option<usize> {
        let value = self.canonicalise(value);
        if !value.is_finite() {
            return None;
        }

        let nearest = ((value - self.first) / self.spacing).round();
        if !nearest.is_finite() {
            return None;
        }
        // Rounding can land one cell off when the value sits on a bound
        let nearest = nearest as i64;
        for candidate in [nearest, nearest - 1, nearest + 1] {
            if candidate < 0 || candidate >= self.count as i64 {
                continue;
            }
            let index = candidate as usize;
            let (lo, hi) = self.bounds_at(index);
            if value >= lo && value <= hi {
                return Some(index);
            }
        }
        None
    }

    fn bound_before(&self, index: usize) -> f64 {
        if index == 0 {
            self.first - 0.5 * self.spacing
        } else {
            midpoint(self.value_at(index - 1), self.value_at(index))
        }
    }

    fn bounds_at(&self, index: usize) -> (f64, f64) {
        let after = if index + 1 == self.count {
            self.value_at(index) + 0.5 * self.spacing
        } else {
            self.bound_before(index + 1)
        };
        ordered(self.bound_before(index), after)
    }

    /// Bounds `(lo, hi)` of the cell at `index`.
    pub fn coordinate_bounds(&self, index: usize) -> FieldResult<(f64, f64)> {
        FieldError::check_index(index, self.count)?;
        Ok(self.bounds_at(index))
    }

    /// Range covered by all cell bounds.
    pub fn extent(&self) -> (f64, f64) {
        let (lo_first, hi_first) = self.bounds_at(0);
        let (lo_last, hi_last) = self.bounds_at(self.count - 1);
        (lo_first.min(lo_last), hi_first.max(hi_last))
    }

    fn canonicalise(&self, value: f64) -> f64 {
        if self.is_longitude {
            next_equivalent_longitude(self.extent().0, value)
        } else {
            value
        }
    }
}

/// An axis with explicit, strictly monotonic coordinate values.
///
/// Values are stored ascending; a descending axis keeps its index order by
/// mapping each index to the mirrored storage slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrregularAxis {
    name: String,
    values: Vec<f64>,
    ascending: bool,
    is_longitude: bool,
}

impl IrregularAxis {
    /// Create an irregular axis from values in either ascending or
    /// descending order.
    ///
    /// Fails with a domain error for an empty list, non-finite values, or a
    /// sequence that is not strictly monotonic.
    pub fn new(name: impl Into<String>, mut values: Vec<f64>, is_longitude: bool) -> FieldResult<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(FieldError::domain(format!("Axis '{}' must have at least one value", name)));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(FieldError::domain(format!(
                "Axis '{}' contains a non-finite value ({})",
                name, bad
            )));
        }

        let ascending = values.len() < 2 || values[1] > values[0];
        if !ascending {
            values.reverse();
        }
        if values.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FieldError::domain(format!(
                "Axis '{}' values must be strictly monotonic",
                name
            )));
        }

        Ok(Self {
            name,
            values,
            ascending,
            is_longitude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coordinate values in ascending order, whatever the axis direction.
    pub fn sorted_values(&self) -> &[f64] {
        &self.values
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn is_longitude(&self) -> bool {
        self.is_longitude
    }

    /// Storage slot of `index`; its own inverse.
    #[inline]
    fn slot(&self, index: usize) -> usize {
        if self.ascending {
            index
        } else {
            self.values.len() - 1 - index
        }
    }

    /// Coordinate value at `index`.
    pub fn coordinate_value(&self, index: usize) -> FieldResult<f64> {
        FieldError::check_index(index, self.values.len())?;
        Ok(self.values[self.slot(index)])
    }

    /// Index of the cell containing `value`.
    ///
    /// Exact coordinate matches are found by binary search. Otherwise the
    /// insertion point and the slot before it are tested against their
    /// cell bounds; values outside the outermost bounds are unmapped.
    pub fn find_index_of(&self, value: f64) -> Option<usize> {
        let value = self.canonicalise(value);
        if !value.is_finite() {
            return None;
        }

        let search = self
            .values
            .binary_search_by(|v| v.partial_cmp(&value).unwrap_or(Ordering::Less));
        let insertion = match search {
            Ok(slot) => return Some(self.slot(slot)),
            Err(insertion) => insertion,
        };

        [Some(insertion), insertion.checked_sub(1)]
            .into_iter()
            .flatten()
            .filter(|&slot| slot < self.values.len())
            .find(|&slot| {
                let (lo, hi) = self.bounds_at(slot);
                value >= lo && value <= hi
            })
            .map(|slot| self.slot(slot))
    }

    /// Same as [`IrregularAxis::find_index_of`]; irregular lookups already
    /// use cell containment.
    pub fn find_containing_index(&self, value: f64) -> Option<usize> {
        self.find_index_of(value)
    }

    /// Bound shared by slots `slot - 1` and `slot`; `slot` may be `0` or
    /// `size()` for the extrapolated outer bounds.
    fn bound_before(&self, slot: usize) -> f64 {
        let v = &self.values;
        let n = v.len();
        if n == 1 {
            return v[0];
        }
        if slot == 0 {
            v[0] - 0.5 * (v[1] - v[0])
        } else if slot == n {
            v[n - 1] + 0.5 * (v[n - 1] - v[n - 2])
        } else {
            midpoint(v[slot - 1], v[slot])
        }
    }

    fn bounds_at(&self, slot: usize) -> (f64, f64) {
        (self.bound_before(slot), self.bound_before(slot + 1))
    }

    /// Bounds `(lo, hi)` of the cell at `index`.
    pub fn coordinate_bounds(&self, index: usize) -> FieldResult<(f64, f64)> {
        FieldError::check_index(index, self.values.len())?;
        Ok(self.bounds_at(self.slot(index)))
    }

    /// Range covered by all cell bounds.
    pub fn extent(&self) -> (f64, f64) {
        (self.bound_before(0), self.bound_before(self.values.len()))
    }

    fn canonicalise(&self, value: f64) -> f64 {
        if self.is_longitude {
            next_equivalent_longitude(self.extent().0, value)
        } else {
            value
        }
    }
}

/// A coordinate axis of either representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Axis {
    Regular(RegularAxis),
    Irregular(IrregularAxis),
}

impl Axis {
    /// Build the compact representation when `values` are evenly spaced,
    /// falling back to an explicit list otherwise.
    pub fn from_values(name: impl Into<String>, values: Vec<f64>, is_longitude: bool) -> FieldResult<Self> {
        let name = name.into();
        let irregular = IrregularAxis::new(name.clone(), values, is_longitude)?;
        let v: Vec<f64> = (0..irregular.size()).map(|i| irregular.values[irregular.slot(i)]).collect();
        if v.len() >= 2 {
            let spacing = (v[v.len() - 1] - v[0]) / (v.len() - 1) as f64;
            let regular = v
                .iter()
                .enumerate()
                .all(|(i, &x)| v[0] + i as f64 * spacing == x);
            if regular {
                return Ok(Axis::Regular(RegularAxis::new(name, v[0], spacing, v.len(), is_longitude)?));
            }
        }
        Ok(Axis::Irregular(irregular))
    }

    pub fn name(&self) -> &str {
        match self {
            Axis::Regular(a) => a.name(),
            Axis::Irregular(a) => a.name(),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Axis::Regular(a) => a.size(),
            Axis::Irregular(a) => a.size(),
        }
    }

    pub fn is_ascending(&self) -> bool {
        match self {
            Axis::Regular(a) => a.is_ascending(),
            Axis::Irregular(a) => a.is_ascending(),
        }
    }

    pub fn is_longitude(&self) -> bool {
        match self {
            Axis::Regular(a) => a.is_longitude(),
            Axis::Irregular(a) => a.is_longitude(),
        }
    }

    pub fn coordinate_value(&self, index: usize) -> FieldResult<f64> {
        match self {
            Axis::Regular(a) => a.coordinate_value(index),
            Axis::Irregular(a) => a.coordinate_value(index),
        }
    }

    pub fn find_index_of(&self, value: f64) -> Option<usize> {
        match self {
            Axis::Regular(a) => a.find_index_of(value),
            Axis::Irregular(a) => a.find_index_of(value),
        }
    }

    pub fn find_containing_index(&self, value: f64) -> Option<usize> {
        match self {
            Axis::Regular(a) => a.find_containing_index(value),
            Axis::Irregular(a) => a.find_containing_index(value),
        }
    }

    pub fn coordinate_bounds(&self, index: usize) -> FieldResult<(f64, f64)> {
        match self {
            Axis::Regular(a) => a.coordinate_bounds(index),
            Axis::Irregular(a) => a.coordinate_bounds(index),
        }
    }

    pub fn extent(&self) -> (f64, f64) {
        match self {
            Axis::Regular(a) => a.extent(),
            Axis::Irregular(a) => a.extent(),
        }
    }
}

impl From<RegularAxis> for Axis {
    fn from(axis: RegularAxis) -> Self {
        Axis::Regular(axis)
    }
}

impl From<IrregularAxis> for Axis {
    fn from(axis: IrregularAxis) -> Self {
        Axis::Irregular(axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latitude() -> RegularAxis {
        RegularAxis::new("lat", -90.0, 1.0, 181, false).unwrap()
    }

    #[test]
    fn test_latitude_axis_exact_lookup() {
        let axis = latitude();
        assert_eq!(axis.find_index_of(-90.0), Some(0));
        assert_eq!(axis.find_index_of(90.0), Some(180));
        assert_eq!(axis.find_index_of(-89.6), None);
        assert_eq!(axis.find_index_of(90.5), None);
        assert_eq!(axis.find_index_of(f64::NAN), None);
    }

    #[test]
    fn test_regular_round_trip() {
        let axis = RegularAxis::new("x", 0.1, 0.3, 50, false).unwrap();
        for i in 0..axis.size() {
            let v = axis.coordinate_value(i).unwrap();
            assert_eq!(axis.find_index_of(v), Some(i));
        }
    }

    #[test]
    fn test_regular_containing_index() {
        let axis = latitude();
        assert_eq!(axis.find_containing_index(-89.6), Some(0));
        assert_eq!(axis.find_containing_index(-90.4), Some(0));
        assert_eq!(axis.find_containing_index(90.49), Some(180));
        assert_eq!(axis.find_containing_index(90.6), None);
    }

    #[test]
    fn test_regular_bounds() {
        let axis = latitude();
        assert_eq!(axis.coordinate_bounds(0).unwrap(), (-90.5, -89.5));
        assert_eq!(axis.coordinate_bounds(180).unwrap(), (89.5, 90.5));
        assert!(matches!(axis.coordinate_bounds(181), Err(FieldError::Index { .. })));
        assert_eq!(axis.extent(), (-90.5, 90.5));
    }

    #[test]
    fn test_descending_regular_axis() {
        let axis = RegularAxis::new("lat", 90.0, -0.5, 361, false).unwrap();
        assert!(!axis.is_ascending());
        assert_eq!(axis.find_index_of(89.5), Some(1));
        assert_eq!(axis.coordinate_bounds(0).unwrap(), (89.75, 90.25));
    }

    #[test]
    fn test_regular_longitude_wrap() {
        let axis = RegularAxis::new("lon", 0.0, 1.0, 360, true).unwrap();
        assert_eq!(axis.find_index_of(-10.0), Some(350));
        assert_eq!(axis.find_index_of(370.0), Some(10));
        assert_eq!(axis.find_containing_index(-0.4), Some(0));
        assert_eq!(axis.find_containing_index(-0.6), Some(359));
    }

    #[test]
    fn test_invalid_construction() {
        assert!(matches!(RegularAxis::new("x", 0.0, 1.0, 0, false), Err(FieldError::Domain(_))));
        assert!(matches!(RegularAxis::new("x", 0.0, 0.0, 3, false), Err(FieldError::Domain(_))));
        assert!(matches!(IrregularAxis::new("z", vec![], false), Err(FieldError::Domain(_))));
        assert!(matches!(
            IrregularAxis::new("z", vec![1.0, 3.0, 2.0], false),
            Err(FieldError::Domain(_))
        ));
        assert!(matches!(
            IrregularAxis::new("z", vec![1.0, 1.0], false),
            Err(FieldError::Domain(_))
        ));
    }

    #[test]
    fn test_irregular_lookup() {
        let axis = IrregularAxis::new("depth", vec![0.0, 10.0, 30.0, 70.0], false).unwrap();
        assert_eq!(axis.find_index_of(10.0), Some(1));
        assert_eq!(axis.find_index_of(4.0), Some(0));
        assert_eq!(axis.find_index_of(6.0), Some(1));
        assert_eq!(axis.find_index_of(45.0), Some(2));
        assert_eq!(axis.find_index_of(89.0), Some(3));
        assert_eq!(axis.find_index_of(91.0), None);
        assert_eq!(axis.find_index_of(-5.0), Some(0));
        assert_eq!(axis.find_index_of(-5.1), None);
    }

    #[test]
    fn test_irregular_descending_lookup() {
        let axis = IrregularAxis::new("pressure", vec![1000.0, 850.0, 500.0], false).unwrap();
        assert!(!axis.is_ascending());
        assert_eq!(axis.find_index_of(850.0), Some(1));
        assert_eq!(axis.find_index_of(900.0), Some(1));
        assert_eq!(axis.find_index_of(950.0), Some(0));
        assert_eq!(axis.find_index_of(600.0), Some(2));
        assert_eq!(axis.coordinate_bounds(0).unwrap(), (925.0, 1075.0));
    }

    #[test]
    fn test_descending_irregular_stored_ascending() {
        let axis = IrregularAxis::new("pressure", vec![1000.0, 850.0, 500.0, 250.0], false).unwrap();
        assert_eq!(axis.sorted_values(), &[250.0, 500.0, 850.0, 1000.0]);
        assert_eq!(axis.coordinate_value(0).unwrap(), 1000.0);
        assert_eq!(axis.coordinate_value(3).unwrap(), 250.0);
        assert!(axis.coordinate_value(4).is_err());
        assert_eq!(axis.extent(), (125.0, 1075.0));
        for i in 0..axis.size() {
            let v = axis.coordinate_value(i).unwrap();
            assert_eq!(axis.find_index_of(v), Some(i));
            let (lo, hi) = axis.coordinate_bounds(i).unwrap();
            assert!(lo < v && v < hi);
        }
        assert_eq!(axis.find_index_of(300.0), Some(3));
        assert_eq!(axis.find_index_of(120.0), None);

        let flipped = Axis::from_values("pressure", vec![1000.0, 850.0, 500.0, 250.0], false).unwrap();
        assert!(!flipped.is_ascending());
        assert_eq!(flipped.coordinate_value(1).unwrap(), 850.0);
    }

    #[test]
    fn test_irregular_bounds_contiguous() {
        let axis = IrregularAxis::new("t", vec![0.0, 1.0, 1.5, 4.0, 9.25], false).unwrap();
        for i in 0..axis.size() - 1 {
            let (_, hi) = axis.coordinate_bounds(i).unwrap();
            let (lo, _) = axis.coordinate_bounds(i + 1).unwrap();
            assert_eq!(hi, lo);
        }
        assert_eq!(axis.coordinate_bounds(0).unwrap().0, -0.5);
        assert_eq!(axis.coordinate_bounds(4).unwrap().1, 11.875);
    }

    #[test]
    fn test_single_value_axis() {
        let axis = IrregularAxis::new("z", vec![5.0], false).unwrap();
        assert_eq!(axis.find_index_of(5.0), Some(0));
        assert_eq!(axis.find_index_of(5.1), None);
        assert_eq!(axis.coordinate_bounds(0).unwrap(), (5.0, 5.0));
    }

    #[test]
    fn test_from_values_detects_regular() {
        let axis = Axis::from_values("x", vec![0.0, 2.0, 4.0, 6.0], false).unwrap();
        assert!(matches!(axis, Axis::Regular(_)));

        let axis = Axis::from_values("x", vec![0.0, 2.0, 5.0], false).unwrap();
        assert!(matches!(axis, Axis::Irregular(_)));
    }
}
