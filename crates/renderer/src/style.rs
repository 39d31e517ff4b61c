//! Style functions mapping samples to colours or opacities.
//!
//! A [`StyleFunction`] is a closed set of evaluation strategies:
//! - **Threshold**: step function over ascending thresholds
//! - **Interpolate**: piecewise-linear between control points, clamped at
//!   both ends
//! - **Segment**: an implicit [`ColourScale`] fused with a band list
//! - **Map**: exact lookup of integral categories
//!
//! Every strategy returns the fallback for missing or NaN input. Functions
//! are validated on construction and immutable afterwards.

use crate::palette::{self, ColourTableOptions, Palette};
use crate::scale::ColourScale;
use field_common::{Color, FieldError, FieldResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

/// A value a style function can produce.
pub trait StyleValue: Clone + Debug + PartialEq + Send + Sync {
    /// Linear interpolation, `t` in `[0, 1]`.
    fn lerp(&self, other: &Self, t: f64) -> Self;

    /// Values of a named palette resampled to `num_bands`.
    fn named_palette(name: &str, num_bands: usize) -> FieldResult<Vec<Self>>;
}

impl StyleValue for Color {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Color::lerp(self, other, t)
    }

    fn named_palette(name: &str, num_bands: usize) -> FieldResult<Vec<Self>> {
        Ok(Palette::named(name, num_bands)?.colours().to_vec())
    }
}

impl StyleValue for f32 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0) as f32;
        self + (other - self) * t
    }

    fn named_palette(name: &str, _num_bands: usize) -> FieldResult<Vec<Self>> {
        Err(FieldError::domain(format!(
            "Named palette '{}' cannot supply scalar values",
            name
        )))
    }
}

/// Band spacing of a segment style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    #[default]
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleFunction<T> {
    Threshold(Threshold<T>),
    Interpolate(Interpolate<T>),
    Segment(Segment<T>),
    Map(CategoryMap<T>),
}

impl<T: StyleValue> StyleFunction<T> {
    /// Evaluate for one sample. `None` means no value and no fallback.
    #[inline]
    pub fn evaluate(&self, sample: Option<f64>) -> Option<T> {
        let value = match sample {
            Some(v) if !v.is_nan() => v,
            _ => return self.fallback().cloned(),
        };
        match self {
            StyleFunction::Threshold(f) => Some(f.evaluate(value)),
            StyleFunction::Interpolate(f) => Some(f.evaluate(value)),
            StyleFunction::Segment(f) => Some(f.evaluate(value)),
            StyleFunction::Map(f) => f.evaluate(value),
        }
    }

    /// Evaluate a 32-bit sample, treating NaN as missing.
    #[inline]
    pub fn evaluate_f32(&self, sample: f32) -> Option<T> {
        self.evaluate(Some(sample as f64))
    }

    pub fn fallback(&self) -> Option<&T> {
        match self {
            StyleFunction::Threshold(f) => f.fallback.as_ref(),
            StyleFunction::Interpolate(f) => f.fallback.as_ref(),
            StyleFunction::Segment(f) => f.fallback.as_ref(),
            StyleFunction::Map(f) => f.fallback.as_ref(),
        }
    }

    /// Name of the strategy, as used in style documents.
    pub fn kind(&self) -> &'static str {
        match self {
            StyleFunction::Threshold(_) => "threshold",
            StyleFunction::Interpolate(_) => "interpolate",
            StyleFunction::Segment(_) => "segment",
            StyleFunction::Map(_) => "map",
        }
    }
}

impl<T> From<Threshold<T>> for StyleFunction<T> {
    fn from(f: Threshold<T>) -> Self {
        StyleFunction::Threshold(f)
    }
}

impl<T> From<Interpolate<T>> for StyleFunction<T> {
    fn from(f: Interpolate<T>) -> Self {
        StyleFunction::Interpolate(f)
    }
}

impl<T> From<Segment<T>> for StyleFunction<T> {
    fn from(f: Segment<T>) -> Self {
        StyleFunction::Segment(f)
    }
}

impl<T> From<CategoryMap<T>> for StyleFunction<T> {
    fn from(f: CategoryMap<T>) -> Self {
        StyleFunction::Map(f)
    }
}

/// Step function: `values[k]` applies from `thresholds[k-1]` (inclusive)
/// up to `thresholds[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold<T> {
    thresholds: Vec<f32>,
    values: Vec<T>,
    fallback: Option<T>,
}

impl<T: StyleValue> Threshold<T> {
    pub fn new(thresholds: Vec<f32>, values: Vec<T>, fallback: Option<T>) -> FieldResult<Self> {
        if values.len() != thresholds.len() + 1 {
            return Err(FieldError::domain(format!(
                "Threshold style needs {} values for {} thresholds, got {}",
                thresholds.len() + 1,
                thresholds.len(),
                values.len()
            )));
        }
        if thresholds.iter().any(|t| !t.is_finite()) || thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FieldError::domain("Thresholds must be finite and strictly ascending"));
        }
        Ok(Self {
            thresholds,
            values,
            fallback,
        })
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    fn evaluate(&self, value: f64) -> T {
        // Compare at the thresholds' f32 precision
        let value = value as f32;
        let k = self.thresholds.partition_point(|&t| t <= value);
        self.values[k].clone()
    }
}

/// Piecewise-linear interpolation between `(data, value)` control points.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolate<T> {
    points: Vec<(f32, T)>,
    fallback: Option<T>,
}

impl<T: StyleValue> Interpolate<T> {
    pub fn new(points: Vec<(f32, T)>, fallback: Option<T>) -> FieldResult<Self> {
        if points.is_empty() {
            return Err(FieldError::domain("Interpolate style needs at least one point"));
        }
        if points.iter().any(|(d, _)| !d.is_finite()) || points.windows(2).any(|w| w[0].0 > w[1].0) {
            return Err(FieldError::domain(
                "Interpolation points must be finite and sorted by data value",
            ));
        }
        Ok(Self { points, fallback })
    }

    pub fn points(&self) -> &[(f32, T)] {
        &self.points
    }

    fn evaluate(&self, value: f64) -> T {
        let first = &self.points[0];
        let last = &self.points[self.points.len() - 1];
        if value <= first.0 as f64 {
            return first.1.clone();
        }
        if value >= last.0 as f64 {
            return last.1.clone();
        }

        // first.0 < value < last.0, so 1 <= k < len
        let k = self.points.partition_point(|(d, _)| (*d as f64) <= value);
        let (d0, v0) = &self.points[k - 1];
        let (d1, v1) = &self.points[k];
        let span = (*d1 - *d0) as f64;
        let t = if span > 0.0 { (value - *d0 as f64) / span } else { 0.0 };
        v0.lerp(v1, t)
    }
}

/// Colour scale fused with a band list.
///
/// Samples inside the range pick their band; samples below or above take
/// `below_min` / `above_max`, or the first / last band when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<T> {
    scale: ColourScale,
    values: Vec<T>,
    below_min: Option<T>,
    above_max: Option<T>,
    fallback: Option<T>,
}

impl<T: StyleValue> Segment<T> {
    /// Build from a range and spacing; `values` is resampled to
    /// `num_segments` bands.
    pub fn new(
        range: (f32, f32),
        spacing: Spacing,
        num_segments: u32,
        values: &[T],
        below_min: Option<T>,
        above_max: Option<T>,
        fallback: Option<T>,
    ) -> FieldResult<Self> {
        let scale = ColourScale::new(
            range.0 as f64,
            range.1 as f64,
            spacing == Spacing::Logarithmic,
            num_segments,
        )?;
        let values = palette::generate(values, num_segments as usize)?;
        Ok(Self {
            scale,
            values,
            below_min,
            above_max,
            fallback,
        })
    }

    /// Build with bands taken from a named palette.
    pub fn with_named_palette(
        range: (f32, f32),
        spacing: Spacing,
        num_segments: u32,
        palette_name: &str,
        below_min: Option<T>,
        above_max: Option<T>,
        fallback: Option<T>,
    ) -> FieldResult<Self> {
        let values = T::named_palette(palette_name, num_segments as usize)?;
        Self::new(range, spacing, num_segments, &values, below_min, above_max, fallback)
    }

    /// The implicit scale, for rendering on the indexed path.
    pub fn scale(&self) -> &ColourScale {
        &self.scale
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    fn evaluate(&self, value: f64) -> T {
        let index = self.scale.colour_index(Some(value));
        if let Some(v) = self.values.get(index as usize) {
            return v.clone();
        }
        // Only the out-of-range sentinel remains for a finite sample
        let (edge, first) = if value < self.scale.low() {
            (&self.below_min, true)
        } else {
            (&self.above_max, false)
        };
        match edge {
            Some(v) => v.clone(),
            None if first => self.values[0].clone(),
            None => self.values[self.values.len() - 1].clone(),
        }
    }
}

impl Segment<Color> {
    /// Band colours as a palette, with sentinels left to the colour table.
    pub fn palette(&self) -> FieldResult<Palette> {
        Palette::new(self.values.clone())
    }

    /// Colour of samples below the range.
    pub fn below_colour(&self) -> Color {
        self.below_min.unwrap_or(self.values[0])
    }

    /// Colour of samples above the range.
    pub fn above_colour(&self) -> Color {
        self.above_max.unwrap_or(self.values[self.values.len() - 1])
    }

    /// Whether both sides of the range share one colour, so a colour table
    /// with a single out-of-range entry reproduces this style exactly.
    pub fn fits_colour_table(&self) -> bool {
        self.below_colour() == self.above_colour()
    }

    /// `base` with the out-of-range and missing-data entries replaced by
    /// this style's edge and fallback colours.
    ///
    /// When the edges differ the above-range colour wins; check
    /// [`fits_colour_table`](Self::fits_colour_table) first.
    pub fn colour_table_options(&self, base: &ColourTableOptions) -> ColourTableOptions {
        let out_of_range = if self.fits_colour_table() {
            self.below_colour()
        } else {
            self.above_colour()
        };
        let background = self.fallback.unwrap_or(Color::TRANSPARENT);
        ColourTableOptions {
            background,
            transparent_background: background.a == 0,
            out_of_range: Some(out_of_range),
            transparent_out_of_range: out_of_range.a == 0,
            ..base.clone()
        }
    }
}

/// Exact lookup of integral categories.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMap<T> {
    table: HashMap<i32, T>,
    fallback: Option<T>,
}

impl<T: StyleValue> CategoryMap<T> {
    pub fn new(table: HashMap<i32, T>, fallback: Option<T>) -> Self {
        Self { table, fallback }
    }

    pub fn table(&self) -> &HashMap<i32, T> {
        &self.table
    }

    fn evaluate(&self, value: f64) -> Option<T> {
        let in_range = value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64;
        let hit = if in_range {
            self.table.get(&(value as i32)).cloned()
        } else {
            None
        };
        hit.or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Color = Color::rgb(1, 0, 0);
    const B: Color = Color::rgb(2, 0, 0);
    const C: Color = Color::rgb(3, 0, 0);
    const D: Color = Color::rgb(4, 0, 0);
    const FALLBACK: Color = Color::rgb(9, 9, 9);

    #[test]
    fn test_threshold() {
        let f: StyleFunction<Color> =
            Threshold::new(vec![0.0, 10.0, 20.0], vec![A, B, C, D], Some(FALLBACK))
                .unwrap()
                .into();
        assert_eq!(f.evaluate(Some(-1.0)), Some(A));
        assert_eq!(f.evaluate(Some(0.0)), Some(B));
        assert_eq!(f.evaluate(Some(5.0)), Some(B));
        assert_eq!(f.evaluate(Some(20.0)), Some(D));
        assert_eq!(f.evaluate(None), Some(FALLBACK));
        assert_eq!(f.evaluate(Some(f64::NAN)), Some(FALLBACK));
    }

    #[test]
    fn test_threshold_at_f32_boundary() {
        let f: StyleFunction<Color> = Threshold::new(vec![0.1, 5.0], vec![A, B, C], None).unwrap().into();
        // 0.1f64 is below 0.1f32 as f64, but still sits on the threshold
        assert_eq!(f.evaluate(Some(0.1)), Some(B));
        assert_eq!(f.evaluate(Some(0.0999)), Some(A));
        assert_eq!(f.evaluate_f32(5.0), Some(C));
    }

    #[test]
    fn test_threshold_validation() {
        assert!(Threshold::new(vec![0.0, 10.0], vec![A, B], None).is_err());
        assert!(Threshold::new(vec![10.0, 0.0], vec![A, B, C], None).is_err());
    }

    #[test]
    fn test_interpolate_clamps() {
        let f: StyleFunction<f32> = Interpolate::new(vec![(0.0, 0.0), (10.0, 1.0)], None)
            .unwrap()
            .into();
        assert_eq!(f.evaluate(Some(-5.0)), Some(0.0));
        assert_eq!(f.evaluate(Some(2.5)), Some(0.25));
        assert_eq!(f.evaluate(Some(50.0)), Some(1.0));
        assert_eq!(f.evaluate(None), None);
    }

    #[test]
    fn test_interpolate_colours() {
        let f: StyleFunction<Color> =
            Interpolate::new(vec![(0.0, Color::BLACK), (1.0, Color::WHITE), (2.0, A)], None)
                .unwrap()
                .into();
        assert_eq!(f.evaluate(Some(0.5)), Some(Color::rgb(128, 128, 128)));
        assert_eq!(f.evaluate(Some(1.0)), Some(Color::WHITE));
    }

    #[test]
    fn test_segment_edges() {
        let seg = Segment::new((0.0, 100.0), Spacing::Linear, 4, &[A, B, C, D], Some(Color::BLACK), None, None)
            .unwrap();
        let f: StyleFunction<Color> = seg.into();
        assert_eq!(f.evaluate(Some(0.0)), Some(A));
        assert_eq!(f.evaluate(Some(60.0)), Some(C));
        assert_eq!(f.evaluate(Some(100.0)), Some(D));
        assert_eq!(f.evaluate(Some(-1.0)), Some(Color::BLACK));
        assert_eq!(f.evaluate(Some(101.0)), Some(D));
        assert_eq!(f.evaluate(None), None);
    }

    #[test]
    fn test_segment_colour_table_options() {
        let base = ColourTableOptions::default();

        let split = Segment::new((0.0, 100.0), Spacing::Linear, 4, &[A, B, C, D], Some(FALLBACK), None, None)
            .unwrap();
        assert_eq!((split.below_colour(), split.above_colour()), (FALLBACK, D));
        assert!(!split.fits_colour_table());
        let options = split.colour_table_options(&base);
        assert_eq!(options.out_of_range, Some(D));
        assert!(options.transparent_background);

        let shared = Segment::new(
            (0.0, 100.0),
            Spacing::Linear,
            4,
            &[A, B, C, D],
            Some(FALLBACK),
            Some(FALLBACK),
            Some(Color::WHITE),
        )
        .unwrap();
        assert!(shared.fits_colour_table());
        let options = shared.colour_table_options(&base);
        assert_eq!(options.out_of_range, Some(FALLBACK));
        assert!(!options.transparent_out_of_range);
        assert_eq!(options.background, Color::WHITE);
        assert!(!options.transparent_background);
        assert_eq!(options.ink, base.ink);
    }

    #[test]
    fn test_segment_named_palette() {
        let seg = Segment::<Color>::with_named_palette((1.0, 1000.0), Spacing::Logarithmic, 16, "viridis", None, None, None)
            .unwrap();
        assert_eq!(seg.values().len(), 16);
        assert!(seg.scale().is_logarithmic());
        assert_eq!(seg.palette().unwrap().len(), 16);

        assert!(Segment::<f32>::with_named_palette((0.0, 1.0), Spacing::Linear, 4, "viridis", None, None, None).is_err());
    }

    #[test]
    fn test_map() {
        let mut table = HashMap::new();
        table.insert(1, A);
        table.insert(-2, B);
        let f: StyleFunction<Color> = CategoryMap::new(table, Some(FALLBACK)).into();
        assert_eq!(f.evaluate(Some(1.0)), Some(A));
        assert_eq!(f.evaluate(Some(-2.0)), Some(B));
        assert_eq!(f.evaluate(Some(1.5)), Some(FALLBACK));
        assert_eq!(f.evaluate(Some(7.0)), Some(FALLBACK));
        assert_eq!(f.evaluate(Some(1e12)), Some(FALLBACK));
    }
}
