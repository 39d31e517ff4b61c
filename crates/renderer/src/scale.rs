//! Quantisation of numeric samples into colour-table indices.

use field_common::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

/// Largest number of ordinary bands a scale may have.
///
/// Two sentinel indices and two overlay slots follow the bands, so a full
/// colour table still fits in 256 entries.
pub const MAX_BANDS: u32 = 250;

/// Linear or logarithmic mapping from `[low, high]` onto `num_bands` bands.
///
/// Index `num_bands` is reserved for missing samples and `num_bands + 1`
/// for samples outside `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScaleSpec", into = "ScaleSpec")]
pub struct ColourScale {
    low: f64,
    high: f64,
    logarithmic: bool,
    num_bands: u32,
}

impl ColourScale {
    /// Create a scale, rejecting empty ranges, band counts outside
    /// `1..=250`, and non-positive bounds on a logarithmic scale.
    pub fn new(low: f64, high: f64, logarithmic: bool, num_bands: u32) -> FieldResult<Self> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(FieldError::domain(format!(
                "Scale range must satisfy low < high (low={}, high={})",
                low, high
            )));
        }
        if num_bands == 0 || num_bands > MAX_BANDS {
            return Err(FieldError::domain(format!(
                "Band count {} outside 1..={}",
                num_bands, MAX_BANDS
            )));
        }
        if logarithmic && low <= 0.0 {
            return Err(FieldError::domain(format!(
                "Logarithmic scale needs a positive lower bound (low={})",
                low
            )));
        }

        Ok(Self {
            low,
            high,
            logarithmic,
            num_bands,
        })
    }

    /// Scale over a range that may be degenerate, e.g. from auto-ranging.
    pub fn from_range(range: (f64, f64), logarithmic: bool, num_bands: u32) -> FieldResult<Self> {
        let (low, high) = widen_range(range.0, range.1, logarithmic);
        Self::new(low, high, logarithmic, num_bands)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn is_logarithmic(&self) -> bool {
        self.logarithmic
    }

    pub fn num_bands(&self) -> u32 {
        self.num_bands
    }

    /// Index used for missing samples.
    pub fn background_index(&self) -> u8 {
        self.num_bands as u8
    }

    /// Index used for samples outside the range.
    pub fn out_of_range_index(&self) -> u8 {
        (self.num_bands + 1) as u8
    }

    /// Position of `value` within the range, 0 at `low` and 1 at `high`.
    pub fn normalise(&self, value: f64) -> f64 {
        if self.logarithmic {
            (value.ln() - self.low.ln()) / (self.high.ln() - self.low.ln())
        } else {
            (value - self.low) / (self.high - self.low)
        }
    }

    /// Inverse of [`ColourScale::normalise`].
    pub fn value_at(&self, fraction: f64) -> f64 {
        if self.logarithmic {
            (self.low.ln() + fraction * (self.high.ln() - self.low.ln())).exp()
        } else {
            self.low + fraction * (self.high - self.low)
        }
    }

    /// Colour index for a sample.
    ///
    /// Missing and NaN samples map to the background index; samples outside
    /// `[low, high]` map to the out-of-range index. A sample equal to `high`
    /// lands in the last band.
    #[inline]
    pub fn colour_index(&self, sample: Option<f64>) -> u8 {
        let value = match sample {
            Some(v) if !v.is_nan() => v,
            _ => return self.background_index(),
        };
        if value < self.low || value > self.high {
            return self.out_of_range_index();
        }

        let band = (self.normalise(value) * self.num_bands as f64).floor();
        let band = (band.max(0.0) as u32).min(self.num_bands - 1);
        band as u8
    }
}

/// Widen a degenerate range so a scale can be built from it.
pub fn widen_range(min: f64, max: f64, logarithmic: bool) -> (f64, f64) {
    if min < max {
        return (min, max);
    }
    if logarithmic && min > 0.0 {
        (min * 0.5, max * 2.0)
    } else if min == 0.0 {
        (0.0, 1.0)
    } else {
        let pad = min.abs() * 0.5;
        (min - pad, max + pad)
    }
}

/// Serialised form, validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScaleSpec {
    low: f64,
    high: f64,
    #[serde(default)]
    logarithmic: bool,
    #[serde(default = "default_bands")]
    num_bands: u32,
}

fn default_bands() -> u32 {
    MAX_BANDS
}

impl TryFrom<ScaleSpec> for ColourScale {
    type Error = FieldError;

    fn try_from(spec: ScaleSpec) -> Result<Self, Self::Error> {
        ColourScale::new(spec.low, spec.high, spec.logarithmic, spec.num_bands)
    }
}

impl From<ColourScale> for ScaleSpec {
    fn from(s: ColourScale) -> Self {
        ScaleSpec {
            low: s.low,
            high: s.high,
            logarithmic: s.logarithmic,
            num_bands: s.num_bands,
        }
    }
}
