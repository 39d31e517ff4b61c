//! Rectangular extents in grid coordinate space.

use crate::error::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

/// Axis-aligned extent, degrees for geographic grids and native units
/// otherwise. `y` grows northwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Like [`BoundingBox::new`] but the box must be finite with positive area.
    pub fn try_new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> FieldResult<Self> {
        let bbox = Self::new(min_x, min_y, max_x, max_y);
        if !bbox.is_finite() || bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return Err(FieldError::domain(format!(
                "Bounding box [{}, {}, {}, {}] is empty or not finite",
                min_x, min_y, max_x, max_y
            )));
        }
        Ok(bbox)
    }

    /// Smallest box enclosing the finite points, or `None` if there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| Self::new(x, y, x, y))
            .reduce(|a, b| a.union(&b))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_finite(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Closed containment: points on an edge are inside.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    /// Position as fractions of the box, `(0,0)` south-west and `(1,1)`
    /// north-east.
    pub fn fraction_of(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.min_x) / self.width(), (y - self.min_y) / self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_skips_nan() {
        let bbox = BoundingBox::from_points(vec![(1.0, 2.0), (f64::NAN, 0.0), (-3.0, 5.0)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(-3.0, 2.0, 1.0, 5.0));
        assert!(BoundingBox::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_single_point_box_is_degenerate() {
        let bbox = BoundingBox::from_points([(4.0, 4.0)]).unwrap();
        assert_eq!((bbox.width(), bbox.height()), (0.0, 0.0));
        assert!(BoundingBox::try_new(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y).is_err());
    }
}
