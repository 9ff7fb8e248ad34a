// src/core/types/bounds.rs

use serde::{Deserialize, Serialize};

use super::Point;
use crate::core::common::KnnError;

/// Axis-aligned hyperrectangle: one `[min, max]` interval per dimension.
///
/// `min[i] <= max[i]` holds for every dimension of every value of this type,
/// including both halves produced by [`Bounds::split`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from explicit corners.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the corners differ in length, `InvalidInput` when
    /// a coordinate is NaN or `min[i] > max[i]`.
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Result<Self, KnnError> {
        KnnError::check_dimensions(min.len(), max.len())?;
        for (axis, (lo, hi)) in min.iter().zip(max.iter()).enumerate() {
            if lo.is_nan() || hi.is_nan() {
                return Err(KnnError::invalid_input(format!("bounds on axis {} contain NaN", axis)));
            }
            if lo > hi {
                return Err(KnnError::invalid_input(format!(
                    "bounds on axis {} are inverted: min {} > max {}",
                    axis, lo, hi
                )));
            }
        }
        Ok(Self { min, max })
    }

    /// The widest representable bounds: `f64::MIN..=f64::MAX` on every axis.
    ///
    /// The sentinels are only meaningful for comparisons; differences between
    /// them overflow.
    #[must_use]
    pub fn unbounded(dimensions: usize) -> Self {
        Self { min: vec![f64::MIN; dimensions], max: vec![f64::MAX; dimensions] }
    }

    /// The tightest bounds containing every point, or `None` for an empty slice.
    ///
    /// Callers are expected to have checked that all points share one dimensionality
    /// and have no NaN coordinates.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = first.coordinates().to_vec();
        let mut max = min.clone();
        for point in iter {
            for (axis, &value) in point.coordinates().iter().enumerate() {
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
            }
        }
        Some(Self { min, max })
    }

    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.min.len()
    }

    #[must_use]
    pub fn min(&self) -> &[f64] {
        &self.min
    }

    #[must_use]
    pub fn max(&self) -> &[f64] {
        &self.max
    }

    /// Width of the interval on `axis`.
    #[must_use]
    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        point.dimensionality() == self.dimensionality()
            && point
                .coordinates()
                .iter()
                .zip(self.min.iter().zip(self.max.iter()))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }

    /// Splits at `value` on `axis` into a lower and an upper half.
    ///
    /// `value` is clamped into the interval so both halves keep `min <= max`.
    #[must_use]
    pub fn split(&self, axis: usize, value: f64) -> (Self, Self) {
        let cut = value.clamp(self.min[axis], self.max[axis]);
        let mut lower = self.clone();
        let mut upper = self.clone();
        lower.max[axis] = cut;
        upper.min[axis] = cut;
        (lower, upper)
    }

    /// Per-axis distance from `point` to the nearest face of the box (zero inside).
    pub fn min_gaps<'a>(&'a self, point: &'a Point) -> impl Iterator<Item = f64> + 'a {
        point
            .coordinates()
            .iter()
            .zip(self.min.iter().zip(self.max.iter()))
            .map(|(&v, (&lo, &hi))| {
                if v < lo {
                    lo - v
                } else if v > hi {
                    v - hi
                } else {
                    0.0
                }
            })
    }

    /// Intersection with `other`, or `None` when the boxes are disjoint.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the two boxes differ in dimensionality.
    pub fn intersection(&self, other: &Self) -> Result<Option<Self>, KnnError> {
        KnnError::check_dimensions(self.dimensionality(), other.dimensionality())?;
        let min: Vec<f64> = self.min.iter().zip(&other.min).map(|(a, b)| a.max(*b)).collect();
        let max: Vec<f64> = self.max.iter().zip(&other.max).map(|(a, b)| a.min(*b)).collect();
        if min.iter().zip(&max).any(|(lo, hi)| lo > hi) {
            return Ok(None);
        }
        Ok(Some(Self { min, max }))
    }
}
