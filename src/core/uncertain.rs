// src/core/uncertain.rs

//! Probability densities for sampling uncertain point positions.

use std::fmt::Debug;

use rand::Rng;

use crate::core::common::KnnError;
use crate::core::types::{Bounds, Point};

/// A distribution over positions in space.
pub trait ProbabilityDensity: Debug + Send + Sync {
    /// Draws one position, restricted to `bounds`.
    ///
    /// # Errors
    ///
    /// Implementation specific; see [`UniformDensity::draw_value`].
    fn draw_value<R: Rng + ?Sized>(&self, bounds: &Bounds, rng: &mut R) -> Result<Vec<f64>, KnnError>
    where
        Self: Sized;

    /// Bounds to draw within when the caller has none.
    fn default_bounds(&self, dimensions: usize) -> Bounds {
        Bounds::unbounded(dimensions)
    }
}

/// Uniform distribution over an axis-aligned box.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDensity {
    support: Bounds,
}

impl UniformDensity {
    pub const fn new(support: Bounds) -> Self {
        Self { support }
    }

    /// Box of half-width `radius` around `center` on every axis.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `radius` is negative or not finite.
    pub fn around(center: &Point, radius: f64) -> Result<Self, KnnError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(KnnError::invalid_input(format!(
                "radius must be finite and non-negative, got {}",
                radius
            )));
        }
        let min = center.coordinates().iter().map(|c| c - radius).collect();
        let max = center.coordinates().iter().map(|c| c + radius).collect();
        Ok(Self::new(Bounds::new(min, max)?))
    }

    pub const fn support(&self) -> &Bounds {
        &self.support
    }
}

impl ProbabilityDensity for UniformDensity {
    /// Samples uniformly inside the intersection of the support and `bounds`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `bounds` has another dimensionality than the support,
    /// `InvalidInput` when the intersection is empty or has an infinite extent.
    fn draw_value<R: Rng + ?Sized>(&self, bounds: &Bounds, rng: &mut R) -> Result<Vec<f64>, KnnError> {
        let region = self
            .support
            .intersection(bounds)?
            .ok_or_else(|| KnnError::invalid_input("support does not intersect the bounds"))?;

        (0..region.dimensionality())
            .map(|axis| {
                let (lo, hi) = (region.min()[axis], region.max()[axis]);
                if !region.extent(axis).is_finite() {
                    return Err(KnnError::invalid_input(format!(
                        "cannot sample an unbounded range on axis {}",
                        axis
                    )));
                }
                Ok(if lo == hi { lo } else { rng.gen_range(lo..=hi) })
            })
            .collect()
    }
}
