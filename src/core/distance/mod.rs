// src/core/distance/mod.rs

//! Distance functions over [`Point`]s.
//!
//! Every distance function implements [`DistanceFunction`]. Its value type only has to
//! be totally ordered ([`DistanceValue`]); scalar metrics use `f64`, the subspace
//! correlation distance uses the composite [`CorrelationDistance`].
//!
//! The KD-tree prunes subtrees only for functions reporting [`DistanceFunction::is_metric`];
//! anything else is answered by an exhaustive scan.

use std::cmp::Ordering;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::core::common::KnnError;
use crate::core::types::{Bounds, Point, PointId};

pub mod correlation;

pub use self::correlation::{CorrelationDistance, SubspaceCorrelationDistance};

/// A distance value with a total order.
pub trait DistanceValue: Copy + Debug + PartialEq + Send + Sync {
    /// Total order used by the result collector.
    fn total_order(&self, other: &Self) -> Ordering;
}

impl DistanceValue for f64 {
    fn total_order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

/// Capability interface shared by all distance functions.
///
/// Implementations are side-effect free with respect to their inputs: any working
/// state is copied out of the operands, never written back.
pub trait DistanceFunction: Debug + Send + Sync {
    type Distance: DistanceValue;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Distance between two points.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `a` and `b` differ in dimensionality.
    fn distance(&self, a: &Point, b: &Point) -> Result<Self::Distance, KnnError>;

    /// Bounds to use when nothing tighter is known. Defaults to [`Bounds::unbounded`].
    fn default_bounds(&self, dimensions: usize) -> Bounds {
        Bounds::unbounded(dimensions)
    }

    /// Whether the triangle inequality holds, which is what makes region pruning valid.
    fn is_metric(&self) -> bool;

    /// A lower bound on the distance from `query` to any point inside `bounds`.
    ///
    /// `None` means no bound is known and the region must be searched.
    fn min_distance_to_bounds(&self, _query: &Point, _bounds: &Bounds) -> Option<Self::Distance> {
        None
    }
}

/// One entry of a kNN result: a point id and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceResult<D> {
    pub id: PointId,
    pub distance: D,
}

impl<D: DistanceValue> DistanceResult<D> {
    pub const fn new(id: PointId, distance: D) -> Self {
        Self { id, distance }
    }

    /// Ascending by distance, ascending by id among equal distances.
    #[must_use]
    pub fn result_order(&self, other: &Self) -> Ordering {
        self.distance.total_order(&other.distance).then_with(|| self.id.cmp(&other.id))
    }
}

/// Closed set of coordinate metrics. All of them satisfy the triangle inequality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// L2 distance.
    #[default]
    Euclidean,
    /// L1 distance.
    Manhattan,
    /// L-infinity distance.
    Chebyshev,
}

impl DistanceMetric {
    /// Distance between two coordinate slices under this metric.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the slices differ in length.
    pub fn calculate(&self, v1: &[f64], v2: &[f64]) -> Result<f64, KnnError> {
        match self {
            Self::Euclidean => euclidean_distance(v1, v2),
            Self::Manhattan => manhattan_distance(v1, v2),
            Self::Chebyshev => chebyshev_distance(v1, v2),
        }
    }

    /// Combines per-axis gaps the same way [`DistanceMetric::calculate`] combines
    /// per-axis differences.
    fn combine_gaps(&self, gaps: impl Iterator<Item = f64>) -> f64 {
        match self {
            Self::Euclidean => gaps.map(|g| g * g).sum::<f64>().sqrt(),
            Self::Manhattan => gaps.sum(),
            Self::Chebyshev => gaps.fold(0.0, f64::max),
        }
    }
}

impl DistanceFunction for DistanceMetric {
    type Distance = f64;

    fn name(&self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
            Self::Chebyshev => "chebyshev",
        }
    }

    fn distance(&self, a: &Point, b: &Point) -> Result<f64, KnnError> {
        self.calculate(a.coordinates(), b.coordinates())
    }

    fn is_metric(&self) -> bool {
        true
    }

    fn min_distance_to_bounds(&self, query: &Point, bounds: &Bounds) -> Option<f64> {
        if query.dimensionality() != bounds.dimensionality() {
            return None;
        }
        Some(self.combine_gaps(bounds.min_gaps(query)))
    }
}

/// Calculates the Euclidean distance between two vectors.
///
/// # Errors
///
/// `DimensionMismatch` when the vectors have different dimensions.
pub fn euclidean_distance(v1: &[f64], v2: &[f64]) -> Result<f64, KnnError> {
    KnnError::check_dimensions(v1.len(), v2.len())?;
    let sum_sq_diff: f64 = v1.iter().zip(v2.iter()).map(|(a, b)| (a - b).powi(2)).sum();
    Ok(sum_sq_diff.sqrt())
}

/// Calculates the Manhattan distance between two vectors.
///
/// # Errors
///
/// `DimensionMismatch` when the vectors have different dimensions.
pub fn manhattan_distance(v1: &[f64], v2: &[f64]) -> Result<f64, KnnError> {
    KnnError::check_dimensions(v1.len(), v2.len())?;
    Ok(v1.iter().zip(v2.iter()).map(|(a, b)| (a - b).abs()).sum())
}

/// Calculates the Chebyshev (maximum) distance between two vectors.
///
/// # Errors
///
/// `DimensionMismatch` when the vectors have different dimensions.
pub fn chebyshev_distance(v1: &[f64], v2: &[f64]) -> Result<f64, KnnError> {
    KnnError::check_dimensions(v1.len(), v2.len())?;
    Ok(v1.iter().zip(v2.iter()).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max))
}
