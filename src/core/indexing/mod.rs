// src/core/indexing/mod.rs

//! Exact kNN indexes over a fixed point set.

use std::fmt::Debug;

use crate::core::common::KnnError;
use crate::core::distance::{DistanceResult, DistanceValue};
use crate::core::types::{Point, PointId};

pub mod collector;
pub mod kdtree;
pub mod linear;
mod store;

pub use self::collector::KnnCollector;
pub use self::kdtree::KdTreeIndex;
pub use self::linear::LinearScanIndex;

/// What a kNN query is asked about: an arbitrary point or a stored point's id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnnQuery<'a> {
    Point(&'a Point),
    Id(PointId),
}

impl<'a> From<&'a Point> for KnnQuery<'a> {
    fn from(point: &'a Point) -> Self {
        Self::Point(point)
    }
}

impl From<PointId> for KnnQuery<'_> {
    fn from(id: PointId) -> Self {
        Self::Id(id)
    }
}

/// Trait for indexes answering exact k-nearest-neighbor queries.
///
/// Indexes are built once and are read-only afterwards, so queries take `&self`
/// and may run concurrently.
pub trait KnnIndex: Debug + Send + Sync {
    type Distance: DistanceValue;

    /// Dimensionality of the indexed points (0 for an empty index).
    fn dimension(&self) -> usize;

    /// The indexed points in insertion order.
    fn points(&self) -> &[Point];

    /// Looks up a stored point by id.
    fn point(&self, id: PointId) -> Option<&Point>;

    fn len(&self) -> usize {
        self.points().len()
    }

    fn is_empty(&self) -> bool {
        self.points().is_empty()
    }

    /// Returns the `min(k, len)` nearest points, ascending by distance and by id among
    /// equal distances.
    ///
    /// # Errors
    ///
    /// `UnknownId` for an id that is not stored, `DimensionMismatch` for a query point
    /// of the wrong dimensionality, and whatever the distance function reports.
    fn k_nearest(
        &self,
        query: KnnQuery<'_>,
        k: usize,
    ) -> Result<Vec<DistanceResult<Self::Distance>>, KnnError>;
}
