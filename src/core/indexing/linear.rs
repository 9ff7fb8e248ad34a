// src/core/indexing/linear.rs

//! Exhaustive kNN search.

use super::store::PointStore;
use super::{KnnCollector, KnnIndex, KnnQuery};
use crate::core::common::KnnError;
use crate::core::distance::{DistanceFunction, DistanceResult};
use crate::core::types::{Point, PointId};

/// Compares `query` against every point. Works for any distance function.
pub fn linear_scan<M: DistanceFunction>(
    points: &[Point],
    metric: &M,
    query: &Point,
    k: usize,
) -> Result<Vec<DistanceResult<M::Distance>>, KnnError> {
    if k == 0 {
        return Ok(Vec::new());
    }
    let mut collector = KnnCollector::new(k);
    for point in points {
        collector.insert(point.id(), metric.distance(query, point)?);
    }
    Ok(collector.into_sorted_vec())
}

/// Index without any structure: every query scans all points.
#[derive(Debug)]
pub struct LinearScanIndex<M> {
    store: PointStore,
    metric: M,
}

impl<M: DistanceFunction> LinearScanIndex<M> {
    /// # Errors
    ///
    /// `DimensionMismatch`, `DuplicateId` or `InvalidInput` when the points are not a
    /// consistent set.
    pub fn build(points: Vec<Point>, metric: M) -> Result<Self, KnnError> {
        Ok(Self { store: PointStore::new(points)?, metric })
    }

    #[must_use]
    pub const fn metric(&self) -> &M {
        &self.metric
    }
}

impl<M: DistanceFunction> KnnIndex for LinearScanIndex<M> {
    type Distance = M::Distance;

    fn dimension(&self) -> usize {
        self.store.dimension()
    }

    fn points(&self) -> &[Point] {
        self.store.points()
    }

    fn point(&self, id: PointId) -> Option<&Point> {
        self.store.get(id)
    }

    fn k_nearest(
        &self,
        query: KnnQuery<'_>,
        k: usize,
    ) -> Result<Vec<DistanceResult<M::Distance>>, KnnError> {
        let query_point = self.store.resolve(query)?;
        linear_scan(self.store.points(), &self.metric, query_point, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::DistanceMetric;

    #[test]
    fn test_linear_scan_orders_results() {
        let points = vec![
            Point::new(0, vec![0.0]),
            Point::new(1, vec![3.0]),
            Point::new(2, vec![-1.0]),
            Point::new(3, vec![1.0]),
        ];
        let index = LinearScanIndex::build(points, DistanceMetric::Euclidean).unwrap();
        let results = index.k_nearest(KnnQuery::Id(0), 3).unwrap();
        let ids: Vec<PointId> = results.iter().map(|r| r.id).collect();
        // ids 2 and 3 are both at distance 1: smaller id first
        assert_eq!(ids, vec![0, 2, 3]);
        assert_eq!(index.len(), 4);
        assert_eq!(index.dimension(), 1);
    }

    #[test]
    fn test_k_larger_than_set_and_zero() {
        let points = vec![Point::new(0, vec![0.0, 0.0]), Point::new(1, vec![1.0, 1.0])];
        let index = LinearScanIndex::build(points, DistanceMetric::Manhattan).unwrap();
        let query = Point::new(99, vec![5.0, 5.0]);
        assert_eq!(index.k_nearest(KnnQuery::Point(&query), 10).unwrap().len(), 2);
        assert!(index.k_nearest(KnnQuery::Point(&query), 0).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_id() {
        let index = LinearScanIndex::build(vec![Point::new(0, vec![0.0])], DistanceMetric::Euclidean).unwrap();
        assert!(matches!(index.k_nearest(KnnQuery::Id(4), 1), Err(KnnError::UnknownId(4))));
    }
}
