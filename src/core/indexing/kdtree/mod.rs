// src/core/indexing/kdtree/mod.rs

//! KD-Tree implementation for exact kNN search.

pub use self::tree::{KdNode, KdTree};

use log::debug;

use super::linear::linear_scan;
use super::store::PointStore;
use super::{KnnIndex, KnnQuery};
use crate::core::common::KnnError;
use crate::core::config::IndexConfig;
use crate::core::distance::{DistanceFunction, DistanceResult};
use crate::core::types::{Point, PointId};

mod builder;
mod search;
mod tree;

/// `KdTreeIndex`: answers kNN queries over a fixed point set using a KD-Tree.
///
/// The index owns its points; the tree's leaves refer to them by position. The
/// tree is built once in [`KdTreeIndex::build`] and never changes afterwards, so a
/// shared reference can serve queries from any number of threads.
///
/// Pruning needs a metric (see [`DistanceFunction::is_metric`]). For any other
/// distance function queries fall back to a linear scan and give the same answers.
#[derive(Debug)]
pub struct KdTreeIndex<M> {
    store: PointStore,
    tree: KdTree,
    metric: M,
    config: IndexConfig,
}

impl<M: DistanceFunction> KdTreeIndex<M> {
    /// Validates `points` and builds the tree.
    ///
    /// # Errors
    ///
    /// * `Configuration` when `config` is invalid.
    /// * `DimensionMismatch` when the points differ in dimensionality.
    /// * `DuplicateId` when two points share an id.
    /// * `InvalidInput` when a coordinate is NaN or infinite.
    pub fn build(points: Vec<Point>, metric: M, config: &IndexConfig) -> Result<Self, KnnError> {
        config.validate()?;
        let store = PointStore::new(points)?;
        let tree = builder::build_kdtree(store.points(), config)?;
        debug!(
            "built kd-tree over {} points of dimension {} (depth {}, bucket size {}, {:?} splits, metric {})",
            store.points().len(),
            store.dimension(),
            tree.depth(),
            config.bucket_size,
            config.split_strategy,
            metric.name()
        );
        Ok(Self { store, tree, metric, config: config.clone() })
    }

    pub const fn metric(&self) -> &M {
        &self.metric
    }

    pub const fn tree(&self) -> &KdTree {
        &self.tree
    }

    pub const fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Exhaustive search over the same points, bypassing the tree.
    ///
    /// # Errors
    ///
    /// Same as [`KnnIndex::k_nearest`].
    pub fn linear_scan(
        &self,
        query: KnnQuery<'_>,
        k: usize,
    ) -> Result<Vec<DistanceResult<M::Distance>>, KnnError> {
        let query_point = self.store.resolve(query)?;
        linear_scan(self.store.points(), &self.metric, query_point, k)
    }
}

impl<M: DistanceFunction> KnnIndex for KdTreeIndex<M> {
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
        if !self.metric.is_metric() {
            return linear_scan(self.store.points(), &self.metric, query_point, k);
        }
        let (results, _stats) =
            search::find_knn(&self.tree, self.store.points(), &self.metric, query_point, k)?;
        Ok(results)
    }
}
