// src/core/indexing/kdtree/search.rs

//! Logic for performing K-Nearest Neighbor (KNN) search in a KD-Tree.

use std::cmp::Ordering;

use log::trace;

use super::tree::{KdNode, KdTree};
use crate::core::common::KnnError;
use crate::core::distance::{DistanceFunction, DistanceResult, DistanceValue};
use crate::core::indexing::KnnCollector;
use crate::core::types::Point;

/// Counters gathered during one search, reported at trace level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_visited: usize,
    pub nodes_pruned: usize,
    pub distance_computations: usize,
}

/// State shared by the recursive descent of one query.
struct Search<'a, M: DistanceFunction> {
    points: &'a [Point],
    metric: &'a M,
    query: &'a Point,
    collector: KnnCollector<M::Distance>,
    stats: SearchStats,
}

/// Performs a pruned K-Nearest Neighbor search in the KD-Tree.
///
/// `points` must be the slice the tree was built from. The metric must provide
/// lower bounds that never exceed a true distance; regions whose bound is strictly
/// greater than the current k-th distance are skipped.
///
/// # Errors
///
/// Propagates the metric's errors.
pub fn find_knn<M: DistanceFunction>(
    tree: &KdTree,
    points: &[Point],
    metric: &M,
    query: &Point,
    k: usize,
) -> Result<(Vec<DistanceResult<M::Distance>>, SearchStats), KnnError> {
    let Some(root) = tree.root.as_deref() else {
        return Ok((Vec::new(), SearchStats::default()));
    };
    if k == 0 {
        return Ok((Vec::new(), SearchStats::default()));
    }

    let mut search = Search {
        points,
        metric,
        query,
        collector: KnnCollector::new(k),
        stats: SearchStats::default(),
    };
    search.search_recursive(root)?;

    let stats = search.stats;
    trace!(
        "kd-tree search for k={}: {} nodes visited, {} pruned, {} distance computations",
        k,
        stats.nodes_visited,
        stats.nodes_pruned,
        stats.distance_computations
    );
    Ok((search.collector.into_sorted_vec(), stats))
}

impl<M: DistanceFunction> Search<'_, M> {
    fn search_recursive(&mut self, node: &KdNode) -> Result<(), KnnError> {
        self.stats.nodes_visited += 1;
        match node {
            KdNode::Leaf { point_indices, .. } => {
                for &position in point_indices {
                    let point = &self.points[position];
                    let distance = self.metric.distance(self.query, point)?;
                    self.stats.distance_computations += 1;
                    self.collector.insert(point.id(), distance);
                }
            }
            KdNode::Internal { left_child, right_child, .. } => {
                let left_bound = self.metric.min_distance_to_bounds(self.query, left_child.bounds());
                let right_bound =
                    self.metric.min_distance_to_bounds(self.query, right_child.bounds());

                let right_first = match (&left_bound, &right_bound) {
                    (Some(l), Some(r)) => r.total_order(l) == Ordering::Less,
                    _ => false,
                };
                let (first, first_bound, second, second_bound) = if right_first {
                    (right_child, right_bound, left_child, left_bound)
                } else {
                    (left_child, left_bound, right_child, right_bound)
                };

                for (child, bound) in [(first, first_bound), (second, second_bound)] {
                    if self.can_prune(bound) {
                        self.stats.nodes_pruned += 1;
                    } else {
                        self.search_recursive(child)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// A region can be skipped once `k` results are held and its lower bound is
    /// strictly worse than the k-th. Equal bounds are still searched, since a point
    /// at the same distance with a smaller id would win the tie.
    fn can_prune(&self, bound: Option<M::Distance>) -> bool {
        match (bound, self.collector.kth_distance()) {
            (Some(bound), Some(kth)) => bound.total_order(&kth) == Ordering::Greater,
            _ => false,
        }
    }
}
