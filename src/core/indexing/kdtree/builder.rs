// src/core/indexing/kdtree/builder.rs

//! Logic for building a KD-Tree from a set of points.

use super::tree::{KdNode, KdTree};
use crate::core::common::KnnError;
use crate::core::config::{IndexConfig, SplitStrategy};
use crate::core::types::{Bounds, Point};

/// Builds a KD-Tree over `points`.
///
/// Leaves store positions into `points`, so the same slice must be handed to the
/// search. The points are assumed to be validated already (shared dimensionality,
/// finite coordinates).
///
/// # Errors
///
/// `Configuration` when `config` is invalid.
pub fn build_kdtree(points: &[Point], config: &IndexConfig) -> Result<KdTree, KnnError> {
    config.validate()?;
    let dimension = points.first().map_or(0, Point::dimensionality);
    let mut tree = KdTree::new(dimension);

    let Some(root_bounds) = Bounds::enclosing(points) else {
        return Ok(tree);
    };

    let mut positions: Vec<usize> = (0..points.len()).collect();
    let root = build_recursive(points, &mut positions, root_bounds, 0, config);
    tree.set_root(root);
    Ok(tree)
}

/// Recursively builds the node covering `positions`.
///
/// `positions` is sorted in place along the chosen axis and split at the median,
/// so both halves are non-empty and strictly smaller than the input.
fn build_recursive(
    points: &[Point],
    positions: &mut [usize],
    bounds: Bounds,
    depth: usize,
    config: &IndexConfig,
) -> KdNode {
    let dimension = bounds.dimensionality();
    if positions.len() <= config.bucket_size || dimension == 0 {
        return KdNode::Leaf { bounds, point_indices: positions.to_vec() };
    }

    let axis = match config.split_strategy {
        SplitStrategy::Cycle => depth % dimension,
        SplitStrategy::MaxSpread => widest_axis(points, positions, dimension),
    };

    // Ties on the coordinate are ordered by id, which keeps the layout deterministic.
    positions.sort_unstable_by(|&a, &b| {
        let (pa, pb) = (&points[a], &points[b]);
        pa.coordinate(axis)
            .total_cmp(&pb.coordinate(axis))
            .then_with(|| pa.id().cmp(&pb.id()))
    });

    let median_idx = positions.len() / 2;
    let split_value = points[positions[median_idx]].coordinate(axis);
    let (left_bounds, right_bounds) = bounds.split(axis, split_value);
    let (left_slice, right_slice) = positions.split_at_mut(median_idx);

    let left_child = build_recursive(points, left_slice, left_bounds, depth + 1, config);
    let right_child = build_recursive(points, right_slice, right_bounds, depth + 1, config);

    KdNode::Internal {
        axis,
        split_value,
        bounds,
        left_child: Box::new(left_child),
        right_child: Box::new(right_child),
    }
}

/// Axis along which the given points spread the most. Ties go to the lowest axis.
fn widest_axis(points: &[Point], positions: &[usize], dimension: usize) -> usize {
    let mut best_axis = 0;
    let mut best_spread = f64::NEG_INFINITY;
    for axis in 0..dimension {
        let (lo, hi) = positions.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
            let value = points[p].coordinate(axis);
            (lo.min(value), hi.max(value))
        });
        let spread = hi - lo;
        if spread > best_spread {
            best_spread = spread;
            best_axis = axis;
        }
    }
    best_axis
}
