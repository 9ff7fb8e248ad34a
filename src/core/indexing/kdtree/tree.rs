// src/core/indexing/kdtree/tree.rs

//! Defines the core KD-Tree structures: `KdNode` and `KdTree`.

use crate::core::types::Bounds;

/// Represents a node in the KD-Tree.
///
/// Every node carries the bounding box of the region it covers. Leaves store
/// positions into the index's backing point vector rather than the points.
#[derive(Debug, Clone)]
pub enum KdNode {
    Internal {
        axis: usize,
        split_value: f64,
        bounds: Bounds,
        left_child: Box<KdNode>,
        right_child: Box<KdNode>,
    },
    Leaf {
        bounds: Bounds,
        point_indices: Vec<usize>,
    },
}

impl KdNode {
    pub fn bounds(&self) -> &Bounds {
        match self {
            Self::Internal { bounds, .. } | Self::Leaf { bounds, .. } => bounds,
        }
    }

    /// Number of points stored below this node.
    pub fn point_count(&self) -> usize {
        match self {
            Self::Internal { left_child, right_child, .. } => {
                left_child.point_count() + right_child.point_count()
            }
            Self::Leaf { point_indices, .. } => point_indices.len(),
        }
    }

    /// Length of the longest root-to-leaf path, counting this node.
    pub fn depth(&self) -> usize {
        match self {
            Self::Internal { left_child, right_child, .. } => {
                1 + left_child.depth().max(right_child.depth())
            }
            Self::Leaf { .. } => 1,
        }
    }
}

/// A KD-Tree over a fixed point set.
///
/// `root` is `None` for an empty point set.
#[derive(Debug, Clone)]
pub struct KdTree {
    pub root: Option<Box<KdNode>>,
    pub dimension: usize,
}

impl KdTree {
    /// Creates a new, empty KD-Tree for a given dimension.
    /// The actual tree structure is built using the `build_kdtree` function.
    pub const fn new(dimension: usize) -> Self {
        Self { root: None, dimension }
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Sets the root node of the tree. Primarily used by the builder.
    pub(super) fn set_root(&mut self, root_node: KdNode) {
        self.root = Some(Box::new(root_node));
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.depth())
    }
}
