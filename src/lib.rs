#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]
#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::all)]

//! # subspace-knn: exact k-nearest-neighbour search
//!
//! `subspace_knn` indexes a fixed set of points and answers exact kNN queries.
//! It features:
//! - A KD-tree with bounding-box pruning for metric distances
//! - A linear-scan index and fallback for distances without a triangle inequality
//! - A subspace correlation distance built from per-point local PCA
//! - Deterministic results: ties on distance are broken by ascending point id
//! - TOML configuration and a delimited-text parser for input data
//!
//! ```
//! use subspace_knn::{DistanceMetric, IndexConfig, KdTreeIndex, KnnIndex, KnnQuery, Point};
//!
//! let points = vec![
//!     Point::new(0, vec![-4.0, -5.0]),
//!     Point::new(1, vec![-9.0, 3.0]),
//!     Point::new(2, vec![-6.0, -5.0]),
//!     Point::new(3, vec![9.0, -1.0]),
//! ];
//! let index = KdTreeIndex::build(points, DistanceMetric::Euclidean, &IndexConfig::default())?;
//! let nearest = index.k_nearest(KnnQuery::Id(1), 2)?;
//! assert_eq!(nearest[0].id, 1);
//! assert_eq!(nearest[1].id, 2);
//! # Ok::<(), subspace_knn::KnnError>(())
//! ```

pub mod core;

// Re-export key types for easier use by library consumers
pub use crate::core::common::KnnError;
pub use crate::core::config::{Config, IndexConfig, SplitStrategy};
pub use crate::core::distance::{
    CorrelationDistance, DistanceFunction, DistanceMetric, DistanceResult,
    SubspaceCorrelationDistance,
};
pub use crate::core::indexing::{KdTreeIndex, KnnIndex, KnnQuery, LinearScanIndex};
pub use crate::core::ingestion::{NumberVectorParser, ParseOutcome};
pub use crate::core::pca::{KnnPcaPreprocessor, LocalPca, LocalPcaStore, PcaProvider};
pub use crate::core::types::{Bounds, Point, PointId};

/// Core result type for the library
pub type Result<T> = std::result::Result<T, KnnError>;
