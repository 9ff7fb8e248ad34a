// src/core/pca/preprocessor.rs

use log::{debug, info};

use super::{LocalPca, LocalPcaStore};
use crate::core::common::KnnError;
use crate::core::config::PcaConfig;
use crate::core::indexing::{KnnIndex, KnnQuery};
use crate::core::types::Point;

/// Computes a [`LocalPca`] for every indexed point from its `k` nearest neighbours.
///
/// The neighbourhood includes the point itself. The index should use a scalar metric
/// such as Euclidean distance.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnPcaPreprocessor {
    k: usize,
    alpha: f64,
}

impl KnnPcaPreprocessor {
    /// # Errors
    ///
    /// `Configuration` when `k` is zero or `alpha` lies outside `(0, 1]`.
    pub fn new(k: usize, alpha: f64) -> Result<Self, KnnError> {
        Self::from_config(&PcaConfig { k, alpha })
    }

    pub fn from_config(config: &PcaConfig) -> Result<Self, KnnError> {
        config.validate()?;
        Ok(Self { k: config.k, alpha: config.alpha })
    }

    pub const fn k(&self) -> usize {
        self.k
    }

    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Builds the descriptor store for all points of `index`.
    ///
    /// # Errors
    ///
    /// Propagates query and PCA failures.
    pub fn run<I>(&self, index: &I) -> Result<LocalPcaStore, KnnError>
    where
        I: KnnIndex<Distance = f64> + ?Sized,
    {
        let mut store = LocalPcaStore::new();
        let mut total_dimension = 0usize;
        for point in index.points() {
            let neighbors = index.k_nearest(KnnQuery::Id(point.id()), self.k)?;
            let neighborhood = neighbors
                .iter()
                .map(|n| index.point(n.id).ok_or(KnnError::UnknownId(n.id)))
                .collect::<Result<Vec<&Point>, KnnError>>()?;
            let pca = LocalPca::from_neighborhood(neighborhood, self.alpha)?;
            debug!(
                "point {}: correlation dimension {} from {} neighbours",
                point.id(),
                pca.correlation_dimension(),
                neighbors.len()
            );
            total_dimension += pca.correlation_dimension();
            store.insert(point.id(), pca);
        }

        if !store.is_empty() {
            info!(
                "local PCA computed for {} points (k = {}, alpha = {}), mean correlation dimension {:.2}",
                store.len(),
                self.k,
                self.alpha,
                total_dimension as f64 / store.len() as f64
            );
        }
        Ok(store)
    }
}
