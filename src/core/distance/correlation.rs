// src/core/distance/correlation.rs

//! Subspace correlation distance.
//!
//! Two points are compared by how many dimensions their local subspaces need once
//! each point's strong eigenvectors are merged into the other's basis, with the
//! Euclidean distance as tie-breaker.

use std::cmp::Ordering;
use std::fmt;

use log::trace;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use super::{euclidean_distance, DistanceFunction, DistanceValue};
use crate::core::common::KnnError;
use crate::core::config::{CorrelationConfig, DEFAULT_DELTA};
use crate::core::pca::{LocalPca, PcaProvider};
use crate::core::types::Point;

/// Below this norm an orthogonalised candidate is taken to lie in the span already.
const DEGENERATE_NORM: f64 = 1e-12;

/// Composite distance compared lexicographically: correlation dimension first,
/// Euclidean distance second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationDistance {
    pub correlation_dimension: usize,
    pub euclidean: f64,
}

impl CorrelationDistance {
    pub const fn new(correlation_dimension: usize, euclidean: f64) -> Self {
        Self { correlation_dimension, euclidean }
    }
}

impl DistanceValue for CorrelationDistance {
    fn total_order(&self, other: &Self) -> Ordering {
        self.correlation_dimension
            .cmp(&other.correlation_dimension)
            .then_with(|| self.euclidean.total_cmp(&other.euclidean))
    }
}

impl fmt::Display for CorrelationDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.correlation_dimension, self.euclidean)
    }
}

/// Correlation distance over local PCA descriptors looked up from `P`.
///
/// Not a metric: the index answers queries under it by exhaustive scan.
#[derive(Debug, Clone)]
pub struct SubspaceCorrelationDistance<P> {
    delta: f64,
    provider: P,
}

impl<P: PcaProvider> SubspaceCorrelationDistance<P> {
    /// # Errors
    ///
    /// `Configuration` when `delta` is negative or not finite.
    pub fn new(provider: P, delta: f64) -> Result<Self, KnnError> {
        CorrelationConfig { delta }.validate()?;
        Ok(Self { delta, provider })
    }

    pub fn from_config(provider: P, config: &CorrelationConfig) -> Result<Self, KnnError> {
        Self::new(provider, config.delta)
    }

    /// Uses the default `delta` of 0.25.
    pub const fn with_default_delta(provider: P) -> Self {
        Self { delta: DEFAULT_DELTA, provider }
    }

    #[must_use]
    pub const fn delta(&self) -> f64 {
        self.delta
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Dimension of `base`'s subspace after absorbing every strong eigenvector of
    /// `other` that lies farther than `delta` from it.
    ///
    /// Works on a copy of `base`'s basis; the descriptor itself is left untouched.
    fn merged_dimension(&self, base: &LocalPca, other: &LocalPca) -> usize {
        let dim = base.dimensionality();
        let mut basis = base.eigenvectors().clone();
        let mut selection = base.selection_matrix();
        let mut lambda = base.correlation_dimension();
        let mut projection = subspace_projection(&basis, &selection);

        for candidate in other.strong_eigenvectors().column_iter() {
            if lambda >= dim {
                break;
            }
            let v = candidate.clone_owned();
            let inside = v.dot(&(&projection * &v));
            let residual = (v.dot(&v) - inside).max(0.0).sqrt();
            if residual > self.delta && insert_direction(&mut basis, &mut selection, &v, lambda) {
                lambda += 1;
                projection = subspace_projection(&basis, &selection);
            }
        }
        lambda
    }
}

/// `V · E · Vᵗ`, the projection onto the selected columns of `basis`.
fn subspace_projection(basis: &DMatrix<f64>, selection: &DMatrix<f64>) -> DMatrix<f64> {
    basis * selection * basis.transpose()
}

/// Orthonormalises `vector` against the first `column` columns of `basis` and stores
/// it at `column`, marking that column selected.
///
/// Returns `false` and leaves both matrices unchanged when the orthogonal remainder
/// vanishes.
fn insert_direction(
    basis: &mut DMatrix<f64>,
    selection: &mut DMatrix<f64>,
    vector: &DVector<f64>,
    column: usize,
) -> bool {
    let mut orthogonal = vector.clone();
    for k in 0..column {
        let coefficient = vector.dot(&basis.column(k));
        orthogonal.axpy(-coefficient, &basis.column(k), 1.0);
    }
    let norm = orthogonal.norm();
    if norm < DEGENERATE_NORM {
        trace!("skipping degenerate subspace insertion at column {} (norm {:e})", column, norm);
        return false;
    }
    basis.set_column(column, &(orthogonal / norm));
    selection[(column, column)] = 1.0;
    true
}

impl<P: PcaProvider> DistanceFunction for SubspaceCorrelationDistance<P> {
    type Distance = CorrelationDistance;

    fn name(&self) -> &'static str {
        "subspace_correlation"
    }

    fn distance(&self, a: &Point, b: &Point) -> Result<CorrelationDistance, KnnError> {
        let euclidean = euclidean_distance(a.coordinates(), b.coordinates())?;

        let pca_a = self.provider.local_pca(a.id())?;
        let pca_b = self.provider.local_pca(b.id())?;
        KnnError::check_dimensions(a.dimensionality(), pca_a.dimensionality())?;
        KnnError::check_dimensions(b.dimensionality(), pca_b.dimensionality())?;

        let lambda_a = self.merged_dimension(pca_a, pca_b);
        let lambda_b = self.merged_dimension(pca_b, pca_a);
        Ok(CorrelationDistance::new(lambda_a.max(lambda_b), euclidean))
    }

    fn is_metric(&self) -> bool {
        false
    }
}
