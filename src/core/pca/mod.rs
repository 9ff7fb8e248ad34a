// src/core/pca/mod.rs

//! Local PCA descriptors consumed by the subspace correlation distance.
//!
//! A descriptor holds a point's neighbourhood eigenbasis, columns ordered by
//! descending eigenvalue, and how many leading columns count as "strong".

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::core::common::KnnError;
use crate::core::types::{Point, PointId};

pub mod preprocessor;

pub use self::preprocessor::KnnPcaPreprocessor;

/// Tolerance for the orthonormality check on supplied eigenbases.
const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// Eigen decomposition of one point's neighbourhood.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPca {
    eigenvalues: DVector<f64>,
    eigenvectors: DMatrix<f64>,
    strong_count: usize,
}

impl LocalPca {
    /// Creates a descriptor from an eigenbasis whose columns are already sorted by
    /// descending eigenvalue; the first `strong_count` columns are the strong ones.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the basis is not square or the eigenvalue count differs,
    /// `InvalidInput` when `strong_count` exceeds the dimensionality or the basis is not
    /// orthonormal.
    pub fn new(
        eigenvalues: DVector<f64>,
        eigenvectors: DMatrix<f64>,
        strong_count: usize,
    ) -> Result<Self, KnnError> {
        let dim = eigenvectors.nrows();
        KnnError::check_dimensions(dim, eigenvectors.ncols())?;
        KnnError::check_dimensions(dim, eigenvalues.len())?;
        if strong_count > dim {
            return Err(KnnError::invalid_input(format!(
                "strong eigenvector count {} exceeds dimensionality {}",
                strong_count, dim
            )));
        }
        let gram = eigenvectors.transpose() * &eigenvectors;
        let deviation = (gram - DMatrix::<f64>::identity(dim, dim)).amax();
        if !(deviation < ORTHONORMAL_TOLERANCE) {
            return Err(KnnError::invalid_input(format!(
                "eigenvectors are not orthonormal (max deviation {})",
                deviation
            )));
        }
        Ok(Self { eigenvalues, eigenvectors, strong_count })
    }

    /// Runs PCA over a neighbourhood.
    ///
    /// The strong eigenvectors are the fewest leading ones whose eigenvalues explain at
    /// least `alpha` of the total variance. A neighbourhood without variance has no
    /// preferred directions, so every direction is marked strong.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty neighbourhood or `alpha` outside `(0, 1]`,
    /// `DimensionMismatch` when the neighbours differ in dimensionality.
    pub fn from_neighborhood<'a, I>(neighbors: I, alpha: f64) -> Result<Self, KnnError>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(KnnError::invalid_input(format!("alpha must lie in (0, 1], got {}", alpha)));
        }
        let neighbors: Vec<&Point> = neighbors.into_iter().collect();
        let first = neighbors
            .first()
            .ok_or_else(|| KnnError::invalid_input("cannot run PCA over an empty neighbourhood"))?;
        let dim = first.dimensionality();
        for p in &neighbors {
            KnnError::check_dimensions(dim, p.dimensionality())?;
        }

        let n = neighbors.len() as f64;
        let mut centroid = DVector::<f64>::zeros(dim);
        for p in &neighbors {
            centroid += DVector::from_column_slice(p.coordinates());
        }
        centroid /= n;

        let mut covariance = DMatrix::<f64>::zeros(dim, dim);
        for p in &neighbors {
            let centered = DVector::from_column_slice(p.coordinates()) - &centroid;
            covariance += &centered * centered.transpose();
        }
        covariance /= n;

        let eigen = SymmetricEigen::new(covariance);
        let mut order: Vec<usize> = (0..dim).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let eigenvalues = DVector::from_iterator(dim, order.iter().map(|&i| eigen.eigenvalues[i].max(0.0)));
        let eigenvectors = DMatrix::from_fn(dim, dim, |r, c| eigen.eigenvectors[(r, order[c])]);
        let strong_count = strong_eigenpair_count(&eigenvalues, alpha);

        Ok(Self { eigenvalues, eigenvectors, strong_count })
    }

    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.eigenvectors.nrows()
    }

    /// Eigenvalues in descending order.
    #[must_use]
    pub const fn eigenvalues(&self) -> &DVector<f64> {
        &self.eigenvalues
    }

    /// Full orthonormal eigenbasis (dim × dim), one eigenvector per column.
    #[must_use]
    pub const fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.eigenvectors
    }

    /// Number of strong eigenvectors, i.e. the local correlation dimension.
    #[must_use]
    pub const fn correlation_dimension(&self) -> usize {
        self.strong_count
    }

    /// The strong eigenvectors (dim × strong count).
    #[must_use]
    pub fn strong_eigenvectors(&self) -> DMatrix<f64> {
        self.eigenvectors.columns(0, self.strong_count).into_owned()
    }

    /// Diagonal matrix with ones at the positions of the strong eigenvectors.
    #[must_use]
    pub fn selection_matrix(&self) -> DMatrix<f64> {
        let dim = self.dimensionality();
        let diagonal = DVector::from_fn(dim, |i, _| if i < self.strong_count { 1.0 } else { 0.0 });
        DMatrix::from_diagonal(&diagonal)
    }
}

fn strong_eigenpair_count(eigenvalues: &DVector<f64>, alpha: f64) -> usize {
    let total: f64 = eigenvalues.iter().sum();
    if total <= 0.0 {
        return eigenvalues.len();
    }
    let mut explained = 0.0;
    for (i, value) in eigenvalues.iter().enumerate() {
        explained += value;
        if explained / total >= alpha {
            return i + 1;
        }
    }
    eigenvalues.len()
}

/// Source of local PCA descriptors, keyed by point id.
pub trait PcaProvider: Debug + Send + Sync {
    /// # Errors
    ///
    /// `MissingAssociation` when no descriptor is stored for `id`.
    fn local_pca(&self, id: PointId) -> Result<&LocalPca, KnnError>;
}

impl<P: PcaProvider + ?Sized> PcaProvider for &P {
    fn local_pca(&self, id: PointId) -> Result<&LocalPca, KnnError> {
        (**self).local_pca(id)
    }
}

impl<P: PcaProvider + ?Sized> PcaProvider for Arc<P> {
    fn local_pca(&self, id: PointId) -> Result<&LocalPca, KnnError> {
        (**self).local_pca(id)
    }
}

/// In-memory id → descriptor map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalPcaStore {
    descriptors: HashMap<PointId, LocalPca>,
}

impl LocalPcaStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a descriptor, returning the one it replaced.
    pub fn insert(&mut self, id: PointId, pca: LocalPca) -> Option<LocalPca> {
        self.descriptors.insert(id, pca)
    }

    #[must_use]
    pub fn get(&self, id: PointId) -> Option<&LocalPca> {
        self.descriptors.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl FromIterator<(PointId, LocalPca)> for LocalPcaStore {
    fn from_iter<T: IntoIterator<Item = (PointId, LocalPca)>>(iter: T) -> Self {
        Self { descriptors: iter.into_iter().collect() }
    }
}

impl PcaProvider for LocalPcaStore {
    fn local_pca(&self, id: PointId) -> Result<&LocalPca, KnnError> {
        self.get(id).ok_or(KnnError::MissingAssociation(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_validates_shape() {
        let ok = LocalPca::new(DVector::from_element(2, 1.0), DMatrix::identity(2, 2), 1);
        assert!(ok.is_ok());

        let not_square = LocalPca::new(DVector::from_element(2, 1.0), DMatrix::zeros(2, 3), 1);
        assert!(matches!(not_square, Err(KnnError::DimensionMismatch { .. })));

        let too_many = LocalPca::new(DVector::from_element(2, 1.0), DMatrix::identity(2, 2), 3);
        assert!(matches!(too_many, Err(KnnError::InvalidInput { .. })));

        let skewed = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 1.0]);
        let not_orthonormal = LocalPca::new(DVector::from_element(2, 1.0), skewed, 1);
        assert!(matches!(not_orthonormal, Err(KnnError::InvalidInput { .. })));
    }

    #[test]
    fn test_selection_and_strong_eigenvectors() {
        let pca = LocalPca::new(DVector::from_vec(vec![3.0, 2.0, 1.0]), DMatrix::identity(3, 3), 2).unwrap();
        assert_eq!(pca.correlation_dimension(), 2);
        let strong = pca.strong_eigenvectors();
        assert_eq!(strong.shape(), (3, 2));
        assert_eq!(strong[(0, 0)], 1.0);
        assert_eq!(strong[(1, 1)], 1.0);

        let selection = pca.selection_matrix();
        assert_eq!(selection[(0, 0)], 1.0);
        assert_eq!(selection[(1, 1)], 1.0);
        assert_eq!(selection[(2, 2)], 0.0);
        assert_eq!(selection[(0, 1)], 0.0);
    }

    #[test]
    fn test_from_neighborhood_finds_line() {
        // points on the diagonal y = x with a little noise across it
        let points: Vec<Point> = (0..10)
            .map(|i| {
                let t = i as f64;
                let noise = if i % 2 == 0 { 0.01 } else { -0.01 };
                Point::new(i, vec![t + noise, t - noise])
            })
            .collect();
        let pca = LocalPca::from_neighborhood(&points, 0.85).unwrap();
        assert_eq!(pca.dimensionality(), 2);
        assert_eq!(pca.correlation_dimension(), 1);
        assert!(pca.eigenvalues()[0] >= pca.eigenvalues()[1]);

        let main = pca.eigenvectors().column(0);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(main[0].abs(), s, epsilon = 1e-3);
        assert_relative_eq!(main[1].abs(), s, epsilon = 1e-3);
    }

    #[test]
    fn test_from_neighborhood_without_variance_is_all_strong() {
        let points = vec![Point::new(0, vec![1.0, 1.0]), Point::new(1, vec![1.0, 1.0])];
        let pca = LocalPca::from_neighborhood(&points, 0.85).unwrap();
        assert_eq!(pca.correlation_dimension(), 2);
    }

    #[test]
    fn test_from_neighborhood_rejects_bad_input() {
        let empty: Vec<Point> = Vec::new();
        assert!(LocalPca::from_neighborhood(&empty, 0.85).is_err());

        let points = vec![Point::new(0, vec![1.0, 1.0]), Point::new(1, vec![1.0])];
        assert!(matches!(
            LocalPca::from_neighborhood(&points, 0.85),
            Err(KnnError::DimensionMismatch { .. })
        ));
        assert!(LocalPca::from_neighborhood(&points[..1], 1.5).is_err());
    }

    #[test]
    fn test_store_lookup() {
        let pca = LocalPca::new(DVector::from_element(2, 1.0), DMatrix::identity(2, 2), 1).unwrap();
        let store: LocalPcaStore = vec![(7, pca.clone())].into_iter().collect();
        assert_eq!(store.len(), 1);
        assert_eq!(store.local_pca(7).unwrap(), &pca);
        assert!(matches!(store.local_pca(8), Err(KnnError::MissingAssociation(8))));

        let shared = Arc::new(store);
        assert!(shared.local_pca(7).is_ok());
        assert!((&*shared).local_pca(7).is_ok());
    }
}
