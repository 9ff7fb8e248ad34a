// src/core/types/mod.rs

//! Point and region types shared by the index, the distance functions, and ingestion.

use serde::{Deserialize, Serialize};

mod bounds;

pub use self::bounds::Bounds;

/// Caller-assigned identifier of a point, stable for the lifetime of an index.
pub type PointId = u64;

/// An immutable fixed-dimensionality numeric tuple identified by a unique id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    id: PointId,
    coordinates: Vec<f64>,
}

impl Point {
    pub fn new(id: PointId, coordinates: Vec<f64>) -> Self {
        Self { id, coordinates }
    }

    #[must_use]
    pub const fn id(&self) -> PointId {
        self.id
    }

    #[must_use]
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.coordinates.len()
    }

    /// Coordinate along `axis`. Panics if `axis` is out of range, like slice indexing.
    #[must_use]
    pub fn coordinate(&self, axis: usize) -> f64 {
        self.coordinates[axis]
    }
}

impl From<(PointId, Vec<f64>)> for Point {
    fn from((id, coordinates): (PointId, Vec<f64>)) -> Self {
        Self::new(id, coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_accessors() {
        let p = Point::new(42, vec![1.5, -2.0, 3.0]);
        assert_eq!(p.id(), 42);
        assert_eq!(p.dimensionality(), 3);
        assert_eq!(p.coordinates(), &[1.5, -2.0, 3.0]);
        assert_eq!(p.coordinate(1), -2.0);
    }

    #[test]
    fn test_point_from_tuple() {
        let p: Point = (3, vec![0.0, 1.0]).into();
        assert_eq!(p, Point::new(3, vec![0.0, 1.0]));
    }
}
