// src/core/indexing/store.rs

//! Validated backing store shared by the index implementations.

use std::collections::HashMap;

use super::KnnQuery;
use crate::core::common::KnnError;
use crate::core::types::{Point, PointId};

/// Owns the indexed points; indexes refer to them by position.
#[derive(Debug, Clone, Default)]
pub(crate) struct PointStore {
    points: Vec<Point>,
    positions: HashMap<PointId, usize>,
    dimension: usize,
}

impl PointStore {
    /// Validates and takes ownership of `points`.
    ///
    /// Every point must share the first point's dimensionality, carry a unique id,
    /// and have finite coordinates.
    pub(crate) fn new(points: Vec<Point>) -> Result<Self, KnnError> {
        let dimension = points.first().map_or(0, Point::dimensionality);
        let mut positions = HashMap::with_capacity(points.len());
        for (position, point) in points.iter().enumerate() {
            KnnError::check_dimensions(dimension, point.dimensionality())?;
            check_finite(point)?;
            if positions.insert(point.id(), position).is_some() {
                return Err(KnnError::DuplicateId(point.id()));
            }
        }
        Ok(Self { points, positions, dimension })
    }

    pub(crate) fn points(&self) -> &[Point] {
        &self.points
    }

    pub(crate) fn dimension(&self) -> usize {
        self.dimension
    }

    pub(crate) fn get(&self, id: PointId) -> Option<&Point> {
        self.positions.get(&id).map(|&position| &self.points[position])
    }

    /// Turns a query into the point to measure distances from.
    ///
    /// An empty store accepts query points of any dimensionality. Query points must
    /// have finite coordinates, like stored ones.
    pub(crate) fn resolve<'q>(&'q self, query: KnnQuery<'q>) -> Result<&'q Point, KnnError> {
        match query {
            KnnQuery::Id(id) => self.get(id).ok_or(KnnError::UnknownId(id)),
            KnnQuery::Point(point) => {
                if !self.points.is_empty() {
                    KnnError::check_dimensions(self.dimension, point.dimensionality())?;
                }
                check_finite(point)?;
                Ok(point)
            }
        }
    }
}

fn check_finite(point: &Point) -> Result<(), KnnError> {
    match point.coordinates().iter().position(|c| !c.is_finite()) {
        Some(axis) => Err(KnnError::invalid_input(format!(
            "point {} has a non-finite coordinate on axis {}",
            point.id(),
            axis
        ))),
        None => Ok(()),
    }
}
