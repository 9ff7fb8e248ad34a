// src/core/indexing/collector.rs

//! Bounded collector of the best `k` candidates seen during a search.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::distance::{DistanceResult, DistanceValue};
use crate::core::types::PointId;

/// Heap entry ordered by (distance, id), so the max-heap's top is the current worst.
#[derive(Debug, Clone, Copy)]
struct Candidate<D>(DistanceResult<D>);

impl<D: DistanceValue> PartialEq for Candidate<D> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<D: DistanceValue> Eq for Candidate<D> {}

impl<D: DistanceValue> PartialOrd for Candidate<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D: DistanceValue> Ord for Candidate<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.result_order(&other.0)
    }
}

/// Keeps at most `k` results: the `k` smallest by distance, ties resolved towards
/// smaller ids.
#[derive(Debug)]
pub struct KnnCollector<D> {
    k: usize,
    heap: BinaryHeap<Candidate<D>>,
}

impl<D: DistanceValue> KnnCollector<D> {
    /// `k` may exceed the number of candidates; storage grows with what is inserted.
    pub fn new(k: usize) -> Self {
        Self { k, heap: BinaryHeap::new() }
    }

    #[must_use]
    pub const fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// Distance of the current k-th best entry, once `k` entries are held.
    #[must_use]
    pub fn kth_distance(&self) -> Option<D> {
        if self.is_full() {
            self.heap.peek().map(|worst| worst.0.distance)
        } else {
            None
        }
    }

    /// Offers a candidate. Returns whether it was kept.
    ///
    /// When full, the worst entry is replaced only by a candidate that is strictly
    /// closer, or equally close with a smaller id.
    pub fn insert(&mut self, id: PointId, distance: D) -> bool {
        if self.k == 0 {
            return false;
        }
        let candidate = Candidate(DistanceResult::new(id, distance));
        if self.heap.len() < self.k {
            self.heap.push(candidate);
            return true;
        }
        let replaces_worst = self.heap.peek().map_or(false, |worst| candidate < *worst);
        if replaces_worst {
            self.heap.pop();
            self.heap.push(candidate);
        }
        replaces_worst
    }

    /// Drains the collector in ascending (distance, id) order.
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<DistanceResult<D>> {
        self.heap.into_sorted_vec().into_iter().map(|c| c.0).collect()
    }
}
