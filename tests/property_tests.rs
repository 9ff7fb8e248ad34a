//! Property-based tests for the kNN indexes and distances.
//!
//! These tests verify invariants that should hold regardless of input:
//! - The pruned KD-tree search returns exactly what a linear scan returns,
//!   for indexed points and for arbitrary query locations far outside the data
//! - Results are sorted by (distance, id) and have `min(k, n)` entries
//! - An indexed point queried by id comes first at distance zero
//! - The subspace correlation distance is symmetric

use proptest::prelude::*;

use nalgebra::{DMatrix, DVector};
use subspace_knn::{
    DistanceFunction, DistanceMetric, IndexConfig, KdTreeIndex, KnnIndex, KnnQuery,
    LinearScanIndex, LocalPca, LocalPcaStore, Point, SplitStrategy, SubspaceCorrelationDistance,
};

prop_compose! {
    /// Points on a coarse grid so that equal distances are common.
    fn arb_points()(dims in 1usize..4)(
        rows in prop::collection::vec(prop::collection::vec(-10i32..10, dims), 1..60)
    ) -> Vec<Point> {
        rows.into_iter()
            .enumerate()
            .map(|(id, row)| Point::new(id as u64, row.into_iter().map(|v| f64::from(v) * 0.5).collect()))
            .collect()
    }
}

prop_compose! {
    /// Grid points plus a query of the same dimension that is generally not one
    /// of them: near the data, or far outside its bounding box on some axes.
    fn arb_points_and_query()(dims in 1usize..4)(
        rows in prop::collection::vec(prop::collection::vec(-10i32..10, dims), 1..60),
        query in prop::collection::vec(
            prop_oneof![-40.0f64..40.0, 1.0e3f64..1.0e6, -1.0e6f64..-1.0e3],
            dims,
        ),
    ) -> (Vec<Point>, Point) {
        let points = rows.into_iter()
            .enumerate()
            .map(|(id, row)| Point::new(id as u64, row.into_iter().map(|v| f64::from(v) * 0.5).collect()))
            .collect();
        (points, Point::new(u64::MAX, query))
    }
}

fn arb_metric() -> impl Strategy<Value = DistanceMetric> {
    prop_oneof![
        Just(DistanceMetric::Euclidean),
        Just(DistanceMetric::Manhattan),
        Just(DistanceMetric::Chebyshev),
    ]
}

fn arb_config() -> impl Strategy<Value = IndexConfig> {
    (1usize..8, any::<bool>()).prop_map(|(bucket_size, max_spread)| IndexConfig {
        bucket_size,
        split_strategy: if max_spread { SplitStrategy::MaxSpread } else { SplitStrategy::Cycle },
    })
}

proptest! {
    #[test]
    fn kdtree_matches_linear_scan(
        points in arb_points(),
        metric in arb_metric(),
        config in arb_config(),
        k in 0usize..20,
        pick in any::<prop::sample::Index>(),
    ) {
        let query = points[pick.index(points.len())].clone();
        let linear = LinearScanIndex::build(points.clone(), metric).unwrap();
        let tree = KdTreeIndex::build(points, metric, &config).unwrap();

        let expected = linear.k_nearest(KnnQuery::Point(&query), k).unwrap();
        let actual = tree.k_nearest(KnnQuery::Point(&query), k).unwrap();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn kdtree_matches_linear_scan_for_outside_queries(
        (points, query) in arb_points_and_query(),
        metric in arb_metric(),
        config in arb_config(),
        k in 0usize..20,
    ) {
        let linear = LinearScanIndex::build(points.clone(), metric).unwrap();
        let tree = KdTreeIndex::build(points, metric, &config).unwrap();

        let expected = linear.k_nearest(KnnQuery::Point(&query), k).unwrap();
        let actual = tree.k_nearest(KnnQuery::Point(&query), k).unwrap();
        prop_assert_eq!(actual.len(), expected.len());
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn results_are_sorted_and_sized(
        points in arb_points(),
        metric in arb_metric(),
        config in arb_config(),
        k in 0usize..80,
        pick in any::<prop::sample::Index>(),
    ) {
        let n = points.len();
        let id = points[pick.index(n)].id();
        let index = KdTreeIndex::build(points, metric, &config).unwrap();
        let results = index.k_nearest(KnnQuery::Id(id), k).unwrap();

        prop_assert_eq!(results.len(), k.min(n));
        for pair in results.windows(2) {
            prop_assert!(
                pair[0].distance < pair[1].distance
                    || (pair[0].distance == pair[1].distance && pair[0].id < pair[1].id)
            );
        }
        if k > 0 {
            prop_assert_eq!(results[0].distance, 0.0);
            // the query point itself, unless a duplicate location has a smaller id
            prop_assert!(results[0].id <= id);
        }
    }

    #[test]
    fn correlation_distance_is_symmetric(
        angle_a in 0.0f64..std::f64::consts::PI,
        angle_b in 0.0f64..std::f64::consts::PI,
        strong_a in 1usize..=2,
        strong_b in 1usize..=2,
        xa in -5.0f64..5.0,
        xb in -5.0f64..5.0,
    ) {
        let rotation = |angle: f64| {
            let (s, c) = angle.sin_cos();
            DMatrix::from_row_slice(2, 2, &[c, -s, s, c])
        };
        let values = DVector::from_vec(vec![2.0, 1.0]);
        let store: LocalPcaStore = [
            (0, LocalPca::new(values.clone(), rotation(angle_a), strong_a).unwrap()),
            (1, LocalPca::new(values, rotation(angle_b), strong_b).unwrap()),
        ]
        .into_iter()
        .collect();
        let distance = SubspaceCorrelationDistance::with_default_delta(&store);
        let a = Point::new(0, vec![xa, 0.0]);
        let b = Point::new(1, vec![xb, 1.0]);

        let ab = distance.distance(&a, &b).unwrap();
        let ba = distance.distance(&b, &a).unwrap();
        prop_assert_eq!(ab.correlation_dimension, ba.correlation_dimension);
        prop_assert_eq!(ab.euclidean, ba.euclidean);
        prop_assert!(ab.correlation_dimension >= strong_a.max(strong_b));
        prop_assert!(ab.correlation_dimension <= 2);
    }
}
