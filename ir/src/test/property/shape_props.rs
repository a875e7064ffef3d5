//! Properties of axis normalization and output shape rules.

use proptest::prelude::*;

use crate::shape::*;

use super::generators::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// A normalized axis always addresses a dimension.
    #[test]
    fn normalized_axis_in_range((shape, axis) in arb_shape_and_axis(1..=4, 10)) {
        let rank = shape.len();
        match normalize_axis(axis, rank) {
            Ok(normalized) => {
                prop_assert!(normalized < rank);
                prop_assert!(axis >= -(rank as i64) && axis < rank as i64);
            }
            Err(_) => prop_assert!(axis < -(rank as i64) || axis >= rank as i64),
        }
    }

    #[test]
    fn valid_axis_always_normalizes(
        (rank, axis) in (1usize..=4).prop_flat_map(|rank| (Just(rank), arb_valid_axis(rank)))
    ) {
        prop_assert!(normalize_axis(axis, rank).is_ok());
    }

    /// Positive and negative forms of the same axis agree.
    #[test]
    fn negative_axis_mirrors_positive(rank in 1usize..=6, axis in 0usize..6) {
        prop_assume!(axis < rank);
        let negative = axis as i64 - rank as i64;
        prop_assert_eq!(normalize_axis(negative, rank).unwrap(), axis);
    }

    /// keep_dim preserves rank and the element count shrinks by the reduced extents.
    #[test]
    fn reduce_keep_dim_preserves_rank(shape in arb_shape(1..=4, 10), axis_seed in any::<prop::sample::Index>()) {
        let axis = axis_seed.index(shape.len());
        let out = reduce_shape(&shape, &[axis], true);
        prop_assert_eq!(out.len(), shape.len());
        prop_assert_eq!(out[axis], 1);
        prop_assert_eq!(numel(&out) * shape[axis], numel(&shape));
    }

    /// Dropping a reduced axis removes exactly one dimension, never below rank 1.
    #[test]
    fn reduce_drop_dim_rank(shape in arb_shape(1..=4, 10), axis_seed in any::<prop::sample::Index>()) {
        let axis = axis_seed.index(shape.len());
        let out = reduce_shape(&shape, &[axis], false);
        prop_assert_eq!(out.len(), (shape.len() - 1).max(1));
        prop_assert_eq!(numel(&out) * shape[axis], numel(&shape));
    }

    /// Stacking inserts `count` at the normalized axis and keeps the rest in order.
    #[test]
    fn stack_inserts_count(
        (shape, axis) in arb_shape_and_axis(1..=4, 8),
        count in 1usize..=4,
    ) {
        if let Ok(axis) = stack_axis(axis, shape.len()) {
            let out = stack_shape(&shape, count, axis).unwrap();
            prop_assert_eq!(out.len(), shape.len() + 1);
            prop_assert_eq!(out[axis], count);
            let mut rest = out.clone();
            rest.remove(axis);
            prop_assert_eq!(rest, shape);
        }
    }
}
