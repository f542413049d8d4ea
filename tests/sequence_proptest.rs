//! Property-based tests: every operation is checked against a `Vec` model.

use proptest::prelude::*;

use indexed_skiplist::Config;
use indexed_skiplist::Error;
use indexed_skiplist::SkipList;

// =============================================================================
// Test helpers
// =============================================================================

/// A positional operation with its index expressed as a fraction of the
/// current length, so generated sequences stay mostly in range.
#[derive(Clone, Debug)]
enum ListOp {
    Insert { pos_pct: f64, value: i32 },
    Remove { pos_pct: f64 },
    Set { pos_pct: f64, value: i32 },
    /// Split, then glue the halves back together by pushing the tail.
    SplitRejoin { pos_pct: f64 },
}

fn arbitrary_list_op() -> impl Strategy<Value = ListOp> {
    prop_oneof![
        4 => (0.0..=1.0f64, any::<i32>()).prop_map(|(pos_pct, value)| ListOp::Insert { pos_pct, value }),
        2 => (0.0..=1.0f64).prop_map(|pos_pct| ListOp::Remove { pos_pct }),
        2 => (0.0..=1.0f64, any::<i32>()).prop_map(|(pos_pct, value)| ListOp::Set { pos_pct, value }),
        1 => (0.0..=1.0f64).prop_map(|pos_pct| ListOp::SplitRejoin { pos_pct }),
    ]
}

fn pick(pos_pct: f64, bound: usize) -> usize {
    ((pos_pct * bound as f64) as usize).min(bound)
}

fn apply_op(list: &mut SkipList<i32>, model: &mut Vec<i32>, op: &ListOp) {
    match op {
        ListOp::Insert { pos_pct, value } => {
            let index = pick(*pos_pct, model.len());
            list.insert(index, *value).unwrap();
            model.insert(index, *value);
        }
        ListOp::Remove { pos_pct } => {
            if model.is_empty() {
                assert_eq!(list.remove(0), Err(Error::OutOfRange { index: 0, len: 0 }));
                return;
            }
            let index = pick(*pos_pct, model.len() - 1);
            assert_eq!(list.remove(index), Ok(model.remove(index)));
        }
        ListOp::Set { pos_pct, value } => {
            if model.is_empty() {
                return;
            }
            let index = pick(*pos_pct, model.len() - 1);
            let old = std::mem::replace(&mut model[index], *value);
            assert_eq!(list.set(index, *value), Ok(old));
        }
        ListOp::SplitRejoin { pos_pct } => {
            let index = pick(*pos_pct, model.len());
            let tail = list.split_off(index).unwrap();
            assert_eq!(list.len(), index);
            assert_eq!(tail.len(), model.len() - index);
            list.extend(tail);
        }
    }
}

fn small_list() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(any::<i32>(), 0..200)
}

// =============================================================================
// Model equivalence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of operations leaves the list equal to the model.
    #[test]
    fn matches_vec_model(
        seed in any::<u64>(),
        initial in small_list(),
        ops in prop::collection::vec(arbitrary_list_op(), 1..100),
    ) {
        let mut list = SkipList::with_config(Config::new().with_seed(seed));
        list.extend(initial.iter().copied());
        let mut model = initial;

        for op in &ops {
            apply_op(&mut list, &mut model, op);
            prop_assert_eq!(list.len(), model.len());
        }
        prop_assert_eq!(list.to_vec(), model.clone());
        for (i, value) in model.iter().enumerate() {
            prop_assert_eq!(list.get(i), Ok(*value));
        }
    }

    /// insert(i, x) puts x at i and shifts everything at or after i by one.
    #[test]
    fn insert_shifts_suffix(values in small_list(), pos_pct in 0.0..=1.0f64, x in any::<i32>()) {
        let mut list: SkipList<_> = values.iter().copied().collect();
        let index = pick(pos_pct, values.len());
        list.insert(index, x).unwrap();

        prop_assert_eq!(list.len(), values.len() + 1);
        prop_assert_eq!(list.get(index), Ok(x));
        for (i, value) in values.iter().enumerate() {
            let expected_at = if i < index { i } else { i + 1 };
            prop_assert_eq!(list.get(expected_at), Ok(*value));
        }
    }

    /// insert(i, x) followed by remove(i) is a no-op.
    #[test]
    fn insert_remove_round_trip(values in small_list(), pos_pct in 0.0..=1.0f64, x in any::<i32>()) {
        let mut list: SkipList<_> = values.iter().copied().collect();
        let index = pick(pos_pct, values.len());
        list.insert(index, x).unwrap();
        prop_assert_eq!(list.remove(index), Ok(x));
        prop_assert_eq!(list.to_vec(), values);
    }

    /// set returns the previous value and get sees the new one.
    #[test]
    fn set_then_get(values in prop::collection::vec(any::<i32>(), 1..200), pos_pct in 0.0..=1.0f64, x in any::<i32>()) {
        let mut list: SkipList<_> = values.iter().copied().collect();
        let index = pick(pos_pct, values.len() - 1);
        prop_assert_eq!(list.set(index, x), Ok(values[index]));
        prop_assert_eq!(list.get(index), Ok(x));
    }

    /// Splitting at every index partitions the sequence exactly.
    #[test]
    fn split_partitions_at_every_index(values in prop::collection::vec(any::<i32>(), 0..64), seed in any::<u64>()) {
        for index in 0..=values.len() {
            let mut list = SkipList::with_config(Config::new().with_seed(seed));
            list.extend(values.iter().copied());
            let tail = list.split_off(index).unwrap();

            prop_assert_eq!(list.len(), index);
            prop_assert_eq!(tail.len(), values.len() - index);

            let mut joined = list.to_vec();
            joined.extend(tail.iter());
            prop_assert_eq!(joined, values.clone());
        }
    }

    /// Both halves of a split keep working as ordinary lists.
    #[test]
    fn halves_stay_usable(
        values in small_list(),
        pos_pct in 0.0..=1.0f64,
        head_ops in prop::collection::vec(arbitrary_list_op(), 0..40),
        tail_ops in prop::collection::vec(arbitrary_list_op(), 0..40),
    ) {
        let mut list: SkipList<_> = values.iter().copied().collect();
        let index = pick(pos_pct, values.len());
        let mut tail = list.split_off(index).unwrap();

        let mut head_model = values[..index].to_vec();
        let mut tail_model = values[index..].to_vec();
        for (head_op, tail_op) in head_ops.iter().zip(tail_ops.iter()) {
            apply_op(&mut list, &mut head_model, head_op);
            apply_op(&mut tail, &mut tail_model, tail_op);
        }
        prop_assert_eq!(list.to_vec(), head_model);
        prop_assert_eq!(tail.to_vec(), tail_model);
    }

    /// Out-of-range calls fail and leave the list untouched.
    #[test]
    fn out_of_range_is_harmless(values in small_list(), past in 0usize..10) {
        let mut list: SkipList<_> = values.iter().copied().collect();
        let len = values.len();
        let err = |index| Error::OutOfRange { index, len };

        prop_assert_eq!(list.get(len + past).unwrap_err(), err(len + past));
        prop_assert_eq!(list.set(len + past, 0).unwrap_err(), err(len + past));
        prop_assert_eq!(list.remove(len + past).unwrap_err(), err(len + past));
        prop_assert_eq!(list.insert(len + past + 1, 0).unwrap_err(), err(len + past + 1));
        prop_assert!(list.split_off(len + past + 1).is_err());

        prop_assert_eq!(list.len(), len);
        prop_assert_eq!(list.to_vec(), values);
    }
}
