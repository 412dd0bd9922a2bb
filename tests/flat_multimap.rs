use flat_collections::{FlatMultiMap, FlatMultiSet, Natural, Reverse};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 1_000;

/// Inserts into the model after every entry with the same key.
fn model_insert(model: &mut Vec<(u8, u32)>, key: u8, value: u32) -> usize {
    let position = model.partition_point(|&(k, _)| k <= key);
    model.insert(position, (key, value));
    position
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MultiMapOp {
    Insert(u8),
    InsertHint(usize, u8),
    Remove(u8),
    GetAll(u8),
    RemoveIndex(usize),
}

fn multimap_op_strategy() -> impl Strategy<Value = MultiMapOp> {
    prop_oneof![
        5 => (0u8..30).prop_map(MultiMapOp::Insert),
        4 => (any::<usize>(), 0u8..30).prop_map(|(h, k)| MultiMapOp::InsertHint(h, k)),
        1 => (0u8..30).prop_map(MultiMapOp::Remove),
        3 => (0u8..30).prop_map(MultiMapOp::GetAll),
        1 => any::<usize>().prop_map(MultiMapOp::RemoveIndex),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// The values stored under one key come back in the order they were inserted.
    #[test]
    fn multimap_ops_match_sorted_vec(ops in proptest::collection::vec(multimap_op_strategy(), TEST_SIZE)) {
        let mut flat: FlatMultiMap<u8, u32> = FlatMultiMap::new();
        let mut model: Vec<(u8, u32)> = Vec::new();
        let mut next = 0u32;

        for op in &ops {
            match *op {
                MultiMapOp::Insert(k) => {
                    next += 1;
                    prop_assert_eq!(flat.insert(k, next), model_insert(&mut model, k, next));
                }
                MultiMapOp::InsertHint(hint, k) => {
                    next += 1;
                    let hint = hint % (flat.len() + 1);
                    prop_assert_eq!(flat.insert_hint(hint, k, next), model_insert(&mut model, k, next));
                }
                MultiMapOp::Remove(k) => {
                    let before = model.len();
                    model.retain(|&(key, _)| key != k);
                    prop_assert_eq!(flat.remove(&k), before - model.len());
                }
                MultiMapOp::GetAll(k) => {
                    let expected: Vec<u32> = model.iter().filter(|&&(key, _)| key == k).map(|&(_, v)| v).collect();
                    let actual: Vec<u32> = flat.get_all(&k).copied().collect();
                    prop_assert_eq!(flat.get(&k), expected.first());
                    prop_assert_eq!(flat.count(&k), expected.len());
                    prop_assert_eq!(actual, expected);
                }
                MultiMapOp::RemoveIndex(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        prop_assert_eq!(flat.remove_index(i), model.remove(i));
                    }
                }
            }
        }

        prop_assert_eq!(flat.as_slice(), model.as_slice());
        prop_assert!(flat.keys().eq(model.iter().map(|(k, _)| k)));
    }
}

#[test]
fn bulk_extend_appends_after_existing_runs() {
    let mut map = FlatMultiMap::from([(2, 'a'), (1, 'b')]);
    map.extend([(2, 'c'), (1, 'd'), (2, 'e')]);
    assert_eq!(map.as_slice(), &[(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c'), (2, 'e')]);
    assert_eq!(map.equal_range(&2), 2..5);
    assert_eq!(map.range(2..).count(), 3);
}

#[test]
fn retain_and_values_mut_edit_in_place() {
    let mut map: FlatMultiMap<&str, i32> = [("x", 1), ("y", 2), ("x", 3)].into_iter().collect();
    for value in map.values_mut() {
        *value *= 10;
    }
    map.retain(|_, v| *v != 20);
    assert_eq!(map.as_slice(), &[("x", 10), ("x", 30)]);
    assert_eq!(map.get_all("x").sum::<i32>(), 40);
}

#[test]
fn capacity_and_comparator_together() {
    let mut map = FlatMultiMap::with_capacity_and_comparator(6, Reverse(Natural));
    map.extend([(1, 'a'), (3, 'b'), (1, 'c')]);
    assert_eq!(map.capacity(), 6);
    assert_eq!(map.as_slice(), &[(3, 'b'), (1, 'a'), (1, 'c')]);
    map.shrink_to_fit();
    assert_eq!(map.capacity(), 3);

    let mut set = FlatMultiSet::with_capacity_and_comparator(4, Reverse(Natural));
    set.extend([2, 2, 7]);
    assert_eq!(set.as_slice(), &[7, 2, 2]);
    assert_eq!(set.try_reserve(1), Ok(()));
    assert_eq!(set.capacity(), 4);
}
