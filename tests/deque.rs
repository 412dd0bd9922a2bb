use std::collections::VecDeque;

use flat_collections::{Deque, Error};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum DequeOp {
    PushBack(i32),
    PushFront(i32),
    PopBack,
    PopFront,
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    SetFront(i32),
    Truncate(usize),
    Resize(usize, i32),
}

fn deque_op_strategy() -> impl Strategy<Value = DequeOp> {
    prop_oneof![
        6 => any::<i32>().prop_map(DequeOp::PushBack),
        6 => any::<i32>().prop_map(DequeOp::PushFront),
        4 => Just(DequeOp::PopBack),
        4 => Just(DequeOp::PopFront),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(i, v)| DequeOp::Insert(i, v)),
        2 => any::<usize>().prop_map(DequeOp::Remove),
        2 => any::<usize>().prop_map(DequeOp::Get),
        1 => any::<i32>().prop_map(DequeOp::SetFront),
        1 => (0usize..64).prop_map(DequeOp::Truncate),
        1 => (0usize..64, any::<i32>()).prop_map(|(n, v)| DequeOp::Resize(n, v)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations on both Deque and VecDeque and compares every result.
    #[test]
    fn deque_ops_match_vec_deque(ops in proptest::collection::vec(deque_op_strategy(), TEST_SIZE)) {
        let mut deque: Deque<i32> = Deque::new();
        let mut model: VecDeque<i32> = VecDeque::new();

        for op in &ops {
            match *op {
                DequeOp::PushBack(v) => {
                    deque.push_back(v);
                    model.push_back(v);
                }
                DequeOp::PushFront(v) => {
                    deque.push_front(v);
                    model.push_front(v);
                }
                DequeOp::PopBack => prop_assert_eq!(deque.pop_back(), model.pop_back()),
                DequeOp::PopFront => prop_assert_eq!(deque.pop_front(), model.pop_front()),
                DequeOp::Insert(i, v) => {
                    let i = i % (model.len() + 1);
                    deque.insert(i, v);
                    model.insert(i, v);
                }
                DequeOp::Remove(i) => {
                    let i = i % (model.len() + 1);
                    prop_assert_eq!(deque.remove(i), model.remove(i));
                }
                DequeOp::Get(i) => {
                    let i = i % (model.len() + 1);
                    prop_assert_eq!(deque.get(i), model.get(i));
                    let expected = model.get(i).ok_or(Error::IndexOutOfBounds { index: i, len: model.len() });
                    prop_assert_eq!(deque.at(i), expected);
                }
                DequeOp::SetFront(v) => {
                    if let Some(front) = deque.front_mut() {
                        *front = v;
                    }
                    if let Some(front) = model.front_mut() {
                        *front = v;
                    }
                }
                DequeOp::Truncate(n) => {
                    deque.truncate(n);
                    model.truncate(n);
                }
                DequeOp::Resize(n, v) => {
                    deque.resize(n, v);
                    model.resize(n, v);
                }
            }
            prop_assert_eq!(deque.len(), model.len());
            prop_assert_eq!(deque.front(), model.front());
            prop_assert_eq!(deque.back(), model.back());
            let capacity = deque.capacity();
            prop_assert!(capacity == 0 || capacity.is_power_of_two());
        }

        prop_assert!(deque.iter().eq(model.iter()));
        let (front, back) = deque.as_slices();
        prop_assert!(front.iter().chain(back).eq(model.iter()));
    }

    /// A cursor walk visits the same elements as iteration, and positions translate both ways.
    #[test]
    fn cursor_walk_matches_iteration(
        back in proptest::collection::vec(any::<u16>(), 0..100),
        front in proptest::collection::vec(any::<u16>(), 0..100),
        offset in 0usize..200,
    ) {
        let mut deque = Deque::new();
        for &v in &back {
            deque.push_back(v);
        }
        for &v in &front {
            deque.push_front(v);
        }

        let mut cursor = deque.cursor_front();
        let mut walked = Vec::new();
        while let Some(&value) = cursor.get() {
            walked.push(value);
            cursor.move_next();
        }
        prop_assert!(walked.iter().eq(deque.iter()));
        prop_assert_eq!(cursor.index(), deque.len());

        let target = offset % (deque.len() + 1);
        let at = deque.cursor_at(target);
        prop_assert_eq!(at.index(), target);
        prop_assert_eq!(at.get(), deque.get(target));
        let isize_target = isize::try_from(target).unwrap();
        prop_assert_eq!(at.offset_from(&deque.cursor_front()), isize_target);
        let mut sought = deque.cursor_front();
        sought.seek(isize_target);
        prop_assert!(sought == at);
    }
}

// ─── Ring behavior ───────────────────────────────────────────────────────────

#[test]
fn fifth_push_doubles_capacity() {
    let mut deque = Deque::with_capacity(4);
    for value in 1..=4 {
        deque.push_back(value);
    }
    assert_eq!(deque.capacity(), 4);
    deque.push_back(5);
    assert_eq!(deque.capacity(), 8);
    assert_eq!(deque.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
}

#[test]
fn at_reports_out_of_bounds() {
    let deque = Deque::from(vec!['a', 'b', 'c']);
    assert_eq!(deque.at(2), Ok(&'c'));
    let error = deque.at(3).unwrap_err();
    assert_eq!(error, Error::IndexOutOfBounds { index: 3, len: 3 });
    assert_eq!(error.to_string(), "index 3 is out of bounds for length 3");
}

#[test]
fn comparisons_are_lexicographic() {
    let mut a = Deque::from([1, 2, 3]);
    let b: Deque<i32> = (1..=3).collect();
    assert_eq!(a, b);
    a.push_front(0);
    assert!(a < b);
    assert_eq!(format!("{a:?}"), "[0, 1, 2, 3]");
}

#[test]
fn insert_many_and_remove_range_keep_order() {
    let mut deque: Deque<u32> = (0..10).collect();
    deque.remove_range(..3);
    deque.remove_range(5..);
    deque.insert_many(2, 100..103);
    assert_eq!(deque.iter().copied().collect::<Vec<_>>(), [3, 4, 100, 101, 102, 5, 6, 7]);
}

#[test]
#[should_panic(expected = "`Deque::index()` - `index` (2) >= `len` (2)!")]
fn indexing_past_the_end_panics() {
    let deque = Deque::from([1, 2]);
    let _ = deque[2];
}

#[test]
#[should_panic(expected = "`Cursor::move_prev()` - cursor is at the front!")]
fn cursor_before_front_panics() {
    let deque = Deque::from([1, 2]);
    deque.cursor_front().move_prev();
}
