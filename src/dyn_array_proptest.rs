#![cfg(test)]

// Property tests for DynArray: contents against Vec, capacity against the
// percentage policy, for both slot strategies.

use crate::dyn_array::{
    DynArray, DOWNSIZE_THRESHOLD, GROWTH_FACTOR, MINIMUM_SIZE, SHRINK_FACTOR, UPSIZE_THRESHOLD,
};
use crate::error::{Error, InvalidArgument};
use crate::storage::Element;
use proptest::prelude::*;
use std::fmt::Debug;

#[derive(Clone, Debug)]
enum Op {
    Append(i32),
    InsertAt(usize, i32),
    RemoveAt(usize),
    Set(usize, i32),
    Get(usize),
    Resize(usize, bool),
    Clear,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        8 => any::<i32>().prop_map(Op::Append),
        3 => (0usize..48, any::<i32>()).prop_map(|(i, v)| Op::InsertAt(i, v)),
        6 => (0usize..48).prop_map(Op::RemoveAt),
        2 => (0usize..48, any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
        2 => (0usize..48).prop_map(Op::Get),
        1 => (0usize..40, any::<bool>()).prop_map(|(n, s)| Op::Resize(n, s)),
        1 => Just(Op::Clear),
    ];
    proptest::collection::vec(op, 1..200)
}

/// Capacity the growth policy predicts before an append or insert.
fn grown(len: usize, capacity: usize) -> usize {
    if len * 100 >= UPSIZE_THRESHOLD * capacity {
        (capacity * GROWTH_FACTOR / 100).max(MINIMUM_SIZE)
    } else {
        capacity
    }
}

/// Capacity the shrink policy predicts before a removal.
fn shrunk(len: usize, capacity: usize) -> usize {
    if capacity > MINIMUM_SIZE && len * 100 <= DOWNSIZE_THRESHOLD * capacity {
        (capacity * SHRINK_FACTOR / 100).max(MINIMUM_SIZE)
    } else {
        capacity
    }
}

fn run_against_model<T, F>(ops: Vec<Op>, make: F) -> Result<(), TestCaseError>
where
    T: Element + Clone + Default + PartialEq + Debug,
    F: Fn(i32) -> T,
{
    let mut sut: DynArray<T> = DynArray::new();
    let mut model: Vec<T> = Vec::new();
    let mut capacity = MINIMUM_SIZE;

    for op in ops {
        let len = model.len();
        match op {
            Op::Append(v) => {
                capacity = grown(len, capacity);
                sut.append(make(v));
                model.push(make(v));
            }
            Op::InsertAt(i, v) => {
                let res = sut.insert_at(make(v), i);
                if i < len {
                    prop_assert!(res.is_ok());
                    capacity = grown(len, capacity);
                    model.insert(i, make(v));
                } else {
                    prop_assert_eq!(res, Err(Error::OutOfRange { index: i, len }));
                }
            }
            Op::RemoveAt(i) => {
                let res = sut.remove_at(i);
                if i < len {
                    capacity = shrunk(len, capacity);
                    prop_assert_eq!(res, Ok(model.remove(i)));
                } else {
                    prop_assert_eq!(res, Err(Error::OutOfRange { index: i, len }));
                }
            }
            Op::Set(i, v) => {
                let res = sut.set(i, make(v));
                match model.get_mut(i) {
                    Some(slot) => {
                        prop_assert_eq!(res, Ok(std::mem::replace(slot, make(v))));
                    }
                    None => {
                        prop_assert!(res.is_err());
                    }
                }
            }
            Op::Get(i) => {
                prop_assert_eq!(sut.get(i).ok(), model.get(i));
            }
            Op::Resize(n, allow_shrink) => {
                let res = sut.resize(n, allow_shrink);
                if n == 0 {
                    prop_assert_eq!(res, Err(Error::from(InvalidArgument::ZeroSize)));
                } else if n < len && !allow_shrink {
                    prop_assert_eq!(
                        res,
                        Err(Error::from(InvalidArgument::WouldTruncate { requested: n, len }))
                    );
                } else {
                    prop_assert!(res.is_ok());
                    model.resize(n, T::default());
                    capacity = n.max(MINIMUM_SIZE);
                }
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                capacity = 0;
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.capacity(), capacity);
        prop_assert!(sut.iter().eq(model.iter()));
        sut.debug_validate_invariants();
    }

    // Draining from the head returns the model's order.
    let drained: Vec<T> = sut.into_iter().collect();
    prop_assert_eq!(drained, model);
    Ok(())
}

// Property: DynArray is observably a Vec with a predictable capacity.
// - Positional operations agree with Vec, and out-of-range ones fail without
//   side effects.
// - Capacity follows the grow/shrink percentages exactly and only `clear`
//   reaches zero.
// - Live slots are occupied and boxed slack slots are empty after each step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_inline_elements(ops in arb_ops()) {
        run_against_model(ops, |v| v)?;
    }

    #[test]
    fn prop_boxed_elements(ops in arb_ops()) {
        run_against_model(ops, |v| v.to_string())?;
    }
}
