use chained_collections::{
    dyn_array, impl_element, DynArray, Error, InvalidArgument, Queue, MINIMUM_SIZE,
};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn append_index_remove_insert() {
    let mut a = DynArray::new();
    a.append(1);
    a.append(2);
    a.append(3);
    assert_eq!(a.len(), 3);
    assert_eq!(a.to_string(), "{ 1, 2, 3 }");

    assert_eq!(a.remove_at(0), Ok(1));
    assert_eq!(a.to_string(), "{ 2, 3 }");
    a.insert_at(1, 0).unwrap();
    assert_eq!(a, dyn_array![1, 2, 3]);
}

#[test]
fn literal_and_known_size_construction() {
    let small = dyn_array!["a".to_string(), "b".to_string()];
    assert_eq!(small.capacity(), MINIMUM_SIZE);
    assert!(!DynArray::<String>::is_dense());

    let big: DynArray<u64> = DynArray::from_exact((0..40u32).map(u64::from));
    assert_eq!(big.capacity(), 40);
    assert_eq!(big.last(), Some(&39));
    assert!(DynArray::<u64>::is_dense());

    let defaults: DynArray<f64> = DynArray::with_default_len(3);
    assert_eq!(defaults.to_string(), "{ 0, 0, 0 }");

    let empty: DynArray<i8> = dyn_array![];
    assert_eq!(empty.to_string(), "{ }");
}

#[test]
fn errors_carry_position_and_reason() {
    let mut a = dyn_array![1u8, 2, 3];
    let err = a.remove_at(7).unwrap_err();
    assert_eq!(err, Error::OutOfRange { index: 7, len: 3 });
    assert_eq!(err.to_string(), "index out of bounds: index 7, size 3");

    let err = a.resize(1, false).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidArgument(InvalidArgument::WouldTruncate {
            requested: 1,
            len: 3
        })
    );
    a.resize(1, true).unwrap();
    assert_eq!(a, dyn_array![1]);
}

/// A user-defined, non-trivially-copyable element opting into boxed storage.
#[derive(Debug, PartialEq)]
struct Ticket {
    id: u32,
    drops: Rc<Cell<usize>>,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

impl_element!(boxed: Ticket);

#[test]
fn user_elements_are_owned_and_dropped_once() {
    let drops = Rc::new(Cell::new(0));
    let mut a = DynArray::new();
    for id in 0..30 {
        a.append(Ticket {
            id,
            drops: drops.clone(),
        });
    }
    // Growth moved 30 tickets several times without dropping any.
    assert_eq!(drops.get(), 0);

    let t = a.remove_at(10).unwrap();
    assert_eq!(t.id, 10);
    drop(t);
    assert_eq!(drops.get(), 1);

    a.clear();
    assert_eq!(drops.get(), 30);
    assert_eq!(a.capacity(), 0);

    a.append(Ticket {
        id: 99,
        drops: drops.clone(),
    });
    assert_eq!(a.capacity(), MINIMUM_SIZE);
    drop(a);
    assert_eq!(drops.get(), 31);
}

#[test]
fn nested_arrays() {
    let mut grid: DynArray<DynArray<i32>> = DynArray::new();
    for row in 0..3 {
        grid.append((0..row + 1).collect());
    }
    grid[1].append(7);
    assert_eq!(grid.to_string(), "{ { 0 }, { 0, 1, 7 }, { 0, 1, 2 } }");
    let copy = grid.clone();
    grid[0].set(0, 5).unwrap();
    assert_ne!(grid, copy);
}

#[test]
fn iterator_adapters() {
    let mut a: DynArray<i32> = (1..=5).collect();
    for v in &mut a {
        *v *= 10;
    }
    let total: i32 = a.iter().sum();
    assert_eq!(total, 150);
    assert_eq!(a.iter().rev().next(), Some(&50));
    a.extend([60, 70]);
    assert_eq!(a.into_iter().collect::<Vec<_>>(), vec![10, 20, 30, 40, 50, 60, 70]);
}

#[test]
fn borrowed_and_fixed_size_elements() {
    let text = String::from("alpha beta gamma");
    let mut words: DynArray<&str> = text.split(' ').collect();
    assert!(!DynArray::<&str>::is_dense());
    words.insert_at("zero", 0).unwrap();
    for w in words.iter_mut() {
        *w = w.trim_end_matches('a');
    }
    assert_eq!(words.iter().rev().copied().collect::<Vec<_>>(), ["gamm", "bet", "alph", "zero"]);
    assert_eq!(words.to_string(), "{ zero, alph, bet, gamm }");

    let mut q: Queue<&str, DynArray<&str>> = Queue::with_sequence(DynArray::new());
    q.push(&text[..5]);
    q.push(&text[6..10]);
    assert_eq!(q.pop(), Some("alpha"));
    assert_eq!(q.peek(), Some(&"beta"));

    let mut blocks: DynArray<[u8; 4]> = DynArray::new();
    for i in 0..20u8 {
        blocks.append([i; 4]);
    }
    assert_eq!(blocks.remove_at(3), Ok([3; 4]));
    assert_eq!(blocks[3], [4; 4]);
    assert_eq!(blocks.len(), 19);
    blocks.debug_validate_invariants();

    let units: DynArray<()> = dyn_array![(), (), ()];
    assert!(DynArray::<()>::is_dense());
    assert_eq!(units.len(), 3);

    let mut rows: DynArray<(u8, char, &str, bool)> = DynArray::new();
    rows.append((1, 'a', "one", true));
    rows.append((2, 'b', "two", false));
    assert_eq!(rows.last(), Some(&(2, 'b', "two", false)));
}
