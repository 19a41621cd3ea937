//! Slot storage strategies for [`DynArray`](crate::DynArray).
//!
//! Every element type picks one strategy at compile time through
//! [`Element::Storage`]:
//! - [`Inline`] (dense mode): the slot is the value itself. Slack slots hold
//!   `T::default()`, so only cheap `Copy + Default` scalars use it.
//! - [`Boxed`] (indirect mode): the slot is an owned, nullable box. Slack
//!   slots are `None`, and reallocation moves box handles only; the payload
//!   is never copied or default-constructed.
//!
//! Types outside this crate opt in with [`impl_element!`](crate::impl_element).

use core::mem;

/// How a single buffer slot holds (or does not hold) an element.
pub trait Storage<T> {
    /// Physical representation of one slot.
    type Slot;

    /// Whether slack slots hold real (default) values rather than nothing.
    const DENSE: bool;

    /// A slack slot past the live prefix.
    fn vacant() -> Self::Slot;

    /// Wrap a value into a live slot.
    fn occupy(value: T) -> Self::Slot;

    fn get(slot: &Self::Slot) -> Option<&T>;

    fn get_mut(slot: &mut Self::Slot) -> Option<&mut T>;

    /// Move the value out, leaving the slot vacant.
    fn vacate(slot: &mut Self::Slot) -> Option<T>;

    /// Consume a slot, yielding its value if it held one.
    fn release(slot: Self::Slot) -> Option<T>;
}

/// Dense storage: values live directly in the buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

/// Indirect storage: one owned heap cell per live slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boxed;

impl<T: Copy + Default> Storage<T> for Inline {
    type Slot = T;
    const DENSE: bool = true;

    #[inline]
    fn vacant() -> T {
        T::default()
    }

    #[inline]
    fn occupy(value: T) -> T {
        value
    }

    #[inline]
    fn get(slot: &T) -> Option<&T> {
        Some(slot)
    }

    #[inline]
    fn get_mut(slot: &mut T) -> Option<&mut T> {
        Some(slot)
    }

    #[inline]
    fn vacate(slot: &mut T) -> Option<T> {
        Some(mem::take(slot))
    }

    #[inline]
    fn release(slot: T) -> Option<T> {
        Some(slot)
    }
}

impl<T> Storage<T> for Boxed {
    type Slot = Option<Box<T>>;
    const DENSE: bool = false;

    #[inline]
    fn vacant() -> Option<Box<T>> {
        None
    }

    #[inline]
    fn occupy(value: T) -> Option<Box<T>> {
        Some(Box::new(value))
    }

    #[inline]
    fn get(slot: &Option<Box<T>>) -> Option<&T> {
        slot.as_deref()
    }

    #[inline]
    fn get_mut(slot: &mut Option<Box<T>>) -> Option<&mut T> {
        slot.as_deref_mut()
    }

    #[inline]
    fn vacate(slot: &mut Option<Box<T>>) -> Option<T> {
        slot.take().map(|b| *b)
    }

    #[inline]
    fn release(slot: Option<Box<T>>) -> Option<T> {
        slot.map(|b| *b)
    }
}

/// Element types usable in a [`DynArray`](crate::DynArray), paired with the
/// storage strategy chosen for them.
pub trait Element: Sized {
    type Storage: Storage<Self>;
}

/// Physical slot type for element `T`.
pub type Slot<T> = <<T as Element>::Storage as Storage<T>>::Slot;

/// Implement [`Element`] for one or more types.
///
/// ```
/// use chained_collections::{impl_element, DynArray};
///
/// #[derive(Clone, Copy, Default, PartialEq, Debug)]
/// struct Point(i32, i32);
/// struct Blob(Vec<u8>);
///
/// impl_element!(inline: Point);
/// impl_element!(boxed: Blob);
///
/// let mut points = DynArray::new();
/// points.append(Point(1, 2));
/// assert_eq!(points[0], Point(1, 2));
/// ```
#[macro_export]
macro_rules! impl_element {
    (inline: $($t:ty),+ $(,)?) => {
        $(impl $crate::Element for $t {
            type Storage = $crate::Inline;
        })+
    };
    (boxed: $($t:ty),+ $(,)?) => {
        $(impl $crate::Element for $t {
            type Storage = $crate::Boxed;
        })+
    };
}

impl_element!(
    inline: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool,
    char
);

impl_element!(inline: ());

impl_element!(boxed: String, std::path::PathBuf, std::ffi::OsString);

impl<T> Element for Vec<T> {
    type Storage = Boxed;
}

impl<T: ?Sized> Element for Box<T> {
    type Storage = Boxed;
}

impl<T> Element for Option<T> {
    type Storage = Boxed;
}

impl<T, E> Element for Result<T, E> {
    type Storage = Boxed;
}

impl<T, const N: usize> Element for [T; N] {
    type Storage = Boxed;
}

// Borrowed elements are `Copy` but have no default, so they sit boxed.
impl<'a, T: ?Sized> Element for &'a T {
    type Storage = Boxed;
}

impl<'a, T: ?Sized> Element for &'a mut T {
    type Storage = Boxed;
}

impl<'a, B: ?Sized + ToOwned> Element for std::borrow::Cow<'a, B> {
    type Storage = Boxed;
}

impl<T: ?Sized> Element for std::rc::Rc<T> {
    type Storage = Boxed;
}

impl<T: ?Sized> Element for std::sync::Arc<T> {
    type Storage = Boxed;
}

impl<T> Element for core::cell::Cell<T> {
    type Storage = Boxed;
}

impl<T> Element for core::cell::RefCell<T> {
    type Storage = Boxed;
}

impl<T> Element for std::collections::VecDeque<T> {
    type Storage = Boxed;
}

impl<K, V, S> Element for std::collections::HashMap<K, V, S> {
    type Storage = Boxed;
}

impl<T, S> Element for std::collections::HashSet<T, S> {
    type Storage = Boxed;
}

impl<K, V> Element for std::collections::BTreeMap<K, V> {
    type Storage = Boxed;
}

impl<T> Element for std::collections::BTreeSet<T> {
    type Storage = Boxed;
}

macro_rules! boxed_tuples {
    ($(($($name:ident),+))+) => {
        $(impl<$($name),+> Element for ($($name,)+) {
            type Storage = Boxed;
        })+
    };
}

boxed_tuples! {
    (A)
    (A, B)
    (A, B, C)
    (A, B, C, D)
    (A, B, C, D, E)
    (A, B, C, D, E, F)
    (A, B, C, D, E, F, G)
    (A, B, C, D, E, F, G, H)
    (A, B, C, D, E, F, G, H, I)
    (A, B, C, D, E, F, G, H, I, J)
    (A, B, C, D, E, F, G, H, I, J, K)
    (A, B, C, D, E, F, G, H, I, J, K, L)
}

impl<T: Element> Element for crate::DynArray<T> {
    type Storage = Boxed;
}

impl<T> Element for crate::SLinkedList<T> {
    type Storage = Boxed;
}

impl<T> Element for crate::DLinkedList<T> {
    type Storage = Boxed;
}

impl<K, V, S> Element for crate::ChainedHashMap<K, V, S> {
    type Storage = Boxed;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_slots_are_values_and_vacate_to_default() {
        let mut slot = <Inline as Storage<i32>>::occupy(42);
        assert_eq!(slot, 42);
        assert_eq!(<Inline as Storage<i32>>::vacate(&mut slot), Some(42));
        assert_eq!(slot, 0);
        assert_eq!(<Inline as Storage<i32>>::vacant(), 0);
    }

    #[test]
    fn boxed_slots_are_nullable_handles() {
        let mut slot = <Boxed as Storage<String>>::occupy("x".to_string());
        assert_eq!(<Boxed as Storage<String>>::get(&slot), Some(&"x".to_string()));
        if let Some(s) = <Boxed as Storage<String>>::get_mut(&mut slot) {
            s.push('y');
        }
        assert_eq!(
            <Boxed as Storage<String>>::vacate(&mut slot),
            Some("xy".to_string())
        );
        assert!(slot.is_none());
        assert!(<Boxed as Storage<String>>::release(slot).is_none());
    }

    #[test]
    fn boxed_handle_moves_do_not_move_payload() {
        let slot = <Boxed as Storage<String>>::occupy("payload".to_string());
        let before = slot.as_deref().map(|s| s as *const String);
        let moved = vec![slot];
        let after = moved[0].as_deref().map(|s| s as *const String);
        assert_eq!(before, after);
    }
}
