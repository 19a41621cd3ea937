//! The ordered-sequence contract shared by the lists, the array and the
//! queue adapter: append at the tail, take from the head.

use core::fmt;

pub trait Sequence<T> {
    fn push_back(&mut self, value: T);

    fn pop_front(&mut self) -> Option<T>;

    fn front(&self) -> Option<&T>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Renders `{ e1, e2, ... }`, or `{ }` for an empty sequence.
pub(crate) fn write_braced<I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator,
    I::Item: fmt::Display,
{
    let mut items = items.into_iter().peekable();
    if items.peek().is_none() {
        return f.write_str("{ }");
    }
    f.write_str("{ ")?;
    let mut first = true;
    for item in items {
        if !first {
            f.write_str(", ")?;
        }
        first = false;
        fmt::Display::fmt(&item, f)?;
    }
    f.write_str(" }")
}
