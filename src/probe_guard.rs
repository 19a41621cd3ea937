//! Debug-only bookkeeping of in-flight key probes on a `ChainedHashMap`.
//!
//! A probe is the window in which the map runs user code (`K: Hash`,
//! `K: Eq`) against its chains. Probes only read, so a key whose `Eq` looks
//! the map up again simply nests another probe. What must never happen is a
//! chain being relinked underneath a running probe: every structural change
//! (append, unlink, rehash, clear) asserts that no probe is open. Safe code
//! cannot get there; a caller aliasing the map through a raw pointer can.
//!
//! Release builds keep no state.

#[cfg(debug_assertions)]
use core::cell::Cell;
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

#[derive(Debug, Default)]
pub(crate) struct ProbeTracker {
    #[cfg(debug_assertions)]
    open: Cell<u32>,
}

impl ProbeTracker {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            open: Cell::new(0),
        }
    }

    /// Open a probe; it closes when the returned guard drops.
    #[inline]
    pub(crate) fn open(&self) -> Probe<'_> {
        #[cfg(debug_assertions)]
        {
            self.open.set(self.open.get() + 1);
            Probe { tracker: self }
        }

        #[cfg(not(debug_assertions))]
        {
            Probe { _tracker: PhantomData }
        }
    }

    /// Panics in debug builds if any probe is still open.
    #[inline]
    pub(crate) fn assert_idle(&self) {
        #[cfg(debug_assertions)]
        assert_eq!(
            self.open.get(),
            0,
            "chain relinked while a key's Hash/Eq was running on it"
        );
    }

    #[cfg(all(test, debug_assertions))]
    pub(crate) fn open_probes(&self) -> u32 {
        self.open.get()
    }
}

pub(crate) struct Probe<'a> {
    #[cfg(debug_assertions)]
    tracker: &'a ProbeTracker,
    #[cfg(not(debug_assertions))]
    _tracker: PhantomData<&'a ProbeTracker>,
}

impl Drop for Probe<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.tracker.open.set(self.tracker.open.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::ProbeTracker;

    #[test]
    fn idle_tracker_allows_mutation() {
        let t = ProbeTracker::new();
        {
            let _p = t.open();
        }
        t.assert_idle();
    }

    #[cfg(debug_assertions)]
    #[test]
    fn probes_nest_and_unwind() {
        let t = ProbeTracker::new();
        let outer = t.open();
        let inner = t.open();
        assert_eq!(t.open_probes(), 2);
        drop(inner);
        assert_eq!(t.open_probes(), 1);
        drop(outer);
        assert_eq!(t.open_probes(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "chain relinked while a key's Hash/Eq was running")]
    fn mutation_under_open_probe_panics() {
        let t = ProbeTracker::new();
        let _p = t.open();
        t.assert_idle();
    }
}
