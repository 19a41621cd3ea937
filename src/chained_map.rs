//! ChainedHashMap: separate chaining with a clustering-driven rehash.
//!
//! Layout
//! - `buckets[i]` is the head of a singly linked chain; every entry owns the
//!   rest of its chain, so there are no shared or cyclic links.
//! - Each entry caches the `u64` hash of its key and lives in bucket
//!   `hash % capacity`. Rehashing only reads the cached hash; `K: Hash` is
//!   never called after insertion.
//! - Keys are unique: lookups match on cached hash *and* key equality, and
//!   `insert` on an existing key replaces its value.
//!
//! Rehash policy
//! - The load factor is a clustering metric, `Σ chain_len² / capacity`. The
//!   sum of squares is maintained incrementally, so the check after each
//!   mutation is O(1).
//! - When the load factor reaches `MAX_LOAD` percent the map grows to
//!   `ceil(len * 100 / NEW_LOAD)` buckets and relinks every entry into its
//!   new bucket. Entries are moved, never cloned.
//! - Capacity only grows. If the target is not above the current capacity the
//!   clustering comes from the hash distribution, not from the table size,
//!   and the map stays as is.
//! - `clear()` releases every bucket; the next insertion allocates
//!   `DEFAULT_BUCKETS` again.
//!
//! Reentrancy
//! - User code (`K: Hash`, `K: Eq`) only runs inside `probe`, before any
//!   structural change. Probes may nest: a key's `Eq` can read the map.
//! - Debug builds count open probes; appending, unlinking, rehashing and
//!   clearing assert that none is open.

use crate::probe_guard::ProbeTracker;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::mem;
use core::ptr;
use hashbrown::hash_map::DefaultHashBuilder;

/// Buckets allocated by `new()` and after `clear()` on the next insertion.
pub const DEFAULT_BUCKETS: usize = 16;
/// Load factor, in percent, at which the map grows.
pub const MAX_LOAD: usize = 70;
/// Occupancy per bucket, in percent, targeted by a growth.
pub const NEW_LOAD: usize = 30;

type Link<K, V> = Option<Box<Entry<K, V>>>;

struct Entry<K, V> {
    hash: u64,
    key: K,
    value: V,
    next: Link<K, V>,
}

fn empty_buckets<K, V>(capacity: usize) -> Box<[Link<K, V>]> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, || None);
    buckets.into_boxed_slice()
}

#[inline]
fn bucket_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

fn chain<K, V>(link: &Link<K, V>) -> impl Iterator<Item = &Entry<K, V>> {
    core::iter::successors(link.as_deref(), |e| e.next.as_deref())
}

/// The link holding the `depth`-th entry of a chain.
fn link_at<K, V>(mut link: &mut Link<K, V>, depth: usize) -> &mut Link<K, V> {
    for _ in 0..depth {
        match link {
            Some(entry) => link = &mut entry.next,
            None => break,
        }
    }
    link
}

/// Unlink a chain front to back so long chains do not recurse on drop.
fn release_chain<K, V>(mut link: Link<K, V>) {
    while let Some(mut entry) = link {
        link = entry.next.take();
    }
}

fn clone_chain<K: Clone, V: Clone>(link: &Link<K, V>) -> Link<K, V> {
    let entries: Vec<&Entry<K, V>> = chain(link).collect();
    entries.into_iter().rev().fold(None, |next, e| {
        Some(Box::new(Entry {
            hash: e.hash,
            key: e.key.clone(),
            value: e.value.clone(),
            next,
        }))
    })
}

pub struct ChainedHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    buckets: Box<[Link<K, V>]>,
    len: usize,
    square_sum: usize, // Σ chain_len² over all buckets
    probes: ProbeTracker,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(buckets: usize) -> Self {
        Self::with_capacity_and_hasher(buckets, Default::default())
    }
}

impl<K, V, S> Default for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// `Σ chain_len² / capacity`; zero for a map without buckets.
    pub fn load_factor(&self) -> f64 {
        if self.buckets.is_empty() {
            return 0.0;
        }
        self.square_sum as f64 / self.buckets.len() as f64
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        if self.len == 0 {
            return false;
        }
        self.values().any(|v| v == value)
    }

    /// Release every chain and every bucket.
    pub fn clear(&mut self) {
        self.probes.assert_idle();
        for bucket in mem::take(&mut self.buckets).into_vec() {
            release_chain(bucket);
        }
        self.len = 0;
        self.square_sum = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: None,
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            current: None,
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.iter_mut().map(|(_, v)| v)
    }

    fn grow_if_clustered(&mut self) {
        let capacity = self.buckets.len();
        if capacity == 0 || self.square_sum * 100 < MAX_LOAD * capacity {
            return;
        }
        let target = (self.len * 100).div_ceil(NEW_LOAD);
        if target > capacity {
            self.rehash(target);
        }
    }

    /// Relink every entry into a fresh table of `new_capacity` buckets.
    fn rehash(&mut self, new_capacity: usize) {
        self.probes.assert_idle();
        let old = mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        for mut link in old.into_vec() {
            while let Some(mut entry) = link {
                link = entry.next.take();
                let slot = &mut self.buckets[bucket_index(entry.hash, new_capacity)];
                entry.next = slot.take();
                *slot = Some(entry);
            }
        }
        self.square_sum = self
            .buckets
            .iter()
            .map(|b| {
                let c = chain(b).count();
                c * c
            })
            .sum();
    }

    /// Append a new entry at the tail of its chain and return its address.
    fn push_entry(&mut self, hash: u64, key: K, value: V) -> *const Entry<K, V> {
        self.probes.assert_idle();
        if self.buckets.is_empty() {
            self.buckets = empty_buckets(DEFAULT_BUCKETS);
        }
        let bucket = bucket_index(hash, self.buckets.len());
        let mut chain_len = 0;
        let mut link = &mut self.buckets[bucket];
        while let Some(entry) = link {
            link = &mut entry.next;
            chain_len += 1;
        }
        let entry = link.insert(Box::new(Entry {
            hash,
            key,
            value,
            next: None,
        }));
        let addr: *const Entry<K, V> = &**entry;
        self.len += 1;
        self.square_sum += 2 * chain_len + 1;
        addr
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_BUCKETS, hasher)
    }

    pub fn with_capacity_and_hasher(buckets: usize, hasher: S) -> Self {
        Self {
            hasher,
            buckets: empty_buckets(buckets),
            len: 0,
            square_sum: 0,
            probes: ProbeTracker::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Hash `q` and find its `(bucket, depth)`. The only place user key code
    /// runs.
    fn probe<Q>(&self, q: &Q) -> (u64, Option<(usize, usize)>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _probe = self.probes.open();
        let hash = self.make_hash(q);
        if self.buckets.is_empty() {
            return (hash, None);
        }
        let bucket = bucket_index(hash, self.buckets.len());
        let depth = chain(&self.buckets[bucket]).position(|e| e.hash == hash && e.key.borrow() == q);
        (hash, depth.map(|d| (bucket, d)))
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.probe(q).1.is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (bucket, depth) = self.probe(q).1?;
        chain(&self.buckets[bucket]).nth(depth).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (bucket, depth) = self.probe(q).1?;
        link_at(&mut self.buckets[bucket], depth)
            .as_mut()
            .map(|e| &mut e.value)
    }

    /// Value for `key`, inserting `V::default()` first when absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let (hash, found) = self.probe(&key);
        let (bucket, depth) = match found {
            Some(position) => position,
            None => {
                let target = self.push_entry(hash, key, V::default());
                self.grow_if_clustered();
                let bucket = bucket_index(hash, self.buckets.len());
                let depth = chain(&self.buckets[bucket])
                    .position(|e| ptr::eq(e, target))
                    .expect("new entry must be reachable from its bucket");
                (bucket, depth)
            }
        };
        let entry = link_at(&mut self.buckets[bucket], depth)
            .as_mut()
            .expect("located entry must exist");
        &mut entry.value
    }

    /// Insert or replace. Returns the previous value when `key` was present;
    /// the stored key is kept in that case.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (hash, found) = self.probe(&key);
        if let Some((bucket, depth)) = found {
            let entry = link_at(&mut self.buckets[bucket], depth)
                .as_mut()
                .expect("located entry must exist");
            return Some(mem::replace(&mut entry.value, value));
        }
        self.push_entry(hash, key, value);
        self.grow_if_clustered();
        None
    }

    /// Remove `q` and return its value. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (bucket, depth) = self.probe(q).1?;
        self.probes.assert_idle();
        let chain_len = chain(&self.buckets[bucket]).count();
        let link = link_at(&mut self.buckets[bucket], depth);
        let mut entry = link.take()?;
        *link = entry.next.take();
        self.len -= 1;
        self.square_sum -= 2 * chain_len - 1;
        self.grow_if_clustered();
        let Entry { value, .. } = *entry;
        Some(value)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let capacity = self.buckets.len();
        let mut total = 0;
        let mut squares = 0;
        for (i, bucket) in self.buckets.iter().enumerate() {
            let entries: Vec<&Entry<K, V>> = chain(bucket).collect();
            for (d, e) in entries.iter().enumerate() {
                assert_eq!(bucket_index(e.hash, capacity), i, "entry in wrong bucket");
                assert_eq!(e.hash, self.make_hash(&e.key), "stale cached hash");
                assert!(
                    entries[..d].iter().all(|o| o.key != e.key),
                    "duplicate key in bucket {i}"
                );
            }
            total += entries.len();
            squares += entries.len() * entries.len();
        }
        assert_eq!(total, self.len, "len out of sync with chains");
        assert_eq!(squares, self.square_sum, "clustering sum out of sync");
    }
}

impl<K, V, S> Drop for ChainedHashMap<K, V, S> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V, S> Clone for ChainedHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        let buckets: Vec<Link<K, V>> = self.buckets.iter().map(clone_chain).collect();
        Self {
            hasher: self.hasher.clone(),
            buckets: buckets.into_boxed_slice(),
            len: self.len,
            square_sum: self.square_sum,
            probes: ProbeTracker::new(),
        }
    }
}

impl<K, V, S> PartialEq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ChainedHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

/// Iterator over `(&K, &V)` in bucket order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Link<K, V>>,
    current: Option<&'a Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            buckets: self.buckets.clone(),
            current: self.current,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current {
                self.current = entry.next.as_deref();
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }
            self.current = self.buckets.next()?.as_deref();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in bucket order.
pub struct IterMut<'a, K, V> {
    buckets: core::slice::IterMut<'a, Link<K, V>>,
    current: Option<&'a mut Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.take() {
                let Entry {
                    key, value, next, ..
                } = entry;
                self.current = next.as_deref_mut();
                self.remaining -= 1;
                return Some((&*key, value));
            }
            self.current = self.buckets.next()?.as_deref_mut();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over `(K, V)`.
pub struct IntoIter<K, V> {
    buckets: std::vec::IntoIter<Link<K, V>>,
    current: Link<K, V>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        loop {
            if let Some(mut entry) = self.current.take() {
                self.current = entry.next.take();
                self.remaining -= 1;
                let Entry { key, value, .. } = *entry;
                return Some((key, value));
            }
            self.current = self.buckets.next()?;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> Drop for IntoIter<K, V> {
    fn drop(&mut self) {
        for _ in self.by_ref() {}
    }
}

impl<K, V, S> IntoIterator for ChainedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        let buckets = mem::take(&mut self.buckets).into_vec();
        let remaining = mem::replace(&mut self.len, 0);
        self.square_sum = 0;
        IntoIter {
            buckets: buckets.into_iter(),
            current: None,
            remaining,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
