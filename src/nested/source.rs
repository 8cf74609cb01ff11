//! Sorted key sources consumed by leaf iterators
//!
//! A source is an already-sorted, duplicate-free stream of keys produced
//! outside this module (a posting list, a range scan). Sources are only
//! ever driven by the thread that owns the enclosing tree.

use std::fmt;

/// Element type carried through a tree: any totally ordered, cloneable key.
pub trait Element: Ord + Clone + fmt::Debug {}

impl<T: Ord + Clone + fmt::Debug> Element for T {}

/// Pull-based sorted key stream
pub trait KeySource<T: Ord> {
    /// Returns the next key, or None once the stream is exhausted.
    fn next_key(&mut self) -> Option<T>;

    /// Returns the first key >= target, consuming every key before it.
    ///
    /// The default scans with `next_key`; sources with random access
    /// should override it.
    fn skip_to(&mut self, target: &T) -> Option<T> {
        while let Some(key) = self.next_key() {
            if key >= *target {
                return Some(key);
            }
        }
        None
    }

    /// Number of keys left, if known
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

impl<T, S> KeySource<T> for Box<S>
where
    T: Ord,
    S: KeySource<T> + ?Sized,
{
    fn next_key(&mut self) -> Option<T> {
        self.as_mut().next_key()
    }

    fn skip_to(&mut self, target: &T) -> Option<T> {
        self.as_mut().skip_to(target)
    }

    fn size_hint(&self) -> Option<usize> {
        self.as_ref().size_hint()
    }
}

/// In-memory sorted source with binary-search skipping
#[derive(Debug, Clone)]
pub struct VecSource<T> {
    keys: Vec<T>,
    pos: usize,
}

impl<T: Ord> VecSource<T> {
    /// Builds a source from arbitrary keys, sorting and deduplicating them.
    pub fn new(mut keys: Vec<T>) -> Self {
        keys.sort();
        keys.dedup();
        Self { keys, pos: 0 }
    }

    /// Builds a source from keys the caller guarantees are strictly ascending.
    pub fn from_sorted(keys: Vec<T>) -> Self {
        debug_assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys must be strictly ascending");
        Self { keys, pos: 0 }
    }

    /// Returns the keys not yet pulled
    pub fn remaining(&self) -> &[T] {
        &self.keys[self.pos..]
    }
}

impl<T: Ord + Clone> KeySource<T> for VecSource<T> {
    fn next_key(&mut self) -> Option<T> {
        let key = self.keys.get(self.pos)?.clone();
        self.pos += 1;
        Some(key)
    }

    fn skip_to(&mut self, target: &T) -> Option<T> {
        self.pos += self.keys[self.pos..].partition_point(|k| k < target);
        self.next_key()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.keys.len() - self.pos)
    }
}

impl<T: Ord> FromIterator<T> for VecSource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
