//! Leaf iterator: adapts an external sorted key source
//!
//! A leaf is always enumerable. A negated leaf is expressed by placing it
//! in a composite's exclude set, never by the leaf itself.

use std::fmt;

use super::source::{Element, KeySource};
use super::stats::NodeStats;

/// Adapter exposing a sorted, duplicate-free source as a tree node
pub struct LeafIterator<T: Element> {
    source: Box<dyn KeySource<T> + Send>,
    label: Option<String>,
    /// Next element not yet handed to the parent
    head: Option<T>,
    stats: NodeStats,
}

impl<T: Element> LeafIterator<T> {
    /// Wraps a source
    pub fn new<S>(source: S) -> Self
    where
        S: KeySource<T> + Send + 'static,
    {
        Self {
            source: Box::new(source),
            label: None,
            head: None,
            stats: NodeStats::default(),
        }
    }

    /// Wraps a source with a label used when rendering the tree
    pub fn labeled<S>(label: impl Into<String>, source: S) -> Self
    where
        S: KeySource<T> + Send + 'static,
    {
        Self {
            label: Some(label.into()),
            ..Self::new(source)
        }
    }

    /// Returns the label, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Primes the first element.
    pub(crate) fn prepare(&mut self) {
        self.head = self.pull();
    }

    pub(crate) fn head(&self) -> Option<&T> {
        self.head.as_ref()
    }

    pub(crate) fn advance(&mut self) {
        if let Some(previous) = self.head.take() {
            self.head = self.pull();
            debug_assert!(
                self.head.as_ref().map_or(true, |next| *next > previous),
                "leaf source is not strictly ascending"
            );
        }
    }

    /// Positions the head on the first element >= target.
    ///
    /// A target at or below the head leaves the leaf untouched.
    pub(crate) fn seek(&mut self, target: &T) -> Option<&T> {
        self.stats.seeks += 1;
        if matches!(&self.head, Some(head) if head < target) {
            let before = self.source.size_hint();
            self.head = self.source.skip_to(target);
            self.stats.keys_read += match (before, self.source.size_hint()) {
                (Some(before), Some(after)) if before > after => (before - after) as u64,
                _ => u64::from(self.head.is_some()),
            };
        }
        self.head.as_ref()
    }

    pub(crate) fn size_hint(&self) -> Option<usize> {
        self.source
            .size_hint()
            .map(|remaining| remaining.saturating_add(usize::from(self.head.is_some())))
    }

    pub(crate) fn stats(&self) -> &NodeStats {
        &self.stats
    }

    fn pull(&mut self) -> Option<T> {
        let key = self.source.next_key();
        if key.is_some() {
            self.stats.keys_read += 1;
        }
        key
    }
}

impl<T: Element> fmt::Display for LeafIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}", label),
            None => write!(f, "Leaf"),
        }
    }
}

impl<T: Element> fmt::Debug for LeafIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafIterator")
            .field("label", &self.label)
            .field("head", &self.head)
            .finish()
    }
}
