//! Intersection with negation filtering
//!
//! Produces the elements present in every include and absent from every
//! exclude. Enumerable includes drive a sorted merge join: one of them (the
//! lead) proposes a candidate, the others skip to it, and the largest
//! mismatch becomes the next skip target. Deferred includes and all excludes
//! are only ever asked about candidates the drivers already agree on.
//!
//! # Deferral
//!
//! With no enumerable include there is nothing to propose candidates, so
//! the node becomes a predicate: `e` is accepted iff every include accepts
//! it and no exclude contains it (`!A AND !B == !(A OR B)`).

use std::fmt;

use crate::config::{DriverSelection, EvaluationConfig};

use super::iterator::NestedIterator;
use super::merge::{all_contain, any_contains, min_size_hint};
use super::source::Element;
use super::stats::NodeStats;

/// K-way sorted intersection node
pub struct AndIterator<T: Element> {
    includes: Vec<NestedIterator<T>>,
    excludes: Vec<NestedIterator<T>>,
    /// Enumerable includes, lead first
    drivers: Vec<usize>,
    /// Deferred includes, consulted as predicates
    filters: Vec<usize>,
    deferred: bool,
    /// Accepted element all drivers currently sit on
    head: Option<T>,
    stats: NodeStats,
}

impl<T: Element> AndIterator<T> {
    /// Creates an intersection of `includes` minus anything in `excludes`
    pub fn new(includes: Vec<NestedIterator<T>>, excludes: Vec<NestedIterator<T>>) -> Self {
        Self {
            includes,
            excludes,
            drivers: Vec::new(),
            filters: Vec::new(),
            deferred: false,
            head: None,
            stats: NodeStats::default(),
        }
    }

    /// Positive sub-expressions
    pub fn includes(&self) -> &[NestedIterator<T>] {
        &self.includes
    }

    /// Negated sub-expressions
    pub fn excludes(&self) -> &[NestedIterator<T>] {
        &self.excludes
    }

    pub(crate) fn prepare(&mut self, config: &EvaluationConfig) {
        for child in self.includes.iter_mut().chain(self.excludes.iter_mut()) {
            child.prepare(config);
        }

        let includes = &self.includes;
        let (drivers, filters): (Vec<usize>, Vec<usize>) =
            (0..includes.len()).partition(|&i| !includes[i].deferred());
        self.drivers = drivers;
        self.filters = filters;
        self.deferred = self.drivers.is_empty();
        if self.deferred {
            return;
        }

        if config.driver == DriverSelection::SmallestHint {
            let includes = &self.includes;
            // stable: ties keep construction order
            self.drivers
                .sort_by_key(|&i| includes[i].size_hint().unwrap_or(usize::MAX));
        }

        self.head = self.settle();
    }

    pub(crate) fn is_deferred(&self) -> bool {
        self.deferred
    }

    pub(crate) fn head(&self) -> Option<&T> {
        self.head.as_ref()
    }

    pub(crate) fn advance(&mut self) {
        if self.head.take().is_none() {
            return;
        }
        if let Some(lead) = self.drivers.first().copied() {
            self.includes[lead].advance();
            self.head = self.settle();
        }
    }

    pub(crate) fn seek(&mut self, target: &T) -> Option<&T> {
        self.stats.seeks += 1;
        if matches!(&self.head, Some(head) if head < target) {
            let lead = self.drivers.first().copied();
            self.head = match lead {
                Some(lead) if self.includes[lead].seek(target).is_some() => self.settle(),
                _ => None,
            };
        }
        self.head.as_ref()
    }

    /// Predicate used while deferred
    pub(crate) fn matches(&mut self, candidate: &T) -> bool {
        self.stats.candidates += 1;
        let accepted = all_contain(&mut self.includes, &self.filters, candidate)
            && !any_contains(&mut self.excludes, candidate);
        if !accepted {
            self.stats.rejected += 1;
        }
        accepted
    }

    pub(crate) fn size_hint(&self) -> Option<usize> {
        min_size_hint(&self.includes, &self.drivers)
    }

    pub(crate) fn stats(&self) -> &NodeStats {
        &self.stats
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = &NestedIterator<T>> {
        self.includes.iter().chain(self.excludes.iter())
    }

    /// Runs the merge join from the drivers' current positions until every
    /// driver agrees on a candidate that passes the filters and excludes.
    fn settle(&mut self) -> Option<T> {
        let Self {
            includes,
            excludes,
            drivers,
            filters,
            stats,
            ..
        } = self;
        let (&lead, rest) = drivers.split_first()?;

        loop {
            let mut candidate = includes[lead].head()?.clone();
            let mut agreed = true;
            for &i in rest {
                let head = includes[i].seek(&candidate)?;
                if *head != candidate {
                    candidate = head.clone();
                    agreed = false;
                }
            }

            if !agreed {
                includes[lead].seek(&candidate)?;
                continue;
            }

            stats.candidates += 1;
            if all_contain(includes, filters, &candidate) && !any_contains(excludes, &candidate) {
                return Some(candidate);
            }
            stats.rejected += 1;
            includes[lead].advance();
        }
    }
}

impl<T: Element> fmt::Display for AndIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "And(")?;
        super::iterator::write_children(f, &self.includes, &self.excludes)?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nested::source::{KeySource, VecSource};

    fn leaf(keys: &[u32]) -> NestedIterator<u32> {
        NestedIterator::leaf(VecSource::new(keys.to_vec()))
    }

    fn prepared(
        includes: Vec<NestedIterator<u32>>,
        excludes: Vec<NestedIterator<u32>>,
    ) -> AndIterator<u32> {
        let mut node = AndIterator::new(includes, excludes);
        node.prepare(&EvaluationConfig::default());
        node
    }

    fn drain(node: &mut AndIterator<u32>) -> Vec<u32> {
        let mut out = Vec::new();
        while let Some(key) = node.head().cloned() {
            out.push(key);
            node.advance();
        }
        out
    }

    #[test]
    fn test_single_include_reproduces_source() {
        let mut node = prepared(vec![leaf(&[1, 5, 9])], vec![]);
        assert!(!node.is_deferred());
        assert_eq!(drain(&mut node), vec![1, 5, 9]);
    }

    #[test]
    fn test_intersection() {
        let mut node = prepared(
            vec![leaf(&[1, 2, 3, 5, 8, 13]), leaf(&[2, 3, 5, 7, 11, 13]), leaf(&[3, 5, 13, 21])],
            vec![],
        );
        assert_eq!(drain(&mut node), vec![3, 5, 13]);
    }

    #[test]
    fn test_exclude_filters_candidates() {
        let mut node = prepared(vec![leaf(&[1, 2, 3, 4])], vec![leaf(&[2, 4])]);
        assert_eq!(drain(&mut node), vec![1, 3]);
        assert_eq!(node.stats().rejected, 2);
    }

    #[test]
    fn test_exhausted_include_empties_intersection() {
        let mut node = prepared(vec![leaf(&[1, 2]), leaf(&[])], vec![]);
        assert_eq!(node.head(), None);
        assert!(drain(&mut node).is_empty());
    }

    #[test]
    fn test_pure_negation_is_deferred() {
        let mut node = prepared(vec![], vec![leaf(&[2]), leaf(&[3])]);
        assert!(node.is_deferred());
        assert!(node.matches(&1));
        assert!(!node.matches(&2));
        assert!(!node.matches(&3));
        assert!(node.matches(&4));
    }

    #[test]
    fn test_seek_lands_on_next_match() {
        let mut node = prepared(vec![leaf(&[1, 4, 6, 9]), leaf(&[4, 5, 6, 9])], vec![leaf(&[6])]);
        assert_eq!(node.seek(&2), Some(&4));
        assert_eq!(node.seek(&5), Some(&9));
        assert_eq!(node.seek(&10), None);
    }

    #[test]
    fn test_smallest_hint_driver_same_output() {
        let includes = || vec![leaf(&[1, 2, 3, 4, 5, 6, 7, 8]), leaf(&[2, 7])];
        let mut first = AndIterator::new(includes(), vec![]);
        first.prepare(&EvaluationConfig::default());
        let mut smallest = AndIterator::new(includes(), vec![]);
        smallest.prepare(&EvaluationConfig::with_driver(DriverSelection::SmallestHint));

        assert_eq!(smallest.drivers, vec![1, 0]);
        assert_eq!(drain(&mut first), drain(&mut smallest));
    }

    /// Source whose size hint is saturated
    struct Endless(u32);

    impl KeySource<u32> for Endless {
        fn next_key(&mut self) -> Option<u32> {
            self.0 += 1;
            Some(self.0)
        }

        fn size_hint(&self) -> Option<usize> {
            Some(usize::MAX)
        }
    }

    #[test]
    fn test_smallest_hint_with_saturated_source() {
        let mut node = AndIterator::new(
            vec![NestedIterator::leaf(Endless(0)), leaf(&[2, 3])],
            vec![],
        );
        node.prepare(&EvaluationConfig::with_driver(DriverSelection::SmallestHint));

        assert_eq!(node.drivers, vec![1, 0]);
        assert_eq!(node.size_hint(), Some(2));
        assert_eq!(drain(&mut node), vec![2, 3]);
    }

    #[test]
    fn test_display() {
        let node = AndIterator::new(
            vec![NestedIterator::leaf_labeled("x", VecSource::new(vec![1u32]))],
            vec![NestedIterator::leaf_labeled("y", VecSource::new(vec![1u32]))],
        );
        assert_eq!(node.to_string(), "And(includes=[x], excludes=[y])");
    }
}
