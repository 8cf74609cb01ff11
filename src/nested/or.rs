//! Union with negation handling
//!
//! A union of enumerable includes is a k-way sorted merge: emit the
//! smallest head once, then advance every child sitting on it.
//!
//! A negated term inside a union matches elements outside every positive
//! stream, so as soon as an exclude (or a deferred include) is present the
//! union cannot be enumerated and becomes a predicate: `e` is accepted iff
//! some include contains it or some exclude lacks it.

use std::fmt;

use crate::config::EvaluationConfig;

use super::iterator::NestedIterator;
use super::merge::{any_contains, any_lacks, min_head, sum_size_hint};
use super::source::Element;
use super::stats::NodeStats;

/// K-way sorted union node
pub struct OrIterator<T: Element> {
    includes: Vec<NestedIterator<T>>,
    excludes: Vec<NestedIterator<T>>,
    deferred: bool,
    /// Smallest head across includes
    head: Option<T>,
    stats: NodeStats,
}

impl<T: Element> OrIterator<T> {
    /// Creates a union of `includes` and the complements of `excludes`
    pub fn new(includes: Vec<NestedIterator<T>>, excludes: Vec<NestedIterator<T>>) -> Self {
        Self {
            includes,
            excludes,
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

        self.deferred =
            !self.excludes.is_empty() || self.includes.iter().any(|child| child.deferred());
        if !self.deferred {
            self.head = min_head(&self.includes);
        }
    }

    pub(crate) fn is_deferred(&self) -> bool {
        self.deferred
    }

    pub(crate) fn head(&self) -> Option<&T> {
        self.head.as_ref()
    }

    pub(crate) fn advance(&mut self) {
        let Some(current) = self.head.take() else {
            return;
        };
        for child in &mut self.includes {
            if child.head() == Some(&current) {
                child.advance();
            }
        }
        self.head = min_head(&self.includes);
    }

    pub(crate) fn seek(&mut self, target: &T) -> Option<&T> {
        self.stats.seeks += 1;
        if matches!(&self.head, Some(head) if head < target) {
            for child in &mut self.includes {
                child.seek(target);
            }
            self.head = min_head(&self.includes);
        }
        self.head.as_ref()
    }

    /// Predicate used while deferred
    pub(crate) fn matches(&mut self, candidate: &T) -> bool {
        self.stats.candidates += 1;
        let accepted = any_contains(&mut self.includes, candidate)
            || any_lacks(&mut self.excludes, candidate);
        if !accepted {
            self.stats.rejected += 1;
        }
        accepted
    }

    pub(crate) fn size_hint(&self) -> Option<usize> {
        sum_size_hint(&self.includes)
    }

    pub(crate) fn stats(&self) -> &NodeStats {
        &self.stats
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = &NestedIterator<T>> {
        self.includes.iter().chain(self.excludes.iter())
    }
}

impl<T: Element> fmt::Display for OrIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Or(")?;
        super::iterator::write_children(f, &self.includes, &self.excludes)?;
        write!(f, ")")
    }
}
