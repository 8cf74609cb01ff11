//! Shared merge and membership helpers for composite nodes

use super::iterator::NestedIterator;
use super::source::Element;

/// Smallest head across enumerable children
pub(crate) fn min_head<T: Element>(children: &[NestedIterator<T>]) -> Option<T> {
    children.iter().filter_map(|child| child.head()).min().cloned()
}

/// True if any child contains the candidate.
///
/// Short-circuits; a skipped child simply sees a larger candidate next time.
pub(crate) fn any_contains<T: Element>(children: &mut [NestedIterator<T>], candidate: &T) -> bool {
    children.iter_mut().any(|child| child.contains(candidate))
}

/// True if any child does not contain the candidate
pub(crate) fn any_lacks<T: Element>(children: &mut [NestedIterator<T>], candidate: &T) -> bool {
    children.iter_mut().any(|child| !child.contains(candidate))
}

/// True if every indexed child contains the candidate
pub(crate) fn all_contain<T: Element>(
    children: &mut [NestedIterator<T>],
    indices: &[usize],
    candidate: &T,
) -> bool {
    indices.iter().all(|&i| children[i].contains(candidate))
}

/// Smallest known size among the indexed children
pub(crate) fn min_size_hint<T: Element>(
    children: &[NestedIterator<T>],
    indices: &[usize],
) -> Option<usize> {
    indices.iter().filter_map(|&i| children[i].size_hint()).min()
}

/// Total size of all children, unknown if any child is unknown.
///
/// Saturates at `usize::MAX`.
pub(crate) fn sum_size_hint<T: Element>(children: &[NestedIterator<T>]) -> Option<usize> {
    children.iter().try_fold(0usize, |total, child| {
        child.size_hint().map(|size| total.saturating_add(size))
    })
}
