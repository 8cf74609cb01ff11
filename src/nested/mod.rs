//! Boolean evaluation over sorted key streams
//!
//! A tree of lazily evaluated nodes computes AND / OR / NOT directly over
//! ascending, duplicate-free key streams, without materializing any
//! intermediate result.
//!
//! # Design Principles
//!
//! - Negation is absence: excludes are checked, never enumerated
//! - Skip-ahead (`seek`) on every node, so intersections never rescan
//! - Single-threaded: one consumer pulls, no internal synchronization
//! - A node that cannot enumerate (deferred) is still a valid predicate
//!
//! # Invariants
//!
//! - Output of a non-deferred node is strictly ascending and duplicate-free
//! - `AndIterator` is deferred iff it has no enumerable include
//! - `OrIterator` is deferred iff it has an exclude or a deferred include
//! - A deferred root cannot be initialized for enumeration
//!
//! # Example
//!
//! ```
//! use aerologic::nested::{NestedIterator, VecSource};
//!
//! // x AND (!y OR !z)
//! let x = NestedIterator::leaf(VecSource::new(vec!["a", "b", "c"]));
//! let y = NestedIterator::leaf(VecSource::new(vec!["b", "c"]));
//! let z = NestedIterator::leaf(VecSource::new(vec!["a", "b"]));
//! let mut tree = NestedIterator::and(vec![x, NestedIterator::or(vec![], vec![y, z])], vec![]);
//!
//! tree.initialize().unwrap();
//! let keys: Vec<_> = tree.keys().collect::<Result<_, _>>().unwrap();
//! assert_eq!(keys, vec!["a", "c"]);
//! ```

mod and;
mod errors;
mod iterator;
mod leaf;
mod merge;
mod or;
mod source;
mod stats;

pub use and::AndIterator;
pub use errors::{ErrorKind, IteratorError, IteratorErrorCode, IteratorResult, Severity};
pub use iterator::{Keys, NestedIterator, Node, NodeState};
pub use leaf::LeafIterator;
pub use or::OrIterator;
pub use source::{Element, KeySource, VecSource};
pub use stats::StatsSnapshot;
