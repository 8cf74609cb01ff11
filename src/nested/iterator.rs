//! The node type every tree is built from
//!
//! `NestedIterator` wraps one of a closed set of node kinds (leaf, and, or)
//! and enforces the call protocol around them:
//!
//! ```text
//! CREATED -> initialize()           -> ENUMERATING    -> EXHAUSTED
//!         -> initialize_predicate() -> PREDICATE_ONLY
//!         -> initialize() on a deferred root -> REJECTED
//! ```
//!
//! Nothing ever returns to CREATED. Children are initialized by their
//! parent and never see the public protocol.

use std::fmt;

use crate::config::EvaluationConfig;
use crate::observability::{log_event, Event, Logger};

use super::and::AndIterator;
use super::errors::{IteratorError, IteratorResult};
use super::leaf::LeafIterator;
use super::or::OrIterator;
use super::source::{Element, KeySource};
use super::stats::StatsSnapshot;

/// Lifecycle state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Constructed, not yet initialized
    Created,
    /// Produces elements through has_next()/next()
    Enumerating,
    /// Answers is_member() only
    PredicateOnly,
    /// Enumeration finished
    Exhausted,
    /// Deferred root refused at initialization
    Rejected,
}

impl NodeState {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Created => "CREATED",
            NodeState::Enumerating => "ENUMERATING",
            NodeState::PredicateOnly => "PREDICATE_ONLY",
            NodeState::Exhausted => "EXHAUSTED",
            NodeState::Rejected => "REJECTED",
        }
    }
}

/// The node kinds a tree is composed of
pub enum Node<T: Element> {
    Leaf(LeafIterator<T>),
    And(AndIterator<T>),
    Or(OrIterator<T>),
}

/// A node of a boolean evaluation tree
pub struct NestedIterator<T: Element> {
    node: Node<T>,
    state: NodeState,
    /// Set by a successful has_next(), consumed by next()
    ready: bool,
    last_candidate: Option<T>,
    emitted: u64,
    logger: Logger,
}

impl<T: Element> NestedIterator<T> {
    fn from_node(node: Node<T>) -> Self {
        Self {
            node,
            state: NodeState::Created,
            ready: false,
            last_candidate: None,
            emitted: 0,
            logger: Logger::default(),
        }
    }

    /// Leaf over an external sorted source
    pub fn leaf<S>(source: S) -> Self
    where
        S: KeySource<T> + Send + 'static,
    {
        LeafIterator::new(source).into()
    }

    /// Labeled leaf over an external sorted source
    pub fn leaf_labeled<S>(label: impl Into<String>, source: S) -> Self
    where
        S: KeySource<T> + Send + 'static,
    {
        LeafIterator::labeled(label, source).into()
    }

    /// Intersection of `includes` without anything in `excludes`
    pub fn and(includes: Vec<NestedIterator<T>>, excludes: Vec<NestedIterator<T>>) -> Self {
        AndIterator::new(includes, excludes).into()
    }

    /// Union of `includes` and the complements of `excludes`
    pub fn or(includes: Vec<NestedIterator<T>>, excludes: Vec<NestedIterator<T>>) -> Self {
        OrIterator::new(includes, excludes).into()
    }

    // ------------------------------------------------------------------
    // Public protocol
    // ------------------------------------------------------------------

    /// Initializes this node as the root of an enumeration.
    ///
    /// Fails with a fatal configuration error if the tree is deferred:
    /// nothing in it can supply candidates.
    pub fn initialize(&mut self) -> IteratorResult<()> {
        self.initialize_with(&EvaluationConfig::default())
    }

    /// Same as [`initialize`](Self::initialize) with an explicit config
    pub fn initialize_with(&mut self, config: &EvaluationConfig) -> IteratorResult<()> {
        self.ensure_created()?;
        self.prepare(config);

        let leaves = self.leaves().len().to_string();
        if self.deferred() {
            self.state = NodeState::Rejected;
            let tree = self.to_string();
            log_event(
                &self.logger,
                Event::TreeRejected,
                &[("leaves", leaves.as_str()), ("tree", tree.as_str())],
            );
            return Err(IteratorError::no_driving_term(tree));
        }

        log_event(
            &self.logger,
            Event::TreeInitialized,
            &[("leaves", leaves.as_str()), ("mode", self.state.as_str())],
        );
        Ok(())
    }

    /// Initializes this node as the root of a predicate driven from outside
    /// the tree. Works for deferred and enumerable trees alike.
    pub fn initialize_predicate(&mut self) -> IteratorResult<()> {
        self.initialize_predicate_with(&EvaluationConfig::default())
    }

    /// Same as [`initialize_predicate`](Self::initialize_predicate) with an explicit config
    pub fn initialize_predicate_with(&mut self, config: &EvaluationConfig) -> IteratorResult<()> {
        self.ensure_created()?;
        self.prepare(config);
        self.state = NodeState::PredicateOnly;

        let leaves = self.leaves().len().to_string();
        let deferred = self.deferred().to_string();
        log_event(
            &self.logger,
            Event::PredicateInitialized,
            &[("deferred", deferred.as_str()), ("leaves", leaves.as_str())],
        );
        Ok(())
    }

    /// Whether this node can only be used as a membership predicate
    pub fn is_deferred(&self) -> IteratorResult<bool> {
        if self.state == NodeState::Created {
            return Err(self.violation(IteratorError::not_initialized("is_deferred()")));
        }
        Ok(self.deferred())
    }

    /// Returns true if another element is available
    pub fn has_next(&mut self) -> IteratorResult<bool> {
        match self.state {
            NodeState::Created => Err(self.violation(IteratorError::not_initialized("has_next()"))),
            NodeState::PredicateOnly | NodeState::Rejected => {
                Err(self.violation(IteratorError::deferred("has_next()")))
            }
            NodeState::Exhausted => Ok(false),
            NodeState::Enumerating => {
                if self.head().is_some() {
                    self.ready = true;
                    return Ok(true);
                }
                self.finish();
                Ok(false)
            }
        }
    }

    /// Returns the next element. Must follow a has_next() that returned true.
    pub fn next(&mut self) -> IteratorResult<T> {
        match self.state {
            NodeState::Created => Err(self.violation(IteratorError::not_initialized("next()"))),
            NodeState::PredicateOnly | NodeState::Rejected => {
                Err(self.violation(IteratorError::deferred("next()")))
            }
            NodeState::Exhausted => Err(self.violation(IteratorError::exhausted())),
            NodeState::Enumerating => {
                if !self.ready {
                    return Err(self.violation(IteratorError::not_ready()));
                }
                self.ready = false;
                let key = match self.head() {
                    Some(key) => key.clone(),
                    None => return Err(self.violation(IteratorError::exhausted())),
                };
                self.advance();
                self.emitted += 1;
                Ok(key)
            }
        }
    }

    /// Skips ahead to the first element >= target and returns it without
    /// consuming it; the next has_next()/next() pair yields it.
    ///
    /// A target at or below the current element is a no-op.
    pub fn move_to(&mut self, target: &T) -> IteratorResult<Option<T>> {
        match self.state {
            NodeState::Created => Err(self.violation(IteratorError::not_initialized("move_to()"))),
            NodeState::PredicateOnly | NodeState::Rejected => {
                Err(self.violation(IteratorError::deferred("move_to()")))
            }
            NodeState::Exhausted => Ok(None),
            NodeState::Enumerating => {
                let head = self.seek(target).cloned();
                self.ready = head.is_some();
                if head.is_none() {
                    self.finish();
                }
                Ok(head)
            }
        }
    }

    /// Tests a candidate supplied by an outside driver.
    ///
    /// Candidates must be non-decreasing: skip-based children cannot rewind.
    pub fn is_member(&mut self, candidate: &T) -> IteratorResult<bool> {
        match self.state {
            NodeState::Created => {
                Err(self.violation(IteratorError::not_initialized("is_member()")))
            }
            NodeState::PredicateOnly => {
                if let Some(previous) = &self.last_candidate {
                    if candidate < previous {
                        let err = IteratorError::candidate_order(previous, candidate);
                        return Err(self.violation(err));
                    }
                }
                self.last_candidate = Some(candidate.clone());
                Ok(self.contains(candidate))
            }
            _ => Err(self.violation(IteratorError::not_predicate())),
        }
    }

    /// Iterator over the remaining elements
    pub fn keys(&mut self) -> Keys<'_, T> {
        Keys {
            tree: self,
            done: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// The wrapped node
    pub fn node(&self) -> &Node<T> {
        &self.node
    }

    /// Direct children, includes first
    pub fn children(&self) -> Vec<&NestedIterator<T>> {
        match &self.node {
            Node::Leaf(_) => Vec::new(),
            Node::And(node) => node.children().collect(),
            Node::Or(node) => node.children().collect(),
        }
    }

    /// All leaves of this subtree, depth first
    pub fn leaves(&self) -> Vec<&NestedIterator<T>> {
        match &self.node {
            Node::Leaf(_) => vec![self],
            _ => self
                .children()
                .into_iter()
                .flat_map(|child| child.leaves())
                .collect(),
        }
    }

    /// Returns true for leaf nodes
    pub fn is_leaf(&self) -> bool {
        matches!(self.node, Node::Leaf(_))
    }

    /// Counters aggregated over this subtree
    pub fn stats(&self) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot::default();
        let node_stats = match &self.node {
            Node::Leaf(node) => node.stats(),
            Node::And(node) => node.stats(),
            Node::Or(node) => node.stats(),
        };
        snapshot.absorb(node_stats, self.emitted);
        for child in self.children() {
            snapshot.merge(child.stats());
        }
        snapshot
    }

    fn ensure_created(&self) -> IteratorResult<()> {
        if self.state != NodeState::Created {
            return Err(self.violation(IteratorError::already_initialized()));
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.ready = false;
        if self.state != NodeState::Exhausted {
            self.state = NodeState::Exhausted;
            let emitted = self.emitted.to_string();
            log_event(&self.logger, Event::TreeExhausted, &[("emitted", emitted.as_str())]);
        }
    }

    fn violation(&self, err: IteratorError) -> IteratorError {
        log_event(
            &self.logger,
            Event::ProtocolViolation,
            &[
                ("code", err.code().code()),
                ("message", err.message()),
                ("state", self.state.as_str()),
            ],
        );
        err
    }

    // ------------------------------------------------------------------
    // Parent-facing operations
    // ------------------------------------------------------------------

    /// Initializes the subtree and fixes the deferred flag.
    pub(crate) fn prepare(&mut self, config: &EvaluationConfig) {
        self.logger = config.logger();
        match &mut self.node {
            Node::Leaf(node) => node.prepare(),
            Node::And(node) => node.prepare(config),
            Node::Or(node) => node.prepare(config),
        }
        self.state = if self.deferred() {
            NodeState::PredicateOnly
        } else {
            NodeState::Enumerating
        };
    }

    pub(crate) fn deferred(&self) -> bool {
        match &self.node {
            Node::Leaf(_) => false,
            Node::And(node) => node.is_deferred(),
            Node::Or(node) => node.is_deferred(),
        }
    }

    pub(crate) fn head(&self) -> Option<&T> {
        match &self.node {
            Node::Leaf(node) => node.head(),
            Node::And(node) => node.head(),
            Node::Or(node) => node.head(),
        }
    }

    pub(crate) fn advance(&mut self) {
        match &mut self.node {
            Node::Leaf(node) => node.advance(),
            Node::And(node) => node.advance(),
            Node::Or(node) => node.advance(),
        }
    }

    pub(crate) fn seek(&mut self, target: &T) -> Option<&T> {
        match &mut self.node {
            Node::Leaf(node) => node.seek(target),
            Node::And(node) => node.seek(target),
            Node::Or(node) => node.seek(target),
        }
    }

    /// Membership of a candidate; candidates must arrive non-decreasing.
    pub(crate) fn contains(&mut self, candidate: &T) -> bool {
        if !self.deferred() {
            return self.seek(candidate) == Some(candidate);
        }
        match &mut self.node {
            Node::Leaf(_) => false,
            Node::And(node) => node.matches(candidate),
            Node::Or(node) => node.matches(candidate),
        }
    }

    pub(crate) fn size_hint(&self) -> Option<usize> {
        match &self.node {
            Node::Leaf(node) => node.size_hint(),
            Node::And(node) => node.size_hint(),
            Node::Or(node) => node.size_hint(),
        }
    }
}

impl<T: Element> From<LeafIterator<T>> for NestedIterator<T> {
    fn from(node: LeafIterator<T>) -> Self {
        Self::from_node(Node::Leaf(node))
    }
}

impl<T: Element> From<AndIterator<T>> for NestedIterator<T> {
    fn from(node: AndIterator<T>) -> Self {
        Self::from_node(Node::And(node))
    }
}

impl<T: Element> From<OrIterator<T>> for NestedIterator<T> {
    fn from(node: OrIterator<T>) -> Self {
        Self::from_node(Node::Or(node))
    }
}

impl<T: Element> fmt::Display for NestedIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Node::Leaf(node) => write!(f, "{}", node),
            Node::And(node) => write!(f, "{}", node),
            Node::Or(node) => write!(f, "{}", node),
        }
    }
}

impl<T: Element> fmt::Debug for NestedIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedIterator")
            .field("tree", &self.to_string())
            .field("state", &self.state)
            .field("head", &self.head())
            .finish()
    }
}

/// Renders `includes=[..], excludes=[..]`, omitting empty lists.
pub(crate) fn write_children<T: Element>(
    f: &mut fmt::Formatter<'_>,
    includes: &[NestedIterator<T>],
    excludes: &[NestedIterator<T>],
) -> fmt::Result {
    let mut sections = Vec::with_capacity(2);
    if !includes.is_empty() {
        sections.push(("includes", includes));
    }
    if !excludes.is_empty() {
        sections.push(("excludes", excludes));
    }

    for (n, (name, children)) in sections.into_iter().enumerate() {
        if n > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}=[", name)?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", child)?;
        }
        write!(f, "]")?;
    }
    Ok(())
}

/// Iterator adapter over a root's remaining elements.
///
/// Yields an error once and then stops if the protocol is violated.
pub struct Keys<'a, T: Element> {
    tree: &'a mut NestedIterator<T>,
    done: bool,
}

impl<T: Element> Iterator for Keys<'_, T> {
    type Item = IteratorResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.tree.has_next() {
            Ok(true) => {
                let key = self.tree.next();
                self.done = key.is_err();
                Some(key)
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nested::errors::IteratorErrorCode;
    use crate::nested::source::VecSource;

    fn leaf(label: &str, keys: &[&'static str]) -> NestedIterator<&'static str> {
        NestedIterator::leaf_labeled(label, VecSource::new(keys.to_vec()))
    }

    #[test]
    fn test_leaf_protocol() {
        let mut tree = leaf("x", &["a", "b"]);
        assert_eq!(tree.state(), NodeState::Created);
        tree.initialize().unwrap();
        assert_eq!(tree.state(), NodeState::Enumerating);
        assert!(!tree.is_deferred().unwrap());

        assert!(tree.has_next().unwrap());
        assert_eq!(tree.next().unwrap(), "a");
        assert!(tree.has_next().unwrap());
        assert_eq!(tree.next().unwrap(), "b");
        assert!(!tree.has_next().unwrap());
        assert_eq!(tree.state(), NodeState::Exhausted);
    }

    #[test]
    fn test_next_requires_has_next() {
        let mut tree = leaf("x", &["a", "b"]);
        tree.initialize().unwrap();
        let err = tree.next().unwrap_err();
        assert_eq!(err.code(), IteratorErrorCode::AeroIteratorNotReady);

        assert!(tree.has_next().unwrap());
        tree.next().unwrap();
        let err = tree.next().unwrap_err();
        assert_eq!(err.code(), IteratorErrorCode::AeroIteratorNotReady);
    }

    #[test]
    fn test_move_to_does_not_consume() {
        let mut tree = leaf("x", &["a", "c", "e"]);
        tree.initialize().unwrap();
        assert_eq!(tree.move_to(&"b").unwrap(), Some("c"));
        assert_eq!(tree.next().unwrap(), "c");
        assert_eq!(tree.move_to(&"a").unwrap(), Some("e"));
        assert_eq!(tree.move_to(&"f").unwrap(), None);
        assert_eq!(tree.state(), NodeState::Exhausted);
        assert!(!tree.has_next().unwrap());
    }

    #[test]
    fn test_children_and_leaves() {
        let tree = NestedIterator::and(
            vec![
                leaf("x", &["a"]),
                NestedIterator::or(vec![], vec![leaf("y", &["a"]), leaf("z", &["a"])]),
            ],
            vec![leaf("w", &["a"])],
        );
        assert_eq!(tree.children().len(), 3);
        let labels: Vec<String> = tree.leaves().iter().map(|l| l.to_string()).collect();
        assert_eq!(labels, vec!["x", "y", "z", "w"]);
        assert_eq!(
            tree.to_string(),
            "And(includes=[x, Or(excludes=[y, z])], excludes=[w])"
        );
    }

    #[test]
    fn test_keys_adapter() {
        let mut tree = NestedIterator::or(vec![leaf("x", &["b"]), leaf("y", &["a", "b"])], vec![]);
        tree.initialize().unwrap();
        let keys: Vec<&str> = tree.keys().collect::<IteratorResult<_>>().unwrap();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(tree.stats().emitted, 2);
    }

    #[test]
    fn test_keys_adapter_surfaces_misuse_once() {
        let mut tree = leaf("x", &["a"]);
        let mut keys = tree.keys();
        assert!(matches!(keys.next(), Some(Err(_))));
        assert!(keys.next().is_none());
    }
}
