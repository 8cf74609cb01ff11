//! Observable lifecycle events of an iterator tree
//!
//! Events are explicit and typed. None of them fire per element.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Root initialized for enumeration
    TreeInitialized,
    /// Root initialized for membership testing by an outside driver
    PredicateInitialized,
    /// Root rejected at initialization (FATAL)
    TreeRejected,
    /// Root ran out of elements
    TreeExhausted,
    /// A call violated the iterator protocol
    ProtocolViolation,
    /// A tree was built from an expression
    TreeAssembled,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::TreeInitialized => "TREE_INITIALIZED",
            Event::PredicateInitialized => "PREDICATE_INITIALIZED",
            Event::TreeRejected => "TREE_REJECTED",
            Event::TreeExhausted => "TREE_EXHAUSTED",
            Event::ProtocolViolation => "PROTOCOL_VIOLATION",
            Event::TreeAssembled => "TREE_ASSEMBLED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::TreeInitialized | Event::PredicateInitialized => Severity::Info,
            Event::TreeExhausted | Event::TreeAssembled => Severity::Trace,
            Event::ProtocolViolation => Severity::Warn,
            Event::TreeRejected => Severity::Fatal,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
