//! Nested iterator error types
//!
//! Error codes:
//! - AERO_QUERY_NO_DRIVING_TERM (FATAL, configuration)
//! - AERO_ITERATOR_* (ERROR, protocol misuse)
//!
//! Nothing here is retryable. Every failure is either a tree with no
//! positive driving term or a call sequence the assembler got wrong.

use std::fmt;

/// Severity levels for iterator errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller bug, the tree itself is still consistent
    Error,
    /// The tree can never produce results
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Broad classification of an iterator failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The tree shape cannot be evaluated
    Configuration,
    /// The call sequence violated the iterator protocol
    Misuse,
}

/// Iterator-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorErrorCode {
    /// Root is deferred: no positive term anywhere can supply candidates
    AeroQueryNoDrivingTerm,
    /// A method was called before initialize()
    AeroIteratorNotInitialized,
    /// initialize() was called twice
    AeroIteratorAlreadyInitialized,
    /// has_next()/next() on a node that only supports membership tests
    AeroIteratorDeferred,
    /// next() without a preceding successful has_next()
    AeroIteratorNotReady,
    /// next() after the node ran out of elements
    AeroIteratorExhausted,
    /// is_member() on a node initialized for enumeration
    AeroIteratorNotPredicate,
    /// is_member() candidate below a previous candidate
    AeroIteratorCandidateOrder,
}

impl IteratorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IteratorErrorCode::AeroQueryNoDrivingTerm => "AERO_QUERY_NO_DRIVING_TERM",
            IteratorErrorCode::AeroIteratorNotInitialized => "AERO_ITERATOR_NOT_INITIALIZED",
            IteratorErrorCode::AeroIteratorAlreadyInitialized => {
                "AERO_ITERATOR_ALREADY_INITIALIZED"
            }
            IteratorErrorCode::AeroIteratorDeferred => "AERO_ITERATOR_DEFERRED",
            IteratorErrorCode::AeroIteratorNotReady => "AERO_ITERATOR_NOT_READY",
            IteratorErrorCode::AeroIteratorExhausted => "AERO_ITERATOR_EXHAUSTED",
            IteratorErrorCode::AeroIteratorNotPredicate => "AERO_ITERATOR_NOT_PREDICATE",
            IteratorErrorCode::AeroIteratorCandidateOrder => "AERO_ITERATOR_CANDIDATE_ORDER",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            IteratorErrorCode::AeroQueryNoDrivingTerm => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Returns the error classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            IteratorErrorCode::AeroQueryNoDrivingTerm => ErrorKind::Configuration,
            _ => ErrorKind::Misuse,
        }
    }
}

impl fmt::Display for IteratorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Iterator error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IteratorError {
    code: IteratorErrorCode,
    message: String,
}

impl IteratorError {
    /// Create a configuration error for a deferred root
    pub fn no_driving_term(tree: impl Into<String>) -> Self {
        Self {
            code: IteratorErrorCode::AeroQueryNoDrivingTerm,
            message: format!(
                "expression has no positive term to drive enumeration: {}",
                tree.into()
            ),
        }
    }

    /// Create a not-initialized misuse error
    pub fn not_initialized(operation: &str) -> Self {
        Self::misuse(
            IteratorErrorCode::AeroIteratorNotInitialized,
            format!("{} called before initialize()", operation),
        )
    }

    /// Create an already-initialized misuse error
    pub fn already_initialized() -> Self {
        Self::misuse(
            IteratorErrorCode::AeroIteratorAlreadyInitialized,
            "initialize() must be called exactly once",
        )
    }

    /// Create a deferred-enumeration misuse error
    pub fn deferred(operation: &str) -> Self {
        Self::misuse(
            IteratorErrorCode::AeroIteratorDeferred,
            format!("{} called on a node in predicate-only mode", operation),
        )
    }

    /// Create a next-without-has_next misuse error
    pub fn not_ready() -> Self {
        Self::misuse(
            IteratorErrorCode::AeroIteratorNotReady,
            "next() called without a preceding successful has_next()",
        )
    }

    /// Create an exhausted misuse error
    pub fn exhausted() -> Self {
        Self::misuse(
            IteratorErrorCode::AeroIteratorExhausted,
            "next() called past exhaustion",
        )
    }

    /// Create a not-a-predicate misuse error
    pub fn not_predicate() -> Self {
        Self::misuse(
            IteratorErrorCode::AeroIteratorNotPredicate,
            "is_member() called on a node initialized for enumeration",
        )
    }

    /// Create a candidate-order misuse error
    pub fn candidate_order(previous: impl fmt::Debug, candidate: impl fmt::Debug) -> Self {
        Self::misuse(
            IteratorErrorCode::AeroIteratorCandidateOrder,
            format!(
                "is_member() candidates must not decrease: previous={:?}, candidate={:?}",
                previous, candidate
            ),
        )
    }

    fn misuse(code: IteratorErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IteratorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error classification
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for IteratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for IteratorError {}

/// Result type for iterator operations
pub type IteratorResult<T> = Result<T, IteratorError>;
