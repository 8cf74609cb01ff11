//! Assembly errors

use thiserror::Error;

/// Result type for tree assembly
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Errors raised while turning an expression into an iterator tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    /// Field was never indexed
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Comparison value is not a scalar
    #[error("Unsupported value for field {field}: {value}")]
    UnsupportedValue {
        /// Field being compared
        field: String,
        /// Offending value, rendered as JSON
        value: String,
    },

    /// And / Or with no operands
    #[error("Empty {0} expression")]
    EmptyComposite(&'static str),
}
