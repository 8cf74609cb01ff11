//! Pre-parsed boolean expressions over indexed fields
//!
//! Expressions arrive already structured (usually as JSON); there is no
//! text syntax.
//!
//! ```json
//! {"and": [
//!     {"eq": {"field": "status", "value": "active"}},
//!     {"not": {"range": {"field": "age", "min": 18, "max": 20}}}
//! ]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boolean expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryExpr {
    /// field == value
    Eq {
        /// Field name
        field: String,
        /// Scalar to match
        value: Value,
    },
    /// min <= field <= max, a missing bound is open
    Range {
        /// Field name
        field: String,
        /// Inclusive lower bound
        #[serde(default)]
        min: Option<Value>,
        /// Inclusive upper bound
        #[serde(default)]
        max: Option<Value>,
    },
    /// Every operand holds
    And(Vec<QueryExpr>),
    /// At least one operand holds
    Or(Vec<QueryExpr>),
    /// Operand does not hold
    Not(Box<QueryExpr>),
}

impl QueryExpr {
    /// Equality predicate
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        QueryExpr::Eq {
            field: field.into(),
            value,
        }
    }

    /// Inclusive range predicate
    pub fn range(field: impl Into<String>, min: Option<Value>, max: Option<Value>) -> Self {
        QueryExpr::Range {
            field: field.into(),
            min,
            max,
        }
    }

    /// Conjunction
    pub fn and(operands: Vec<QueryExpr>) -> Self {
        QueryExpr::And(operands)
    }

    /// Disjunction
    pub fn or(operands: Vec<QueryExpr>) -> Self {
        QueryExpr::Or(operands)
    }

    /// Negation
    pub fn negate(operand: QueryExpr) -> Self {
        QueryExpr::Not(Box::new(operand))
    }

    /// Parses an expression from JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Strips leading negations.
    ///
    /// Returns the innermost non-negated expression and whether an odd
    /// number of negations was removed.
    pub fn strip_negation(&self) -> (bool, &QueryExpr) {
        let mut negated = false;
        let mut expr = self;
        while let QueryExpr::Not(inner) = expr {
            negated = !negated;
            expr = inner;
        }
        (negated, expr)
    }
}
