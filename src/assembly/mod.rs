//! Tree assembly
//!
//! Turns a pre-parsed `QueryExpr` into an uninitialized `NestedIterator`
//! whose leaves are posting lists from a `PostingIndex`.

mod assembler;
mod errors;
mod expr;

pub use assembler::TreeAssembler;
pub use errors::{AssemblyError, AssemblyResult};
pub use expr::QueryExpr;
