//! Posting index subsystem
//!
//! Field values of JSON documents mapped to ascending document ids. The
//! posting lists are the leaf streams that iterator trees run over.
//!
//! # Invariants
//!
//! - Posting lists are strictly ascending, no duplicate ids
//! - Deterministic: BTreeMap iteration order
//! - Range lookups merge lists into one sorted, deduplicated stream

mod btree;
mod postings;

pub use btree::{DocId, IndexKey, IndexTree};
pub use postings::PostingIndex;
