//! Per-node evaluation counters
//!
//! Counters only, monotonic, owned by the node that increments them.
//! A tree is driven by a single thread, so plain integers suffice.

use serde::Serialize;

/// Counters kept by one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NodeStats {
    /// Candidates a composite examined
    pub candidates: u64,
    /// Candidates a composite rejected after all drivers agreed
    pub rejected: u64,
    /// Skip-ahead calls received
    pub seeks: u64,
    /// Keys consumed from an external source, skipped keys included
    /// when the source reports its remaining size
    pub keys_read: u64,
}

/// A point-in-time aggregate of counters over a whole subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub candidates: u64,
    pub rejected: u64,
    pub emitted: u64,
    pub seeks: u64,
    pub keys_read: u64,
    pub nodes: u64,
}

impl StatsSnapshot {
    pub(crate) fn absorb(&mut self, node: &NodeStats, emitted: u64) {
        self.candidates += node.candidates;
        self.rejected += node.rejected;
        self.emitted += emitted;
        self.seeks += node.seeks;
        self.keys_read += node.keys_read;
        self.nodes += 1;
    }

    pub(crate) fn merge(&mut self, other: StatsSnapshot) {
        self.candidates += other.candidates;
        self.rejected += other.rejected;
        self.emitted += other.emitted;
        self.seeks += other.seeks;
        self.keys_read += other.keys_read;
        self.nodes += other.nodes;
    }

    /// Renders the snapshot as a single JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
