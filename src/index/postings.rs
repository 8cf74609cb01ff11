//! Field-value posting index
//!
//! Maps every top-level scalar field of a JSON document to posting lists of
//! document ids. Lookups hand back a `VecSource`, so results plug straight
//! into an iterator tree as leaves.
//!
//! # API
//!
//! - `index_document(id, body)` - Index (or re-index) a document
//! - `remove_document(id)` - Drop a document from every posting list
//! - `postings_eq(field, value)` - Exact match stream
//! - `postings_range(field, min, max)` - Inclusive range stream

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;

use serde_json::Value;

use super::btree::{DocId, IndexKey, IndexTree};
use crate::nested::VecSource;

/// In-memory posting index over JSON documents
#[derive(Debug, Default)]
pub struct PostingIndex {
    /// field -> value -> ids
    fields: BTreeMap<String, IndexTree>,
    /// id -> indexed (field, key) pairs, for removal without the body
    documents: HashMap<DocId, Vec<(String, IndexKey)>>,
    /// Every indexed id, for complements
    all: BTreeSet<DocId>,
}

impl PostingIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes the top-level scalar fields of `body` under `id`.
    ///
    /// Re-indexing an id replaces its previous entries. Arrays, objects and
    /// null values are not indexed.
    pub fn index_document(&mut self, id: DocId, body: &Value) {
        self.remove_document(id);

        let mut entries = Vec::new();
        if let Value::Object(map) = body {
            for (field, value) in map {
                let Some(key) = IndexKey::from_json(value) else {
                    continue;
                };
                self.fields
                    .entry(field.clone())
                    .or_default()
                    .insert(key.clone(), id);
                entries.push((field.clone(), key));
            }
        }

        self.all.insert(id);
        self.documents.insert(id, entries);
    }

    /// Removes a document from every posting list. Unknown ids are ignored.
    ///
    /// A field stays known after its last posting is removed.
    pub fn remove_document(&mut self, id: DocId) {
        let Some(entries) = self.documents.remove(&id) else {
            return;
        };
        for (field, key) in entries {
            if let Some(tree) = self.fields.get_mut(&field) {
                tree.remove(&key, id);
            }
        }
        self.all.remove(&id);
    }

    /// Documents whose `field` equals `value`.
    ///
    /// Returns None if the field was never indexed. A non-scalar value
    /// matches nothing.
    pub fn postings_eq(&self, field: &str, value: &Value) -> Option<VecSource<DocId>> {
        let tree = self.fields.get(field)?;
        let docs = match IndexKey::from_json(value) {
            Some(key) => tree.lookup_eq(&key),
            None => Vec::new(),
        };
        Some(VecSource::from_sorted(docs))
    }

    /// Documents whose `field` lies in `[min, max]`; a missing bound is open.
    ///
    /// Returns None if the field was never indexed.
    pub fn postings_range(
        &self,
        field: &str,
        min: Option<&Value>,
        max: Option<&Value>,
    ) -> Option<VecSource<DocId>> {
        let tree = self.fields.get(field)?;
        let min_key = min.and_then(IndexKey::from_json);
        let max_key = max.and_then(IndexKey::from_json);

        let docs = tree.lookup_range(
            min_key.as_ref().map_or(Bound::Unbounded, Bound::Included),
            max_key.as_ref().map_or(Bound::Unbounded, Bound::Included),
        );
        Some(VecSource::from_sorted(docs))
    }

    /// Every indexed document
    pub fn all_documents(&self) -> VecSource<DocId> {
        VecSource::from_sorted(self.all.iter().copied().collect())
    }

    /// Whether `field` has ever been indexed
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Indexed field names in ascending order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of indexed documents
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}
