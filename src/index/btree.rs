//! BTreeMap-backed posting lists
//!
//! Each distinct field value maps to the ascending list of document ids
//! carrying it. Posting lists are the leaf streams of an iterator tree, so
//! they are kept strictly ascending and duplicate-free at all times.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

/// Document identifier stored in posting lists
pub type DocId = u64;

/// Totally ordered field value.
///
/// Ordering across kinds is fixed: Bool < Number < String. Numbers compare
/// by value whether they are stored as `Int` or `Float`; a float with an
/// exact integer value is always stored as `Int`, so each number has exactly
/// one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value, including integral floats in i64 range
    Int(i64),
    /// Any other float, bit-mapped so integer order matches numeric order
    Float(u64),
    /// String value
    String(String),
}

/// 2^63 as f64, the first float above the i64 range
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl IndexKey {
    /// Create a key from a float
    pub fn from_float(v: f64) -> Self {
        if v.fract() == 0.0 && v >= -I64_LIMIT && v < I64_LIMIT {
            return IndexKey::Int(v as i64);
        }
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        IndexKey::Float(ordered)
    }

    /// Create a key from a JSON scalar. Arrays, objects and null have no key.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(IndexKey::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(IndexKey::Int(i)),
                None => n.as_f64().map(IndexKey::from_float),
            },
            serde_json::Value::String(s) => Some(IndexKey::String(s.clone())),
            _ => None,
        }
    }

    fn float_value(bits: u64) -> f64 {
        let raw = if (bits >> 63) == 1 {
            bits ^ (1 << 63)
        } else {
            !bits
        };
        f64::from_bits(raw)
    }

    fn kind_rank(&self) -> u8 {
        match self {
            IndexKey::Bool(_) => 0,
            IndexKey::Int(_) | IndexKey::Float(_) => 1,
            IndexKey::String(_) => 2,
        }
    }
}

/// Orders an integer against a float that is never integral in i64 range.
fn cmp_int_float(int: i64, bits: u64) -> Ordering {
    let float = IndexKey::float_value(bits);
    match (int as f64).total_cmp(&float) {
        // only reachable when the float lies outside the i64 range
        Ordering::Equal if float.is_sign_negative() => Ordering::Greater,
        Ordering::Equal => Ordering::Less,
        other => other,
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexKey::Bool(a), IndexKey::Bool(b)) => a.cmp(b),
            (IndexKey::Int(a), IndexKey::Int(b)) => a.cmp(b),
            (IndexKey::Float(a), IndexKey::Float(b)) => a.cmp(b),
            (IndexKey::Int(a), IndexKey::Float(b)) => cmp_int_float(*a, *b),
            (IndexKey::Float(a), IndexKey::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (IndexKey::String(a), IndexKey::String(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Bool(b) => write!(f, "{}", b),
            IndexKey::Int(i) => write!(f, "{}", i),
            IndexKey::Float(bits) => write!(f, "{}", IndexKey::float_value(*bits)),
            IndexKey::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Posting lists for one field
#[derive(Debug, Default, Clone)]
pub struct IndexTree {
    tree: BTreeMap<IndexKey, Vec<DocId>>,
}

impl IndexTree {
    /// Creates an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document to the posting list of `key`
    pub fn insert(&mut self, key: IndexKey, doc: DocId) {
        let postings = self.tree.entry(key).or_default();
        if let Err(pos) = postings.binary_search(&doc) {
            postings.insert(pos, doc);
        }
    }

    /// Removes a document from the posting list of `key`, dropping empty lists
    pub fn remove(&mut self, key: &IndexKey, doc: DocId) {
        if let Some(postings) = self.tree.get_mut(key) {
            if let Ok(pos) = postings.binary_search(&doc) {
                postings.remove(pos);
            }
            if postings.is_empty() {
                self.tree.remove(key);
            }
        }
    }

    /// Posting list for an exact value
    pub fn lookup_eq(&self, key: &IndexKey) -> Vec<DocId> {
        self.tree.get(key).cloned().unwrap_or_default()
    }

    /// Union of the posting lists of every value inside the bounds.
    ///
    /// The result is sorted and deduplicated, ready to back a leaf.
    pub fn lookup_range(&self, min: Bound<&IndexKey>, max: Bound<&IndexKey>) -> Vec<DocId> {
        let lo = match min {
            Bound::Included(key) | Bound::Excluded(key) => Some(key),
            Bound::Unbounded => None,
        };
        let hi = match max {
            Bound::Included(key) | Bound::Excluded(key) => Some(key),
            Bound::Unbounded => None,
        };
        if let (Some(lo), Some(hi)) = (lo, hi) {
            let excluded = matches!(min, Bound::Excluded(_)) || matches!(max, Bound::Excluded(_));
            // BTreeMap::range panics on inverted bounds
            if lo > hi || (lo == hi && excluded) {
                return Vec::new();
            }
        }

        let mut docs: Vec<DocId> = self
            .tree
            .range((min, max))
            .flat_map(|(_, postings)| postings.iter().copied())
            .collect();
        docs.sort_unstable();
        docs.dedup();
        docs
    }

    /// Number of distinct values
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Total number of postings
    pub fn posting_count(&self) -> usize {
        self.tree.values().map(Vec::len).sum()
    }
}
