use crate::query::Query;
use bytes::Bytes;
use std::collections::HashMap;

/// Raw payloads keyed by query identity.
///
/// Entries never expire and are never evicted; the cache lives exactly as
/// long as the dispatcher that owns it.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: HashMap<Query, Bytes>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query: &Query) -> Option<&Bytes> {
        self.entries.get(query)
    }

    pub fn contains(&self, query: &Query) -> bool {
        self.entries.contains_key(query)
    }

    /// Stores `payload`, replacing any entry with the same rendered string.
    pub fn insert(&mut self, query: Query, payload: Bytes) {
        self.entries.insert(query, payload);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
