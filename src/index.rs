//! In-memory index: tracking key -> append-only entry sequence.
//!
//! Keys are spread over `DashMap` shards. Appends to the same key serialize on that key's
//! shard lock; appends to keys in different shards proceed in parallel. Reads take the shard
//! read lock only long enough to clone the sequence out.

use crate::entry::JournalEntry;
use crate::snapshot::JournalSnapshot;
use dashmap::DashMap;
use std::collections::BTreeMap;

/// Whether `key` is empty or whitespace-only, i.e. "no tracking requested".
pub fn is_blank_key(key: &str) -> bool {
    key.trim().is_empty()
}

/// Concurrent map from tracking key to its entries in insertion order.
///
/// Invariant: every key present has at least one entry.
#[derive(Debug, Default)]
pub struct JournalIndex {
    keys: DashMap<String, Vec<JournalEntry>>,
}

impl JournalIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index holding exactly the contents of `snapshot`.
    pub fn from_snapshot(snapshot: JournalSnapshot) -> Self {
        let map = snapshot.into_inner();
        let keys = DashMap::with_capacity(map.len());
        for (key, entries) in map {
            if is_blank_key(&key) || entries.is_empty() {
                continue;
            }
            keys.insert(key, entries);
        }
        Self { keys }
    }

    /// Append `entry` to the end of `key`'s sequence, creating it on first use.
    ///
    /// Returns `false` (and drops the entry) when `key` is blank.
    pub fn append(&self, key: &str, entry: JournalEntry) -> bool {
        if is_blank_key(key) {
            return false;
        }
        if let Some(mut seq) = self.keys.get_mut(key) {
            seq.push(entry);
            return true;
        }
        self.keys.entry(key.to_owned()).or_default().push(entry);
        true
    }

    /// Copy of `key`'s entries in insertion order; empty for unknown keys.
    pub fn entries(&self, key: &str) -> Vec<JournalEntry> {
        self.keys
            .get(key)
            .map(|seq| seq.value().clone())
            .unwrap_or_default()
    }

    /// Whether `key` has at least one entry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Number of keys with entries.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Total number of entries across all keys.
    pub fn entry_count(&self) -> usize {
        self.keys.iter().map(|seq| seq.value().len()).sum()
    }

    /// Copy of every key and entry.
    ///
    /// Shards are visited one at a time, so an append racing with this call may or may not
    /// be included. Every append that returned before the call started is included.
    pub fn snapshot(&self) -> JournalSnapshot {
        let map: BTreeMap<String, Vec<JournalEntry>> = self
            .keys
            .iter()
            .map(|seq| (seq.key().clone(), seq.value().clone()))
            .collect();
        JournalSnapshot::from(map)
    }
}
