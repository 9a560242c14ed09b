//! Journal snapshot file (one JSON document holding every key).
//!
//! Every save rewrites the whole journal. There is no incremental log; the file is always a
//! complete, self-contained snapshot.
//!
//! ## Public invariants (other tooling reads this file directly)
//!
//! - **Shape**: a JSON object mapping tracking key to an array of entries, each entry an
//!   object with `operation` (string), `calculation` (string) and `timestamp` (RFC 3339 UTC).
//! - **Key order**: keys are written sorted; entry arrays keep insertion order.
//! - **No empty keys**: a key is present only if it has at least one entry, and never blank.
//! - **Unique keys**: each tracking key appears once.
//! - **Atomicity**: `SnapshotFile` writes via `Directory::atomic_write` (or the durable
//!   variant), so the target path always holds a complete document.
//!
//! Loading is all-or-nothing: a document that fails to parse or breaks one of the invariants
//! above is discarded as a whole.

use crate::config::SyncPolicy;
use crate::entry::JournalEntry;
use crate::error::{JournalError, JournalResult};
use crate::index::is_blank_key;
use crate::storage::{self, Directory, DurableDirectory};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{BTreeMap, Entry};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Point-in-time copy of the whole journal, in its on-disk shape.
///
/// Deserializing rejects a document that names the same tracking key twice; a plain map
/// would silently keep only the last list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct JournalSnapshot(BTreeMap<String, Vec<JournalEntry>>);

impl<'de> Deserialize<'de> for JournalSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SnapshotVisitor)
    }
}

struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = JournalSnapshot;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from tracking key to a list of journal entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = BTreeMap::new();
        while let Some((key, entries)) = access.next_entry::<String, Vec<JournalEntry>>()? {
            match map.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(entries);
                }
                Entry::Occupied(slot) => {
                    return Err(de::Error::custom(format!(
                        "duplicate tracking key {:?}",
                        slot.key()
                    )));
                }
            }
        }
        Ok(JournalSnapshot(map))
    }
}

impl JournalSnapshot {
    /// Number of keys.
    pub fn key_count(&self) -> usize {
        self.0.len()
    }

    /// Total number of entries.
    pub fn entry_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Whether the snapshot holds no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, Vec<JournalEntry>> {
        self.0
    }

    /// Check the document invariants: no blank keys, no empty entry lists.
    pub fn validate(&self) -> JournalResult<()> {
        for (key, entries) in &self.0 {
            if is_blank_key(key) {
                return Err(JournalError::Format(format!(
                    "blank tracking key {key:?} in snapshot"
                )));
            }
            if entries.is_empty() {
                return Err(JournalError::Format(format!(
                    "tracking key {key:?} has no entries"
                )));
            }
        }
        Ok(())
    }

    /// Serialize to the on-disk JSON form.
    pub fn encode(&self) -> JournalResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| JournalError::Encode(e.to_string()))
    }

    /// Parse and validate the on-disk JSON form.
    pub fn decode(bytes: &[u8]) -> JournalResult<Self> {
        let snapshot: Self =
            serde_json::from_slice(bytes).map_err(|e| JournalError::Decode(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

impl From<BTreeMap<String, Vec<JournalEntry>>> for JournalSnapshot {
    fn from(map: BTreeMap<String, Vec<JournalEntry>>) -> Self {
        Self(map)
    }
}

/// What happened when the journal file was loaded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file at the configured path; started empty.
    Missing,
    /// File parsed and loaded.
    Loaded {
        /// Keys loaded.
        keys: usize,
        /// Entries loaded across all keys.
        entries: usize,
    },
    /// File existed but could not be read or parsed; started empty.
    Discarded {
        /// Why the content was rejected.
        reason: String,
    },
}

/// Result of one successful snapshot save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Path the snapshot was published to.
    pub path: String,
    /// Keys written.
    pub keys: usize,
    /// Entries written.
    pub entries: usize,
    /// Size of the published document.
    pub bytes: usize,
}

/// Read/write the journal snapshot at one path of a `Directory`.
pub struct SnapshotFile {
    dir: Arc<dyn Directory>,
    path: String,
    sync: SyncPolicy,
}

impl SnapshotFile {
    /// Snapshot file at `path` inside `dir`.
    pub fn new(
        dir: impl Into<Arc<dyn Directory>>,
        path: impl Into<String>,
        sync: SyncPolicy,
    ) -> Self {
        Self {
            dir: dir.into(),
            path: path.into(),
            sync,
        }
    }

    /// Path of the snapshot within its directory.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Encode `snapshot` and atomically replace the file with it.
    ///
    /// On error the previous file (if any) is left untouched.
    pub fn write(&self, snapshot: &JournalSnapshot) -> JournalResult<SaveReport> {
        let bytes = snapshot.encode()?;
        match self.sync {
            SyncPolicy::Atomic => self.dir.atomic_write(&self.path, &bytes)?,
            SyncPolicy::Durable => self.dir.atomic_write_durable(&self.path, &bytes)?,
        }
        let report = SaveReport {
            path: self.path.clone(),
            keys: snapshot.key_count(),
            entries: snapshot.entry_count(),
            bytes: bytes.len(),
        };
        debug!(
            path = %report.path,
            keys = report.keys,
            entries = report.entries,
            bytes = report.bytes,
            "journal snapshot saved"
        );
        Ok(report)
    }

    /// Read and decode the file. `Ok(None)` when nothing has been saved yet.
    pub fn read(&self) -> JournalResult<Option<JournalSnapshot>> {
        if !self.dir.exists(&self.path) {
            return Ok(None);
        }
        let bytes = match storage::read_all(&*self.dir, &self.path) {
            Ok(bytes) => bytes,
            // Deleted between the existence check and the open.
            Err(e) if e.is_missing() => return Ok(None),
            Err(e) => return Err(e),
        };
        JournalSnapshot::decode(&bytes).map(Some)
    }

    /// Load the startup state. Never fails: unreadable or malformed content yields an empty
    /// snapshot, with the reason reported in the [`LoadOutcome`].
    pub fn load(&self) -> (JournalSnapshot, LoadOutcome) {
        match self.read() {
            Ok(None) => {
                info!(path = %self.path, "no journal file; starting empty");
                (JournalSnapshot::default(), LoadOutcome::Missing)
            }
            Ok(Some(snapshot)) => {
                let outcome = LoadOutcome::Loaded {
                    keys: snapshot.key_count(),
                    entries: snapshot.entry_count(),
                };
                info!(
                    path = %self.path,
                    keys = snapshot.key_count(),
                    entries = snapshot.entry_count(),
                    "journal loaded"
                );
                (snapshot, outcome)
            }
            Err(e) => {
                warn!(path = %self.path, error = %e, "journal file unusable; starting empty");
                (
                    JournalSnapshot::default(),
                    LoadOutcome::Discarded {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }
}
