//! The journal store: concurrent in-memory index plus save-on-every-append persistence.
//!
//! Availability over durability: a failed save never fails [`JournalStore::append`]. The
//! entry stays in memory, the failure is logged at `warn`, and it is recorded in
//! [`SaveStatus`] so callers and tests can observe it. Use [`JournalStore::try_append`] or
//! [`JournalStore::persist`] to get the save error as a value.
//!
//! Saves are synchronous: `append` returns after its snapshot has been published (or has
//! failed). Per-key history is unbounded; every save rewrites all of it.

use crate::config::{JournalConfig, SyncPolicy};
use crate::entry::JournalEntry;
use crate::error::JournalResult;
use crate::index::JournalIndex;
use crate::snapshot::{LoadOutcome, SaveReport, SnapshotFile};
use crate::storage::{Directory, FsDirectory};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

/// Outcome of [`JournalStore::try_append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Blank tracking key: nothing was recorded.
    Skipped,
    /// Entry recorded and the journal saved.
    Persisted(SaveReport),
}

/// Counters and last error of the save path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveStatus {
    /// Successful saves since the store was opened.
    pub saves_ok: u64,
    /// Failed saves since the store was opened.
    pub saves_failed: u64,
    /// Message of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
    /// The most recent save failed, so the file may lag the in-memory journal.
    pub dirty: bool,
}

/// Per-client calculation journal backed by a snapshot file.
///
/// Share it between threads with `Arc<JournalStore>`; every method takes `&self`.
pub struct JournalStore {
    index: JournalIndex,
    file: SnapshotFile,
    save_lock: Mutex<()>,
    status: Mutex<SaveStatus>,
    load_outcome: LoadOutcome,
}

impl JournalStore {
    /// Open the journal file named by `config`, loading whatever it holds.
    ///
    /// Fails only if the file's parent directory cannot be created; a missing, unreadable
    /// or corrupt journal file yields an empty store (see [`JournalStore::load_outcome`]).
    pub fn open(config: JournalConfig) -> JournalResult<Self> {
        let (root, name) = config.split()?;
        let dir: Arc<dyn Directory> = Arc::new(FsDirectory::new(root)?);
        Ok(Self::with_directory(dir, name, config.sync))
    }

    /// Open the journal stored at `path` inside any `Directory` backend.
    pub fn with_directory(
        dir: impl Into<Arc<dyn Directory>>,
        path: impl Into<String>,
        sync: SyncPolicy,
    ) -> Self {
        let file = SnapshotFile::new(dir, path, sync);
        let (snapshot, load_outcome) = file.load();
        Self {
            index: JournalIndex::from_snapshot(snapshot),
            file,
            save_lock: Mutex::new(()),
            status: Mutex::new(SaveStatus::default()),
            load_outcome,
        }
    }

    /// Record `entry` under `key` and save the journal.
    ///
    /// Blank keys are a silent no-op. Save failures are swallowed (see module docs).
    pub fn append(&self, key: &str, entry: JournalEntry) {
        if let Err(e) = self.try_append(key, entry) {
            warn!(
                key,
                path = self.file.path(),
                error = %e,
                "journal save failed; entry kept in memory only"
            );
        }
    }

    /// Like [`JournalStore::append`], but returns the save error.
    ///
    /// On `Err` the entry is still recorded in memory; only the save failed.
    pub fn try_append(&self, key: &str, entry: JournalEntry) -> JournalResult<AppendOutcome> {
        if !self.index.append(key, entry) {
            return Ok(AppendOutcome::Skipped);
        }
        self.persist().map(AppendOutcome::Persisted)
    }

    /// All entries recorded under `key`, oldest first. Empty for unknown or blank keys.
    ///
    /// Served from memory; never touches the file.
    pub fn query(&self, key: &str) -> Vec<JournalEntry> {
        self.index.entries(key)
    }

    /// Snapshot the whole journal and atomically replace the file with it.
    ///
    /// Called by every append; call it directly to retry after a failed save.
    pub fn persist(&self) -> JournalResult<SaveReport> {
        let _guard = self.save_lock.lock();
        // Snapshot under the save lock so a slower save never publishes an older view over
        // a newer one.
        let snapshot = self.index.snapshot();
        let result = self.file.write(&snapshot);

        let mut status = self.status.lock();
        match &result {
            Ok(_) => {
                status.saves_ok += 1;
                status.last_error = None;
                status.dirty = false;
            }
            Err(e) => {
                status.saves_failed += 1;
                status.last_error = Some(e.to_string());
                status.dirty = true;
            }
        }
        result
    }

    /// Current save counters.
    pub fn save_status(&self) -> SaveStatus {
        self.status.lock().clone()
    }

    /// How the journal file was handled when the store was opened.
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Path of the journal file within its directory.
    pub fn path(&self) -> &str {
        self.file.path()
    }

    /// Number of tracking keys with entries.
    pub fn key_count(&self) -> usize {
        self.index.key_count()
    }

    /// Total number of entries across all keys.
    pub fn entry_count(&self) -> usize {
        self.index.entry_count()
    }
}
