//! Store configuration.
//!
//! The only required input is the journal file path. Nothing here reads the environment or
//! searches for files; callers decide where the journal lives.

use crate::error::{JournalError, JournalResult};
use std::path::{Path, PathBuf};

/// How hard a snapshot save pushes bytes toward stable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// `Directory::atomic_write`: temp file + rename. Readers never observe a partial file.
    #[default]
    Atomic,
    /// `DurableDirectory::atomic_write_durable`: additionally syncs the temp file and the
    /// parent directory, so a successful save survives power loss.
    ///
    /// Requires a filesystem-backed `Directory`; other backends fail every save with
    /// `NotSupported`.
    Durable,
}

/// Configuration for [`crate::JournalStore::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
    /// File the journal is loaded from and saved to.
    pub path: PathBuf,
    /// Save strength.
    pub sync: SyncPolicy,
}

impl JournalConfig {
    /// Configuration for the journal file at `path` with default settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync: SyncPolicy::default(),
        }
    }

    /// Override the sync policy.
    pub fn with_sync(mut self, sync: SyncPolicy) -> Self {
        self.sync = sync;
        self
    }

    /// Split `path` into (directory, file name). A bare file name lives in `.`.
    pub fn split(&self) -> JournalResult<(PathBuf, String)> {
        let Some(name) = self.path.file_name().and_then(|n| n.to_str()) else {
            return Err(JournalError::InvalidConfig(format!(
                "journal path has no usable file name: {:?}",
                self.path
            )));
        };
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };
        Ok((parent, name.to_string()))
    }
}
