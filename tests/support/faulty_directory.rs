//! Filesystem-backed `Directory` wrapper with targeted fault injection.
//!
//! Important: this file lives under `tests/support/` so it is **not** compiled as a standalone
//! integration test target.

use calc_journal::storage::{Directory, FsDirectory};
use calc_journal::JournalResult;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Fault-injection configuration for snapshot saves.
#[derive(Default)]
pub struct FaultConfig {
    /// Fail `atomic_write` before touching the target (disk full, permission denied).
    pub fail_atomic_write: bool,
    /// Leave a torn temp file behind, then fail instead of renaming.
    pub tear_temp_write: bool,
    /// Count of `atomic_write` calls attempted.
    pub write_calls: usize,
    /// Peak number of `atomic_write` calls in flight at once.
    pub max_concurrent_writes: usize,
    /// `exists` answers true even for a missing path, as if the file vanished right after the
    /// check.
    pub report_missing_as_present: bool,
    in_flight: usize,
}

/// A filesystem-backed `Directory` wrapper with targeted fault injection.
pub struct FaultyDirectory {
    inner: FsDirectory,
    cfg: Arc<Mutex<FaultConfig>>,
}

impl FaultyDirectory {
    /// Wrap an existing `FsDirectory`.
    pub fn new(inner: FsDirectory) -> Self {
        Self {
            inner,
            cfg: Arc::new(Mutex::new(FaultConfig::default())),
        }
    }

    /// Access the shared fault config (for toggling failpoints and reading counters).
    pub fn cfg(&self) -> Arc<Mutex<FaultConfig>> {
        self.cfg.clone()
    }
}

impl Directory for FaultyDirectory {
    fn create_file(&self, path: &str) -> JournalResult<Box<dyn io::Write>> {
        self.inner.create_file(path)
    }

    fn open_file(&self, path: &str) -> JournalResult<Box<dyn io::Read>> {
        self.inner.open_file(path)
    }

    fn exists(&self, path: &str) -> bool {
        if self.cfg.lock().unwrap().report_missing_as_present {
            return true;
        }
        self.inner.exists(path)
    }

    fn delete(&self, path: &str) -> JournalResult<()> {
        self.inner.delete(path)
    }

    fn atomic_rename(&self, from: &str, to: &str) -> JournalResult<()> {
        self.inner.atomic_rename(from, to)
    }

    fn atomic_write(&self, path: &str, data: &[u8]) -> JournalResult<()> {
        let (fail, tear) = {
            let mut cfg = self.cfg.lock().unwrap();
            cfg.write_calls += 1;
            cfg.in_flight += 1;
            cfg.max_concurrent_writes = cfg.max_concurrent_writes.max(cfg.in_flight);
            (cfg.fail_atomic_write, cfg.tear_temp_write)
        };

        let result = if fail {
            Err(io::Error::new(io::ErrorKind::Other, "injected write failure").into())
        } else if tear {
            let mut w = self.inner.create_file(&format!("{path}.tmp"));
            if let Ok(w) = w.as_mut() {
                let _ = w.write_all(&data[..data.len() / 2]);
            }
            Err(io::Error::new(io::ErrorKind::Other, "injected crash before rename").into())
        } else {
            // Widen the window so overlapping saves would be observed.
            std::thread::sleep(std::time::Duration::from_micros(200));
            self.inner.atomic_write(path, data)
        };

        self.cfg.lock().unwrap().in_flight -= 1;
        result
    }

    fn file_path(&self, path: &str) -> Option<std::path::PathBuf> {
        self.inner.file_path(path)
    }
}
