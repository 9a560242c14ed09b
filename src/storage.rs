//! Storage abstraction for the journal file.
//!
//! Vocabulary note:
//! - Snapshot publishing requires **atomicity**: a reader of the target path sees either the
//!   old bytes or the new bytes, never a prefix of the new ones. `atomic_write` provides this
//!   by writing a sibling temp file and renaming it over the target.
//! - Stable-storage **durability** (survives power loss after reporting success)
//!   additionally requires explicit `fsync`/`sync_all` barriers and a parent-directory sync
//!   after the rename. See [`DurableDirectory`].

use crate::error::{JournalError, JournalResult};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Suffix of the sibling file a snapshot is staged in before the rename.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Sibling temp path used while publishing `path`.
pub fn temp_path(path: &str) -> String {
    format!("{path}{TEMP_SUFFIX}")
}

/// Attempt to `fsync`/`sync_all` the file at `path`.
///
/// Requires a `Directory` backend that exposes `file_path()`; other backends get
/// `NotSupported`. This does **not** sync the parent directory.
pub fn sync_file<D: Directory + ?Sized>(dir: &D, path: &str) -> JournalResult<()> {
    let Some(p) = dir.file_path(path) else {
        return Err(JournalError::NotSupported(
            "sync_file requires Directory::file_path()".into(),
        ));
    };
    let f = std::fs::OpenOptions::new().read(true).open(&p)?;
    f.sync_all()?;
    Ok(())
}

/// Attempt to `fsync`/`sync_all` the parent directory of `path`.
///
/// This is what makes a rename durable on most filesystems.
pub fn sync_parent_dir<D: Directory + ?Sized>(dir: &D, path: &str) -> JournalResult<()> {
    let Some(p) = dir.file_path(path) else {
        return Err(JournalError::NotSupported(
            "sync_parent_dir requires Directory::file_path()".into(),
        ));
    };
    let Some(parent) = p.parent() else {
        return Err(JournalError::InvalidConfig(format!(
            "path has no parent directory: {p:?}"
        )));
    };
    let f = std::fs::File::open(parent)?;
    f.sync_all()?;
    Ok(())
}

/// Read the whole file at `path`.
pub fn read_all<D: Directory + ?Sized>(dir: &D, path: &str) -> JournalResult<Vec<u8>> {
    let mut r = dir.open_file(path)?;
    let mut buf = Vec::new();
    r.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Trait for directory-like storage backends.
pub trait Directory: Send + Sync {
    /// Create a new file for writing (overwriting if it exists).
    fn create_file(&self, path: &str) -> JournalResult<Box<dyn Write>>;
    /// Open an existing file for reading.
    fn open_file(&self, path: &str) -> JournalResult<Box<dyn Read>>;
    /// Return whether a path exists.
    fn exists(&self, path: &str) -> bool;
    /// Delete a file. Deleting a missing file is not an error.
    fn delete(&self, path: &str) -> JournalResult<()>;
    /// Atomically rename/move a file, replacing the destination.
    fn atomic_rename(&self, from: &str, to: &str) -> JournalResult<()>;
    /// Atomically replace the contents of `path` with `data`.
    fn atomic_write(&self, path: &str, data: &[u8]) -> JournalResult<()>;
    /// Optional filesystem path for backends that support it.
    fn file_path(&self, path: &str) -> Option<PathBuf>;
}

/// Opt-in stable-storage durability operations for a `Directory`.
///
/// Default implementations use [`sync_file`] / [`sync_parent_dir`], which require
/// `Directory::file_path()`. For non-filesystem backends, these return `NotSupported`.
pub trait DurableDirectory: Directory {
    /// Attempt to make the file at `path` durable on stable storage.
    fn sync_file(&self, path: &str) -> JournalResult<()> {
        sync_file(self, path)
    }

    /// Attempt to make the *name* of `path` durable (sync the parent directory).
    fn sync_parent_dir(&self, path: &str) -> JournalResult<()> {
        sync_parent_dir(self, path)
    }

    /// Atomically rename and then sync the destination parent directory.
    fn atomic_rename_durable(&self, from: &str, to: &str) -> JournalResult<()> {
        let (Some(from_path), Some(to_path)) = (self.file_path(from), self.file_path(to)) else {
            return Err(JournalError::NotSupported(
                "atomic_rename_durable requires Directory::file_path()".into(),
            ));
        };

        self.atomic_rename(from, to)?;
        if from_path.parent() != to_path.parent() {
            self.sync_parent_dir(from)?;
        }
        self.sync_parent_dir(to)?;
        Ok(())
    }

    /// Atomically write bytes to `path` with explicit durability barriers.
    ///
    /// - write temp file
    /// - `sync_file(temp)`
    /// - atomic rename temp -> final
    /// - `sync_parent_dir(final)`
    ///
    /// On any failure the temp file is removed and the previous contents of `path` stay in place.
    fn atomic_write_durable(&self, path: &str, data: &[u8]) -> JournalResult<()> {
        if self.file_path(path).is_none() {
            return Err(JournalError::NotSupported(
                "atomic_write_durable requires Directory::file_path()".into(),
            ));
        }

        let tmp = temp_path(path);
        let staged = (|| -> JournalResult<()> {
            let mut w = self.create_file(&tmp)?;
            w.write_all(data)?;
            w.flush()?;
            drop(w);
            self.sync_file(&tmp)?;
            self.atomic_rename_durable(&tmp, path)
        })();
        if let Err(e) = staged {
            let _ = self.delete(&tmp);
            return Err(e);
        }
        Ok(())
    }
}

impl<T: Directory + ?Sized> DurableDirectory for T {}

/// Filesystem-backed `Directory` rooted at a local path.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    root: PathBuf,
}

impl FsDirectory {
    /// Create (or open) a filesystem directory backend rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> JournalResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Directory for FsDirectory {
    fn create_file(&self, path: &str) -> JournalResult<Box<dyn Write>> {
        let full_path = self.resolve_path(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Box::new(std::fs::File::create(full_path)?))
    }

    fn open_file(&self, path: &str) -> JournalResult<Box<dyn Read>> {
        let full_path = self.resolve_path(path);
        match std::fs::File::open(&full_path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(JournalError::MissingPath(full_path))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve_path(path).exists()
    }

    fn delete(&self, path: &str) -> JournalResult<()> {
        let full_path = self.resolve_path(path);
        if full_path.exists() {
            std::fs::remove_file(full_path)?;
        }
        Ok(())
    }

    fn atomic_rename(&self, from: &str, to: &str) -> JournalResult<()> {
        let from_path = self.resolve_path(from);
        let to_path = self.resolve_path(to);
        if let Some(parent) = to_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(from_path, to_path)?;
        Ok(())
    }

    fn atomic_write(&self, path: &str, data: &[u8]) -> JournalResult<()> {
        let temp = temp_path(path);
        let full_temp_path = self.resolve_path(&temp);
        if let Some(parent) = full_temp_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let staged = (|| -> std::io::Result<()> {
            let mut temp_file = std::fs::File::create(&full_temp_path)?;
            temp_file.write_all(data)?;
            temp_file.sync_all()?;
            std::fs::rename(&full_temp_path, self.resolve_path(path))
        })();
        if let Err(e) = staged {
            let _ = std::fs::remove_file(&full_temp_path);
            return Err(e.into());
        }

        // Best-effort: the rename is already atomic; this only affects power-loss durability.
        if let Some(parent) = self.resolve_path(path).parent() {
            if let Ok(parent_file) = std::fs::File::open(parent) {
                let _ = parent_file.sync_all();
            }
        }
        Ok(())
    }

    fn file_path(&self, path: &str) -> Option<PathBuf> {
        Some(self.resolve_path(path))
    }
}

type SharedFiles = Arc<RwLock<HashMap<String, Vec<u8>>>>;

/// In-memory `Directory` used for tests and benches.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    files: SharedFiles,
}

impl MemoryDirectory {
    /// Create an empty in-memory directory.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Directory for MemoryDirectory {
    fn create_file(&self, path: &str) -> JournalResult<Box<dyn Write>> {
        // Overwrite semantics: clear the file eagerly, then append in-place.
        self.files
            .write()
            .map_err(|_| JournalError::poisoned("memory directory"))?
            .insert(path.to_string(), Vec::new());

        Ok(Box::new(MemoryInPlaceWriter {
            files: self.files.clone(),
            path: path.to_string(),
        }))
    }

    fn open_file(&self, path: &str) -> JournalResult<Box<dyn Read>> {
        let files = self
            .files
            .read()
            .map_err(|_| JournalError::poisoned("memory directory"))?;
        let data = files
            .get(path)
            .ok_or_else(|| JournalError::NotFound(path.to_string()))?
            .clone();
        Ok(Box::new(std::io::Cursor::new(data)))
    }

    fn exists(&self, path: &str) -> bool {
        self.files
            .read()
            .map(|f| f.contains_key(path))
            .unwrap_or(false)
    }

    fn delete(&self, path: &str) -> JournalResult<()> {
        self.files
            .write()
            .map_err(|_| JournalError::poisoned("memory directory"))?
            .remove(path);
        Ok(())
    }

    fn atomic_rename(&self, from: &str, to: &str) -> JournalResult<()> {
        let mut files = self
            .files
            .write()
            .map_err(|_| JournalError::poisoned("memory directory"))?;
        let data = files
            .remove(from)
            .ok_or_else(|| JournalError::NotFound(from.to_string()))?;
        files.insert(to.to_string(), data);
        Ok(())
    }

    fn atomic_write(&self, path: &str, data: &[u8]) -> JournalResult<()> {
        // A single map insert under the write lock is already all-or-nothing.
        self.files
            .write()
            .map_err(|_| JournalError::poisoned("memory directory"))?
            .insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn file_path(&self, _path: &str) -> Option<PathBuf> {
        None
    }
}

struct MemoryInPlaceWriter {
    files: SharedFiles,
    path: String,
}

impl Write for MemoryInPlaceWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut files = self
            .files
            .write()
            .map_err(|_| std::io::Error::other("lock poisoned"))?;
        let entry = files.entry(self.path.clone()).or_default();
        entry.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
