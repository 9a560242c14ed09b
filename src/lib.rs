//! `calc_journal`: per-client calculation journal with crash-safe snapshot persistence.
//!
//! Scope:
//! - journal entries (`entry`)
//! - concurrent in-memory index keyed by tracking id (`index`)
//! - snapshot document and its load/save protocol (`snapshot`)
//! - directory abstraction with atomic replace (`storage`)
//! - the store tying them together (`store`)
//! - journaled arithmetic operations (`calc`)
//!
//! Non-goal: transport (HTTP routing, request parsing), editing or deleting entries,
//! multi-process coordination, compaction.
//!
//! ## Contract (what you can rely on)
//!
//! - **No lost appends**: concurrent appends to the same key are linearized; each appears
//!   exactly once in [`JournalStore::query`].
//! - **Read-your-writes**: `query` reflects every append that returned before it started.
//!   Queries are served from memory and never wait on disk I/O.
//! - **Blank keys are a no-op**: an empty or whitespace-only key records nothing.
//! - **Atomic snapshots**: each append rewrites the whole journal to a sibling temp file and
//!   renames it over the target. The target always holds a complete document. Each published
//!   snapshot includes every append that returned before its save started.
//! - **Forgiving load**: a missing, unreadable or malformed file yields an empty journal.
//!   Nothing is partially loaded.
//! - **Availability over durability**: a failed save does not fail `append`. The entry stays
//!   in memory and the failure shows up in [`JournalStore::save_status`] and the logs.
//!
//! Terminology:
//! - “Atomic” means no torn files. Surviving power loss additionally needs
//!   [`SyncPolicy::Durable`].
//! - One process owns the journal file. Two processes writing the same path may lose entries.

pub mod calc;
pub mod config;
pub mod entry;
pub mod error;
pub mod index;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use calc::{CalcError, CalcResult, Calculator};
pub use config::{JournalConfig, SyncPolicy};
pub use entry::JournalEntry;
pub use error::{JournalError, JournalResult};
pub use snapshot::{JournalSnapshot, LoadOutcome, SaveReport};
pub use storage::{Directory, DurableDirectory, FsDirectory, MemoryDirectory};
pub use store::{AppendOutcome, JournalStore, SaveStatus};
