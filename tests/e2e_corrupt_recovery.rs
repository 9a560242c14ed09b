//! Startup never fails because of the journal file's contents.

mod support;

use calc_journal::{
    Directory, FsDirectory, JournalConfig, JournalEntry, JournalStore, LoadOutcome, SyncPolicy,
};
use std::sync::Arc;
use support::FaultyDirectory;

fn open_with_contents(contents: &[u8]) -> (tempfile::TempDir, JournalStore) {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("journal.json");
    std::fs::write(&path, contents).unwrap();
    let store = JournalStore::open(JournalConfig::new(&path)).unwrap();
    (tmp, store)
}

#[test]
fn corrupt_file_starts_empty() {
    let (_tmp, store) = open_with_contents(b"{not-valid-json");
    assert!(store.query("any-id").is_empty());
    assert_eq!(store.key_count(), 0);
    assert!(matches!(store.load_outcome(), LoadOutcome::Discarded { .. }));
}

#[test]
fn empty_file_starts_empty() {
    let (_tmp, store) = open_with_contents(b"");
    assert!(store.query("any-id").is_empty());
    assert!(matches!(store.load_outcome(), LoadOutcome::Discarded { .. }));
}

#[test]
fn unexpected_shape_is_not_partially_loaded() {
    // First key is fine, second is malformed: nothing is loaded.
    let doc = br#"{
        "good": [{"operation": "Add", "calculation": "1 + 1 = 2", "timestamp": "2024-01-01T00:00:00Z"}],
        "bad": [{"operation": "Add"}]
    }"#;
    let (_tmp, store) = open_with_contents(doc);
    assert!(store.query("good").is_empty());
    assert!(store.query("bad").is_empty());
}

#[test]
fn duplicate_key_is_discarded_whole() {
    let doc = br#"{
        "t1": [{"operation": "Add", "calculation": "a", "timestamp": "2024-01-01T00:00:00Z"}],
        "t1": [{"operation": "Add", "calculation": "b", "timestamp": "2024-01-01T00:00:00Z"}]
    }"#;
    let (_tmp, store) = open_with_contents(doc);
    assert!(store.query("t1").is_empty());
    assert_eq!(store.key_count(), 0);
    match store.load_outcome() {
        LoadOutcome::Discarded { reason } => {
            assert!(reason.contains("duplicate tracking key"), "{reason}")
        }
        other => panic!("expected the file to be discarded, got {other:?}"),
    }
}

#[test]
fn unreadable_file_starts_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("journal.json");
    // A directory where the file should be: it exists but cannot be read as one.
    std::fs::create_dir(&path).unwrap();

    let store = JournalStore::open(JournalConfig::new(&path)).unwrap();
    assert!(store.query("any-id").is_empty());
    assert!(matches!(store.load_outcome(), LoadOutcome::Discarded { .. }));
}

#[test]
fn file_deleted_after_exists_check_reads_as_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let faulty = FaultyDirectory::new(FsDirectory::new(tmp.path()).unwrap());
    faulty.cfg().lock().unwrap().report_missing_as_present = true;
    let dir: Arc<dyn Directory> = Arc::new(faulty);

    let store = JournalStore::with_directory(dir, "journal.json", SyncPolicy::Atomic);
    assert_eq!(store.load_outcome(), &LoadOutcome::Missing);
    assert!(store.query("any-id").is_empty());
}

#[test]
fn missing_file_starts_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("journal.json");
    let store = JournalStore::open(JournalConfig::new(&path)).unwrap();
    assert_eq!(store.load_outcome(), &LoadOutcome::Missing);
    assert!(store.query("unknown-key").is_empty());
    assert!(!path.exists());
}

#[test]
fn first_save_after_corruption_replaces_the_file() {
    let (tmp, store) = open_with_contents(b"\x00\xffgarbage");
    store.append("t1", JournalEntry::new("Sum", "5 + 7 = 12"));
    drop(store);

    let reopened = JournalStore::open(JournalConfig::new(tmp.path().join("journal.json"))).unwrap();
    assert_eq!(reopened.query("t1").len(), 1);
    assert!(matches!(reopened.load_outcome(), LoadOutcome::Loaded { .. }));
}

#[test]
fn valid_file_written_by_other_tooling_loads() {
    let doc = r#"{"t1": [
        {"operation": "Add", "calculation": "5 + 7 = 12", "timestamp": "2024-05-01T10:00:00.1234567Z"},
        {"operation": "Sqrt", "calculation": "√16 = 4", "timestamp": "2024-05-01T10:00:01+00:00"}
    ]}"#
    .as_bytes();
    let (_tmp, store) = open_with_contents(doc);
    let got = store.query("t1");
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].operation(), "Add");
    assert_eq!(got[1].calculation(), "√16 = 4");
}
