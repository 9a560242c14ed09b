//! Benchmarks for `JournalStore::append` (in-memory index + full snapshot save).
#![allow(missing_docs)]

use calc_journal::storage::{Directory, FsDirectory, MemoryDirectory};
use calc_journal::{JournalEntry, JournalStore, SyncPolicy};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::sync::Arc;

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    group.sample_size(20);

    group.bench_function("append_100_memory", |b| {
        b.iter_batched(
            || {
                let dir: Arc<dyn Directory> = Arc::new(MemoryDirectory::new());
                JournalStore::with_directory(dir, "journal.json", SyncPolicy::Atomic)
            },
            |store| {
                for i in 0..100 {
                    store.append("bench", JournalEntry::new("Add", format!("{i} + 1 = {}", i + 1)));
                }
                std::hint::black_box(store.entry_count());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("append_100_fs", |b| {
        b.iter_batched(
            || {
                let tmp = tempfile::tempdir().unwrap();
                let dir: Arc<dyn Directory> = Arc::new(FsDirectory::new(tmp.path()).unwrap());
                let store = JournalStore::with_directory(dir, "journal.json", SyncPolicy::Atomic);
                (tmp, store)
            },
            |(tmp, store)| {
                for i in 0..100 {
                    store.append("bench", JournalEntry::new("Add", format!("{i} + 1 = {}", i + 1)));
                }
                drop(store);
                drop(tmp);
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("query_1000_entries", |b| {
        let dir: Arc<dyn Directory> = Arc::new(MemoryDirectory::new());
        let store = JournalStore::with_directory(dir, "journal.json", SyncPolicy::Atomic);
        for i in 0..1000 {
            store.append("bench", JournalEntry::new("Add", format!("{i}")));
        }
        b.iter(|| std::hint::black_box(store.query("bench")));
    });

    group.finish();
}

criterion_group!(benches, bench_append);
criterion_main!(benches);
