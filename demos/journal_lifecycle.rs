//! Minimal consumer of `calc_journal`.
//!
//! Exercises the journal the way an API layer would:
//! - tracked and untracked calculations
//! - concurrent callers sharing one store
//! - restart from the persisted file
//!
//! Run:
//! `RUST_LOG=debug cargo run --example journal_lifecycle`

use calc_journal::{Calculator, JournalConfig, JournalStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let tmp = tempfile::tempdir()?;
    let config = JournalConfig::new(tmp.path().join("journal.json"));

    let store = Arc::new(JournalStore::open(config.clone())?);
    let calc = Calculator::new(store.clone());

    calc.add(&[5.0, 7.0], Some("client-a"))?;
    calc.div(7.0, 2.0, Some("client-a"))?;
    calc.sqrt(2.0, None)?;
    if let Err(e) = calc.div(1.0, 0.0, Some("client-a")) {
        println!("rejected: {} ({})", e, e.code());
    }

    let workers: Vec<_> = (0..4u8)
        .map(|w| {
            let calc = calc.clone();
            std::thread::spawn(move || {
                for i in 0..5u8 {
                    let _ = calc.mul(&[f64::from(w), f64::from(i)], Some("client-b"));
                }
            })
        })
        .collect();
    for w in workers {
        w.join().map_err(|_| "worker panicked")?;
    }

    println!("save status: {:?}", store.save_status());
    drop(calc);
    drop(store);

    // Restart.
    let reopened = JournalStore::open(config)?;
    println!("load outcome: {:?}", reopened.load_outcome());
    for key in ["client-a", "client-b", "nobody"] {
        let entries = reopened.query(key);
        println!("{key}: {} entries", entries.len());
        for e in entries {
            println!(
                "  {} {:<5} {}",
                e.timestamp().to_rfc3339(),
                e.operation(),
                e.calculation()
            );
        }
    }
    Ok(())
}
