//! Shared helpers for integration tests.

#![allow(dead_code)]

mod faulty_directory;

pub use faulty_directory::{FaultConfig, FaultyDirectory};
