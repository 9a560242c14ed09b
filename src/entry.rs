//! Journal entries: one immutable record per completed calculation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed calculation.
///
/// Fields are private: once built, an entry never changes. The serialized field names
/// (`operation`, `calculation`, `timestamp`) are part of the on-disk contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    operation: String,
    calculation: String,
    timestamp: DateTime<Utc>,
}

impl JournalEntry {
    /// Create an entry stamped with the current UTC instant.
    pub fn new(operation: impl Into<String>, calculation: impl Into<String>) -> Self {
        Self::at(operation, calculation, Utc::now())
    }

    /// Create an entry with an explicit timestamp.
    pub fn at(
        operation: impl Into<String>,
        calculation: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            operation: operation.into(),
            calculation: calculation.into(),
            timestamp,
        }
    }

    /// Label of the operation that produced this entry (`"Add"`, `"Sqrt"`, ...).
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Human-readable rendering of inputs and result, e.g. `"5 + 7 = 12"`.
    pub fn calculation(&self) -> &str {
        &self.calculation
    }

    /// When the entry was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
