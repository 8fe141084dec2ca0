//! Person domain model.
//!
//! # Responsibility
//! - Define the roster entry and its per-date paid flags.
//!
//! # Invariants
//! - `name` is unique within the roster (enforced by `PeopleStore`).
//! - `paid` is a derived summary; it is only written by reconciliation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-date paid flags keyed by ISO `YYYY-MM-DD` date.
pub type PaidDates = BTreeMap<String, bool>;

/// One participant of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Exact, case-sensitive identity within the roster.
    pub name: String,
    /// True iff every date this person owes money on is marked paid.
    pub paid: bool,
    /// Records written before per-date tracking existed carry no `dates`.
    #[serde(default)]
    pub dates: PaidDates,
}

impl Person {
    /// Creates an unpaid person with no per-date flags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paid: false,
            dates: PaidDates::new(),
        }
    }

    /// Returns the stored flag for `date`, or `false` when absent.
    pub fn paid_on(&self, date: &str) -> bool {
        self.dates.get(date).copied().unwrap_or(false)
    }
}
