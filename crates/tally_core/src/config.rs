//! Ledger configuration.
//!
//! # Responsibility
//! - Name the storage keys each collection is persisted under.
//!
//! # Invariants
//! - `bills_key` and `people_key` must differ; each collection owns its key.

pub const DEFAULT_BILLS_KEY: &str = "billList";
pub const DEFAULT_PEOPLE_KEY: &str = "peopleList";

/// Storage settings for a `LedgerService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub bills_key: String,
    pub people_key: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            bills_key: DEFAULT_BILLS_KEY.to_string(),
            people_key: DEFAULT_PEOPLE_KEY.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Returns an error message when both collections would share a key.
    pub fn validate(&self) -> Result<(), String> {
        if self.bills_key.trim().is_empty() || self.people_key.trim().is_empty() {
            return Err("storage keys cannot be empty".to_string());
        }
        if self.bills_key == self.people_key {
            return Err(format!(
                "bills and people cannot share storage key `{}`",
                self.bills_key
            ));
        }
        Ok(())
    }
}
