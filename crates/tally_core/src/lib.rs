//! Core state layer for a personal bill-splitting ledger.
//!
//! A fixed roster of people shares a list of bills. This crate owns both
//! collections, keeps them referentially consistent, derives who owes how
//! much on which date, and mirrors every change to durable storage.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::LedgerConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::bill::{Bill, BillId, BillValidationError, Payer};
pub use model::person::{PaidDates, Person};
pub use repo::kv_repo::{KvRepository, SqliteKvRepository, StorageError, StorageResult};
pub use service::bill_store::{BillStore, PayerAmounts};
pub use service::ledger_service::{LedgerError, LedgerResult, LedgerService, LedgerSnapshot};
pub use service::people_store::PeopleStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
