//! Repository layer for durable ledger storage.
//!
//! # Responsibility
//! - Define the string-keyed storage contract the ledger persists through.
//! - Isolate SQLite details from service orchestration.
//! - Encode and decode whole collections as JSON arrays.
//!
//! # Invariants
//! - Writes overwrite the full value stored under a key.
//! - Malformed stored JSON is reported, never replaced by a default.

pub mod collection;
pub mod kv_repo;
