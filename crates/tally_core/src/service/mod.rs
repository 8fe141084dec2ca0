//! Ledger use-case services.
//!
//! # Responsibility
//! - Hold the bill and people collections in memory.
//! - Coordinate cross-collection consistency and persistence through one
//!   owning service, so neither collection references the other.

pub mod bill_store;
pub mod ledger_service;
pub mod people_store;
