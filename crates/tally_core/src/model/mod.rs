//! Domain model for the bill-splitting ledger.
//!
//! # Responsibility
//! - Define the persisted shapes of people and bills.
//! - Provide currency-safe split arithmetic shared by derived views.
//!
//! # Invariants
//! - A person is identified by an exact, case-sensitive `name`.
//! - A bill is identified by a unique integer `id`.
//! - Entities live only as long as their collection entry; there are no
//!   tombstones.

pub mod bill;
pub mod money;
pub mod person;
